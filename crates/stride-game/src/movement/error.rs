/// Failures of a spatial probe. The controller treats any of these as
/// "no room to stand".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("character body is not in the physics world")]
    BodyNotSpawned,

    #[error("probe segment is not finite: {from} -> {to}")]
    NonFiniteSegment { from: glam::Vec3, to: glam::Vec3 },
}

/// Errors from loading or validating a movement config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse movement config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid movement config: `{field}` must be {requirement}, got {value}")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },
}
