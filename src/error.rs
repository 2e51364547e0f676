//! Crate error type
//!
//! Only construction-time operations fail. Per-frame code recovers locally
//! (skipped obstacles, placeholder models) and never returns these.

use crate::sim::ZoneKind;

#[derive(Debug, Clone, PartialEq)]
pub enum CorridorError {
    /// Tuning could not be parsed or failed validation
    Config(String),
    /// A zone descriptor rejected by the strict layout policy
    InvalidZone { zone: ZoneKind, reason: String },
    /// A model load failed; the placeholder stays in place
    Asset(String),
}

impl std::fmt::Display for CorridorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(m) => write!(f, "invalid tuning: {m}"),
            Self::InvalidZone { zone, reason } => write!(f, "invalid {zone:?} zone: {reason}"),
            Self::Asset(m) => write!(f, "asset load failed: {m}"),
        }
    }
}

impl std::error::Error for CorridorError {}

impl From<serde_json::Error> for CorridorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_zone() {
        let err = CorridorError::InvalidZone {
            zone: ZoneKind::BlinkMaze,
            reason: "count is zero".into(),
        };
        assert_eq!(err.to_string(), "invalid BlinkMaze zone: count is zero");
    }

    #[test]
    fn test_json_error_maps_to_config() {
        let err: CorridorError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, CorridorError::Config(_)));
    }
}
