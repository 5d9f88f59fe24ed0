//! Configuration types for the draw engine and the lobby.

use serde::{Deserialize, Serialize};

use crate::{DrawError, Result, constants};

/// Matching engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Retry ceiling for rejection sampling. Must be non-zero.
    pub max_attempts: usize,
    /// Smallest participating roster accepted by the matcher.
    pub min_participants: usize,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::DEFAULT_MAX_DRAW_ATTEMPTS,
            min_participants: constants::MIN_PARTICIPANTS,
        }
    }
}

impl DrawConfig {
    /// Parse from a JSON document; missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(DrawError::Configuration(
                "max_attempts must be > 0".into(),
            ));
        }
        if self.min_participants < constants::MIN_PARTICIPANTS {
            return Err(DrawError::Configuration(format!(
                "min_participants must be >= {}",
                constants::MIN_PARTICIPANTS
            )));
        }
        Ok(())
    }
}

/// Lobby (pre-lock roster) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Maximum members per group, spectators included.
    pub max_participants: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_participants: constants::DEFAULT_MAX_PARTICIPANTS,
        }
    }
}

impl LobbyConfig {
    pub fn from_json(input: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_participants < constants::MIN_PARTICIPANTS {
            return Err(DrawError::Configuration(format!(
                "max_participants must be >= {}",
                constants::MIN_PARTICIPANTS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_config_defaults() {
        let cfg = DrawConfig::default();
        assert_eq!(cfg.max_attempts, 1000);
        assert_eq!(cfg.min_participants, 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn draw_config_partial_json() {
        let cfg = DrawConfig::from_json(r#"{ "max_attempts": 250 }"#).unwrap();
        assert_eq!(cfg.max_attempts, 250);
        assert_eq!(cfg.min_participants, 2);
    }

    #[test]
    fn zero_ceiling_rejected() {
        let err = DrawConfig::from_json(r#"{ "max_attempts": 0 }"#).unwrap_err();
        assert!(matches!(err, DrawError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = DrawConfig::from_json("{ not json").unwrap_err();
        assert!(format!("{err}").starts_with("DRAW_ERR_900"));
    }

    #[test]
    fn lobby_config_defaults_and_validation() {
        assert_eq!(LobbyConfig::default().max_participants, 500);
        assert!(LobbyConfig::from_json(r#"{ "max_participants": 1 }"#).is_err());
        assert_eq!(
            LobbyConfig::from_json("{}").unwrap(),
            LobbyConfig::default()
        );
    }
}
