//! Static game configuration: dice range, board geometry, economy constants.

use crate::{errors::ErrorCategory, players::Money};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Malformed configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::ValidationFailure
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Dice configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiceConfig {
    /// Lowest face value (inclusive)
    pub min_value: u8,

    /// Highest face value (inclusive)
    pub max_value: u8,

    /// Whether a double grants another roll
    pub double_roll_bonus: bool,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            min_value: 1,
            max_value: 6,
            double_roll_bonus: true,
        }
    }
}

/// Board geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    /// Cells on the inner (rat race) track
    pub inner_track_cells: usize,

    /// Cells on the outer (fast) track
    pub outer_track_cells: usize,

    /// Offset of the PAYDAY cell
    pub payday_position: usize,

    /// Offset of the charity cell
    pub charity_position: usize,

    /// Offset of the baby cell, if the board has one
    pub baby_position: Option<usize>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            inner_track_cells: 24,
            outer_track_cells: 52,
            payday_position: 6,
            charity_position: 12,
            baby_position: None,
        }
    }
}

/// Presentation timing. Not consulted by any game rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    pub animation_duration_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            animation_duration_ms: 800,
        }
    }
}

/// Money rules applied by the event handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EconomyConfig {
    /// Monthly expense per child, charged at PAYDAY
    pub child_expense: Money,

    /// One-off gift credited when a child is born
    pub baby_bonus: Money,

    /// Children cap per player
    pub max_children: u8,

    /// Monthly interest on outstanding credit, in percent
    pub credit_interest_percent: u32,

    /// Share of monthly income donated on the charity cell, in percent
    pub charity_percent: u32,

    /// Balance given to newly added players
    pub starting_balance: Money,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            child_expense: 1000,
            baby_bonus: 5000,
            max_children: 3,
            credit_interest_percent: 10,
            charity_percent: 10,
            starting_balance: 10_000,
        }
    }
}

/// Capacity of each diagnostic history buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    pub rolls: usize,
    pub draws: usize,
    pub moves: usize,
    pub events: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            rolls: 50,
            draws: 100,
            moves: 100,
            events: 100,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub dice: DiceConfig,
    pub board: BoardConfig,
    pub ui: UiConfig,
    pub economy: EconomyConfig,
    pub history: HistoryConfig,
}

impl GameConfig {
    /// Parse a JSON document. Missing sections and keys keep their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with process environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values returned by `lookup`.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn read<T: std::str::FromStr, F: Fn(&str) -> Option<String>>(
            lookup: &F,
            key: &str,
            default: T,
        ) -> T {
            lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        }

        let defaults = Self::default();
        let config = Self {
            dice: DiceConfig {
                min_value: read(&lookup, "DICE_MIN_VALUE", defaults.dice.min_value),
                max_value: read(&lookup, "DICE_MAX_VALUE", defaults.dice.max_value),
                double_roll_bonus: read(
                    &lookup,
                    "DICE_DOUBLE_ROLL_BONUS",
                    defaults.dice.double_roll_bonus,
                ),
            },
            board: BoardConfig {
                inner_track_cells: read(
                    &lookup,
                    "BOARD_INNER_TRACK_CELLS",
                    defaults.board.inner_track_cells,
                ),
                outer_track_cells: read(
                    &lookup,
                    "BOARD_OUTER_TRACK_CELLS",
                    defaults.board.outer_track_cells,
                ),
                payday_position: read(
                    &lookup,
                    "BOARD_PAYDAY_POSITION",
                    defaults.board.payday_position,
                ),
                charity_position: read(
                    &lookup,
                    "BOARD_CHARITY_POSITION",
                    defaults.board.charity_position,
                ),
                baby_position: lookup("BOARD_BABY_POSITION").and_then(|v| v.parse().ok()),
            },
            ui: UiConfig {
                animation_duration_ms: read(
                    &lookup,
                    "UI_ANIMATION_DURATION_MS",
                    defaults.ui.animation_duration_ms,
                ),
            },
            economy: defaults.economy,
            history: defaults.history,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.dice.min_value == 0 {
            return Err(ConfigError::Invalid(
                "Dice minimum value must be at least 1".to_string(),
            ));
        }

        if self.dice.min_value > self.dice.max_value {
            return Err(ConfigError::Invalid(format!(
                "Dice minimum {} exceeds maximum {}",
                self.dice.min_value, self.dice.max_value
            )));
        }

        if self.board.inner_track_cells == 0 || self.board.outer_track_cells == 0 {
            return Err(ConfigError::Invalid(
                "Both tracks need at least one cell".to_string(),
            ));
        }

        let inner = self.board.inner_track_cells;
        let specials = [
            ("payday", Some(self.board.payday_position)),
            ("charity", Some(self.board.charity_position)),
            ("baby", self.board.baby_position),
        ];
        for (name, position) in specials {
            match position {
                Some(position) if position >= inner => {
                    return Err(ConfigError::Invalid(format!(
                        "The {name} position {position} is outside the inner track (0..{inner})"
                    )));
                }
                _ => {}
            }
        }

        if self.economy.max_children == 0 && self.economy.baby_bonus > 0 {
            log::warn!("Baby bonus configured but max_children is 0; no child will ever be born");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dice.min_value, 1);
        assert_eq!(config.dice.max_value, 6);
        assert!(config.dice.double_roll_bonus);
        assert_eq!(config.economy.child_expense, 1000);
        assert_eq!(config.economy.baby_bonus, 5000);
        assert_eq!(config.economy.max_children, 3);
    }

    #[test]
    fn test_dice_min_greater_than_max_rejected() {
        let mut config = GameConfig::default();
        config.dice.min_value = 7;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_min_value_rejected() {
        let mut config = GameConfig::default();
        config.dice.min_value = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_special_position_outside_track_rejected() {
        let mut config = GameConfig::default();
        config.board.payday_position = config.board.inner_track_cells;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.board.baby_position = Some(100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_track_rejected() {
        let mut config = GameConfig::default();
        config.board.outer_track_cells = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial_document() {
        let config =
            GameConfig::from_json(r#"{ "dice": { "maxValue": 8, "doubleRollBonus": false } }"#)
                .unwrap();
        assert_eq!(config.dice.min_value, 1);
        assert_eq!(config.dice.max_value, 8);
        assert!(!config.dice.double_roll_bonus);
        assert_eq!(config.board, BoardConfig::default());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert_eq!(err.category(), ErrorCategory::ValidationFailure);
    }

    #[test]
    fn test_from_json_invalid_values() {
        let err = GameConfig::from_json(r#"{ "dice": { "minValue": 5, "maxValue": 2 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DICE_MAX_VALUE", "12"),
            ("BOARD_PAYDAY_POSITION", "3"),
            ("BOARD_BABY_POSITION", "9"),
            ("DICE_DOUBLE_ROLL_BONUS", "false"),
        ]);
        let config = GameConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.dice.max_value, 12);
        assert_eq!(config.board.payday_position, 3);
        assert_eq!(config.board.baby_position, Some(9));
        assert!(!config.dice.double_roll_bonus);
    }

    #[test]
    fn test_from_lookup_ignores_garbage() {
        let config = GameConfig::from_lookup(|k| {
            (k == "DICE_MAX_VALUE").then(|| "lots".to_string())
        })
        .unwrap();
        assert_eq!(config.dice.max_value, 6);
    }
}
