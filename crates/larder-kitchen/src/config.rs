//! Kitchen configuration.
//!
//! Loaded from TOML. Every section is optional; missing values fall back to
//! the defaults below.
//!
//! ```toml
//! extra_portion_chance = 0.1
//! burnt_item = 900
//!
//! [slots]
//! usable_by_level = [2, 3, 4, 5, 6]
//! max = 6
//!
//! [burn]
//! base = 0.04
//! per_ingredient = 0.02
//!
//! [[seasonings]]
//! item = 917
//! quality = 2
//! ```

use std::path::Path;

use larder_common::{ItemTypeId, LarderError, Quality};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::providers::{BurnCurve, ExtraPortion, Seasoning, SeasoningTable};
use crate::slots::SlotTable;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range or inconsistent.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for LarderError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Read(io) => Self::Io(io),
            other => Self::Config(other.to_string()),
        }
    }
}

/// Ingredient slot settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotSettings {
    /// Usable slots per cooking tool level
    pub usable_by_level: Vec<usize>,
    /// Slots displayed, including locked ones
    pub max: usize,
}

impl Default for SlotSettings {
    fn default() -> Self {
        Self {
            usable_by_level: vec![2, 3, 4, 5, 6],
            max: 6,
        }
    }
}

/// Kitchen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    /// Ingredient slot settings
    pub slots: SlotSettings,
    /// Burn chance curve
    pub burn: BurnCurve,
    /// Chance of an extra portion per craft
    pub extra_portion_chance: f64,
    /// Item given in place of each burnt unit
    pub burnt_item: Option<ItemTypeId>,
    /// Experience per successfully cooked unit
    pub experience_per_unit: u32,
    /// Seasonings, in any order
    pub seasonings: Vec<Seasoning>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            slots: SlotSettings::default(),
            burn: BurnCurve::default(),
            extra_portion_chance: 0.0,
            burnt_item: None,
            experience_per_unit: 1,
            seasonings: Vec::new(),
        }
    }
}

impl KitchenConfig {
    /// Parses and validates a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            "Loaded kitchen config from {:?} ({} seasonings)",
            path,
            config.seasonings.len()
        );
        Ok(config)
    }

    /// Checks ranges and consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.slot_table()?;

        let burn = &self.burn;
        for (name, value) in [
            ("burn.base", burn.base),
            ("burn.per_ingredient", burn.per_ingredient),
            ("burn.skill_reduction", burn.skill_reduction),
            ("burn.tool_reduction", burn.tool_reduction),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !(0.0..1.0).contains(&burn.max) {
            return Err(ConfigError::Invalid(format!(
                "burn.max must be in [0, 1), got {}",
                burn.max
            )));
        }
        if !(0.0..=1.0).contains(&self.extra_portion_chance) {
            return Err(ConfigError::Invalid(format!(
                "extra_portion_chance must be in [0, 1], got {}",
                self.extra_portion_chance
            )));
        }
        if let Some(flat) = self
            .seasonings
            .iter()
            .find(|s| s.quality == Quality::Normal)
        {
            return Err(ConfigError::Invalid(format!(
                "seasoning {} does not raise quality",
                flat.item
            )));
        }
        debug!("Kitchen config validated");
        Ok(())
    }

    /// Builds the slot capacity table.
    pub fn slot_table(&self) -> Result<SlotTable, ConfigError> {
        SlotTable::new(self.slots.usable_by_level.clone(), self.slots.max)
    }

    /// Builds the ranked seasoning table.
    #[must_use]
    pub fn seasoning_table(&self) -> SeasoningTable {
        SeasoningTable::new(self.seasonings.clone())
    }

    /// Extra portion bonus derived from the configured chance.
    #[must_use]
    pub fn extra_portion(&self) -> ExtraPortion {
        ExtraPortion::from_chance(self.extra_portion_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SeasoningProvider;
    use crate::slots::SlotCapacity;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = KitchenConfig::from_toml_str("").expect("valid");
        assert_eq!(config, KitchenConfig::default());
        assert_eq!(config.extra_portion(), ExtraPortion::Never);
    }

    #[test]
    fn test_full_config_parses() {
        let config = KitchenConfig::from_toml_str(
            r#"
            extra_portion_chance = 0.25
            burnt_item = 900
            experience_per_unit = 4

            [slots]
            usable_by_level = [1, 2, 4]
            max = 5

            [burn]
            base = 0.1
            max = 0.5

            [[seasonings]]
            item = 917
            quality = 1

            [[seasonings]]
            item = 918
            quality = 4
            "#,
        )
        .expect("valid");

        assert_eq!(config.burnt_item, Some(ItemTypeId::new(900)));
        assert_eq!(config.extra_portion(), ExtraPortion::Chance(0.25));
        let table = config.slot_table().expect("valid table");
        assert_eq!(table.usable_slots(2), 4);
        assert_eq!(table.max_slots(), 5);
        // Unspecified burn fields keep their defaults.
        assert!((config.burn.per_ingredient - BurnCurve::default().per_ingredient).abs() < 1e-12);
        let ranked = config.seasoning_table();
        assert_eq!(ranked.ranked()[0].item, ItemTypeId::new(918));
    }

    #[test]
    fn test_rejects_quality_three() {
        let result = KitchenConfig::from_toml_str(
            r#"
            [[seasonings]]
            item = 1
            quality = 3
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let result = KitchenConfig::from_toml_str("[burn]\nmax = 1.0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = KitchenConfig::from_toml_str("[slots]\nusable_by_level = [4, 2]");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = KitchenConfig::from_toml_str("[[seasonings]]\nitem = 1\nquality = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "experience_per_unit = 7").expect("write");
        let config = KitchenConfig::load(file.path()).expect("valid");
        assert_eq!(config.experience_per_unit, 7);

        let missing = KitchenConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Read(_))));
    }

    #[test]
    fn test_bundled_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/kitchen.toml");
        let config = KitchenConfig::load(path).expect("bundled config");
        assert_eq!(config.burnt_item, Some(ItemTypeId::new(900)));
        assert_eq!(config.seasoning_table().ranked()[0].quality, Quality::Gold);
    }
}
