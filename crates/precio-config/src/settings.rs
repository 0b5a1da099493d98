//! # Pricing Settings
//!
//! The per-company values the pricing engine is parameterized with.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PRECIO_ROUNDING_MODE=up                                            │
//! │     PRECIO_DEFAULT_VAT=10.5                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pricing/pricing.toml (Linux)                             │
//! │     ~/Library/Application Support/com.precio.pricing/pricing.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     half_up, 2 decimals, 30% margin, 21% VAT, L1/L2/L3 = 20/15/10      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [rounding]
//! mode = "half_up"   # half_up | up | down
//! decimals = 2
//!
//! [pricing]
//! default_margin_percent = 30
//! default_vat_percent = 21
//!
//! [tiers]
//! l1 = 20
//! l2 = 15
//! l3 = 10
//! ```

use precio_core::validation::validate_vat_rate;
use precio_core::{Percent, PriceListResolver, PriceRow, RoundingMode, TierMargins};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// Decimal places the engine actually rounds to.
pub const ENGINE_DECIMALS: u32 = 2;

/// Largest `rounding.decimals` accepted in a settings file.
pub const MAX_ROUNDING_DECIMALS: u32 = 4;

// =============================================================================
// Rounding Settings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingSettings {
    #[serde(default)]
    pub mode: RoundingMode,

    /// Stored for the settings screen. The engine always rounds to cents.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_decimals() -> u32 {
    ENGINE_DECIMALS
}

impl Default for RoundingSettings {
    fn default() -> Self {
        RoundingSettings {
            mode: RoundingMode::default(),
            decimals: default_decimals(),
        }
    }
}

// =============================================================================
// Pricing Defaults
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsSettings {
    /// Margin seeded into new margin-driven price rows.
    #[serde(default = "default_margin")]
    pub default_margin_percent: Percent,

    /// VAT used when the caller has none for a product.
    #[serde(default = "default_vat")]
    pub default_vat_percent: Percent,
}

fn default_margin() -> Percent {
    Percent::from_bps(3000)
}

fn default_vat() -> Percent {
    Percent::from_bps(2100)
}

impl Default for DefaultsSettings {
    fn default() -> Self {
        DefaultsSettings {
            default_margin_percent: default_margin(),
            default_vat_percent: default_vat(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Complete pricing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub rounding: RoundingSettings,

    #[serde(default)]
    pub pricing: DefaultsSettings,

    /// Fallback margins for price lists without a precomputed price.
    #[serde(default)]
    pub tiers: TierMargins,
}

impl PricingSettings {
    /// Loads settings from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricing.toml), if it exists
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut settings = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing settings from file");
                settings = Self::from_file(&path)?;
            } else {
                debug!(?path, "Settings file not found, using defaults");
            }
        }

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or falls back to defaults if anything fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load pricing settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a settings file without environment overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Writes settings as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Pricing settings saved");
        Ok(path)
    }

    /// Checks values the engine cannot work with.
    ///
    /// A `rounding.decimals` other than 2 is accepted with a warning: the
    /// engine keeps rounding to cents.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_vat_rate(self.pricing.default_vat_percent).map_err(|e| ConfigError::InvalidValue {
            key: "pricing.default_vat_percent".to_string(),
            reason: e.to_string(),
        })?;

        if self.rounding.decimals > MAX_ROUNDING_DECIMALS {
            return Err(ConfigError::InvalidValue {
                key: "rounding.decimals".to_string(),
                reason: format!("must be at most {}", MAX_ROUNDING_DECIMALS),
            });
        }

        if self.rounding.decimals != ENGINE_DECIMALS {
            warn!(
                configured = self.rounding.decimals,
                applied = ENGINE_DECIMALS,
                "Rounding decimals setting is not applied by the pricing engine"
            );
        }

        Ok(())
    }

    /// Applies `PRECIO_*` overrides looked up through `lookup`.
    ///
    /// Values that do not parse are logged and skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("PRECIO_ROUNDING_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding rounding mode from environment");
                    self.rounding.mode = parsed;
                }
                Err(e) => warn!(value = %mode, error = %e, "Ignoring PRECIO_ROUNDING_MODE"),
            }
        }

        if let Some(decimals) = lookup("PRECIO_ROUNDING_DECIMALS") {
            match decimals.trim().parse::<u32>() {
                Ok(d) => self.rounding.decimals = d,
                Err(e) => warn!(value = %decimals, error = %e, "Ignoring PRECIO_ROUNDING_DECIMALS"),
            }
        }

        if let Some(margin) = lookup("PRECIO_DEFAULT_MARGIN") {
            if let Some(p) = parse_percent("PRECIO_DEFAULT_MARGIN", &margin) {
                self.pricing.default_margin_percent = p;
            }
        }

        if let Some(vat) = lookup("PRECIO_DEFAULT_VAT") {
            if let Some(p) = parse_percent("PRECIO_DEFAULT_VAT", &vat) {
                debug!(vat = %p, "Overriding default VAT from environment");
                self.pricing.default_vat_percent = p;
            }
        }
    }

    /// Returns the default settings file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "precio", "pricing")
            .map(|dirs| dirs.config_dir().join("pricing.toml"))
    }

    // =========================================================================
    // Engine Hand-off
    // =========================================================================

    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding.mode
    }

    /// Price-list resolver using these tier margins and rounding mode.
    pub fn resolver(&self) -> PriceListResolver {
        PriceListResolver::new(self.tiers, self.rounding.mode)
    }

    /// A new margin-driven row seeded with the default margin.
    pub fn new_direct_row(&self, label: impl Into<String>) -> PriceRow {
        PriceRow::direct(label, self.pricing.default_margin_percent)
    }

    /// The given VAT, or the configured default.
    pub fn vat_or_default(&self, vat: Option<Percent>) -> Percent {
        vat.unwrap_or(self.pricing.default_vat_percent)
    }
}

fn parse_percent(key: &str, raw: &str) -> Option<Percent> {
    match raw.trim().parse::<Decimal>() {
        Ok(value) => Some(Percent::new(value)),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring malformed percentage");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("precio-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let settings = PricingSettings::default();
        assert_eq!(settings.rounding.mode, RoundingMode::HalfUp);
        assert_eq!(settings.rounding.decimals, 2);
        assert_eq!(settings.pricing.default_margin_percent.value(), dec!(30));
        assert_eq!(settings.pricing.default_vat_percent.value(), dec!(21));
        assert_eq!(settings.tiers, TierMargins::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: PricingSettings = toml::from_str(
            r#"
            [rounding]
            mode = "down"

            [tiers]
            l1 = 25
            "#,
        )
        .unwrap();

        assert_eq!(settings.rounding.mode, RoundingMode::Down);
        assert_eq!(settings.rounding.decimals, 2);
        assert_eq!(settings.tiers.l1.value(), dec!(25));
        assert_eq!(settings.tiers.l2.value(), dec!(15));
        assert_eq!(settings.pricing, DefaultsSettings::default());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&PricingSettings::default()).unwrap();
        assert!(toml_str.contains("[rounding]"));
        assert!(toml_str.contains("[pricing]"));
        assert!(toml_str.contains("[tiers]"));

        let parsed: PricingSettings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, PricingSettings::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = temp_path("pricing.toml");
        let mut settings = PricingSettings::default();
        settings.rounding.mode = RoundingMode::Up;
        settings.pricing.default_vat_percent = Percent::new(dec!(10.5));

        let saved_to = settings.save(Some(path.clone())).unwrap();
        let loaded = PricingSettings::from_file(&saved_to).unwrap();

        assert_eq!(loaded, settings);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let path = temp_path("broken.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[rounding]\nmode = \"sideways\"\n").unwrap();

        let err = PricingSettings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = PricingSettings::default();
        settings.apply_overrides(lookup_from(&[
            ("PRECIO_ROUNDING_MODE", "UP"),
            ("PRECIO_DEFAULT_MARGIN", "42.5"),
            ("PRECIO_DEFAULT_VAT", " 10.5 "),
            ("PRECIO_ROUNDING_DECIMALS", "2"),
        ]));

        assert_eq!(settings.rounding.mode, RoundingMode::Up);
        assert_eq!(settings.pricing.default_margin_percent.value(), dec!(42.5));
        assert_eq!(settings.pricing.default_vat_percent.value(), dec!(10.5));
    }

    #[test]
    fn test_malformed_env_override_is_ignored() {
        let mut settings = PricingSettings::default();
        settings.apply_overrides(lookup_from(&[
            ("PRECIO_ROUNDING_MODE", "bankers"),
            ("PRECIO_DEFAULT_VAT", "twenty"),
            ("PRECIO_ROUNDING_DECIMALS", "-1"),
        ]));
        assert_eq!(settings, PricingSettings::default());
    }

    #[test]
    fn test_validation() {
        let mut settings = PricingSettings::default();
        settings.pricing.default_vat_percent = Percent::new(dec!(150));
        assert!(settings.validate().is_err());

        let mut settings = PricingSettings::default();
        settings.rounding.decimals = 9;
        assert!(settings.validate().is_err());

        // Accepted with a warning; the engine still rounds to cents.
        settings.rounding.decimals = 0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_engine_hand_off() {
        let settings = PricingSettings::default();
        let row = settings.new_direct_row("List 1");
        assert_eq!(row.margin_percent.value(), dec!(30));
        assert_eq!(settings.vat_or_default(None).value(), dec!(21));
        assert_eq!(settings.vat_or_default(Some(Percent::zero())), Percent::zero());
        assert_eq!(settings.resolver(), PriceListResolver::default());
    }
}
