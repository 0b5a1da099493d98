//! # precio-config: Pricing Settings for Precio
//!
//! Loads, validates and saves the settings the pricing engine is
//! parameterized with. precio-core never reads settings itself; callers
//! load a [`PricingSettings`] here and pass its values in.
//!
//! ## Usage
//! ```rust,no_run
//! use precio_config::PricingSettings;
//!
//! let settings = PricingSettings::load_or_default(None);
//! let resolver = settings.resolver();
//! let mode = settings.rounding_mode();
//! ```

pub mod error;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{DefaultsSettings, PricingSettings, RoundingSettings};
