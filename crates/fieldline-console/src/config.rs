//! # Console Configuration
//!
//! Stores configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`FIELDLINE_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};

use fieldline_core::types::TaxRate;
use fieldline_core::DEFAULT_TAX_RATE_BPS;

/// Console configuration.
///
/// The single home of the tax rate: the pricing engine is constructed
/// from this value and never reads a literal anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Company name (displayed in headers and on orders)
    pub company_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Default tax rate in basis points
    /// e.g., 800 = 8%
    pub default_tax_rate_bps: u32,
}

impl Default for ConsoleConfig {
    /// Returns default configuration suitable for development.
    fn default() -> Self {
        ConsoleConfig {
            company_name: "Fieldline Dev Co".to_string(),
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            default_tax_rate_bps: DEFAULT_TAX_RATE_BPS,
        }
    }
}

impl ConsoleConfig {
    /// Creates a ConsoleConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `FIELDLINE_COMPANY_NAME`: Override company name
    /// - `FIELDLINE_TAX_RATE`: Override default tax rate (e.g., "8.25")
    pub fn from_env() -> Self {
        let mut config = ConsoleConfig::default();

        if let Ok(company_name) = std::env::var("FIELDLINE_COMPANY_NAME") {
            config.company_name = company_name;
        }

        if let Ok(tax_rate_str) = std::env::var("FIELDLINE_TAX_RATE") {
            if let Ok(rate) = tax_rate_str.parse::<f64>() {
                config.default_tax_rate_bps = (rate * 100.0) as u32;
            }
        }

        config
    }

    /// The configured tax rate as a core type.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.default_tax_rate_bps)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// The one place integer cents become display text; everything inside
    /// the core stays numeric.
    ///
    /// ## Example
    /// ```rust
    /// use fieldline_console::config::ConsoleConfig;
    ///
    /// let config = ConsoleConfig::default();
    /// assert_eq!(config.format_currency(22247), "$222.47");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_is_eight_percent() {
        let config = ConsoleConfig::default();
        assert_eq!(config.default_tax_rate_bps, 800);
        assert_eq!(config.tax_rate().bps(), 800);
    }

    #[test]
    fn test_format_currency_positive() {
        let config = ConsoleConfig::default();
        assert_eq!(config.format_currency(22247), "$222.47");
        assert_eq!(config.format_currency(100), "$1.00");
        assert_eq!(config.format_currency(1), "$0.01");
        assert_eq!(config.format_currency(0), "$0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConsoleConfig::default();
        assert_eq!(config.format_currency(-1234), "-$12.34");
    }
}
