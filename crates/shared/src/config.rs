//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Stock ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Catalog loaded into the engine at startup.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Stock ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Code of the warehouse used when a record names none.
    #[serde(default = "default_warehouse_code")]
    pub default_warehouse_code: String,
    /// Display name of the default warehouse.
    #[serde(default = "default_warehouse_name")]
    pub default_warehouse_name: String,
    /// Buffered stock-change notifications before slow subscribers lag.
    #[serde(default = "default_notify_capacity")]
    pub notify_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_warehouse_code: default_warehouse_code(),
            default_warehouse_name: default_warehouse_name(),
            notify_capacity: default_notify_capacity(),
        }
    }
}

fn default_warehouse_code() -> String {
    "MAIN".to_string()
}

fn default_warehouse_name() -> String {
    "Main warehouse".to_string()
}

fn default_notify_capacity() -> usize {
    256
}

/// Warehouses and items registered before the server accepts requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Additional warehouses (the default warehouse always exists).
    #[serde(default)]
    pub warehouses: Vec<SeedWarehouse>,
    /// Catalog items.
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

/// A warehouse to register at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedWarehouse {
    /// Unique warehouse code.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// A catalog item to register at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedItem {
    /// Unique item code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Unit cost.
    #[serde(default)]
    pub unit_cost: Decimal,
    /// Unit price.
    #[serde(default)]
    pub unit_price: Decimal,
    /// Reorder threshold.
    #[serde(default)]
    pub reorder_min: i64,
    /// Overstock threshold (0 disables it).
    #[serde(default)]
    pub reorder_max: i64,
    /// Opening stock per warehouse code.
    #[serde(default)]
    pub opening_stock: Vec<SeedStock>,
}

/// Opening stock of a seeded item in one warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedStock {
    /// Warehouse code; the default warehouse when omitted.
    pub warehouse: Option<String>,
    /// Opening quantity.
    pub quantity: i64,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("STOCKLEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from a TOML document, without files or environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_toml_str(document: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_without_sources() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ledger.default_warehouse_code, "MAIN");
        assert_eq!(config.ledger.notify_capacity, 256);
        assert!(config.seed.items.is_empty());
    }

    #[test]
    fn test_seed_catalog_parses() {
        let config = AppConfig::from_toml_str(
            r#"
            [ledger]
            default_warehouse_code = "HQ"

            [[seed.warehouses]]
            code = "W1"
            name = "North"

            [[seed.items]]
            code = "P-100"
            name = "Mineral water 1.5L"
            unit_cost = "7"
            unit_price = "10.50"
            reorder_min = 10
            reorder_max = 500
            opening_stock = [{ quantity = 150 }, { warehouse = "W1", quantity = 5 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger.default_warehouse_code, "HQ");
        assert_eq!(config.seed.warehouses[0].code, "W1");
        let item = &config.seed.items[0];
        assert_eq!(item.unit_price, dec!(10.50));
        assert_eq!(item.opening_stock.len(), 2);
        assert!(item.opening_stock[0].warehouse.is_none());
        assert_eq!(item.opening_stock[1].warehouse.as_deref(), Some("W1"));
    }

    #[test]
    fn test_environment_overrides_port() {
        temp_env::with_vars(
            [
                ("STOCKLEDGER__SERVER__PORT", Some("9191")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.port, 9191);
            },
        );
    }
}
