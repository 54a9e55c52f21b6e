//! Builds the ledger from configuration: default warehouse plus the
//! optional seeded catalog.

use anyhow::{Context, bail};
use tracing::info;

use stockledger_core::stock::{NewItem, NewWarehouse, StockLedger};
use stockledger_shared::config::{LedgerConfig, SeedConfig};

/// Creates the engine and loads the seed catalog into it.
///
/// # Errors
///
/// Returns an error if a seeded code is duplicated, an opening stock entry
/// names an unknown warehouse code, or a quantity is invalid.
pub fn build_ledger(ledger: &LedgerConfig, seed: &SeedConfig) -> anyhow::Result<StockLedger> {
    let mut engine = StockLedger::new(NewWarehouse::new(
        &ledger.default_warehouse_code,
        &ledger.default_warehouse_name,
    ));

    for warehouse in &seed.warehouses {
        engine
            .register_warehouse(NewWarehouse::new(&warehouse.code, &warehouse.name))
            .with_context(|| format!("seeding warehouse {}", warehouse.code))?;
    }

    for item in &seed.items {
        let id = engine
            .register_item(
                NewItem::new(&item.code, &item.name)
                    .with_prices(item.unit_cost, item.unit_price)
                    .with_thresholds(item.reorder_min, item.reorder_max),
            )
            .with_context(|| format!("seeding item {}", item.code))?;

        for stock in &item.opening_stock {
            let warehouse_id = match &stock.warehouse {
                Some(code) => match engine.find_warehouse(code) {
                    Some(warehouse) => Some(warehouse.id),
                    None => bail!("item {} names unknown warehouse {code}", item.code),
                },
                None => None,
            };
            engine
                .record_opening_stock(id, warehouse_id, stock.quantity)
                .with_context(|| format!("seeding opening stock for {}", item.code))?;
        }
    }

    info!(
        warehouses = engine.warehouses().count(),
        items = engine.items().count(),
        "Ledger seeded"
    );
    Ok(engine)
}
