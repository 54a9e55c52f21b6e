//! Property-based tests for the stock ledger engine.

use proptest::prelude::*;
use stockledger_shared::types::{ItemId, WarehouseId};

use super::*;

struct World {
    ledger: StockLedger,
    item: ItemId,
    main: WarehouseId,
    depot: WarehouseId,
}

fn world(opening: i64) -> World {
    let mut ledger = StockLedger::new(NewWarehouse::new("MAIN", "Main"));
    let main = ledger.default_warehouse_id();
    let depot = ledger
        .register_warehouse(NewWarehouse::new("DEPOT", "Depot"))
        .unwrap();
    let item = ledger.register_item(NewItem::new("P-1", "Widget")).unwrap();
    if opening > 0 {
        ledger.record_opening_stock(item, None, opening).unwrap();
    }
    World {
        ledger,
        item,
        main,
        depot,
    }
}

/// Builds one record from generated parameters.
fn record(w: &World, selector: u8, quantity: i64, at_depot: bool) -> MutationRecord {
    let (here, there) = if at_depot {
        (w.depot, w.main)
    } else {
        (w.main, w.depot)
    };
    let line = LineItem::new(w.item, quantity);
    match selector % 9 {
        0 => movement(w.item, MovementKind::Add, quantity, None, Some(here)),
        1 => movement(w.item, MovementKind::Issue, quantity, Some(here), None),
        2 => movement(w.item, MovementKind::Transfer, quantity, Some(here), Some(there)),
        3 => movement(w.item, MovementKind::Adjust, -quantity, None, Some(here)),
        4 => MutationRecord::PurchaseReceipt(PurchaseReceipt {
            item_id: w.item,
            quantity,
            warehouse_id: here,
        }),
        5 => MutationRecord::PurchaseReturn(PurchaseReturn {
            item_id: w.item,
            quantity,
        }),
        6 => MutationRecord::SalesInvoice(SalesInvoice {
            lines: vec![line],
            warehouse_id: Some(here),
        }),
        7 => MutationRecord::SalesReturn(SalesReturn { lines: vec![line] }),
        _ => MutationRecord::PosSale(PosSale {
            lines: vec![PosLine {
                item_id: w.item,
                quantity,
                warehouse_id: here,
            }],
        }),
    }
}

fn movement(
    item_id: ItemId,
    movement_type: MovementKind,
    quantity: i64,
    source_warehouse_id: Option<WarehouseId>,
    dest_warehouse_id: Option<WarehouseId>,
) -> MutationRecord {
    MutationRecord::Movement(StockMovement {
        movement_type,
        item_id,
        quantity,
        source_warehouse_id,
        dest_warehouse_id,
    })
}

fn buckets(w: &World) -> (i64, i64) {
    (
        w.ledger.get_quantity(w.item, Some(w.main)).unwrap(),
        w.ledger.get_quantity(w.item, Some(w.depot)).unwrap(),
    )
}

fn op() -> impl Strategy<Value = (u8, i64, bool)> {
    (0u8..9, 1i64..200, any::<bool>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Total stock equals opening stock plus the sum of every applied delta,
    /// and no bucket ever goes negative.
    #[test]
    fn prop_total_is_opening_plus_applied(
        opening in 0i64..500,
        ops in prop::collection::vec(op(), 1..30),
    ) {
        let mut w = world(opening);
        let mut expected = opening;

        for (selector, quantity, at_depot) in ops {
            let before = buckets(&w);
            let r = record(&w, selector, quantity, at_depot);
            match w.ledger.create(r, None) {
                Ok(id) => {
                    let stored = w.ledger.record(id).unwrap();
                    expected += stored.applied.iter().map(|d| d.delta).sum::<i64>();
                }
                Err(e) => {
                    prop_assert!(
                        matches!(e, StockError::InsufficientStock { .. }),
                        "unexpected error: {e}"
                    );
                    prop_assert_eq!(buckets(&w), before);
                }
            }
            let (main, depot) = buckets(&w);
            prop_assert!(main >= 0 && depot >= 0);
            prop_assert_eq!(w.ledger.get_quantity(w.item, None).unwrap(), expected);
        }
        prop_assert!(w.ledger.reconcile().is_empty());
    }

    /// Creating then deleting a record restores every bucket.
    #[test]
    fn prop_create_then_delete_restores(
        opening in 0i64..500,
        selector in 0u8..9,
        quantity in 1i64..200,
        at_depot in any::<bool>(),
    ) {
        let mut w = world(opening);
        let before = buckets(&w);
        let r = record(&w, selector, quantity, at_depot);

        if let Ok(id) = w.ledger.create(r, None) {
            w.ledger.delete_record(id).unwrap();
        }

        prop_assert_eq!(buckets(&w), before);
        prop_assert!(w.ledger.records(None).unwrap().is_empty());
    }

    /// Editing a record with its own fields changes nothing.
    #[test]
    fn prop_edit_with_same_fields_is_noop(
        opening in 0i64..500,
        selector in 0u8..9,
        quantity in 1i64..200,
        at_depot in any::<bool>(),
    ) {
        let mut w = world(opening);
        let r = record(&w, selector, quantity, at_depot);

        if let Ok(id) = w.ledger.create(r.clone(), None) {
            let before = buckets(&w);
            w.ledger.edit_record(id, r).unwrap();
            prop_assert_eq!(buckets(&w), before);
        }
    }

    /// A rejected edit leaves quantities and the stored record untouched.
    #[test]
    fn prop_rejected_edit_is_noop(
        opening in 1i64..100,
        quantity in 1i64..50,
        extra in 1i64..1000,
    ) {
        let mut w = world(opening);
        let issue = movement(w.item, MovementKind::Issue, quantity.min(opening), Some(w.main), None);
        let id = w.ledger.create(issue, None).unwrap();
        let stored = w.ledger.record(id).unwrap();
        let before = buckets(&w);

        let oversized = movement(w.item, MovementKind::Issue, opening + extra, Some(w.main), None);
        let result = w.ledger.edit_record(id, oversized);

        prop_assert!(
            matches!(result, Err(StockError::InsufficientStock { .. })),
            "expected a shortfall, got {:?}",
            result
        );
        prop_assert_eq!(buckets(&w), before);
        prop_assert_eq!(w.ledger.record(id).unwrap(), stored);
    }
}
