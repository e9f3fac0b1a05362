// ==========================================
// 库存对账集成测试
// ==========================================
// 测试目标: 多库位并集、库位失败降级、平衡符号
// ==========================================


use sop_control_tower::config::{IngestConfig, StockLocationConfig};
use sop_control_tower::{IngestPipeline, IngestStage};
use test_helpers::{master_rows, n, orders_rows, stock_ee_rows, stock_nl_rows, t, WorkbookBuilder};

fn pipeline() -> IngestPipeline<IngestConfig> {
    IngestPipeline::new(IngestConfig::default())
}

#[test]
fn test_union_across_locations() {
    let bytes = WorkbookBuilder::new()
        .sheet("S&OP Meeting", master_rows())
        .sheet("Orders", orders_rows())
        .sheet("Stocklist NL", stock_nl_rows())
        .sheet("Stocklist EE", stock_ee_rows())
        .build()
        .unwrap();

    let inventory = pipeline().ingest(&bytes).unwrap().inventory;
    assert_eq!(inventory.locations_loaded, vec!["NL", "EE"]);
    assert_eq!(inventory.stock_records.len(), 4);

    let by_product: Vec<(&str, f64)> = inventory
        .by_product
        .iter()
        .map(|p| (p.product_code.as_str(), p.stock_qty))
        .collect();
    assert_eq!(by_product, vec![("SKU-1", 10.0), ("SKU-2", 5.0), ("SKU-9", 2.0)]);

    let locations: Vec<&str> = inventory
        .stock_records
        .iter()
        .map(|r| r.location.as_str())
        .collect();
    assert_eq!(locations, vec!["NL", "NL", "EE", "EE"]);
}

#[test]
fn test_single_location_only() {
    let bytes = WorkbookBuilder::new()
        .sheet("S&OP Meeting", master_rows())
        .sheet("Orders", orders_rows())
        .sheet("stocklist ee", stock_ee_rows())
        .build()
        .unwrap();

    let outcome = pipeline().ingest(&bytes).unwrap();
    assert_eq!(outcome.inventory.locations_loaded, vec!["EE"]);
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

    let sku1 = outcome
        .inventory
        .balance
        .iter()
        .find(|b| b.product_code == "SKU-1")
        .unwrap();
    assert_eq!(sku1.stock_qty, 4.0);
    assert_eq!(sku1.balance, -9.0);
    assert!(sku1.is_shortage());
}

#[test]
fn test_malformed_location_is_warning_not_fatal() {
    let bytes = WorkbookBuilder::new()
        .sheet("S&OP Meeting", master_rows())
        .sheet("Orders", orders_rows())
        .sheet("Stocklist NL", stock_nl_rows())
        .sheet(
            "Stocklist EE",
            vec![vec![t("Remarks"), t("Owner")], vec![t("tbd"), t("ops")]],
        )
        .build()
        .unwrap();

    let outcome = pipeline().ingest(&bytes).unwrap();
    assert_eq!(outcome.inventory.locations_loaded, vec!["NL"]);
    assert!(outcome.reached(IngestStage::Balanced));
    assert!(!outcome.warnings.is_empty());
    assert!(outcome.warnings.iter().all(|w| w.contains("EE")));
    assert!(outcome
        .inventory
        .stock_records
        .iter()
        .all(|r| r.location == "NL"));
}

#[test]
fn test_no_stock_sheets_gives_empty_balance() {
    let bytes = WorkbookBuilder::new()
        .sheet("S&OP Meeting", master_rows())
        .sheet("Orders", orders_rows())
        .build()
        .unwrap();

    let outcome = pipeline().ingest(&bytes).unwrap();
    assert!(outcome.inventory.is_empty());
    assert!(outcome.inventory.balance.is_empty());
    assert!(!outcome.reached(IngestStage::InventoryLoaded));
    assert!(outcome.reached(IngestStage::Balanced));
}

#[test]
fn test_balance_sign_invariant() {
    let bytes = test_helpers::standard_workbook().build().unwrap();
    let outcome = pipeline().ingest(&bytes).unwrap();

    for row in &outcome.inventory.balance {
        assert_eq!(row.balance, row.stock_qty - row.demand_qty);
        assert_eq!(row.is_shortage(), row.balance < 0.0);
    }
    assert_eq!(outcome.inventory.shortages().count(), 1);
}

#[test]
fn test_custom_location_with_fixed_offset() {
    let mut config = IngestConfig::default();
    config.stock_locations = vec![StockLocationConfig::new("DE", &[], 0, 1)];

    let bytes = WorkbookBuilder::new()
        .sheet("S&OP Meeting", master_rows())
        .sheet("Orders", orders_rows())
        .sheet(
            "Stocklist DE",
            vec![
                vec![t("exported 2025-03-01")],
                vec![t("SKU"), t("Qty")],
                vec![t("SKU-3"), n(1.0)],
            ],
        )
        .build()
        .unwrap();

    let outcome = IngestPipeline::new(config).ingest(&bytes).unwrap();
    assert_eq!(outcome.inventory.locations_loaded, vec!["DE"]);
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);

    let sku3 = outcome
        .inventory
        .balance
        .iter()
        .find(|b| b.product_code == "SKU-3")
        .unwrap();
    assert_eq!(sku3.stock_qty, 1.0);
    assert_eq!(sku3.demand_qty, 0.0);
}
