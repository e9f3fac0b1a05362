// ==========================================
// CSV 导出集成测试
// ==========================================


use sop_control_tower::config::IngestConfig;
use sop_control_tower::export::{CsvExporter, BALANCE_FILE, DETAIL_FILE, MASTER_FILE, STOCK_FILE};
use sop_control_tower::IngestPipeline;
use tempfile::tempdir;
use test_helpers::standard_workbook;

#[test]
fn test_export_all_tables() {
    let bytes = standard_workbook().build().unwrap();
    let outcome = IngestPipeline::new(IngestConfig::default())
        .ingest(&bytes)
        .unwrap();

    let dir = tempdir().unwrap();
    let written = CsvExporter.export_all(&outcome, dir.path()).unwrap();
    assert_eq!(
        written,
        vec![
            dir.path().join(MASTER_FILE),
            dir.path().join(DETAIL_FILE),
            dir.path().join(STOCK_FILE),
            dir.path().join(BALANCE_FILE),
        ]
    );

    let mut master = csv::Reader::from_path(dir.path().join(MASTER_FILE)).unwrap();
    let headers = master.headers().unwrap().clone();
    assert_eq!(&headers[0], "Order_ID");
    let total_idx = headers.iter().position(|h| h == "Total_Qty").unwrap();
    let rows: Vec<csv::StringRecord> = master.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "1002");
    assert_eq!(&rows[0][total_idx], "15");

    let mut balance = csv::Reader::from_path(dir.path().join(BALANCE_FILE)).unwrap();
    let first = balance.records().next().unwrap().unwrap();
    assert_eq!(first.iter().collect::<Vec<_>>(), vec!["SKU-1", "13", "10", "-3", "SHORTAGE"]);
}
