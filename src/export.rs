// ==========================================
// S&OP 控制塔 - CSV 导出
// ==========================================
// 职责: 主表/明细/库存/平衡表导出为 CSV，供下钻核对
// ==========================================

use crate::domain::inventory::InventoryTable;
use crate::domain::order::{DetailTable, MasterTable};
use crate::domain::outcome::IngestOutcome;
use crate::importer::error::IngestResult;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MASTER_FILE: &str = "master.csv";
pub const DETAIL_FILE: &str = "detail.csv";
pub const STOCK_FILE: &str = "stock.csv";
pub const BALANCE_FILE: &str = "balance.csv";

/// 数量列输出格式（整数不带小数点）
fn fmt_qty(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub struct CsvExporter;

impl CsvExporter {
    /// 主表（列顺序与 MasterTable.columns 一致）
    pub fn export_master<W: Write>(&self, master: &MasterTable, writer: W) -> IngestResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&master.columns)?;
        for record in &master.records {
            wtr.write_record(
                master
                    .columns
                    .iter()
                    .map(|c| record.value(c).to_display_string()),
            )?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 明细表（无列时不输出任何内容）
    pub fn export_detail<W: Write>(&self, detail: &DetailTable, writer: W) -> IngestResult<()> {
        if detail.columns.is_empty() {
            return Ok(());
        }
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&detail.columns)?;
        for record in &detail.records {
            wtr.write_record(
                detail
                    .columns
                    .iter()
                    .map(|c| record.value(c).to_display_string()),
            )?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 库位库存并集
    pub fn export_stock<W: Write>(&self, inventory: &InventoryTable, writer: W) -> IngestResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["Product_Code", "Stock_Qty", "Location"])?;
        for record in &inventory.stock_records {
            wtr.write_record([
                record.product_code.clone(),
                fmt_qty(record.stock_qty),
                record.location.clone(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 供需平衡
    pub fn export_balance<W: Write>(&self, inventory: &InventoryTable, writer: W) -> IngestResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["Product_Code", "Demand_Qty", "Stock_Qty", "Balance", "Risk_Status"])?;
        for row in &inventory.balance {
            wtr.write_record([
                row.product_code.clone(),
                fmt_qty(row.demand_qty),
                fmt_qty(row.stock_qty),
                fmt_qty(row.balance),
                row.risk_status.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 全部导出到目录
    ///
    /// # 返回
    /// 实际写出的文件路径（明细无列、未加载任何库位时对应文件不写出）
    pub fn export_all(&self, outcome: &IngestOutcome, dir: &Path) -> IngestResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let path = dir.join(MASTER_FILE);
        self.export_master(&outcome.master, File::create(&path)?)?;
        written.push(path);

        if !outcome.detail.columns.is_empty() {
            let path = dir.join(DETAIL_FILE);
            self.export_detail(&outcome.detail, File::create(&path)?)?;
            written.push(path);
        }

        if !outcome.inventory.is_empty() {
            let path = dir.join(STOCK_FILE);
            self.export_stock(&outcome.inventory, File::create(&path)?)?;
            written.push(path);

            let path = dir.join(BALANCE_FILE);
            self.export_balance(&outcome.inventory, File::create(&path)?)?;
            written.push(path);
        }

        info!(dir = %dir.display(), files = written.len(), "CSV 导出完成");
        Ok(written)
    }
}
