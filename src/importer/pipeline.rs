// ==========================================
// S&OP 控制塔 - 摄取管道
// ==========================================
// 状态机: START → MASTER_LOADED → DETAIL_LOADED(可选) → MERGED
//         → INVENTORY_LOADED(可选) → BALANCED → DONE
// 致命: 仅 START → FAILED（主表不存在或不可读）
// 其余工作表问题降级为警告，管道继续
// ==========================================

use crate::config::{HeaderRule, IngestConfigReader, StockLocationConfig};
use crate::domain::cell::RawRow;
use crate::domain::inventory::StockRecord;
use crate::domain::order::{DetailTable, MasterTable};
use crate::domain::outcome::IngestOutcome;
use crate::domain::types::IngestStage;
use crate::engine::{Aggregator, InventoryReconciler, MasterMerger};
use crate::i18n::t_with_args;
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::header_locator::HeaderLocator;
use crate::importer::sheet_normalizer::{SheetNormalizer, SheetTable};
use crate::importer::workbook_loader::{Sheet, Workbook};
use crate::perf::PerfGuard;
use tracing::{error, info, instrument, warn};

// ==========================================
// IngestRun - 单次调用的过程状态
// ==========================================
#[derive(Debug, Default)]
struct IngestRun {
    stages: Vec<IngestStage>,
    warnings: Vec<String>,
}

impl IngestRun {
    fn enter(&mut self, stage: IngestStage) {
        info!(stage = %stage, "进入阶段");
        self.stages.push(stage);
    }

    /// 记录面向用户的非致命警告
    fn warn(&mut self, key: &str, args: &[(&str, &str)]) {
        let message = t_with_args(key, args);
        warn!(key, message = %message, "摄取警告");
        self.warnings.push(message);
    }
}

// ==========================================
// IngestPipeline
// ==========================================
pub struct IngestPipeline<C: IngestConfigReader> {
    config: C,
}

impl<C: IngestConfigReader> IngestPipeline<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 从工作簿字节执行一次完整摄取
    ///
    /// # 返回
    /// - Ok(IngestOutcome): 主表/明细/库存 + 警告
    /// - Err(WorkbookOpenError): 字节无法解析为工作簿
    /// - Err(MasterSheetNotFound): 主表缺失（唯一的业务致命错误）
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn ingest(&self, bytes: &[u8]) -> IngestResult<IngestOutcome> {
        let workbook = Workbook::from_bytes(bytes)?;
        self.ingest_workbook(&workbook)
    }

    /// 对已加载的工作簿执行摄取
    #[instrument(skip_all, fields(sheets = workbook.sheets().len()))]
    pub fn ingest_workbook(&self, workbook: &Workbook) -> IngestResult<IngestOutcome> {
        let mut perf = PerfGuard::new("ingest_workbook");
        let mut run = IngestRun::default();
        run.enter(IngestStage::Start);

        // 1. 主表（致命）
        let mut master = match self.load_master(workbook, &mut run) {
            Ok(master) => master,
            Err(e) => {
                error!(
                    stage = %IngestStage::Failed,
                    error = %e.user_message(),
                    "主表加载失败，终止摄取"
                );
                return Err(e);
            }
        };
        run.enter(IngestStage::MasterLoaded);

        // 2. 明细（可选）
        let detail = self.load_detail(workbook, &mut run);
        if detail.sheet_name.is_some() && !detail.columns.is_empty() {
            run.enter(IngestStage::DetailLoaded);
        }

        // 3. 合并
        let totals = Aggregator.aggregate_order_quantities(&detail);
        let report = MasterMerger.merge(&mut master, &totals);
        if !report.orphan_order_ids.is_empty() {
            let count = report.orphan_order_ids.len().to_string();
            let sheet = detail.sheet_name.clone().unwrap_or_default();
            run.warn(
                "ingest.orphan_orders",
                &[("count", count.as_str()), ("sheet", sheet.as_str())],
            );
        }
        run.enter(IngestStage::Merged);

        // 4. 库存（可选）
        let mut locations_loaded = Vec::new();
        let mut per_location = Vec::new();
        for location in self.config.stock_locations() {
            let Some(sheet) = find_stock_sheet(workbook, location) else {
                continue;
            };
            match self.load_stock(sheet, location, &mut run) {
                Ok(records) => {
                    locations_loaded.push(location.tag.clone());
                    per_location.push(records);
                }
                Err(e) => {
                    let error = e.to_string();
                    run.warn(
                        "ingest.stock_sheet_failed",
                        &[("location", location.tag.as_str()), ("error", error.as_str())],
                    );
                }
            }
        }
        if !locations_loaded.is_empty() {
            run.enter(IngestStage::InventoryLoaded);
        }

        let stock_records = InventoryReconciler.union_locations(per_location);
        let demand = Aggregator.aggregate_demand_by_product(&detail);
        let inventory = InventoryReconciler.reconcile(locations_loaded, stock_records, &demand);
        run.enter(IngestStage::Balanced);

        perf.add_rows(master.len() + detail.len() + inventory.stock_records.len());
        run.enter(IngestStage::Done);

        info!(
            master_rows = master.len(),
            detail_rows = detail.len(),
            stock_records = inventory.stock_records.len(),
            shortages = inventory.shortages().count(),
            warnings = run.warnings.len(),
            "摄取完成"
        );

        Ok(IngestOutcome {
            sheet_names: workbook.sheet_names(),
            master,
            detail,
            inventory,
            warnings: run.warnings,
            stages: run.stages,
        })
    }

    // ==========================================
    // 各工作表加载
    // ==========================================

    /// 主表：首个名称包含任一主表片段的工作表
    fn load_master(&self, workbook: &Workbook, run: &mut IngestRun) -> IngestResult<MasterTable> {
        let fragments: Vec<String> = self
            .config
            .master_sheet_fragments()
            .iter()
            .map(|f| f.to_lowercase())
            .collect();

        let sheet = workbook
            .find_sheet(|name| {
                let name = name.to_lowercase();
                fragments.iter().any(|f| name.contains(f.as_str()))
            })
            .ok_or_else(|| IngestError::MasterSheetNotFound {
                available: workbook.sheet_names(),
            })?;

        let rows = sheet.rows()?;
        let table = self.locate_table(
            sheet.name(),
            rows,
            self.config.master_header_rule(),
            run,
            |_| true,
        );
        Ok(SheetNormalizer::new(&self.config).normalize_master(table))
    }

    /// 明细表：去空白后名称等于配置名的工作表；缺失或不可读时为空表
    fn load_detail(&self, workbook: &Workbook, run: &mut IngestRun) -> DetailTable {
        let expected = self.config.detail_sheet_name().trim();
        let Some(sheet) = workbook.find_sheet(|name| name.trim() == expected) else {
            run.warn("ingest.detail_sheet_missing", &[("sheet", expected)]);
            return DetailTable::empty();
        };

        let rows = match sheet.rows() {
            Ok(rows) => rows,
            Err(e) => {
                let error = e.to_string();
                run.warn(
                    "ingest.detail_sheet_failed",
                    &[("sheet", sheet.name()), ("error", error.as_str())],
                );
                return DetailTable::empty();
            }
        };

        let table = self.locate_table(
            sheet.name(),
            rows,
            self.config.detail_header_rule(),
            run,
            |_| true,
        );
        let detail = SheetNormalizer::new(&self.config).normalize_detail(table);
        if detail.quantity_column.is_none() {
            run.warn("ingest.quantity_column_missing", &[("sheet", sheet.name())]);
        }
        detail
    }

    /// 单个库位库存表
    fn load_stock(
        &self,
        sheet: &Sheet,
        location: &StockLocationConfig,
        run: &mut IngestRun,
    ) -> IngestResult<Vec<StockRecord>> {
        let rows = sheet.rows()?;
        let normalizer = SheetNormalizer::new(&self.config);
        let table = self.locate_table(sheet.name(), rows, &location.header, run, |row| {
            normalizer.is_stock_header(row)
        });
        normalizer.normalize_stock(&table, location)
    }

    /// 定位表头并构建通用表；关键词非空却未命中时记警告
    fn locate_table<F>(
        &self,
        sheet_name: &str,
        rows: &[RawRow],
        rule: &HeaderRule,
        run: &mut IngestRun,
        accept: F,
    ) -> SheetTable
    where
        F: Fn(&RawRow) -> bool,
    {
        let (header_row, detected) = HeaderLocator.resolve_where(rows, rule, accept);
        if !detected && !rule.keywords.is_empty() {
            let row = header_row.to_string();
            run.warn(
                "ingest.header_fallback",
                &[("sheet", sheet_name), ("row", row.as_str())],
            );
        }
        SheetTable::from_rows(sheet_name, rows, header_row, detected)
    }
}

/// 库位工作表：名称（不区分大小写）同时包含全部片段
fn find_stock_sheet<'w>(workbook: &'w Workbook, location: &StockLocationConfig) -> Option<&'w Sheet> {
    let fragments: Vec<String> = location
        .sheet_fragments
        .iter()
        .map(|f| f.to_lowercase())
        .collect();
    if fragments.is_empty() {
        return None;
    }
    workbook.find_sheet(|name| {
        let name = name.to_lowercase();
        fragments.iter().all(|f| name.contains(f.as_str()))
    })
}
