// ==========================================
// S&OP 控制塔 - 命令行入口
// ==========================================
// 用法: sop-control-tower <workbook> [--csv-dir DIR] [--config PATH] [--locale en|zh-CN]
// 输出: stdout 打印 JSON 汇总；日志写 stderr
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use sop_control_tower::config::{ConfigManager, IngestConfigReader};
use sop_control_tower::export::CsvExporter;
use sop_control_tower::{i18n, logging, DashboardApi, IngestApi, OrderBookIngestor};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sop-control-tower", version, about = "S&OP 工作簿摄取与库存对账")]
struct Cli {
    /// 工作簿路径（.xlsx/.xlsm/.xls）
    workbook: PathBuf,

    /// CSV 导出目录
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// 配置文件路径（缺省时按 SOP_INGEST_CONFIG / 用户配置目录查找）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 警告文本语言
    #[arg(long, default_value = "en")]
    locale: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    i18n::set_locale(&cli.locale);

    let manager = match &cli.config {
        Some(path) => {
            let mut manager = ConfigManager::from_file(path)
                .with_context(|| format!("无法加载配置: {}", path.display()))?;
            manager.apply_overrides(|key| std::env::var(key).ok())?;
            manager
        }
        None => ConfigManager::load()?,
    };

    tracing::info!(
        version = sop_control_tower::VERSION,
        source = ?manager.source(),
        workbook = %cli.workbook.display(),
        "{}",
        sop_control_tower::APP_NAME
    );

    let api = IngestApi::from_config_manager(&manager);
    let outcome = api.ingest_file(&cli.workbook).await.map_err(|e| {
        anyhow::anyhow!("摄取失败: {}: {}", cli.workbook.display(), e.user_message())
    })?;

    let now = chrono::Local::now().naive_local();
    let view = DashboardApi::new(manager.config().insight_rules().clone()).view(&outcome, now);

    let exported = match &cli.csv_dir {
        Some(dir) => CsvExporter
            .export_all(&outcome, dir)
            .with_context(|| format!("CSV 导出失败: {}", dir.display()))?,
        None => Vec::new(),
    };

    let summary = json!({
        "version": sop_control_tower::VERSION,
        "sheets": outcome.sheet_names,
        "stages": outcome.stages,
        "master": {
            "sheet": outcome.master.sheet_name,
            "header_row": outcome.master.header_row,
            "header_detected": outcome.master.header_detected,
            "orders": outcome.master.len(),
        },
        "detail": {
            "sheet": outcome.detail.sheet_name,
            "lines": outcome.detail.len(),
            "quantity_column": outcome.detail.quantity_column,
        },
        "inventory": {
            "locations_loaded": outcome.inventory.locations_loaded,
            "products": outcome.inventory.balance.len(),
        },
        "dashboard": view,
        "exported": exported,
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
