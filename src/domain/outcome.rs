// ==========================================
// S&OP 控制塔 - 摄取结果
// ==========================================
// 用途: 单次摄取调用的完整产出（三张表 + 非致命警告）
// 生命周期: 每次调用重新派生，无持久状态
// ==========================================

use crate::domain::inventory::InventoryTable;
use crate::domain::order::{DetailTable, MasterTable};
use crate::domain::types::IngestStage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub sheet_names: Vec<String>,
    pub master: MasterTable,
    pub detail: DetailTable,
    pub inventory: InventoryTable,
    pub warnings: Vec<String>,      // 面向用户的非致命警告
    pub stages: Vec<IngestStage>,   // 实际经过的状态机阶段
}

impl IngestOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn reached(&self, stage: IngestStage) -> bool {
        self.stages.contains(&stage)
    }
}
