// ==========================================
// 客户需求表同步服务 - 层级构建器
// ==========================================
// 职责: 按行序消费分类结果，累积四级层级并计数
// 约束: 严格顺序处理——各级“首次出现”顺序取决于行序，
//       不得并行消费数据行
// ==========================================

use crate::domain::hierarchy::{ActionLeaf, HierarchyTree};
use crate::sheet::row_classifier::{RowClass, RowClassifier};
use tracing::debug;

/// 行接受/跳过计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowTally {
    pub accepted: usize, // 接受并入树的行数
    pub skipped: usize,  // 跳过的行数（坏行不中止整批）
}

// ==========================================
// HierarchyBuilder - 层级构建器
// ==========================================
// 用途: 每次同步独占一个实例，产出本次同步的完整层级树
pub struct HierarchyBuilder {
    tree: HierarchyTree,
    tally: RowTally,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self {
            tree: HierarchyTree::new(),
            tally: RowTally::default(),
        }
    }

    /// 消费一行原始单元格
    ///
    /// # 参数
    /// - sheet_row_num: 表格中的 1 基行号（仅用于日志）
    /// - row: 原始单元格
    pub fn push_row(&mut self, sheet_row_num: usize, row: &[String]) {
        match RowClassifier::classify(row) {
            RowClass::Accept(accepted) => {
                self.tree
                    .entry_title(&accepted.title)
                    .entry_demand(&accepted.demand)
                    .entry_patient_type(&accepted.patient_type)
                    .push_action(ActionLeaf {
                        description: accepted.action_description,
                        dire_text: accepted.action_dire_text,
                    });
                self.tally.accepted += 1;
            }
            RowClass::Skip(reason) => {
                debug!(sheet_row_num, reason = ?reason, "跳过数据行");
                self.tally.skipped += 1;
            }
        }
    }

    /// 完成构建，返回层级树与计数
    pub fn finish(self) -> (HierarchyTree, RowTally) {
        (self.tree, self.tally)
    }
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
