// ==========================================
// 客户需求表同步服务 - 同步结果契约
// ==========================================
// 用途: HTTP 层 / 任务队列消费的结构化同步结果
// 约束: 字段即对外契约，调整需同步修改消费方
// ==========================================

use crate::sync::error::SyncError;
use serde::{Deserialize, Serialize};

/// 同步结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Error,
}

// ==========================================
// SyncReport - 对外同步结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub status: SyncStatus,    // success / error
    pub records_added: usize,  // 接受并写入的数据行数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_title: Option<String>, // 表格显示标题（成功时返回）
    pub message: String,       // 人类可读说明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>, // 人类可读错误详情（失败时返回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>, // 稳定错误类别标识（失败时返回）
}

impl SyncReport {
    /// 构造成功结果
    pub fn success(
        records_added: usize,
        spreadsheet_title: String,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: SyncStatus::Success,
            records_added,
            spreadsheet_title: Some(spreadsheet_title),
            message: message.into(),
            error: None,
            error_kind: None,
        }
    }

    /// 构造失败结果（客户既有数据保持不变）
    pub fn failure(err: &SyncError) -> Self {
        Self {
            status: SyncStatus::Error,
            records_added: 0,
            spreadsheet_title: None,
            message: "表格同步失败，客户既有数据未变更。".to_string(),
            error: Some(err.to_string()),
            error_kind: Some(err.kind().to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }
}
