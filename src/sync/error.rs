// ==========================================
// 客户需求表同步服务 - 同步错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 行级问题不在此列——坏行被就地吸收并计入跳过数，
//       只有拉取级与持久化级失败才会中止同步并对外暴露
// ==========================================

use crate::repository::error::RepositoryError;
use crate::sheet::error::SheetError;
use thiserror::Error;

/// 同步错误类型（对外结果契约中 error 字段的来源）
#[derive(Error, Debug)]
pub enum SyncError {
    // ===== 来源侧错误 =====
    #[error("表格不存在: {0}")]
    SourceNotFound(String),

    #[error("表格访问被拒绝或配额受限: {0}")]
    SourcePermissionOrQuota(String),

    #[error("工作表不存在: {0}")]
    SourceWorksheetMissing(String),

    #[error("服务配置错误: {0}")]
    Configuration(String),

    // ===== 存储侧错误 =====
    #[error("层级持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("同步出现未预期错误: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// 稳定的错误类别标识（对外契约，区别于人类可读的 Display 文本）
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::SourceNotFound(_) => "SourceNotFound",
            SyncError::SourcePermissionOrQuota(_) => "SourcePermissionOrQuota",
            SyncError::SourceWorksheetMissing(_) => "SourceWorksheetMissing",
            SyncError::Configuration(_) => "ConfigurationError",
            SyncError::Persistence(RepositoryError::SyncInProgress(_)) => "SyncAlreadyInProgress",
            SyncError::Persistence(_) => "PersistenceError",
            SyncError::Unexpected(_) | SyncError::Other(_) => "UnexpectedError",
        }
    }
}

// 实现 From<SheetError>: 网关四类失败一一映射
impl From<SheetError> for SyncError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::NotFound(detail) => SyncError::SourceNotFound(detail),
            SheetError::PermissionOrQuota(detail) => SyncError::SourcePermissionOrQuota(detail),
            SheetError::WorksheetMissing(name) => SyncError::SourceWorksheetMissing(name),
            SheetError::Config(detail) => SyncError::Configuration(detail),
        }
    }
}

/// Result 类型别名
pub type SyncResult<T> = Result<T, SyncError>;
