// ==========================================
// 客户需求表同步服务 - 外部来源错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 网关失败只分四类，调用方据此决定对外错误类别
// ==========================================

use thiserror::Error;

/// 外部来源网关错误类型
///
/// 行级数据问题不属于本类型：行分类永不失败，坏行由调用方计数跳过。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// 表格文档不存在（含 URL 中无法提取出文档 ID 的情形）
    #[error("表格不存在: {0}")]
    NotFound(String),

    /// 权限被拒或 API 配额耗尽（远端来源受速率限制）
    #[error("表格访问被拒绝或配额受限: {0}")]
    PermissionOrQuota(String),

    /// 文档存在但目标工作表不存在
    #[error("工作表不存在: {0}")]
    WorksheetMissing(String),

    /// 凭据或来源配置不可用
    #[error("来源配置错误: {0}")]
    Config(String),
}

/// Result 类型别名
pub type SheetResult<T> = Result<T, SheetError>;
