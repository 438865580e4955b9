// ==========================================
// 客户需求表同步服务 - 同步引擎层
// ==========================================
// 职责: 拉取 → 表头提取 → 行分类 → 层级构建 → 原子落库
// 流程: 见 orchestrator.rs 的同步状态机
// ==========================================

// 模块声明
pub mod batch;
pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod report;

// 重导出核心类型
pub use batch::BatchSummary;
pub use builder::{HierarchyBuilder, RowTally};
pub use error::{SyncError, SyncResult};
pub use orchestrator::{SheetSyncService, SyncOptions, SyncOutcome, SyncPhase, DATA_START_ROW};
pub use report::{SyncReport, SyncStatus};
