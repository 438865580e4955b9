// ==========================================
// 客户需求表同步服务 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 外部表格到四级需求层级的同步引擎
// 层级: Customer → Title → Demand → PatientType → Action
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 外部来源层 - 表格网关与行分类
pub mod sheet;

// 同步引擎层 - 编排与构建
pub mod sync;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{ActionLeaf, Customer, DemandNode, HeaderUpdate, HierarchyTree, PatientTypeNode, TitleNode};

// 仓储
pub use repository::{CustomerRepository, CustomerRepositoryImpl, RepositoryError};

// 外部来源
pub use sheet::{FixtureSheetGateway, SheetError, SheetGateway, SourceRef};

// 同步引擎
pub use sync::{
    BatchSummary, SheetSyncService, SyncError, SyncOptions, SyncReport, SyncStatus,
};

// 配置
pub use config::{ConfigManager, SyncConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "客户需求表同步服务";
