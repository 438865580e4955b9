// ==========================================
// 客户需求表同步服务 - 配置层
// ==========================================
// 职责: 同步行为配置管理
// 存储: config_kv 表 (key-value)
// ==========================================

pub mod config_manager;
pub mod sync_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use sync_config_trait::SyncConfigReader;
