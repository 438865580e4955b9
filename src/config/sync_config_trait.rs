// ==========================================
// 客户需求表同步服务 - 同步配置读取 Trait
// ==========================================
// 职责: 定义同步模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// SyncConfigReader Trait
// ==========================================
// 用途: 同步模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait SyncConfigReader: Send + Sync {
    /// 获取默认工作表名（客户未指定 worksheet_name 时使用）
    ///
    /// # 默认值
    /// - "detail"
    async fn get_default_worksheet_name(&self) -> Result<String, Box<dyn Error>>;

    /// 再同步时是否覆写客户名称
    ///
    /// 首次同步总是写入表头中的名称；之后的同步默认不覆盖人工维护的
    /// 名称，除非显式开启本配置。
    ///
    /// # 默认值
    /// - false
    async fn get_overwrite_name_on_resync(&self) -> Result<bool, Box<dyn Error>>;

    /// 获取批量同步的最大并发客户数
    ///
    /// # 默认值
    /// - 4
    async fn get_batch_concurrency(&self) -> Result<usize, Box<dyn Error>>;
}
