// ==========================================
// 客户需求表同步服务 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::sync_config_trait::SyncConfigReader;
use crate::db::{init_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键全集
pub mod config_keys {
    /// 默认工作表名
    pub const WORKSHEET_NAME_DEFAULT: &str = "sync/worksheet_name_default";
    /// 再同步时是否覆写客户名称（"true"/"false"）
    pub const OVERWRITE_NAME_ON_RESYNC: &str = "sync/overwrite_name_on_resync";
    /// 批量同步最大并发客户数
    pub const BATCH_CONCURRENCY: &str = "sync/batch_concurrency";
}

// 内置默认值
const DEFAULT_WORKSHEET_NAME: &str = "detail";
const DEFAULT_OVERWRITE_NAME_ON_RESYNC: bool = false;
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（INSERT OR REPLACE）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}

#[async_trait]
impl SyncConfigReader for ConfigManager {
    async fn get_default_worksheet_name(&self) -> Result<String, Box<dyn Error>> {
        let value =
            self.get_config_or_default(config_keys::WORKSHEET_NAME_DEFAULT, DEFAULT_WORKSHEET_NAME)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(DEFAULT_WORKSHEET_NAME.to_string());
        }
        Ok(trimmed.to_string())
    }

    async fn get_overwrite_name_on_resync(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::OVERWRITE_NAME_ON_RESYNC,
            if DEFAULT_OVERWRITE_NAME_ON_RESYNC {
                "true"
            } else {
                "false"
            },
        )?;
        Ok(value.trim().eq_ignore_ascii_case("true"))
    }

    async fn get_batch_concurrency(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_value(config_keys::BATCH_CONCURRENCY)?;
        let concurrency = match value {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("配置值格式错误 (key: {}): {}", config_keys::BATCH_CONCURRENCY, e))?,
            None => DEFAULT_BATCH_CONCURRENCY,
        };
        Ok(concurrency.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        ConfigManager {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn test_defaults_without_rows() {
        let manager = in_memory_manager();

        assert_eq!(manager.get_default_worksheet_name().await.unwrap(), "detail");
        assert!(!manager.get_overwrite_name_on_resync().await.unwrap());
        assert_eq!(manager.get_batch_concurrency().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_set_and_read_back() {
        let manager = in_memory_manager();

        manager
            .set_config_value(config_keys::WORKSHEET_NAME_DEFAULT, "主表")
            .unwrap();
        manager
            .set_config_value(config_keys::OVERWRITE_NAME_ON_RESYNC, "TRUE")
            .unwrap();
        manager
            .set_config_value(config_keys::BATCH_CONCURRENCY, "2")
            .unwrap();

        assert_eq!(manager.get_default_worksheet_name().await.unwrap(), "主表");
        assert!(manager.get_overwrite_name_on_resync().await.unwrap());
        assert_eq!(manager.get_batch_concurrency().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_batch_concurrency_floor_is_one() {
        let manager = in_memory_manager();
        manager
            .set_config_value(config_keys::BATCH_CONCURRENCY, "0")
            .unwrap();

        assert_eq!(manager.get_batch_concurrency().await.unwrap(), 1);
    }
}
