// ==========================================
// 客户需求表同步服务 - 客户仓储 Trait
// ==========================================
// 职责: 定义客户主档与层级子树的数据访问接口（不包含实现）
// 约束: replace_hierarchy 必须整体成功或整体不生效；
//       事务开启期间该客户的层级子树由本次同步独占
// ==========================================

use crate::domain::customer::{Customer, HeaderUpdate};
use crate::domain::hierarchy::HierarchyTree;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// SyncGuard - 同步互斥守卫
// ==========================================
// 用途: 持有期间同一客户的第二次 begin_sync 立即失败（快速失败，
//       不排队等待）；Drop 时释放
pub struct SyncGuard {
    did_number: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl SyncGuard {
    /// 尝试登记客户的同步占用
    ///
    /// # 返回
    /// - Ok(SyncGuard): 登记成功，守卫存活期间该客户被占用
    /// - Err(SyncInProgress): 该客户已有同步在执行
    pub fn acquire(
        active: Arc<Mutex<HashSet<String>>>,
        did_number: &str,
    ) -> RepositoryResult<Self> {
        {
            let mut set = active
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            if !set.insert(did_number.to_string()) {
                return Err(RepositoryError::SyncInProgress(did_number.to_string()));
            }
        }

        Ok(Self {
            did_number: did_number.to_string(),
            active,
        })
    }

    pub fn did_number(&self) -> &str {
        &self.did_number
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.active.lock() {
            set.remove(&self.did_number);
        }
    }
}

// ==========================================
// CustomerRepository Trait
// ==========================================
// 用途: 客户主档 + 层级子树访问接口
// 实现者: CustomerRepositoryImpl
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// 按外部标识读取客户
    async fn get_customer(&self, did_number: &str) -> RepositoryResult<Option<Customer>>;

    /// 创建或更新客户（更新时仅覆写 name/sheet_url/worksheet_name，
    /// 表头来源字段由同步事务维护）
    async fn upsert_customer(&self, customer: &Customer) -> RepositoryResult<()>;

    /// 列出全部客户（批量同步入口）
    async fn list_customers(&self) -> RepositoryResult<Vec<Customer>>;

    /// 登记同步占用（同一客户串行化）
    ///
    /// # 返回
    /// - Ok(SyncGuard): 守卫存活期间独占该客户的同步
    /// - Err(SyncInProgress): 已有同步在执行，调用方应快速失败
    async fn begin_sync(&self, did_number: &str) -> RepositoryResult<SyncGuard>;

    /// 原子替换客户的整个层级子树并更新表头字段
    ///
    /// 单事务内执行：删除既有层级 → 按树序写入新层级 → 覆写表头字段。
    /// 任一步失败整体回滚，读者不会看到空树或半成品树。
    async fn replace_hierarchy(
        &self,
        did_number: &str,
        tree: &HierarchyTree,
        header: &HeaderUpdate,
    ) -> RepositoryResult<()>;

    /// 读取客户当前存储的层级子树（按 position 排序还原）
    async fn load_hierarchy(&self, did_number: &str) -> RepositoryResult<HierarchyTree>;
}
