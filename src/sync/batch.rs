// ==========================================
// 客户需求表同步服务 - 批量同步
// ==========================================
// 用途: 定时批量任务入口，对全部客户逐一同步
// 并发: 客户之间无共享可变状态，可有界并发；同一客户由
//       仓储的同步占用登记串行化
// 约束: 单客户失败只计数，不中止整批
// ==========================================

use crate::config::sync_config_trait::SyncConfigReader;
use crate::repository::customer_repo::CustomerRepository;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::orchestrator::{SheetSyncService, SyncOptions};
use futures::StreamExt;
use serde::Serialize;
use tracing::{error, info, warn};

// ==========================================
// BatchSummary - 批量同步汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,   // 处理的客户总数
    pub updated: usize, // 同步成功数
    pub failed: usize,  // 同步失败数
}

impl<R, C> SheetSyncService<R, C>
where
    R: CustomerRepository,
    C: SyncConfigReader,
{
    /// 同步全部客户
    ///
    /// # 返回
    /// - Ok(BatchSummary): 整批汇总；单客户失败已折叠进 failed 计数
    /// - Err: 仅当客户列表读取或并发配置读取失败
    pub async fn sync_all_customers(&self) -> SyncResult<BatchSummary> {
        let customers = self.repo().list_customers().await?;
        let total = customers.len();

        if customers.is_empty() {
            warn!("没有可同步的客户");
            return Ok(BatchSummary::default());
        }

        let concurrency = self
            .config()
            .get_batch_concurrency()
            .await
            .map_err(|e| SyncError::Configuration(e.to_string()))?;
        info!(total, concurrency, "开始批量同步客户表格");

        let reports: Vec<(String, bool)> = futures::stream::iter(customers.iter().map(|customer| {
            async move {
                let report = self
                    .sync_customer(customer, SyncOptions::default())
                    .await;
                if let Some(detail) = &report.error {
                    error!(did_number = %customer.did_number, error = %detail, "客户同步失败");
                } else {
                    info!(
                        did_number = %customer.did_number,
                        records_added = report.records_added,
                        "客户同步成功"
                    );
                }
                (customer.did_number.clone(), report.is_success())
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        for (_did_number, succeeded) in reports {
            if succeeded {
                summary.updated += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(
            total = summary.total,
            updated = summary.updated,
            failed = summary.failed,
            "批量同步结束"
        );
        Ok(summary)
    }
}
