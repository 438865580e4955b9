// ==========================================
// 客户需求表同步服务 - 同步编排器
// ==========================================
// 职责: 协调单客户同步的完整流程
// 流程: 拉取 → 表头提取 → 行分类/建树 → 原子落库 → 结果上报
// 状态机: Fetching → HeaderExtracted → RowsClassified → Persisting
//         → Done，任一步失败进入 Errored
// ==========================================

use crate::config::sync_config_trait::SyncConfigReader;
use crate::domain::customer::{Customer, HeaderUpdate};
use crate::domain::hierarchy::HierarchyTree;
use crate::repository::customer_repo::CustomerRepository;
use crate::sheet::gateway::{SheetGateway, SourceRef};
use crate::sheet::header::{extract_header_fields, strip_copy_suffix};
use crate::sync::builder::{HierarchyBuilder, RowTally};
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::report::SyncReport;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// 数据行起始行号（1 基）：第 1 行为表头、第 2 行为列标签
pub const DATA_START_ROW: usize = 3;

// 数据行在网格中的 0 基下标
const DATA_START_INDEX: usize = DATA_START_ROW - 1;

// ==========================================
// SyncPhase - 同步状态机阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Fetching,
    HeaderExtracted,
    RowsClassified,
    Persisting,
    Done,
    Errored,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Fetching => "Fetching",
            SyncPhase::HeaderExtracted => "HeaderExtracted",
            SyncPhase::RowsClassified => "RowsClassified",
            SyncPhase::Persisting => "Persisting",
            SyncPhase::Done => "Done",
            SyncPhase::Errored => "Errored",
        };
        f.write_str(name)
    }
}

// ==========================================
// SyncOptions - 同步触发上下文
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// 是否为新建客户后的首次同步
    ///
    /// 首次同步写入表头中的客户名称；之后是否覆写由配置决定。
    pub created: bool,
}

// ==========================================
// SyncOutcome - 同步成功的内部产物
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub records_added: usize,      // 接受并写入的数据行数
    pub records_skipped: usize,    // 跳过的数据行数
    pub spreadsheet_title: String, // 去除重名后缀后的表格标题
    pub no_data: bool,             // 网格不足 3 行（按“无层级数据”处理）
}

// ==========================================
// SheetSyncService - 同步编排器
// ==========================================
pub struct SheetSyncService<R, C>
where
    R: CustomerRepository,
    C: SyncConfigReader,
{
    // 数据访问层
    repo: Arc<R>,

    // 配置读取器
    config: Arc<C>,

    // 外部来源网关
    gateway: Box<dyn SheetGateway>,
}

impl<R, C> SheetSyncService<R, C>
where
    R: CustomerRepository,
    C: SyncConfigReader,
{
    /// 创建新的同步编排器实例
    ///
    /// # 参数
    /// - repo: 客户仓储
    /// - config: 配置读取器
    /// - gateway: 表格来源网关
    pub fn new(repo: Arc<R>, config: Arc<C>, gateway: Box<dyn SheetGateway>) -> Self {
        Self {
            repo,
            config,
            gateway,
        }
    }

    pub fn repo(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn config(&self) -> &Arc<C> {
        &self.config
    }

    /// 对单个客户执行一次完整同步
    ///
    /// 永远返回结构化结果：来源/存储失败折叠进 status=error 的报告，
    /// 客户既有数据保持不变。
    #[instrument(skip(self, customer, options), fields(sync_id = tracing::field::Empty, did_number = %customer.did_number))]
    pub async fn sync_customer(&self, customer: &Customer, options: SyncOptions) -> SyncReport {
        let sync_id = Uuid::new_v4();
        tracing::Span::current().record("sync_id", tracing::field::display(sync_id));
        info!(created = options.created, "开始同步客户表格");

        match self.run_sync(customer, options).await {
            Ok(outcome) => {
                info!(
                    phase = %SyncPhase::Done,
                    records_added = outcome.records_added,
                    records_skipped = outcome.records_skipped,
                    spreadsheet_title = %outcome.spreadsheet_title,
                    "同步完成"
                );
                let message = if outcome.no_data {
                    format!(
                        "表格处理完成（第 {} 行起无数据），已清空既有层级。",
                        DATA_START_ROW
                    )
                } else {
                    format!(
                        "表格处理完成：自第 {} 行起接受 {} 行、跳过 {} 行。",
                        DATA_START_ROW, outcome.records_added, outcome.records_skipped
                    )
                };
                SyncReport::success(outcome.records_added, outcome.spreadsheet_title, message)
            }
            Err(err) => {
                error!(phase = %SyncPhase::Errored, kind = err.kind(), error = %err, "同步失败");
                SyncReport::failure(&err)
            }
        }
    }

    /// 同步主流程（各阶段失败通过 ? 直接进入 Errored）
    async fn run_sync(&self, customer: &Customer, options: SyncOptions) -> SyncResult<SyncOutcome> {
        // === 阶段 1: Fetching ===
        // fetch await 是取消点：调用方在持久化开始前取消，存储不会被触碰
        debug!(phase = %SyncPhase::Fetching, "拉取外部表格");
        let source = self.resolve_source(customer).await?;
        let raw_title = self.gateway.fetch_title(&source).await?;
        let rows = self.gateway.fetch_rows(&source).await?;
        debug!(total_rows = rows.len(), "表格拉取完成");

        // === 阶段 2: HeaderExtracted ===
        debug!(phase = %SyncPhase::HeaderExtracted, "提取表头属性");
        let spreadsheet_title = strip_copy_suffix(&raw_title).to_string();
        let header = self
            .stage_header_update(&rows, &spreadsheet_title, options)
            .await?;

        // === 阶段 3: RowsClassified ===
        debug!(phase = %SyncPhase::RowsClassified, "分类数据行");
        let no_data = rows.len() < DATA_START_ROW;
        let (tree, tally) = if no_data {
            // 不足 3 行按“无层级数据”处理：不是错误，照常清空旧层级
            (HierarchyTree::new(), RowTally::default())
        } else {
            let mut builder = HierarchyBuilder::new();
            for (idx, row) in rows[DATA_START_INDEX..].iter().enumerate() {
                builder.push_row(DATA_START_ROW + idx, row);
            }
            builder.finish()
        };
        debug!(
            accepted = tally.accepted,
            skipped = tally.skipped,
            "行分类完成"
        );

        // === 阶段 4: Persisting ===
        debug!(phase = %SyncPhase::Persisting, "原子替换层级");
        let _guard = self.repo.begin_sync(&customer.did_number).await?;
        self.repo
            .replace_hierarchy(&customer.did_number, &tree, &header)
            .await?;

        // === 阶段 5: Done ===
        Ok(SyncOutcome {
            records_added: tally.accepted,
            records_skipped: tally.skipped,
            spreadsheet_title,
            no_data,
        })
    }

    /// 解析客户的表格来源引用
    async fn resolve_source(&self, customer: &Customer) -> SyncResult<SourceRef> {
        let sheet_url = customer
            .sheet_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                SyncError::SourceNotFound(format!(
                    "客户 {} 未配置表格 URL",
                    customer.did_number
                ))
            })?;

        let worksheet_name = match customer
            .worksheet_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            Some(name) => name.to_string(),
            None => self
                .config
                .get_default_worksheet_name()
                .await
                .map_err(|e| SyncError::Configuration(e.to_string()))?,
        };

        Ok(SourceRef::from_url(sheet_url, &worksheet_name)?)
    }

    /// 组装表头待写字段
    ///
    /// 名称仅在首次同步或显式配置下覆写；地址/备注来自“记录表”，
    /// 单元格存在即覆写；表格标题每次同步刷新。
    async fn stage_header_update(
        &self,
        rows: &[Vec<String>],
        spreadsheet_title: &str,
        options: SyncOptions,
    ) -> SyncResult<HeaderUpdate> {
        let mut header = extract_header_fields(rows.first().map(|row| row.as_slice()));

        if !options.created {
            let overwrite = self
                .config
                .get_overwrite_name_on_resync()
                .await
                .map_err(|e| SyncError::Configuration(e.to_string()))?;
            if !overwrite {
                header.name = None;
            }
        }

        header.filetitle = Some(spreadsheet_title.to_string());
        Ok(header)
    }
}
