// ==========================================
// 客户需求表同步服务 - 表格来源网关接口
// ==========================================
// 职责: 定义外部表格拉取接口（不包含远端实现）
// 实现者: FixtureSheetGateway（本地文件）；远端实现由部署侧提供
// ==========================================

use crate::sheet::error::{SheetError, SheetResult};
use async_trait::async_trait;

// ==========================================
// SourceRef - 表格来源引用
// ==========================================
// 用途: 从客户存储的 URL 中提取出的文档标识 + 目标工作表名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub spreadsheet_id: String, // 文档标识（URL 中 /d/<id>/ 段）
    pub worksheet_name: String, // 目标工作表名
}

impl SourceRef {
    /// 从表格 URL 提取文档标识
    ///
    /// URL 形如 `https://.../d/<id>/edit`；提取 `/d/` 之后、下一个 `/` 之前的段。
    /// 无法提取时按 NotFound 处理：对使用者而言正确动作都是检查 URL。
    pub fn from_url(url: &str, worksheet_name: &str) -> SheetResult<Self> {
        let rest = url.split("/d/").nth(1).ok_or_else(|| {
            SheetError::NotFound(format!("无法从表格 URL 提取文档 ID: {}", url))
        })?;
        let id = rest.split('/').next().unwrap_or("").trim();
        if id.is_empty() {
            return Err(SheetError::NotFound(format!(
                "表格 URL 的文档 ID 为空: {}",
                url
            )));
        }

        Ok(Self {
            spreadsheet_id: id.to_string(),
            worksheet_name: worksheet_name.to_string(),
        })
    }
}

// ==========================================
// SheetGateway Trait
// ==========================================
// 用途: 外部表格来源抽象；fetch 为挂起点，可能阻塞在网络 I/O
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// 拉取目标工作表的全部单元格
    ///
    /// # 返回
    /// - Ok(Vec<Vec<String>>): 按行排列的原始字符串单元格；允许行长度不齐
    /// - Err(SheetError): 四类来源失败之一
    async fn fetch_rows(&self, source: &SourceRef) -> SheetResult<Vec<Vec<String>>>;

    /// 拉取文档自身的显示标题（来源元数据，非单元格内容）
    async fn fetch_title(&self, source: &SourceRef) -> SheetResult<String>;
}
