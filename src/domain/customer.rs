// ==========================================
// 客户需求表同步服务 - 客户主档实体
// ==========================================
// 对齐: db.rs customer 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Customer - 客户主档
// ==========================================
// 用途: 一个客户对应一张外部表格，层级子树整体归属于该客户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub did_number: String,             // 外部唯一标识（主键）
    pub name: String,                   // 客户名称（创建时人工录入）
    pub address: Option<String>,        // 邮寄地址（来自表头行）
    pub note1: Option<String>,          // 自由备注 1（来自表头行）
    pub note2: Option<String>,          // 自由备注 2
    pub note3: Option<String>,          // 自由备注 3
    pub sheet_url: Option<String>,      // 来源表格 URL
    pub worksheet_name: Option<String>, // 工作表名（空则使用全局默认）
    pub filetitle: Option<String>,      // 缓存的表格显示标题（去除重名后缀）
    pub created_at: DateTime<Utc>,      // 创建时间
    pub updated_at: DateTime<Utc>,      // 最近更新时间
}

impl Customer {
    /// 以最小字段构造客户（其余字段留空，时间取当前时刻）
    pub fn new(did_number: &str, name: &str, sheet_url: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            did_number: did_number.to_string(),
            name: name.to_string(),
            address: None,
            note1: None,
            note2: None,
            note3: None,
            sheet_url: sheet_url.map(|u| u.to_string()),
            worksheet_name: None,
            filetitle: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// HeaderUpdate - 表头行待写字段
// ==========================================
// 用途: 表头提取的暂存结构，随层级替换在同一事务内落库
// 语义: None 表示该字段本次不写（保持库中原值）；
//       Some("") 表示表头单元格存在但为空，按空字符串覆写
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderUpdate {
    pub name: Option<String>,      // 客户名称（仅首次同步或显式配置时写入）
    pub address: Option<String>,   // 邮寄地址
    pub note1: Option<String>,     // 自由备注 1
    pub note2: Option<String>,     // 自由备注 2
    pub note3: Option<String>,     // 自由备注 3
    pub filetitle: Option<String>, // 表格显示标题（每次同步刷新）
}

impl HeaderUpdate {
    /// 是否没有任何待写字段
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.note1.is_none()
            && self.note2.is_none()
            && self.note3.is_none()
            && self.filetitle.is_none()
    }
}
