// ==========================================
// 客户需求表同步服务 - 领域层
// ==========================================
// 职责: 客户主档与四级需求层级的实体定义
// 红线: 领域类型不访问数据库、不依赖外部来源
// ==========================================

pub mod customer;
pub mod hierarchy;

// 重导出核心类型
pub use customer::{Customer, HeaderUpdate};
pub use hierarchy::{ActionLeaf, DemandNode, HierarchyTree, PatientTypeNode, TitleNode};
