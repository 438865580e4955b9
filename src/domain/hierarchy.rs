// ==========================================
// 客户需求表同步服务 - 四级需求层级
// ==========================================
// 结构: Title → Demand → PatientType → Action（严格四级，不跳级）
// 语义: 各级键按“首次出现”顺序排列；后续同键行并入既有分支
// 约束: 标签仅做 trim 后的全等比较，不做大小写/标点归一化
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ActionLeaf - 处置动作叶子
// ==========================================
// 用途: 患者类型下的处置动作；不去重，保持行序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLeaf {
    pub description: String, // 动作描述（可为空）
    pub dire_text: String,   // 紧急提示文本（可为空）
}

// ==========================================
// PatientTypeNode - 患者类型节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientTypeNode {
    pub label: String,           // 患者类型标签（同一 Demand 内唯一）
    pub actions: Vec<ActionLeaf>, // 处置动作，按行序追加
}

impl PatientTypeNode {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            actions: Vec::new(),
        }
    }

    /// 追加一个处置动作（不去重）
    pub fn push_action(&mut self, action: ActionLeaf) {
        self.actions.push(action);
    }
}

// ==========================================
// DemandNode - 需求节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandNode {
    pub label: String,                      // 需求标签（同一 Title 内唯一）
    pub patient_types: Vec<PatientTypeNode>, // 子级，按首次出现排序
}

impl DemandNode {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            patient_types: Vec::new(),
        }
    }

    /// 取得（或新建）指定标签的患者类型分支
    pub fn entry_patient_type(&mut self, label: &str) -> &mut PatientTypeNode {
        let idx = match self.patient_types.iter().position(|p| p.label == label) {
            Some(idx) => idx,
            None => {
                self.patient_types.push(PatientTypeNode::new(label));
                self.patient_types.len() - 1
            }
        };
        &mut self.patient_types[idx]
    }
}

// ==========================================
// TitleNode - 需求大类节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleNode {
    pub label: String,           // 大类标签（同一客户内唯一）
    pub demands: Vec<DemandNode>, // 子级，按首次出现排序
}

impl TitleNode {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            demands: Vec::new(),
        }
    }

    /// 取得（或新建）指定标签的需求分支
    pub fn entry_demand(&mut self, label: &str) -> &mut DemandNode {
        let idx = match self.demands.iter().position(|d| d.label == label) {
            Some(idx) => idx,
            None => {
                self.demands.push(DemandNode::new(label));
                self.demands.len() - 1
            }
        };
        &mut self.demands[idx]
    }
}

// ==========================================
// HierarchyTree - 单客户的完整层级
// ==========================================
// 用途: 一次同步在内存中独占构建的层级值类型，随后整树落库；
//       不做跨同步共享，节点没有独立于同步的生命周期
// 实现: Vec + 线性查找保持插入序；单客户行数为表格量级，无需索引结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyTree {
    pub titles: Vec<TitleNode>,
}

impl HierarchyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得（或新建）指定标签的大类分支
    pub fn entry_title(&mut self, label: &str) -> &mut TitleNode {
        let idx = match self.titles.iter().position(|t| t.label == label) {
            Some(idx) => idx,
            None => {
                self.titles.push(TitleNode::new(label));
                self.titles.len() - 1
            }
        };
        &mut self.titles[idx]
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// 各级节点数统计 (titles, demands, patient_types, actions)
    pub fn node_counts(&self) -> (usize, usize, usize, usize) {
        let mut demands = 0;
        let mut patient_types = 0;
        let mut actions = 0;
        for title in &self.titles {
            demands += title.demands.len();
            for demand in &title.demands {
                patient_types += demand.patient_types.len();
                for pt in &demand.patient_types {
                    actions += pt.actions.len();
                }
            }
        }
        (self.titles.len(), demands, patient_types, actions)
    }
}
