// ==========================================
// 客户需求表同步服务 - 行分类器
// ==========================================
// 职责: 单行判定（可用/跳过）与四级语义字段提取
// 约束: 列位固定（不做用户配置）；分类为全函数，任何坏行
//       都归为 Skip 并计数，绝不中断整批同步
// ==========================================

// 固定列位（与表格模板约定一致）
pub const COL_TITLE: usize = 0;        // A 列: 需求大类
pub const COL_DEMAND: usize = 1;       // B 列: 需求
pub const COL_PATIENT_TYPE: usize = 2; // C 列: 患者类型
pub const COL_ACTION_DESC: usize = 3;  // D 列: 处置动作描述
pub const COL_ACTION_DIRE: usize = 4;  // E 列: 紧急提示文本

/// 读取前三级所需的最少单元格数
pub const MIN_REQUIRED_CELLS: usize = COL_PATIENT_TYPE + 1;

// ==========================================
// AcceptedRow - 接受行的语义字段
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedRow {
    pub title: String,              // 需求大类（非空）
    pub demand: String,             // 需求（非空）
    pub patient_type: String,       // 患者类型（非空）
    pub action_description: String, // 动作描述（可为空）
    pub action_dire_text: String,   // 紧急提示（可为空）
}

// ==========================================
// SkipReason - 跳过原因
// ==========================================
// 用途: 仅用于跳过计数与调试日志，不对外暴露为错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 列数不足以读取前三级
    TooShort,
    /// 需求大类为空
    MissingTitle,
    /// 需求为空
    MissingDemand,
    /// 患者类型为空
    MissingPatientType,
}

/// 行分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowClass {
    Accept(AcceptedRow),
    Skip(SkipReason),
}

// ==========================================
// RowClassifier - 行分类器
// ==========================================
pub struct RowClassifier;

impl RowClassifier {
    /// 对一行原始单元格做分类
    ///
    /// 规则（按序）：
    /// 1. 列数 < MIN_REQUIRED_CELLS → Skip(TooShort)
    /// 2. 所有提取值做 trim；缺失单元格按空字符串处理
    /// 3. 前三级任一为空 → Skip（残缺路径无法落位）
    /// 4. 动作两列允许为空，该行仍然 Accept
    pub fn classify(row: &[String]) -> RowClass {
        if row.len() < MIN_REQUIRED_CELLS {
            return RowClass::Skip(SkipReason::TooShort);
        }

        let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");

        let title = cell(COL_TITLE);
        if title.is_empty() {
            return RowClass::Skip(SkipReason::MissingTitle);
        }

        let demand = cell(COL_DEMAND);
        if demand.is_empty() {
            return RowClass::Skip(SkipReason::MissingDemand);
        }

        let patient_type = cell(COL_PATIENT_TYPE);
        if patient_type.is_empty() {
            return RowClass::Skip(SkipReason::MissingPatientType);
        }

        RowClass::Accept(AcceptedRow {
            title: title.to_string(),
            demand: demand.to_string(),
            patient_type: patient_type.to_string(),
            action_description: cell(COL_ACTION_DESC).to_string(),
            action_dire_text: cell(COL_ACTION_DIRE).to_string(),
        })
    }
}
