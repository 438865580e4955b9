// ==========================================
// 客户需求表同步服务 - 表头行提取
// ==========================================
// 职责: 从第 1 行按列位提取客户辅助属性；
//       处理来源系统为重名文档追加的数字后缀
// 语义: 单元格缺失 → 不写（None）；单元格存在但为空 → 覆写为空串
// ==========================================

use crate::domain::customer::HeaderUpdate;

// 表头行列位: (name, address, note1, note2, note3)
const HEADER_COL_NAME: usize = 0;
const HEADER_COL_ADDRESS: usize = 1;
const HEADER_COL_NOTE1: usize = 2;
const HEADER_COL_NOTE2: usize = 3;
const HEADER_COL_NOTE3: usize = 4;

/// 从第 1 行提取客户辅助属性
///
/// 行缺失时返回全 None（库中原值全部保留）；行偏短时仅尾部字段为 None。
/// 注意返回值的 filetitle 恒为 None：表格标题来自来源元数据而非单元格，
/// 由编排器另行填入。
pub fn extract_header_fields(row: Option<&[String]>) -> HeaderUpdate {
    let mut update = HeaderUpdate::default();
    let row = match row {
        Some(row) => row,
        None => return update,
    };

    let cell = |idx: usize| row.get(idx).map(|s| s.trim().to_string());

    update.name = cell(HEADER_COL_NAME);
    update.address = cell(HEADER_COL_ADDRESS);
    update.note1 = cell(HEADER_COL_NOTE1);
    update.note2 = cell(HEADER_COL_NOTE2);
    update.note3 = cell(HEADER_COL_NOTE3);
    update
}

/// 去掉标题尾部的 "-<数字>" 重名后缀
///
/// 来源系统在文档重名时追加数字后缀（如 "诊所A-2"）。仅剥离一层；
/// 标题整体就是 "-<数字>" 时不处理。
pub fn strip_copy_suffix(title: &str) -> &str {
    if let Some(pos) = title.rfind('-') {
        let digits = &title[pos + 1..];
        if pos > 0 && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return &title[..pos];
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_extract_full_header() {
        let cells = row(&["诊所A", "某市某路 1 号", "夜间转接", "", "节假日停诊"]);
        let update = extract_header_fields(Some(&cells));

        assert_eq!(update.name.as_deref(), Some("诊所A"));
        assert_eq!(update.address.as_deref(), Some("某市某路 1 号"));
        assert_eq!(update.note1.as_deref(), Some("夜间转接"));
        // 存在但为空的单元格按空串覆写，区别于缺失
        assert_eq!(update.note2.as_deref(), Some(""));
        assert_eq!(update.note3.as_deref(), Some("节假日停诊"));
        assert!(update.filetitle.is_none());
    }

    #[test]
    fn test_extract_short_header_leaves_tail_unset() {
        let cells = row(&["诊所A", "地址"]);
        let update = extract_header_fields(Some(&cells));

        assert_eq!(update.name.as_deref(), Some("诊所A"));
        assert_eq!(update.address.as_deref(), Some("地址"));
        assert!(update.note1.is_none());
        assert!(update.note2.is_none());
        assert!(update.note3.is_none());
    }

    #[test]
    fn test_extract_missing_header_row() {
        let update = extract_header_fields(None);
        assert!(update.is_empty());
    }

    #[test]
    fn test_strip_copy_suffix() {
        assert_eq!(strip_copy_suffix("诊所A-2"), "诊所A");
        assert_eq!(strip_copy_suffix("clinic-10"), "clinic");
        // 仅剥离一层
        assert_eq!(strip_copy_suffix("clinic-1-2"), "clinic-1");
    }

    #[test]
    fn test_strip_copy_suffix_untouched() {
        assert_eq!(strip_copy_suffix("诊所A"), "诊所A");
        assert_eq!(strip_copy_suffix("clinic-x1"), "clinic-x1");
        assert_eq!(strip_copy_suffix("clinic-"), "clinic-");
        assert_eq!(strip_copy_suffix("-123"), "-123");
    }
}
