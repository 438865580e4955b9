// ==========================================
// 客户需求表同步服务 - 本地文件网关实现
// ==========================================
// 支持: Excel (.xlsx) / CSV (.csv)
// 用途: 以目录为“文档库”，文档 ID 即文件主名；
//       供命令行与集成测试离线使用，远端网关由部署侧提供
// ==========================================

use crate::sheet::error::{SheetError, SheetResult};
use crate::sheet::gateway::{SheetGateway, SourceRef};
use async_trait::async_trait;
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};

// ==========================================
// FixtureSheetGateway - 文件夹化表格网关
// ==========================================
pub struct FixtureSheetGateway {
    root_dir: PathBuf,
}

impl FixtureSheetGateway {
    /// 创建新的文件网关
    ///
    /// # 参数
    /// - root_dir: 文档库目录；`<id>.xlsx` 或 `<id>.csv` 对应文档 `<id>`
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Self {
        Self {
            root_dir: root_dir.as_ref().to_path_buf(),
        }
    }

    /// 按文档 ID 解析文件路径（xlsx 优先，其次 csv）
    fn resolve(&self, spreadsheet_id: &str) -> SheetResult<PathBuf> {
        for ext in ["xlsx", "csv"] {
            let path = self.root_dir.join(format!("{}.{}", spreadsheet_id, ext));
            if path.exists() {
                return Ok(path);
            }
        }
        Err(SheetError::NotFound(format!(
            "文档库中不存在文档: {}",
            spreadsheet_id
        )))
    }

    /// 读取 CSV 文件为原始网格（无表头概念，全部按数据行读取）
    fn read_csv_grid(path: &Path) -> SheetResult<Vec<Vec<String>>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_path(path)
            .map_err(|e| SheetError::Config(format!("CSV 打开失败: {}", e)))?;

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| SheetError::Config(format!("CSV 解析失败: {}", e)))?;
            grid.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(trim_grid_tail(grid))
    }

    /// 读取 Excel 指定工作表为原始网格
    fn read_xlsx_grid(path: &Path, worksheet_name: &str) -> SheetResult<Vec<Vec<String>>> {
        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e: calamine::XlsxError| SheetError::Config(format!("Excel 解析失败: {}", e)))?;

        if !workbook
            .sheet_names()
            .iter()
            .any(|name| name.as_str() == worksheet_name)
        {
            return Err(SheetError::WorksheetMissing(worksheet_name.to_string()));
        }

        let range = workbook
            .worksheet_range(worksheet_name)
            .map_err(|e| SheetError::Config(format!("Excel 读取失败: {}", e)))?;

        // Range 只覆盖“已用区域”，起点可能不在 A1；按起点补齐前导空行/空列，
        // 保证行号、列号与表格中所见一致
        let (start_row, start_col) = match range.start() {
            Some(start) => (start.0 as usize, start.1 as usize),
            None => return Ok(Vec::new()), // 空工作表
        };

        let mut grid: Vec<Vec<String>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            let mut cells = vec![String::new(); start_col];
            cells.extend(row.iter().map(|cell| cell.to_string()));
            grid.push(cells);
        }

        Ok(trim_grid_tail(grid))
    }
}

/// 去掉每行尾部的空单元格与网格尾部的空行
///
/// 远端来源返回的网格同样不含尾部空白；行内与中间的空行保留，
/// 行号语义（表头/列标签/数据起始行）不受影响。
fn trim_grid_tail(mut grid: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for row in &mut grid {
        while row.last().map(|cell| cell.trim().is_empty()).unwrap_or(false) {
            row.pop();
        }
    }
    while grid.last().map(|row| row.is_empty()).unwrap_or(false) {
        grid.pop();
    }
    grid
}

#[async_trait]
impl SheetGateway for FixtureSheetGateway {
    async fn fetch_rows(&self, source: &SourceRef) -> SheetResult<Vec<Vec<String>>> {
        let path = self.resolve(&source.spreadsheet_id)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Self::read_csv_grid(&path),
            "xlsx" => Self::read_xlsx_grid(&path, &source.worksheet_name),
            _ => Err(SheetError::Config(format!("不支持的文件格式: {}", ext))),
        }
    }

    async fn fetch_title(&self, source: &SourceRef) -> SheetResult<String> {
        // 本地文件没有文档元数据，以文件主名作为显示标题
        let path = self.resolve(&source.spreadsheet_id)?;
        Ok(path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| source.spreadsheet_id.clone()))
    }
}
