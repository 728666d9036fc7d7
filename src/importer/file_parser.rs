// ==========================================
// 材料价格台账 - 文件解析器实现
// ==========================================
// 职责: 外部价格表 → RawTable（表头 + 原始单元格行）
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / 粘贴的制表符文本
// 说明: 空白行保留（由行解析阶段静默丢弃），保证行号与源文件一致
// ==========================================

use crate::domain::types::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::price_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// RawTable - 原始表格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// 表头行（粘贴文本无表头）
    pub headers: Option<Vec<CellValue>>,
    /// 数据行
    pub rows: Vec<Vec<CellValue>>,
    /// 表格之前被跳过的源行数（Excel 工作表前导空行）
    pub leading_rows: usize,
}

impl RawTable {
    /// 数据行在源中的行号（从 1 开始，含表头）
    pub fn row_number(&self, row_idx: usize) -> usize {
        self.leading_rows + row_idx + 1 + usize::from(self.headers.is_some())
    }

    /// 是否存在至少一行非空数据
    pub fn has_data_rows(&self) -> bool {
        self.rows
            .iter()
            .any(|row| !row.iter().all(CellValue::is_blank))
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.to_string_lossy().eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let bytes = fs::read(path)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            warn!(
                file = %path.display(),
                valid_up_to = e.utf8_error().valid_up_to(),
                "CSV 非 UTF-8 编码"
            );
            ImportError::UnsupportedEncoding(path.display().to_string())
        })?;

        parse_csv_str(&content)
    }
}

/// 解析 CSV 文本（首行为表头，自动识别分隔符）
pub fn parse_csv_str(content: &str) -> ImportResult<RawTable> {
    let content = content.trim_start_matches('\u{feff}');
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);
    debug!(delimiter = %(delimiter as char), "CSV 分隔符识别完成");

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // 允许行长度不一致
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    // 读取表头
    let headers = match records.next() {
        Some(record) => record?.iter().map(CellValue::from_raw).collect(),
        None => return Ok(RawTable::default()),
    };

    // 读取所有行
    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        rows.push(record.iter().map(CellValue::from_raw).collect());
    }

    Ok(RawTable {
        headers: Some(headers),
        rows,
        leading_rows: 0,
    })
}

/// 在 ; , TAB 中选择表头行出现次数最多的分隔符（默认逗号）
fn detect_delimiter(header_line: &str) -> u8 {
    [b';', b'\t', b',']
        .into_iter()
        .map(|d| (d, header_line.bytes().filter(|b| *b == d).count()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开 Excel 文件
        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        Ok(table_from_range(&range))
    }
}

/// 工作表区域 → RawTable
///
/// calamine 的区域从第一个非空单元格开始，前导空行计入 leading_rows
fn table_from_range(range: &Range<Data>) -> RawTable {
    let mut rows_iter = range.rows();
    let headers = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(cell_from_excel).collect(),
        None => return RawTable::default(),
    };

    let rows = rows_iter
        .map(|row| row.iter().map(cell_from_excel).collect())
        .collect();

    RawTable {
        headers: Some(headers),
        rows,
        leading_rows: range.start().map_or(0, |(row, _)| row as usize),
    }
}

/// calamine 单元格 → CellValue
fn cell_from_excel(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_raw(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Error(_) => CellValue::Empty,
        other => CellValue::from_raw(&other.to_string()),
    }
}

// ==========================================
// 粘贴文本解析
// ==========================================
// 每行: 标签<TAB>价格<TAB>最低价?<TAB>最高价?，无表头
pub fn parse_pasted_text(text: &str) -> RawTable {
    let rows = text
        .lines()
        .map(|line| line.split('\t').map(CellValue::from_raw).collect())
        .collect();

    RawTable {
        headers: None,
        rows,
        leading_rows: 0,
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_table(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_table(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
