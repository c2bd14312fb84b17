// ==========================================
// 表格数据导入 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls，每个工作表一个 Sheet) / CSV (.csv，文件名即表名)
// 规则: 首行为表头；表头 TRIM；完全空白行跳过；缺失的尾部单元格补空串
// ==========================================

use crate::error::{LoadError, LoadResult};
use crate::sheet::{Book, Sheet};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, instrument};

// ==========================================
// SheetParser Trait
// ==========================================
pub trait SheetParser {
    /// 解析单个文件为若干工作表
    ///
    /// # 返回
    /// - Ok(Vec<Sheet>): 按文件内顺序
    /// - Err: 文件不存在 / 格式不支持 / 解析失败
    fn parse_sheets(&self, file_path: &Path) -> LoadResult<Vec<Sheet>>;
}

fn check_file(path: &Path, extensions: &[&str]) -> LoadResult<()> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }
    let ext = extension_of(path);
    if !extensions.contains(&ext.as_str()) {
        return Err(LoadError::UnsupportedFormat(ext));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 按表头宽度对齐一行；完全空白返回 None
fn normalize_row(cells: Vec<String>, width: usize, skip_blank: bool) -> Option<Vec<String>> {
    if skip_blank && cells.iter().all(|v| v.trim().is_empty()) {
        return None;
    }
    let mut row = cells;
    row.resize(width, String::new());
    Some(row)
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser {
    pub delimiter: u8,
    pub skip_blank_rows: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_blank_rows: true,
        }
    }
}

impl SheetParser for CsvParser {
    fn parse_sheets(&self, file_path: &Path) -> LoadResult<Vec<Sheet>> {
        check_file(file_path, &["csv"])?;

        let name = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let cells: Vec<String> = record
                .iter()
                .take(headers.len())
                .map(str::to_string)
                .collect();
            if let Some(row) = normalize_row(cells, headers.len(), self.skip_blank_rows) {
                rows.push(row);
            }
        }

        Ok(vec![Sheet::new(name, headers, rows)])
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser {
    pub skip_blank_rows: bool,
}

impl Default for ExcelParser {
    fn default() -> Self {
        Self {
            skip_blank_rows: true,
        }
    }
}

/// Excel 单元格 → 文本（日期序列号转为 ISO 文本）
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64()),
        other => other.to_string(),
    }
}

fn excel_serial_to_text(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return serial.to_string();
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    let value = epoch + Duration::milliseconds(millis);
    if millis % 86_400_000 == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl SheetParser for ExcelParser {
    fn parse_sheets(&self, file_path: &Path) -> LoadResult<Vec<Sheet>> {
        check_file(file_path, &["xlsx", "xls"])?;

        let mut workbook = open_workbook_auto(file_path)?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;

            // 首行为表头
            let mut rows = range.rows();
            let Some(header_row) = rows.next() else {
                debug!(sheet = %sheet_name, "跳过空工作表");
                continue;
            };
            let headers: Vec<String> = header_row
                .iter()
                .map(|cell| cell_text(cell).trim().to_string())
                .collect();

            let mut data = Vec::new();
            for data_row in rows {
                let cells: Vec<String> = data_row.iter().take(headers.len()).map(cell_text).collect();
                if let Some(row) = normalize_row(cells, headers.len(), self.skip_blank_rows) {
                    data.push(row);
                }
            }

            sheets.push(Sheet::new(sheet_name.trim(), headers, data));
        }

        if sheets.is_empty() {
            return Err(LoadError::ExcelParseError("Excel 文件无工作表".to_string()));
        }
        Ok(sheets)
    }
}

// ==========================================
// BookReader - 根据扩展名自动选择解析器
// ==========================================
pub struct BookReader {
    csv: CsvParser,
    excel: ExcelParser,
}

impl Default for BookReader {
    fn default() -> Self {
        Self::new(b',', true)
    }
}

impl BookReader {
    pub fn new(delimiter: u8, skip_blank_rows: bool) -> Self {
        Self {
            csv: CsvParser {
                delimiter,
                skip_blank_rows,
            },
            excel: ExcelParser { skip_blank_rows },
        }
    }

    /// 解析单个文件
    pub fn read_file<P: AsRef<Path>>(&self, file_path: P) -> LoadResult<Vec<Sheet>> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => self.csv.parse_sheets(path),
            "xlsx" | "xls" => self.excel.parse_sheets(path),
            ext => Err(LoadError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// 依次解析多个文件，合并为一个工作簿（保持文件顺序）
    #[instrument(skip_all, fields(files = file_paths.len()))]
    pub fn read_book<P: AsRef<Path>>(&self, file_paths: &[P]) -> LoadResult<Book> {
        let mut book = Book::default();
        for path in file_paths {
            for sheet in self.read_file(path)? {
                debug!(sheet = %sheet.name(), rows = sheet.row_count(), "读取工作表");
                book.push(sheet);
            }
        }
        info!(sheets = book.len(), "工作簿读取完成");
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_csv_sheet_named_by_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "language.csv", &[" code , name", "en,English", "de,German"]);

        let sheets = CsvParser::default().parse_sheets(&path).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name(), "language");
        assert_eq!(sheets[0].columns(), &["code".to_string(), "name".to_string()]);
        assert_eq!(sheets[0].value("name", 1), Some("German"));
    }

    #[test]
    fn test_csv_skip_blank_and_pad_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "tag.csv", &["name,age,born", "bob,3", ",,", "eve,4,2001-01-01,extra"]);

        let sheets = CsvParser::default().parse_sheets(&path).unwrap();
        let sheet = &sheets[0];
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.value("born", 0), Some(""));
        assert_eq!(sheet.row(1).map(|r| r.len()), Some(3));
    }

    #[test]
    fn test_csv_custom_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "roles.csv", &["id;name", "1;admin"]);

        let reader = BookReader::new(b';', true);
        let sheets = reader.read_file(&path).unwrap();
        assert_eq!(sheets[0].value("name", 0), Some("admin"));
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let reader = BookReader::default();
        assert!(matches!(
            reader.read_file("non_existent.csv"),
            Err(LoadError::FileNotFound(_))
        ));
        assert!(matches!(
            reader.read_file("data.txt"),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_read_book_keeps_file_order() {
        let dir = TempDir::new().unwrap();
        let tag = write_file(&dir, "tag.csv", &["name", "bob"]);
        let language = write_file(&dir, "language.csv", &["code", "en"]);

        let book = BookReader::default().read_book(&[tag, language]).unwrap();
        let names: Vec<&str> = book.sheets().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["tag", "language"]);
    }

    #[test]
    fn test_excel_serial_to_text() {
        assert_eq!(excel_serial_to_text(35248.0), "1996-07-02");
        assert_eq!(excel_serial_to_text(40317.396435185), "2010-05-19 09:30:52");
    }
}
