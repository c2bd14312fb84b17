// ==========================================
// 表格数据导入 - 工作簿 / 工作表
// ==========================================
// 职责: 源数据的内存表示（全部为原始文本）
// 说明: 工作表名即目标表名
// ==========================================

pub mod file_parser;

pub use file_parser::{BookReader, CsvParser, ExcelParser, SheetParser};

use crate::column::data_provider::check_structure;
use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::MetaColumn;
use serde::{Deserialize, Serialize};

// ==========================================
// Sheet - 单个工作表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 目标表名（去除首尾空白）
    pub fn table_name(&self) -> &str {
        self.name.trim()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// 列位置（大小写不敏感）
    pub fn column_index(&self, column: &str) -> Option<usize> {
        let column = column.trim();
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(column))
    }

    /// 取单元格原始文本，缺失单元格返回 None
    pub fn value(&self, column: &str, row: usize) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// 工作表表头与目标表列元数据的结构校验
    pub fn validate_columns(&self, meta_columns: &[MetaColumn]) -> Diagnostics {
        check_structure(self.table_name(), &self.columns, meta_columns)
    }
}

// ==========================================
// Book - 工作簿（有序工作表集合）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    sheets: Vec<Sheet>,
}

impl Book {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets
    }

    /// 按名称查找工作表（大小写不敏感，取第一个）
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.table_name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::meta_type::NativeType;

    fn language() -> Sheet {
        Sheet::new(
            "language",
            vec!["code".to_string(), "Name".to_string()],
            vec![
                vec!["en".to_string(), "English".to_string()],
                vec!["de".to_string()],
            ],
        )
    }

    #[test]
    fn test_value_lookup() {
        let sheet = language();
        assert_eq!(sheet.value("NAME", 0), Some("English"));
        assert_eq!(sheet.value("code", 1), Some("de"));
        assert_eq!(sheet.value("name", 1), None);
        assert_eq!(sheet.value("missing", 0), None);
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_validate_columns() {
        let sheet = language();
        let meta = vec![
            MetaColumn::new("language", "code", NativeType::Text)
                .nullable(false)
                .primary(true),
            MetaColumn::new("language", "label", NativeType::Text).nullable(false),
        ];

        let diagnostics = sheet.validate_columns(&meta);
        assert_eq!(
            diagnostics.texts(),
            vec![
                "Table \"language\" requires values for column \"label\".",
                "Table \"language\" has no column \"Name\".",
            ]
        );
    }

    #[test]
    fn test_book_lookup() {
        let book = Book::new(vec![language()]);
        assert!(book.sheet("LANGUAGE").is_some());
        assert!(book.sheet("tag").is_none());
        assert_eq!(book.len(), 1);
    }
}
