// ==========================================
// 表格数据导入 - 加载报告
// ==========================================
// 用途: DatabaseLoader::load 的返回值，可序列化为 JSON
// ==========================================

use crate::column::diagnostics::{Diagnostic, Diagnostics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 带行号的诊断（行号从 1 开始，不含表头）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    pub row: usize,
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
}

// ==========================================
// SheetReport - 单个工作表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetReport {
    pub sheet: String,
    pub table: String,
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_updated: usize,
    pub rows_skipped: usize,
    pub diagnostics: Diagnostics,         // 表级（结构校验）
    pub row_diagnostics: Vec<RowDiagnostic>, // 行级（转换 / 约束）
}

impl SheetReport {
    pub fn new(sheet: &str, table: &str, rows_read: usize) -> Self {
        Self {
            sheet: sheet.to_string(),
            table: table.to_string(),
            rows_read,
            ..Self::default()
        }
    }

    /// 追加某一行的诊断
    pub fn record(&mut self, row: usize, diagnostics: &Diagnostics) {
        self.row_diagnostics.extend(diagnostics.iter().map(|d| RowDiagnostic {
            row,
            diagnostic: d.clone(),
        }));
    }

    pub fn row_error(&mut self, row: usize, text: impl Into<String>) {
        self.row_diagnostics.push(RowDiagnostic {
            row,
            diagnostic: Diagnostic::error(text),
        });
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
            + self
                .row_diagnostics
                .iter()
                .filter(|d| d.diagnostic.is_error())
                .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.warning_count()
            + self
                .row_diagnostics
                .iter()
                .filter(|d| d.diagnostic.is_warning())
                .count()
    }
}

// ==========================================
// LoadReport - 整批
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub batch_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub schedule: Diagnostics, // 排序阶段被排除的表
    pub sheets: Vec<SheetReport>,
}

impl LoadReport {
    pub fn error_count(&self) -> usize {
        self.schedule.error_count() + self.sheets.iter().map(SheetReport::error_count).sum::<usize>()
    }

    pub fn warning_count(&self) -> usize {
        self.schedule.warning_count() + self.sheets.iter().map(SheetReport::warning_count).sum::<usize>()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn rows_inserted(&self) -> usize {
        self.sheets.iter().map(|s| s.rows_inserted).sum()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetReport> {
        self.sheets.iter().find(|s| s.sheet.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "batch {} ({} ms)", self.batch_id, self.elapsed_ms)?;
        for diagnostic in &self.schedule {
            writeln!(f, "  {}", diagnostic)?;
        }
        for sheet in &self.sheets {
            writeln!(
                f,
                "{} -> {}: read {}, inserted {}, updated {}, skipped {}",
                sheet.sheet,
                sheet.table,
                sheet.rows_read,
                sheet.rows_inserted,
                sheet.rows_updated,
                sheet.rows_skipped
            )?;
            for diagnostic in &sheet.diagnostics {
                writeln!(f, "  {}", diagnostic)?;
            }
            for entry in &sheet.row_diagnostics {
                writeln!(f, "  row {}: {}", entry.row, entry.diagnostic)?;
            }
        }
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}
