// ==========================================
// 表格数据导入 - 加载层
// ==========================================
// 职责: 排序后的工作表 → 两轮写库 → LoadReport
// ==========================================

pub mod database_loader;
pub mod report;
pub mod sheet_loader;
pub mod statement_executor;

pub use database_loader::DatabaseLoader;
pub use report::{LoadReport, RowDiagnostic, SheetReport};
pub use sheet_loader::{SheetLoad, SheetLoader};
pub use statement_executor::{quote_identifier, SqliteStatementExecutor, StatementExecutor};
