// ==========================================
// 表格数据导入 - 核心库
// ==========================================
// 职责: 将工作簿（CSV / Excel）按外键依赖顺序加载到已有数据库表
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 列层 - 列元数据、值转换、诊断
pub mod column;

// 表结构层 - 列元数据 / 主键 / 外键查询
pub mod schema;

// 工作表层 - 工作簿读取
pub mod sheet;

// 排序层 - 加载顺序
pub mod sort;

// 加载层 - 写库与报告
pub mod loader;

// 配置层
pub mod config;

// 错误类型
pub mod error;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use column::{
    Column, ColumnDataProvider, ConverterRegistry, Diagnostic, DiagnosticLevel, Diagnostics,
    MetaColumn, MetaType, NativeType, TypedValue,
};
pub use config::{LoaderConfig, SortingKind};
pub use error::{LoadError, LoadResult};
pub use loader::{DatabaseLoader, LoadReport, SqliteStatementExecutor, StatementExecutor};
pub use schema::{SchemaIntrospector, SqliteIntrospector};
pub use sheet::{Book, BookReader, Sheet};
pub use sort::{DependencySheetSorter, Schedule, SheetSortingStrategy, SimpleSheetSorter};

// ==========================================
// 常量定义
// ==========================================

// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 名称
pub const APP_NAME: &str = "sheet-loader";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
