// ==========================================
// 表格数据导入 - 列层
// ==========================================
// 职责: 列元数据 + 原始文本 → 类型化值 + 诊断
// ==========================================

pub mod cell;
pub mod converter;
pub mod data_provider;
pub mod diagnostics;
pub mod meta_column;
pub mod meta_type;
pub mod typed_value;

pub use cell::Column;
pub use converter::{Conversion, ConverterRegistry, DateFormats, ValueConverter};
pub use data_provider::{ColumnDataProvider, RowConversion};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use meta_column::{find_by_column_name, MetaColumn};
pub use meta_type::{MetaType, NativeType};
pub use typed_value::{Number, TypedValue};
