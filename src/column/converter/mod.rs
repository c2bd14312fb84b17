// ==========================================
// 表格数据导入 - 值转换层
// ==========================================
// 职责: 原始文本 → 类型化值 + 诊断
// 支持: 日期 / 时间戳 / 数值 / 文本 / 兜底
// ==========================================

pub mod date_converter;
pub mod date_formats;
pub mod null_converter;
pub mod number_converter;
pub mod registry;
pub mod text_converter;
pub mod value_converter;

pub use date_converter::{DateConverter, TimestampConverter};
pub use date_formats::DateFormats;
pub use null_converter::NullConverter;
pub use number_converter::{parse_number, NumberConverter};
pub use registry::ConverterRegistry;
pub use text_converter::TextConverter;
pub use value_converter::{Conversion, ValueConverter};
