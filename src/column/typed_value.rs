// ==========================================
// 表格数据导入 - 类型化值
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 数值（整数保持整数，其余按浮点）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(v) => write!(f, "{}", v),
            Number::Decimal(v) => write!(f, "{}", v),
        }
    }
}

/// 转换后的列值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    Text(String),
    Number(Number),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Text(v) => f.write_str(v),
            TypedValue::Number(v) => write!(f, "{}", v),
            TypedValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            TypedValue::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl ToSql for TypedValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            TypedValue::Text(v) => v.to_sql(),
            TypedValue::Number(Number::Integer(v)) => v.to_sql(),
            TypedValue::Number(Number::Decimal(v)) => v.to_sql(),
            TypedValue::Date(v) => v.to_sql(),
            TypedValue::Timestamp(v) => v.to_sql(),
        }
    }
}
