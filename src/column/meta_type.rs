// ==========================================
// 表格数据导入 - 列类型分类
// ==========================================
// 职责: 原生类型标签 (NativeType) → 转换类型 (MetaType)
// 红线: 纯函数，不缓存分类结果
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// MetaType - 可转换的目标类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaType {
    Date,      // 日期（无时间部分）
    Timestamp, // 日期 + 时间
    Number,    // 数值
    String,    // 文本
}

impl MetaType {
    /// 按原生类型分类（先命中先返回）
    ///
    /// 1. 时间戳 → Timestamp
    /// 2. 日期 → Date
    /// 3. 数值 → Number
    /// 4. 已知类型 → String
    /// 5. 未知类型 → None（无可用转换器）
    pub fn classify(native: NativeType) -> Option<MetaType> {
        if native.is_timestamp() {
            Some(MetaType::Timestamp)
        } else if native.is_date() {
            Some(MetaType::Date)
        } else if native.is_numeric() {
            Some(MetaType::Number)
        } else if native.is_known() {
            Some(MetaType::String)
        } else {
            None
        }
    }
}

// ==========================================
// NativeType - 由元数据提供方给出的原生类型标签
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeType {
    Integer,
    Decimal,
    Real,
    Text,
    Boolean,
    Date,
    Timestamp,
    Binary,
    Any, // 未知
}

impl NativeType {
    /// 是否为数值类型
    pub fn is_numeric(self) -> bool {
        matches!(self, NativeType::Integer | NativeType::Decimal | NativeType::Real)
    }

    /// 是否包含日期信息（日期或时间戳）
    pub fn is_date(self) -> bool {
        matches!(self, NativeType::Date | NativeType::Timestamp)
    }

    /// 是否为时间戳
    pub fn is_timestamp(self) -> bool {
        matches!(self, NativeType::Timestamp)
    }

    pub fn is_known(self) -> bool {
        self != NativeType::Any
    }

    /// 从 SQL 声明类型推断原生类型
    ///
    /// # 规则
    /// - 先识别日期/时间戳（SQLite 亲和规则会把它们归为 NUMERIC，这里必须优先）
    /// - 再按 SQLite 类型亲和规则匹配 INT / CHAR|CLOB|TEXT / REAL|FLOA|DOUB
    /// - 空声明 → Any
    pub fn from_declared(declared: &str) -> NativeType {
        let upper = declared.trim().to_uppercase();
        let base = upper.split('(').next().unwrap_or("").trim().to_string();

        if base.is_empty() {
            return NativeType::Any;
        }
        if base.contains("TIMESTAMP") || base.contains("DATETIME") {
            return NativeType::Timestamp;
        }
        if base.contains("DATE") {
            return NativeType::Date;
        }
        if base.contains("BOOL") {
            return NativeType::Boolean;
        }
        if base.contains("INT") {
            return NativeType::Integer;
        }
        if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
            return NativeType::Text;
        }
        if base.contains("BLOB") || base.contains("BINARY") {
            return NativeType::Binary;
        }
        if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
            return NativeType::Real;
        }
        if base.contains("DEC") || base.contains("NUMERIC") || base.contains("NUMBER") {
            return NativeType::Decimal;
        }
        NativeType::Any
    }

    /// 规范化类型名（用于 MetaColumn 的字符串表示）
    pub fn name(self) -> &'static str {
        match self {
            NativeType::Integer => "INTEGER",
            NativeType::Decimal => "DECIMAL",
            NativeType::Real => "REAL",
            NativeType::Text => "TEXT",
            NativeType::Boolean => "BOOLEAN",
            NativeType::Date => "DATE",
            NativeType::Timestamp => "TIMESTAMP",
            NativeType::Binary => "BINARY",
            NativeType::Any => "ANY",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
