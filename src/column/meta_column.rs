// ==========================================
// 表格数据导入 - 列元数据
// ==========================================
// 职责: 描述目标表中单个列（类型/长度/精度/可空/主键/命名）
// 生命周期: 每次元数据查询构造一次，加载期间不可变
// ==========================================

use crate::column::meta_type::{MetaType, NativeType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

// ==========================================
// MetaColumn - 单列元数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaColumn {
    name: String,
    label: Option<String>,
    schema: Option<String>,
    table: String,
    native_type: NativeType,
    native_type_name: Option<String>, // 数据库声明的原始类型名（仅用于展示）
    size: Option<u32>,                // 文本最大长度 / 数值显示长度
    precision: Option<u32>,           // 整数部分位数
    fraction: Option<u32>,            // 小数部分位数
    nullable: bool,
    primary: bool,
}

impl MetaColumn {
    /// 创建列元数据（默认可空、非主键）
    pub fn new(table: impl Into<String>, name: impl Into<String>, native_type: NativeType) -> Self {
        Self {
            name: name.into(),
            label: None,
            schema: None,
            table: table.into(),
            native_type,
            native_type_name: None,
            size: None,
            precision: None,
            fraction: None,
            nullable: true,
            primary: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.schema = if schema.trim().is_empty() { None } else { Some(schema) };
        self
    }

    pub fn with_native_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.native_type_name = Some(type_name.into());
        self
    }

    pub fn with_size(mut self, size: Option<u32>) -> Self {
        self.size = size;
        self
    }

    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_fraction(mut self, fraction: Option<u32>) -> Self {
        self.fraction = fraction;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    // ===== 访问器 =====

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 列别名，未设置时回退为列名
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn native_type(&self) -> NativeType {
        self.native_type
    }

    pub fn native_type_name(&self) -> &str {
        self.native_type_name
            .as_deref()
            .unwrap_or_else(|| self.native_type.name())
    }

    pub fn size(&self) -> Option<u32> {
        self.size
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    pub fn fraction(&self) -> Option<u32> {
        self.fraction
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_not_nullable(&self) -> bool {
        !self.nullable
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    // ===== 类型判定 =====

    /// 可转换的目标类型，None 表示无可用转换规则
    pub fn meta_type(&self) -> Option<MetaType> {
        MetaType::classify(self.native_type)
    }

    pub fn is_date(&self) -> bool {
        self.native_type.is_date()
    }

    pub fn is_timestamp(&self) -> bool {
        self.native_type.is_timestamp()
    }

    pub fn is_numeric(&self) -> bool {
        self.native_type.is_numeric()
    }

    /// 列名大小写不敏感匹配
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    /// `table.column`，用于诊断信息
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// 在列元数据列表中按列名查找（大小写不敏感）
pub fn find_by_column_name<'a>(name: &str, columns: &'a [MetaColumn]) -> Option<&'a MetaColumn> {
    if name.trim().is_empty() {
        return None;
    }
    columns.iter().find(|column| column.matches_name(name))
}

// ==========================================
// 规范字符串表示: [schema.]table.name[TYPE(size|precision,fraction)]flags
// ==========================================
impl fmt::Display for MetaColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = self.schema.as_deref().filter(|s| !s.trim().is_empty()) {
            write!(f, "{}.", schema)?;
        }
        if !self.table.trim().is_empty() {
            write!(f, "{}.", self.table)?;
        }

        let name = if self.name.is_empty() { "<column>" } else { &self.name };
        write!(f, "{}[{}", name, self.native_type)?;

        if self.is_numeric() {
            if let Some(precision) = self.precision {
                write!(f, "({}", precision)?;
                if let Some(fraction) = self.fraction.filter(|&v| v > 0) {
                    write!(f, ",{}", fraction)?;
                }
                f.write_str(")")?;
            }
        } else if !self.is_date() {
            if let Some(size) = self.size.filter(|&v| v > 0) {
                write!(f, "({})", size)?;
            }
        }
        f.write_str("]")?;

        // 主键 "!"，非空 "*"
        if self.primary {
            f.write_str("!")
        } else if !self.nullable {
            f.write_str("*")
        } else {
            Ok(())
        }
    }
}

impl PartialEq for MetaColumn {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for MetaColumn {}

impl Hash for MetaColumn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.to_lowercase().hash(state);
        self.name.to_lowercase().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salary() -> MetaColumn {
        MetaColumn::new("tag", "salary", NativeType::Decimal)
            .with_precision(Some(6))
            .with_fraction(Some(2))
            .with_size(Some(8))
    }

    #[test]
    fn test_display_numeric() {
        assert_eq!(salary().to_string(), "tag.salary[DECIMAL(6,2)]");
    }

    #[test]
    fn test_display_text_and_flags() {
        let name = MetaColumn::new("tag", "name", NativeType::Text)
            .with_size(Some(10))
            .nullable(false)
            .primary(true);
        assert_eq!(name.to_string(), "tag.name[TEXT(10)]!");

        let altered = MetaColumn::new("tag", "altered", NativeType::Timestamp)
            .with_size(Some(26))
            .nullable(false)
            .with_schema("main");
        assert_eq!(altered.to_string(), "main.tag.altered[TIMESTAMP]*");
    }

    #[test]
    fn test_equality_by_rendering() {
        assert_eq!(salary(), salary());
        assert_ne!(salary(), salary().nullable(false));
        // 标签不参与规范表示
        assert_eq!(salary(), salary().with_label("pay"));
    }

    #[test]
    fn test_label_falls_back_to_name() {
        assert_eq!(salary().label(), "salary");
        assert_eq!(salary().with_label("pay").label(), "pay");
    }

    #[test]
    fn test_find_by_column_name() {
        let columns = vec![salary(), MetaColumn::new("tag", "name", NativeType::Text)];
        assert_eq!(find_by_column_name(" NAME ", &columns).map(|c| c.name()), Some("name"));
        assert!(find_by_column_name("", &columns).is_none());
        assert!(find_by_column_name("age", &columns).is_none());
    }
}
