// ==========================================
// 表格数据导入 - 值转换器 Trait
// ==========================================
// 职责: 定义单个类型的转换策略接口
// 实现者: DateConverter, TimestampConverter, NumberConverter, TextConverter, NullConverter
// ==========================================

use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::MetaColumn;
use crate::column::typed_value::TypedValue;

const REQUIRED: &str = "Value for ${table}.${column} is required.";

// ==========================================
// Conversion - 单次转换结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub value: Option<TypedValue>,
    pub diagnostics: Diagnostics,
}

// ==========================================
// ValueConverter Trait
// ==========================================
pub trait ValueConverter: Send + Sync {
    /// 判断本转换器是否适用于该列
    fn applies_to(&self, meta: &MetaColumn) -> bool;

    /// 转换非空、已 TRIM 的值
    ///
    /// # 参数
    /// - meta: 列元数据（applies_to 已判定为 true）
    /// - value: 非空、已 TRIM 的文本
    /// - diagnostics: 追加错误/警告
    ///
    /// # 返回
    /// - Some(TypedValue): 转换成功（可能已被修正）
    /// - None: 无法转换
    fn object_of(
        &self,
        meta: &MetaColumn,
        value: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypedValue>;

    /// 转换原始文本（处理空值与必填校验）
    ///
    /// # 规则
    /// - 空白/缺失: 非空列报错误，结果恒为 None（不做默认值填充）
    /// - 不适用的列: None，无诊断
    /// - 其他: TRIM 后交给 object_of
    fn value_of(&self, meta: &MetaColumn, raw: Option<&str>) -> Conversion {
        let mut diagnostics = Diagnostics::new();

        let value = match raw.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                if meta.is_not_nullable() {
                    diagnostics.error(message(REQUIRED, meta, "").render());
                }
                return Conversion {
                    value: None,
                    diagnostics,
                };
            }
        };

        if !self.applies_to(meta) {
            return Conversion {
                value: None,
                diagnostics,
            };
        }

        let value = self.object_of(meta, value, &mut diagnostics);
        Conversion { value, diagnostics }
    }
}

// ==========================================
// MessageTemplate - ${name} 占位符替换
// ==========================================
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    pub fn new(template: &str) -> Self {
        Self {
            text: template.to_string(),
        }
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.text = self.text.replace(&format!("${{{}}}", name), &value.to_string());
        self
    }

    pub fn render(self) -> String {
        self.text
    }
}

fn optional(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}

/// 预填列元数据中的标准占位符（table/column/value/size/precision/fraction）
pub fn message(template: &str, meta: &MetaColumn, value: impl ToString) -> MessageTemplate {
    MessageTemplate::new(template)
        .with("table", meta.table())
        .with("column", meta.name())
        .with("value", value)
        .with("size", optional(meta.size()))
        .with("precision", optional(meta.precision()))
        .with("fraction", optional(meta.fraction()))
}
