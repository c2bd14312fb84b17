// ==========================================
// 表格数据导入 - 文本转换器
// ==========================================

use crate::column::converter::value_converter::{message, ValueConverter};
use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::MetaColumn;
use crate::column::meta_type::MetaType;
use crate::column::typed_value::TypedValue;

const TRUNCATE: &str = "Value \"${value}\" is too large for ${table}.${column} \
and will be truncated from ${length} to ${size} characters.";

/// 文本列: 超长截断 + 警告
pub struct TextConverter;

impl ValueConverter for TextConverter {
    fn applies_to(&self, meta: &MetaColumn) -> bool {
        meta.meta_type() == Some(MetaType::String)
    }

    fn object_of(
        &self,
        meta: &MetaColumn,
        value: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypedValue> {
        let length = value.chars().count();
        match meta.size().map(|size| size as usize) {
            Some(size) if length > size => {
                diagnostics.warning(
                    message(TRUNCATE, meta, value)
                        .with("length", length)
                        .render(),
                );
                Some(TypedValue::Text(value.chars().take(size).collect()))
            }
            _ => Some(TypedValue::Text(value.to_string())),
        }
    }
}
