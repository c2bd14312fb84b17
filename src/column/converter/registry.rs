// ==========================================
// 表格数据导入 - 转换器注册表
// ==========================================
// 职责: MetaType → 转换策略 的显式映射，构造一次后传入转换入口
// 说明: 非全局状态，测试可替换任意策略
// ==========================================

use crate::column::converter::date_converter::{DateConverter, TimestampConverter};
use crate::column::converter::date_formats::DateFormats;
use crate::column::converter::null_converter::NullConverter;
use crate::column::converter::number_converter::NumberConverter;
use crate::column::converter::text_converter::TextConverter;
use crate::column::converter::value_converter::{Conversion, ValueConverter};
use crate::column::meta_column::MetaColumn;
use crate::column::meta_type::MetaType;
use std::collections::HashMap;

pub struct ConverterRegistry {
    converters: HashMap<MetaType, Box<dyn ValueConverter>>,
    fallback: Box<dyn ValueConverter>,
}

impl ConverterRegistry {
    /// 使用给定日期格式构造标准注册表
    pub fn new(formats: DateFormats) -> Self {
        let mut converters: HashMap<MetaType, Box<dyn ValueConverter>> = HashMap::new();
        converters.insert(MetaType::Date, Box::new(DateConverter::new(formats.clone())));
        converters.insert(MetaType::Timestamp, Box::new(TimestampConverter::new(formats)));
        converters.insert(MetaType::Number, Box::new(NumberConverter));
        converters.insert(MetaType::String, Box::new(TextConverter));

        Self {
            converters,
            fallback: Box::new(NullConverter),
        }
    }

    /// 空注册表（所有值走兜底转换器）
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
            fallback: Box::new(NullConverter),
        }
    }

    /// 注册/替换某个类型的转换策略
    pub fn register(mut self, meta_type: MetaType, converter: Box<dyn ValueConverter>) -> Self {
        self.converters.insert(meta_type, converter);
        self
    }

    /// 转换入口
    ///
    /// # 参数
    /// - meta: 目标列元数据
    /// - raw: 原始文本（None 视为缺失）
    ///
    /// # 返回
    /// - Conversion: 值（可能为 None）+ 本次转换的诊断
    pub fn convert(&self, meta: &MetaColumn, raw: Option<&str>) -> Conversion {
        self.converter_for(meta).value_of(meta, raw)
    }

    fn converter_for(&self, meta: &MetaColumn) -> &dyn ValueConverter {
        meta.meta_type()
            .and_then(|meta_type| self.converters.get(&meta_type))
            .map(|converter| converter.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new(DateFormats::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::diagnostics::Diagnostics;
    use crate::column::meta_type::NativeType;
    use crate::column::typed_value::{Number, TypedValue};

    struct Upper;

    impl ValueConverter for Upper {
        fn applies_to(&self, _meta: &MetaColumn) -> bool {
            true
        }

        fn object_of(
            &self,
            _meta: &MetaColumn,
            value: &str,
            _diagnostics: &mut Diagnostics,
        ) -> Option<TypedValue> {
            Some(TypedValue::Text(value.to_uppercase()))
        }
    }

    #[test]
    fn test_dispatch_by_meta_type() {
        let registry = ConverterRegistry::default();
        let age = MetaColumn::new("tag", "age", NativeType::Integer);
        let conversion = registry.convert(&age, Some(" 11 "));
        assert_eq!(conversion.value, Some(TypedValue::Number(Number::Integer(11))));
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_type_uses_fallback() {
        let registry = ConverterRegistry::default();
        let shape = MetaColumn::new("tag", "shape", NativeType::Any);
        let conversion = registry.convert(&shape, Some("x"));
        assert_eq!(conversion.value, None);
        assert_eq!(conversion.diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_blank_never_coerced() {
        let registry = ConverterRegistry::default();
        let required = MetaColumn::new("tag", "age", NativeType::Integer).nullable(false);
        let optional = MetaColumn::new("tag", "age", NativeType::Integer);

        let conversion = registry.convert(&required, Some(""));
        assert_eq!(conversion.value, None);
        assert_eq!(conversion.diagnostics.error_count(), 1);
        assert_eq!(conversion.diagnostics.len(), 1);

        let conversion = registry.convert(&optional, None);
        assert_eq!(conversion.value, None);
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_register_test_double() {
        let registry = ConverterRegistry::empty().register(MetaType::String, Box::new(Upper));
        let name = MetaColumn::new("tag", "name", NativeType::Text);
        let conversion = registry.convert(&name, Some("bob"));
        assert_eq!(conversion.value, Some(TypedValue::Text("BOB".to_string())));
    }
}
