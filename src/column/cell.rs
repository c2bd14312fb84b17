// ==========================================
// 表格数据导入 - 单元格列值
// ==========================================
// 职责: 某一行某一列的原始文本 + 所属列元数据
// 示例: customer.name = "x-root"
// ==========================================

use crate::column::converter::{Conversion, ConverterRegistry};
use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::MetaColumn;
use crate::column::typed_value::TypedValue;

#[derive(Debug, Clone, Default)]
pub struct Column {
    meta: Option<MetaColumn>,
    value: Option<String>,
    validation: Option<Diagnostics>, // 最近一次转换的诊断，meta/value 变化即失效
}

impl Column {
    pub fn new(meta: Option<MetaColumn>) -> Self {
        Self {
            meta,
            value: None,
            validation: None,
        }
    }

    pub fn meta(&self) -> Option<&MetaColumn> {
        self.meta.as_ref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_meta(&mut self, meta: Option<MetaColumn>) -> &mut Self {
        self.meta = meta;
        self.validation = None;
        self
    }

    pub fn set_value(&mut self, value: Option<String>) -> &mut Self {
        self.value = value;
        self.validation = None;
        self
    }

    /// 按当前列元数据转换，每次调用都会刷新缓存的诊断
    ///
    /// 转换是幂等的，但有成本，不要在循环里反复推测性调用
    pub fn object(&mut self, registry: &ConverterRegistry) -> Option<TypedValue> {
        let Conversion { value, diagnostics } = match &self.meta {
            Some(meta) => registry.convert(meta, self.value.as_deref()),
            // 不知道转成什么，就当作空值
            None => Conversion::default(),
        };
        self.validation = Some(diagnostics);
        value
    }

    /// 当前值的诊断（尚未转换时先转换一次）
    pub fn validate(&mut self, registry: &ConverterRegistry) -> &Diagnostics {
        if self.validation.is_none() {
            self.object(registry);
        }
        self.validation.get_or_insert_with(Diagnostics::new)
    }

    /// 无错误且无警告
    pub fn is_valid(&mut self, registry: &ConverterRegistry) -> bool {
        let validation = self.validate(registry);
        !(validation.has_errors() || validation.has_warnings())
    }

    /// 空白文本或没有列元数据
    pub fn is_empty(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.trim().is_empty()) || self.meta.is_none()
    }
}
