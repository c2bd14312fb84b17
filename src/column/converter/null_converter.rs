// ==========================================
// 表格数据导入 - 空转换器（无可用规则时兜底）
// ==========================================

use crate::column::converter::value_converter::{message, ValueConverter};
use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::MetaColumn;
use crate::column::typed_value::TypedValue;

const INVALID: &str =
    "Cannot import \"${value}\" into ${table}.${column}, no conversion rule is known.";

/// 永远不产出值，只给警告
pub struct NullConverter;

impl ValueConverter for NullConverter {
    fn applies_to(&self, _meta: &MetaColumn) -> bool {
        true
    }

    fn object_of(
        &self,
        meta: &MetaColumn,
        value: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypedValue> {
        diagnostics.warning(message(INVALID, meta, value).render());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::meta_type::NativeType;

    #[test]
    fn test_always_warns() {
        let meta = MetaColumn::new("tag", "shape", NativeType::Any);
        let conversion = NullConverter.value_of(&meta, Some("POINT(1 2)"));
        assert_eq!(conversion.value, None);
        assert_eq!(
            conversion.diagnostics.texts(),
            vec!["Cannot import \"POINT(1 2)\" into tag.shape, no conversion rule is known."]
        );
    }

    #[test]
    fn test_blank_nullable_is_silent() {
        let meta = MetaColumn::new("tag", "shape", NativeType::Any);
        let conversion = NullConverter.value_of(&meta, None);
        assert_eq!(conversion.value, None);
        assert!(conversion.diagnostics.is_empty());
    }
}
