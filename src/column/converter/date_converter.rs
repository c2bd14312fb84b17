// ==========================================
// 表格数据导入 - 日期 / 时间戳转换器
// ==========================================
// 说明: 日期无法解析只给警告，值按缺失处理
// ==========================================

use crate::column::converter::date_formats::DateFormats;
use crate::column::converter::value_converter::{message, ValueConverter};
use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::MetaColumn;
use crate::column::typed_value::TypedValue;

const OUTDATED: &str = "\"${value}\" is not a valid date for ${table}.${column} and will be ignored.";
const OUTTIMED: &str =
    "\"${value}\" is not a valid time stamp for ${table}.${column} and will be ignored.";

// ==========================================
// DateConverter - 先按时间戳精度，再按日精度
// ==========================================
pub struct DateConverter {
    formats: DateFormats,
}

impl DateConverter {
    pub fn new(formats: DateFormats) -> Self {
        Self { formats }
    }
}

impl ValueConverter for DateConverter {
    fn applies_to(&self, meta: &MetaColumn) -> bool {
        meta.is_date()
    }

    fn object_of(
        &self,
        meta: &MetaColumn,
        value: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypedValue> {
        let date = self
            .formats
            .parse_time(value)
            .map(|time| time.date())
            .or_else(|| self.formats.parse_day(value));

        if date.is_none() {
            diagnostics.warning(message(OUTDATED, meta, value).render());
        }
        date.map(TypedValue::Date)
    }
}

// ==========================================
// TimestampConverter - 仅时间戳精度
// ==========================================
pub struct TimestampConverter {
    formats: DateFormats,
}

impl TimestampConverter {
    pub fn new(formats: DateFormats) -> Self {
        Self { formats }
    }
}

impl ValueConverter for TimestampConverter {
    fn applies_to(&self, meta: &MetaColumn) -> bool {
        meta.is_timestamp()
    }

    fn object_of(
        &self,
        meta: &MetaColumn,
        value: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypedValue> {
        let time = self.formats.parse_time(value);
        if time.is_none() {
            diagnostics.warning(message(OUTTIMED, meta, value).render());
        }
        time.map(TypedValue::Timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::meta_type::NativeType;
    use chrono::NaiveDate;

    fn born() -> MetaColumn {
        MetaColumn::new("tag", "born", NativeType::Date)
    }

    fn altered() -> MetaColumn {
        MetaColumn::new("tag", "altered", NativeType::Timestamp).nullable(false)
    }

    #[test]
    fn test_date_from_day() {
        let converter = DateConverter::new(DateFormats::default());
        let conversion = converter.value_of(&born(), Some("1996-07-02"));
        assert_eq!(
            conversion.value,
            Some(TypedValue::Date(NaiveDate::from_ymd_opt(1996, 7, 2).unwrap()))
        );
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_date_from_timestamp_text() {
        let converter = DateConverter::new(DateFormats::default());
        let conversion = converter.value_of(&born(), Some("1996-07-02 10:35:00"));
        assert_eq!(
            conversion.value,
            Some(TypedValue::Date(NaiveDate::from_ymd_opt(1996, 7, 2).unwrap()))
        );
    }

    #[test]
    fn test_invalid_date_is_warning() {
        let converter = DateConverter::new(DateFormats::default());
        let conversion = converter.value_of(&born(), Some("someday"));
        assert_eq!(conversion.value, None);
        assert_eq!(
            conversion.diagnostics.texts(),
            vec!["\"someday\" is not a valid date for tag.born and will be ignored."]
        );
        assert!(!conversion.diagnostics.has_errors());
    }

    #[test]
    fn test_date_converter_ignores_text_column() {
        let converter = DateConverter::new(DateFormats::default());
        let meta = MetaColumn::new("tag", "name", NativeType::Text);
        let conversion = converter.value_of(&meta, Some("1996-07-02"));
        assert_eq!(conversion.value, None);
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_timestamp() {
        let converter = TimestampConverter::new(DateFormats::default());
        let conversion = converter.value_of(&altered(), Some("2010-05-19 09:30:52"));
        let expected = NaiveDate::from_ymd_opt(2010, 5, 19)
            .unwrap()
            .and_hms_opt(9, 30, 52)
            .unwrap();
        assert_eq!(conversion.value, Some(TypedValue::Timestamp(expected)));
    }

    #[test]
    fn test_timestamp_rejects_day_only() {
        let converter = TimestampConverter::new(DateFormats::default());
        let conversion = converter.value_of(&altered(), Some("2010-05-19"));
        assert_eq!(conversion.value, None);
        assert_eq!(conversion.diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_timestamp_required() {
        let converter = TimestampConverter::new(DateFormats::default());
        let conversion = converter.value_of(&altered(), Some("   "));
        assert_eq!(conversion.value, None);
        assert_eq!(
            conversion.diagnostics.texts(),
            vec!["Value for tag.altered is required."]
        );
    }
}
