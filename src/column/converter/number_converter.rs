// ==========================================
// 表格数据导入 - 数值转换器
// ==========================================
// 规则:
// - 解析失败 → 错误，无值
// - 整数位数 > precision → 错误，丢弃（不截断）
// - 文本长度 > size → 警告"将按 fraction 位舍入"，值原样返回
// ==========================================

use crate::column::converter::value_converter::{message, ValueConverter};
use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::MetaColumn;
use crate::column::typed_value::{Number, TypedValue};

const OVERFLOW: &str = "Value \"${value}\" is too large for ${table}.${column} and will be ignored.";
const ROUNDED: &str = "Mantissa of \"${value}\" is too large for ${table}.${column}. \
Will round value to ${fraction} digits.";
const OUTNUMBERED: &str = "\"${value}\" is not a valid number for ${table}.${column} and will be ignored.";

pub struct NumberConverter;

impl ValueConverter for NumberConverter {
    fn applies_to(&self, meta: &MetaColumn) -> bool {
        meta.is_numeric()
    }

    fn object_of(
        &self,
        meta: &MetaColumn,
        value: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<TypedValue> {
        let number = match parse_number(value) {
            Some(number) => number,
            None => {
                diagnostics.error(message(OUTNUMBERED, meta, value).render());
                return None;
            }
        };

        let digits = Digits::of(value).unwrap_or_else(|| Digits::of_number(&number));
        check_overflow(meta, value, &digits, diagnostics)?;
        check_mantissa(meta, value, &digits, diagnostics);
        Some(TypedValue::Number(number))
    }
}

fn check_overflow(
    meta: &MetaColumn,
    value: &str,
    digits: &Digits,
    diagnostics: &mut Diagnostics,
) -> Option<()> {
    match meta.precision() {
        Some(precision) if digits.integral > precision as usize => {
            diagnostics.error(message(OVERFLOW, meta, value).render());
            None
        }
        _ => Some(()),
    }
}

fn check_mantissa(meta: &MetaColumn, value: &str, digits: &Digits, diagnostics: &mut Diagnostics) {
    // 整数部分已校验，这里直接比较整体长度
    if let Some(size) = meta.size() {
        if digits.text_len() > size as usize {
            diagnostics.warning(message(ROUNDED, meta, value).render());
        }
    }
}

// ==========================================
// Digits - 按输入文本计算位数（不经过 f64，超出 i64 的整数也精确）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Digits {
    negative: bool,
    integral: usize, // 至少 1（"0.25" → 1）
    fraction: usize,
}

impl Digits {
    /// 十进制文本（可带符号、小数点、指数）；十六进制返回 None
    fn of(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, unsigned) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        if unsigned.starts_with("0x") || unsigned.starts_with("0X") {
            return None;
        }

        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(at) => (&unsigned[..at], unsigned[at + 1..].parse::<i64>().ok()?),
            None => (unsigned, 0),
        };
        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all = whole.len() + fraction.len();
        if all == 0 || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        // 小数点在全部数字中的位置（计入指数）
        let point = whole.len() as i64 + exponent;
        let leading_zeros = whole
            .chars()
            .chain(fraction.chars())
            .take_while(|&c| c == '0')
            .count() as i64;

        Some(Self {
            negative,
            integral: (point - leading_zeros).max(1) as usize,
            fraction: (all as i64 - point).max(0) as usize,
        })
    }

    fn of_number(number: &Number) -> Self {
        let text = number.to_string();
        Self::of(&text).unwrap_or(Self {
            negative: false,
            integral: text.len(),
            fraction: 0,
        })
    }

    /// 规范十进制文本长度（符号 + 整数位 + 小数点 + 小数位）
    fn text_len(&self) -> usize {
        usize::from(self.negative)
            + self.integral
            + if self.fraction > 0 { self.fraction + 1 } else { 0 }
    }
}

/// 与区域设置无关的数值解析
///
/// # 支持
/// - 可选符号 + 十进制整数 → Integer（超出 i64 时退化为 Decimal，位数校验见 Digits）
/// - 0x 前缀十六进制整数
/// - 小数与科学计数法 → Decimal
///
/// # 拒绝
/// - 千分位、逗号小数点、NaN/Infinity、空串
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        let value = i64::from_str_radix(hex, 16).ok()?;
        return Some(Number::Integer(if negative { -value } else { value }));
    }

    if unsigned.is_empty()
        || !unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }

    if unsigned.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(value) = text.parse::<i64>() {
            return Some(Number::Integer(value));
        }
    }

    let value = text.parse::<f64>().ok()?;
    if value.is_finite() {
        Some(Number::Decimal(value))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::meta_type::NativeType;

    fn salary() -> MetaColumn {
        MetaColumn::new("tag", "salary", NativeType::Decimal)
            .with_precision(Some(6))
            .with_fraction(Some(2))
            .with_size(Some(8))
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(Number::Integer(42)));
        assert_eq!(parse_number("-42"), Some(Number::Integer(-42)));
        assert_eq!(parse_number("+7"), Some(Number::Integer(7)));
        assert_eq!(parse_number("0x1F"), Some(Number::Integer(31)));
        assert_eq!(parse_number("2345.20"), Some(Number::Decimal(2345.2)));
        assert_eq!(parse_number("1e3"), Some(Number::Decimal(1000.0)));
        assert!(matches!(
            parse_number("99999999999999999999"),
            Some(Number::Decimal(_))
        ));
        assert_eq!(parse_number("1,5"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn test_within_precision_no_diagnostics() {
        let conversion = NumberConverter.value_of(&salary(), Some("2345.2"));
        assert_eq!(conversion.value, Some(TypedValue::Number(Number::Decimal(2345.2))));
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_mantissa_warning_keeps_value() {
        let conversion = NumberConverter.value_of(&salary(), Some("12345.678"));
        assert_eq!(
            conversion.value,
            Some(TypedValue::Number(Number::Decimal(12345.678)))
        );
        assert!(!conversion.diagnostics.has_errors());
        assert_eq!(conversion.diagnostics.warning_count(), 1);
        assert!(conversion.diagnostics.texts()[0].contains("Will round value to 2 digits"));
    }

    #[test]
    fn test_overflow_is_error_and_discards() {
        let conversion = NumberConverter.value_of(&salary(), Some("1234567"));
        assert_eq!(conversion.value, None);
        assert_eq!(conversion.diagnostics.error_count(), 1);
        assert_eq!(
            conversion.diagnostics.texts()[0],
            "Value \"1234567\" is too large for tag.salary and will be ignored."
        );
    }

    #[test]
    fn test_invalid_number_is_error() {
        let conversion = NumberConverter.value_of(&salary(), Some("lots"));
        assert_eq!(conversion.value, None);
        assert_eq!(
            conversion.diagnostics.texts(),
            vec!["\"lots\" is not a valid number for tag.salary and will be ignored."]
        );
    }

    #[test]
    fn test_without_precision_no_overflow_check() {
        let meta = MetaColumn::new("tag", "score", NativeType::Real);
        let conversion = NumberConverter.value_of(&meta, Some("123456789012.5"));
        assert!(conversion.value.is_some());
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn test_integral_digits_within_precision_always_ok() {
        let meta = salary();
        for input in ["0", "1", "-999999", "999999", "123456.1", "0.25"] {
            let conversion = NumberConverter.value_of(&meta, Some(input));
            assert!(!conversion.diagnostics.has_errors(), "input {}", input);
            assert!(conversion.value.is_some(), "input {}", input);
        }
    }

    #[test]
    fn test_digits_from_text() {
        let digits = Digits::of("-00123.4500").unwrap();
        assert_eq!((digits.negative, digits.integral, digits.fraction), (true, 3, 4));
        assert_eq!(digits.text_len(), 9);
        assert_eq!(Digits::of("0.25").unwrap().integral, 1);
        assert_eq!(Digits::of("1e3").unwrap().integral, 4);
        assert_eq!(Digits::of("1.5e-3").unwrap().fraction, 4);
        assert_eq!(Digits::of("99999999999999999999").unwrap().integral, 20);
        assert_eq!(Digits::of("0x1F"), None);
    }

    #[test]
    fn test_wider_than_i64_within_precision() {
        let meta = MetaColumn::new("t", "big", NativeType::Decimal)
            .with_precision(Some(20))
            .with_fraction(Some(0))
            .with_size(Some(22));
        let conversion = NumberConverter.value_of(&meta, Some("99999999999999999999"));
        assert!(!conversion.diagnostics.has_errors());
        assert!(conversion.diagnostics.is_empty());
        assert!(conversion.value.is_some());
    }

    #[test]
    fn test_wider_than_i64_overflow_names_input() {
        let meta = MetaColumn::new("t", "big", NativeType::Decimal)
            .with_precision(Some(19))
            .with_fraction(Some(0));
        let conversion = NumberConverter.value_of(&meta, Some("99999999999999999999"));
        assert_eq!(conversion.value, None);
        assert_eq!(
            conversion.diagnostics.texts(),
            vec!["Value \"99999999999999999999\" is too large for t.big and will be ignored."]
        );
    }
}
