// ==========================================
// 表格数据导入 - 日期/时间格式解析
// ==========================================
// 说明: 格式列表可配置，按顺序尝试，先命中先返回
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// 默认时间戳格式
pub const DEFAULT_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%d%H%M%S",
    "%d.%m.%Y %H:%M:%S",
];

/// 默认日期格式
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%d.%m.%Y"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    timestamp: Vec<String>,
    day: Vec<String>,
}

impl DateFormats {
    pub fn new(timestamp: Vec<String>, day: Vec<String>) -> Self {
        Self { timestamp, day }
    }

    /// 时间戳精度解析（另外接受带时区的 RFC 3339，换算为 UTC）
    pub fn parse_time(&self, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(parsed.naive_utc());
        }
        self.timestamp
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    }

    /// 日精度解析
    pub fn parse_day(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        self.day
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    }
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            timestamp: DEFAULT_TIMESTAMP_FORMATS.iter().map(|f| f.to_string()).collect(),
            day: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}
