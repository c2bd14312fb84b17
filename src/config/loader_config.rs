// ==========================================
// 表格数据导入 - 加载配置
// ==========================================
// 来源优先级: 命令行指定文件 > 默认位置文件 > 内置默认值
// 说明: 所有字段均可省略，缺省即取默认值
// ==========================================

use crate::column::converter::date_formats::{DEFAULT_DATE_FORMATS, DEFAULT_TIMESTAMP_FORMATS};
use crate::column::converter::{ConverterRegistry, DateFormats};
use crate::error::{LoadError, LoadResult};
use crate::sheet::BookReader;
use crate::sort::{DependencySheetSorter, SheetSortingStrategy, SimpleSheetSorter};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";

/// 工作表排序策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortingKind {
    #[default]
    Dependency, // 按非空外键依赖排序
    Simple,     // 保持输入顺序
}

impl SortingKind {
    pub fn sorter(self) -> Box<dyn SheetSortingStrategy> {
        match self {
            SortingKind::Dependency => Box::new(DependencySheetSorter),
            SortingKind::Simple => Box::new(SimpleSheetSorter),
        }
    }
}

impl fmt::Display for SortingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortingKind::Dependency => f.write_str("dependency"),
            SortingKind::Simple => f.write_str("simple"),
        }
    }
}

impl FromStr for SortingKind {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dependency" => Ok(SortingKind::Dependency),
            "simple" => Ok(SortingKind::Simple),
            other => Err(LoadError::ConfigValueError {
                key: "sorting".to_string(),
                value: other.to_string(),
                message: "expected \"dependency\" or \"simple\"".to_string(),
            }),
        }
    }
}

fn default_timestamp_formats() -> Vec<String> {
    DEFAULT_TIMESTAMP_FORMATS.iter().map(|f| f.to_string()).collect()
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

// ==========================================
// LoaderConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// 日精度格式（chrono strftime）
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    /// 时间戳精度格式（chrono strftime）
    #[serde(default = "default_timestamp_formats")]
    pub timestamp_formats: Vec<String>,

    #[serde(default)]
    pub sorting: SortingKind,

    /// 是否执行第二轮（可空列）更新
    #[serde(default = "default_true")]
    pub update_pass: bool,

    /// 有转换错误的行不写库
    #[serde(default = "default_true")]
    pub skip_invalid_rows: bool,

    #[serde(default = "default_delimiter")]
    pub csv_delimiter: char,

    #[serde(default = "default_true")]
    pub skip_blank_rows: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
            timestamp_formats: default_timestamp_formats(),
            sorting: SortingKind::default(),
            update_pass: true,
            skip_invalid_rows: true,
            csv_delimiter: default_delimiter(),
            skip_blank_rows: true,
        }
    }
}

impl LoaderConfig {
    /// 从 JSON 文件读取并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LoadError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: LoaderConfig = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), "读取配置文件");
        Ok(config)
    }

    /// 默认配置文件位置
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join(CONFIG_FILE))
    }

    /// 读取配置：指定文件 > 默认位置 > 内置默认值
    pub fn load(path: Option<&Path>) -> LoadResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path().filter(|p| p.exists()) {
            Some(path) => {
                info!(path = %path.display(), "使用默认位置的配置文件");
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// 校验配置值
    pub fn validate(&self) -> LoadResult<()> {
        check_formats("date_formats", &self.date_formats)?;
        check_formats("timestamp_formats", &self.timestamp_formats)?;

        let delimiter = self.csv_delimiter;
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
            return Err(LoadError::ConfigValueError {
                key: "csv_delimiter".to_string(),
                value: delimiter.to_string(),
                message: "delimiter must be a single ASCII character other than quote or newline"
                    .to_string(),
            });
        }
        Ok(())
    }

    pub fn date_formats(&self) -> DateFormats {
        DateFormats::new(self.timestamp_formats.clone(), self.date_formats.clone())
    }

    /// 按配置的日期格式构造转换器注册表
    pub fn registry(&self) -> ConverterRegistry {
        ConverterRegistry::new(self.date_formats())
    }

    pub fn sorter(&self) -> Box<dyn SheetSortingStrategy> {
        self.sorting.sorter()
    }

    pub fn book_reader(&self) -> BookReader {
        // validate() 保证分隔符是 ASCII
        BookReader::new(self.csv_delimiter as u8, self.skip_blank_rows)
    }
}

fn check_formats(key: &str, formats: &[String]) -> LoadResult<()> {
    if formats.is_empty() {
        return Err(LoadError::ConfigValueError {
            key: key.to_string(),
            value: "[]".to_string(),
            message: "at least one format is required".to_string(),
        });
    }
    for format in formats {
        if StrftimeItems::new(format).any(|item| item == Item::Error) {
            return Err(LoadError::ConfigValueError {
                key: key.to_string(),
                value: format.clone(),
                message: "invalid chrono format".to_string(),
            });
        }
    }
    Ok(())
}
