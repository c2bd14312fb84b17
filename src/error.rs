// ==========================================
// 表格数据导入 - 错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 仅承载"硬失败"（文件/表/数据库/配置）
//       业务校验结果走 Diagnostics，不走 Err
// ==========================================

use thiserror::Error;

/// 导入错误类型
#[derive(Error, Debug)]
pub enum LoadError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表结构错误 =====
    #[error("No such table \"{table}\": {message}")]
    TableNotFound { table: String, message: String },

    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    #[error("约束违反: {0}")]
    ConstraintViolation(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (path: {path}): {message}")]
    ConfigReadError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl LoadError {
    /// 构造表不存在错误
    pub fn table_not_found(table: &str, message: impl Into<String>) -> Self {
        let table = if table.trim().is_empty() { "?" } else { table };
        LoadError::TableNotFound {
            table: table.to_string(),
            message: message.into(),
        }
    }

    /// 单行数据违反数据库约束（可按行跳过，不中断整批）
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            LoadError::UniqueConstraintViolation(_)
                | LoadError::ForeignKeyViolation(_)
                | LoadError::ConstraintViolation(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for LoadError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    LoadError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    LoadError::ForeignKeyViolation(msg)
                } else if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                    LoadError::ConstraintViolation(msg)
                } else {
                    LoadError::DatabaseQueryError(msg)
                }
            }
            _ => LoadError::DatabaseQueryError(err.to_string()),
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        LoadError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for LoadError {
    fn from(err: calamine::Error) -> Self {
        LoadError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::ConfigValueError {
            key: "json".to_string(),
            value: format!("line {}, column {}", err.line(), err.column()),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type LoadResult<T> = Result<T, LoadError>;
