// ==========================================
// 表格数据导入 - SQL 执行器
// ==========================================
// 职责: 按列名/值执行单行 INSERT / UPDATE
// 红线: 不做业务判断，不自动提交（事务边界由调用方控制）
// ==========================================

use crate::column::typed_value::TypedValue;
use crate::error::{LoadError, LoadResult};
use rusqlite::{params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

// ==========================================
// StatementExecutor Trait
// ==========================================
pub trait StatementExecutor: Send + Sync {
    /// 插入一行
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数
    fn insert(&self, table: &str, columns: &[String], values: &[Option<TypedValue>]) -> LoadResult<usize>;

    /// 按主键更新一行
    ///
    /// # 参数
    /// - key_columns / key_values: WHERE 条件（全部等值）
    /// - columns / values: SET 子句
    fn update(
        &self,
        table: &str,
        key_columns: &[String],
        key_values: &[Option<TypedValue>],
        columns: &[String],
        values: &[Option<TypedValue>],
    ) -> LoadResult<usize>;
}

/// SQLite 标识符加引号（内部双引号转义）
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn insert_sql(table: &str, columns: &[String]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(table: &str, key_columns: &[String], columns: &[String]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", quote_identifier(c), i + 1))
        .collect();
    let conditions: Vec<String> = key_columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", quote_identifier(c), columns.len() + i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {}",
        quote_identifier(table),
        assignments.join(", "),
        conditions.join(" AND ")
    )
}

// ==========================================
// SqliteStatementExecutor
// ==========================================
pub struct SqliteStatementExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStatementExecutor {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> LoadResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LoadError::LockError(e.to_string()))
    }

    pub fn begin(&self) -> LoadResult<()> {
        self.get_conn()?.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit(&self) -> LoadResult<()> {
        self.get_conn()?.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> LoadResult<()> {
        self.get_conn()?.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// 在一个事务内执行 work
    ///
    /// # 返回
    /// - Ok: work 成功且已提交
    /// - Err: work 的错误（已回滚；回滚失败只记录日志，不覆盖原错误）
    pub fn in_transaction<T>(&self, work: impl FnOnce() -> LoadResult<T>) -> LoadResult<T> {
        self.begin()?;
        match work() {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.rollback() {
                    error!(error = %rollback, cause = %e, "回滚失败");
                }
                Err(e)
            }
        }
    }
}

impl StatementExecutor for SqliteStatementExecutor {
    fn insert(&self, table: &str, columns: &[String], values: &[Option<TypedValue>]) -> LoadResult<usize> {
        if columns.len() != values.len() {
            return Err(LoadError::InternalError(format!(
                "insert into {}: {} columns but {} values",
                table,
                columns.len(),
                values.len()
            )));
        }
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare_cached(&insert_sql(table, columns))?;
        Ok(stmt.execute(params_from_iter(values.iter()))?)
    }

    fn update(
        &self,
        table: &str,
        key_columns: &[String],
        key_values: &[Option<TypedValue>],
        columns: &[String],
        values: &[Option<TypedValue>],
    ) -> LoadResult<usize> {
        if columns.is_empty() {
            return Ok(0);
        }
        if key_columns.is_empty() || key_columns.len() != key_values.len() || columns.len() != values.len() {
            return Err(LoadError::InternalError(format!(
                "update {}: mismatched key or value count",
                table
            )));
        }
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare_cached(&update_sql(table, key_columns, columns))?;
        Ok(stmt.execute(params_from_iter(values.iter().chain(key_values.iter())))?)
    }
}
