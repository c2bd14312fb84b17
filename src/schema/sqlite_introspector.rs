// ==========================================
// 表格数据导入 - SQLite 表结构查询实现
// ==========================================
// 依据: PRAGMA table_info / PRAGMA foreign_key_list
// 职责: 将 SQLite 声明类型解析为 NativeType + 长度/精度
// ==========================================

use crate::column::meta_column::MetaColumn;
use crate::column::meta_type::NativeType;
use crate::error::{LoadError, LoadResult};
use crate::schema::introspector::SchemaIntrospector;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

/// 整数列默认精度（i64 最大位数）
const INTEGER_PRECISION: u32 = 19;

// ==========================================
// DeclaredType - 声明类型解析结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    pub native_type: NativeType,
    pub size: Option<u32>,
    pub precision: Option<u32>,
    pub fraction: Option<u32>,
}

/// 解析 SQLite 声明类型
///
/// # 示例
/// - VARCHAR(10)   → Text, size 10
/// - DECIMAL(6,2)  → Decimal, precision 6, fraction 2, size 8
/// - INTEGER       → Integer, precision 19, size 20
pub fn parse_declared_type(declared: &str) -> DeclaredType {
    let native_type = NativeType::from_declared(declared);
    let args: Vec<u32> = declared
        .find('(')
        .and_then(|start| {
            let rest = &declared[start + 1..];
            rest.find(')').map(|end| &rest[..end])
        })
        .map(|inner| {
            inner
                .split(',')
                .filter_map(|part| part.trim().parse::<u32>().ok())
                .collect()
        })
        .unwrap_or_default();

    let mut parsed = DeclaredType {
        native_type,
        size: None,
        precision: None,
        fraction: None,
    };

    match native_type {
        NativeType::Text => {
            parsed.size = args.first().copied();
        }
        NativeType::Integer => {
            let precision = args.first().copied().unwrap_or(INTEGER_PRECISION);
            parsed.precision = Some(precision);
            parsed.fraction = Some(0);
            parsed.size = Some(precision + 1);
        }
        NativeType::Decimal => {
            if let Some(&precision) = args.first() {
                parsed.precision = Some(precision);
                parsed.fraction = Some(args.get(1).copied().unwrap_or(0));
                // 符号 + 小数点
                parsed.size = Some(precision + 2);
            }
        }
        _ => {}
    }

    parsed
}

/// PRAGMA table_info 的一行
struct TableInfoRow {
    name: String,
    declared: String,
    not_null: bool,
    pk: i64,
}

// ==========================================
// SqliteIntrospector
// ==========================================
pub struct SqliteIntrospector {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteIntrospector {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> LoadResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LoadError::LockError(e.to_string()))
    }

    /// 按 sqlite_master 解析真实表名（大小写不敏感）
    fn resolve_table(conn: &Connection, table: &str) -> LoadResult<String> {
        if table.trim().is_empty() {
            return Err(LoadError::table_not_found(table, "empty table name"));
        }
        conn.query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE LIMIT 1",
            params![table.trim()],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or_else(|| LoadError::table_not_found(table, "not found in sqlite_master"))
    }

    fn table_info(conn: &Connection, table: &str) -> LoadResult<Vec<TableInfoRow>> {
        // NOTE: pragma 表值函数的表名无法参数化，这里转义后内联
        let sql = format!(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info('{}') ORDER BY cid",
            table.replace('\'', "''")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(TableInfoRow {
                name: row.get(0)?,
                declared: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(2)? != 0,
                pk: row.get(3)?,
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    /// (引用表, 本表外键列) 列表
    fn foreign_keys(conn: &Connection, table: &str) -> LoadResult<Vec<(String, String)>> {
        let sql = format!(
            "SELECT \"table\", \"from\" FROM pragma_foreign_key_list('{}')",
            table.replace('\'', "''")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

impl SchemaIntrospector for SqliteIntrospector {
    #[instrument(skip(self))]
    fn meta_columns(&self, table: &str) -> LoadResult<Vec<MetaColumn>> {
        let conn = self.get_conn()?;
        let table = Self::resolve_table(&conn, table)?;

        let columns: Vec<MetaColumn> = Self::table_info(&conn, &table)?
            .into_iter()
            .map(|info| {
                let declared = parse_declared_type(&info.declared);
                MetaColumn::new(table.as_str(), info.name, declared.native_type)
                    .with_native_type_name(info.declared)
                    .with_size(declared.size)
                    .with_precision(declared.precision)
                    .with_fraction(declared.fraction)
                    .nullable(!info.not_null)
                    .primary(info.pk > 0)
            })
            .collect();

        debug!(table = %table, columns = columns.len(), "读取列元数据");
        Ok(columns)
    }

    fn primary_keys(&self, table: &str) -> LoadResult<Vec<String>> {
        let conn = self.get_conn()?;
        let table = Self::resolve_table(&conn, table)?;

        let mut keys: Vec<TableInfoRow> = Self::table_info(&conn, &table)?
            .into_iter()
            .filter(|info| info.pk > 0)
            .collect();
        keys.sort_by_key(|info| info.pk);
        Ok(keys.into_iter().map(|info| info.name).collect())
    }

    fn depends_on(&self, table: &str) -> LoadResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let table = Self::resolve_table(&conn, table)?;

        Ok(Self::foreign_keys(&conn, &table)?
            .into_iter()
            .map(|(referenced, _)| referenced)
            .collect())
    }

    fn depends_mandatory_on(&self, table: &str) -> LoadResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let table = Self::resolve_table(&conn, table)?;

        let required: BTreeSet<String> = Self::table_info(&conn, &table)?
            .into_iter()
            .filter(|info| info.not_null)
            .map(|info| info.name.to_lowercase())
            .collect();

        Ok(Self::foreign_keys(&conn, &table)?
            .into_iter()
            .filter(|(_, from)| required.contains(&from.to_lowercase()))
            .map(|(referenced, _)| referenced)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn introspector() -> SqliteIntrospector {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE language (code VARCHAR(2) PRIMARY KEY NOT NULL, name VARCHAR(40));
            CREATE TABLE tag (
                name VARCHAR(10) NOT NULL PRIMARY KEY,
                married VARCHAR(1),
                age INTEGER,
                born DATE,
                altered TIMESTAMP NOT NULL,
                salary DECIMAL(6,2),
                language VARCHAR(2) NOT NULL REFERENCES language(code),
                mentor VARCHAR(10) REFERENCES tag(name)
            );
            "#,
        )
        .unwrap();
        SqliteIntrospector::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_parse_declared_type() {
        let text = parse_declared_type("VARCHAR(10)");
        assert_eq!(text.native_type, NativeType::Text);
        assert_eq!(text.size, Some(10));

        let decimal = parse_declared_type("DECIMAL(6, 2)");
        assert_eq!(decimal.native_type, NativeType::Decimal);
        assert_eq!(decimal.precision, Some(6));
        assert_eq!(decimal.fraction, Some(2));
        assert_eq!(decimal.size, Some(8));

        let integer = parse_declared_type("INTEGER");
        assert_eq!(integer.precision, Some(19));
        assert_eq!(integer.size, Some(20));

        let untyped = parse_declared_type("");
        assert_eq!(untyped.native_type, NativeType::Any);
        assert_eq!(untyped.size, None);
    }

    #[test]
    fn test_meta_columns() {
        let introspector = introspector();
        let columns = introspector.meta_columns("TAG").unwrap();

        assert_eq!(columns.len(), 8);
        assert_eq!(columns[0].name(), "name");
        assert_eq!(columns[0].table(), "tag");
        assert!(columns[0].is_primary());
        assert!(columns[0].is_not_nullable());
        assert_eq!(columns[0].size(), Some(10));
        assert!(columns[1].is_nullable());
        assert!(columns[4].is_timestamp());
        assert_eq!(columns[5].precision(), Some(6));
    }

    #[test]
    fn test_missing_table() {
        let introspector = introspector();
        let err = introspector.meta_columns("nope").unwrap_err();
        assert!(matches!(err, LoadError::TableNotFound { .. }));
        assert!(introspector.depends_on("nope").is_err());
    }

    #[test]
    fn test_dependencies() {
        let introspector = introspector();
        let all = introspector.depends_on("tag").unwrap();
        let mandatory = introspector.depends_mandatory_on("tag").unwrap();

        assert_eq!(all.len(), 2);
        assert!(all.contains("language"));
        assert!(all.contains("tag"));
        assert_eq!(mandatory.into_iter().collect::<Vec<_>>(), vec!["language".to_string()]);
        assert_eq!(introspector.primary_keys("tag").unwrap(), vec!["name".to_string()]);
        assert!(introspector.depends_on("language").unwrap().is_empty());
    }
}
