// ==========================================
// 表格数据导入 - 表结构层
// ==========================================

pub mod introspector;
pub mod sqlite_introspector;

pub use introspector::SchemaIntrospector;
pub use sqlite_introspector::{parse_declared_type, DeclaredType, SqliteIntrospector};
