// ==========================================
// 表格数据导入 - 原样排序
// ==========================================

use crate::column::diagnostics::Diagnostics;
use crate::schema::SchemaIntrospector;
use crate::sheet::Sheet;
use crate::sort::{Schedule, SheetSortingStrategy};

/// 保持输入顺序，不查询表结构
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSheetSorter;

impl SheetSortingStrategy for SimpleSheetSorter {
    fn sort(&self, _introspector: &dyn SchemaIntrospector, sheets: Vec<Sheet>) -> Schedule {
        Schedule {
            sheets,
            diagnostics: Diagnostics::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::meta_column::MetaColumn;
    use crate::error::{LoadError, LoadResult};
    use std::collections::BTreeSet;

    struct Unreachable;

    impl SchemaIntrospector for Unreachable {
        fn meta_columns(&self, table: &str) -> LoadResult<Vec<MetaColumn>> {
            Err(LoadError::table_not_found(table, "unreachable"))
        }
        fn primary_keys(&self, table: &str) -> LoadResult<Vec<String>> {
            Err(LoadError::table_not_found(table, "unreachable"))
        }
        fn depends_on(&self, table: &str) -> LoadResult<BTreeSet<String>> {
            Err(LoadError::table_not_found(table, "unreachable"))
        }
        fn depends_mandatory_on(&self, table: &str) -> LoadResult<BTreeSet<String>> {
            Err(LoadError::table_not_found(table, "unreachable"))
        }
    }

    #[test]
    fn test_keeps_input_order() {
        let sheets = vec![
            Sheet::new("b", vec![], vec![]),
            Sheet::new("a", vec![], vec![]),
        ];
        let schedule = SimpleSheetSorter.sort(&Unreachable, sheets.clone());
        assert_eq!(schedule.sheets, sheets);
        assert!(schedule.diagnostics.is_empty());
    }
}
