// ==========================================
// 依赖排序集成测试
// ==========================================
// 测试目标: 基于真实外键的加载顺序、缺失依赖、依赖环
// ==========================================


use sheet_loader::{
    DependencySheetSorter, Schedule, Sheet, SheetSortingStrategy, SimpleSheetSorter,
    SqliteIntrospector,
};
use test_helpers::{create_test_db, shared_connection};

fn sort(names: &[&str]) -> Schedule {
    let (_db, db_path) = create_test_db().unwrap();
    let introspector = SqliteIntrospector::new(shared_connection(&db_path).unwrap());
    let sheets = names
        .iter()
        .map(|n| Sheet::new(*n, vec![], vec![]))
        .collect();
    DependencySheetSorter.sort(&introspector, sheets)
}

fn names(schedule: &Schedule) -> Vec<&str> {
    schedule.sheets.iter().map(|s| s.name()).collect()
}

#[test]
fn test_full_order() {
    let schedule = sort(&["role_name", "tag", "roles", "language"]);
    assert_eq!(names(&schedule), vec!["roles", "language", "role_name", "tag"]);
    assert!(schedule.diagnostics.is_empty());
}

#[test]
fn test_missing_dependency() {
    let schedule = sort(&["tag", "roles"]);
    assert_eq!(names(&schedule), vec!["roles"]);
    assert_eq!(
        schedule.diagnostics.texts(),
        vec!["Table \"TAG\" depends on table \"LANGUAGE\" which is not provided."]
    );
}

#[test]
fn test_cycle_is_excluded() {
    let schedule = sort(&["cyc_x", "language", "cyc_y"]);
    assert_eq!(names(&schedule), vec!["language"]);
    assert_eq!(
        schedule.diagnostics.texts(),
        vec![
            "Table \"CYC_X\" cannot be ordered, unresolved mandatory dependency cycle on \"CYC_Y\".",
            "Table \"CYC_Y\" cannot be ordered, unresolved mandatory dependency cycle on \"CYC_X\".",
        ]
    );
}

#[test]
fn test_unknown_table_is_reported() {
    let schedule = sort(&["ghost", "language"]);
    assert_eq!(names(&schedule), vec!["language"]);
    assert_eq!(schedule.diagnostics.error_count(), 1);
    assert!(schedule.diagnostics.texts()[0].starts_with("Cannot access table \"GHOST\""));
}

#[test]
fn test_simple_sorter_keeps_order() {
    let (_db, db_path) = create_test_db().unwrap();
    let introspector = SqliteIntrospector::new(shared_connection(&db_path).unwrap());
    let sheets = vec![
        Sheet::new("tag", vec![], vec![]),
        Sheet::new("language", vec![], vec![]),
    ];
    let schedule = SimpleSheetSorter.sort(&introspector, sheets);
    assert_eq!(names(&schedule), vec!["tag", "language"]);
}
