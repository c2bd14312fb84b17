// ==========================================
// 表格数据导入 - 单表加载
// ==========================================
// 流程: 列元数据 → 结构校验 → 逐行转换 → 第一轮 INSERT（主键 + 非空列）
//       → 第二轮 UPDATE（其余列，按主键）
// 说明: 第二轮用于回填可空外键，此时被引用表已全部写入
// ==========================================

use crate::column::converter::ConverterRegistry;
use crate::column::data_provider::ColumnDataProvider;
use crate::column::meta_column::MetaColumn;
use crate::column::typed_value::TypedValue;
use crate::error::LoadResult;
use crate::loader::report::SheetReport;
use crate::loader::statement_executor::StatementExecutor;
use crate::schema::SchemaIntrospector;
use crate::sheet::Sheet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// LoadPlan - 表头位置 → 两轮写库的列划分
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoadPlan {
    table: String,
    columns: Vec<String>, // 与表头同序的目标列名
    keys: Vec<usize>,
    inserted: Vec<usize>,
    updated: Vec<usize>,
}

impl LoadPlan {
    fn new(table: &str, headers: &[String], meta_columns: &[MetaColumn], primary_keys: &[String]) -> Self {
        let columns: Vec<String> = headers
            .iter()
            .map(|h| {
                meta_columns
                    .iter()
                    .find(|m| m.matches_name(h))
                    .map(|m| m.name().to_string())
                    .unwrap_or_else(|| h.trim().to_string())
            })
            .collect();

        let keys: Vec<usize> = primary_keys
            .iter()
            .filter_map(|key| columns.iter().position(|c| c.eq_ignore_ascii_case(key)))
            .collect();

        // 主键不完整时无法按主键更新，全部列在第一轮写入
        let keyed = !primary_keys.is_empty() && keys.len() == primary_keys.len();

        let (inserted, updated): (Vec<usize>, Vec<usize>) = (0..columns.len()).partition(|&index| {
            if !keyed {
                return true;
            }
            meta_columns
                .iter()
                .find(|m| m.matches_name(&columns[index]))
                .map_or(true, |m| m.is_primary() || m.is_not_nullable())
        });

        Self {
            table: table.to_string(),
            columns,
            keys: if keyed { keys } else { Vec::new() },
            inserted,
            updated,
        }
    }

    fn select(&self, indices: &[usize], values: &[Option<TypedValue>]) -> (Vec<String>, Vec<Option<TypedValue>>) {
        indices
            .iter()
            .map(|&i| (self.columns[i].clone(), values.get(i).cloned().flatten()))
            .unzip()
    }
}

/// 第一轮结果，供第二轮使用
pub struct SheetLoad {
    pub report: SheetReport,
    plan: Option<LoadPlan>,
    rows: Vec<(usize, Vec<Option<TypedValue>>)>, // 已插入的行（行号, 转换后的值）
}

impl SheetLoad {
    pub fn into_report(self) -> SheetReport {
        self.report
    }
}

// ==========================================
// SheetLoader
// ==========================================
pub struct SheetLoader<'a> {
    introspector: &'a dyn SchemaIntrospector,
    executor: &'a dyn StatementExecutor,
    registry: Arc<ConverterRegistry>,
    skip_invalid_rows: bool,
}

impl<'a> SheetLoader<'a> {
    pub fn new(
        introspector: &'a dyn SchemaIntrospector,
        executor: &'a dyn StatementExecutor,
        registry: Arc<ConverterRegistry>,
        skip_invalid_rows: bool,
    ) -> Self {
        Self {
            introspector,
            executor,
            registry,
            skip_invalid_rows,
        }
    }

    /// 第一轮：转换并插入主键与非空列
    ///
    /// # 返回
    /// - Ok(SheetLoad): 行级问题记录在 report 中
    /// - Err: 表不存在 / 非约束类数据库错误
    #[instrument(skip_all, fields(sheet = %sheet.name()))]
    pub fn insert_pass(&self, sheet: &Sheet) -> LoadResult<SheetLoad> {
        let meta_columns = self.introspector.meta_columns(sheet.table_name())?;
        let primary_keys = self.introspector.primary_keys(sheet.table_name())?;
        let table = meta_columns
            .first()
            .map(|m| m.table().to_string())
            .unwrap_or_else(|| sheet.table_name().to_string());

        let mut report = SheetReport::new(sheet.name(), &table, sheet.row_count());

        let mut provider = ColumnDataProvider::for_table(
            self.registry.clone(),
            &table,
            meta_columns,
            sheet.columns().to_vec(),
        );

        let structure = provider.validate_table();
        if structure.has_errors() {
            warn!(table = %table, errors = structure.error_count(), "表结构不匹配，跳过工作表");
            report.rows_skipped = sheet.row_count();
            report.diagnostics = structure;
            return Ok(SheetLoad {
                report,
                plan: None,
                rows: Vec::new(),
            });
        }

        let plan = LoadPlan::new(&table, provider.headers(), provider.meta_columns(), &primary_keys);
        debug!(
            table = %table,
            insert_columns = plan.inserted.len(),
            update_columns = plan.updated.len(),
            "加载计划"
        );

        let mut rows = Vec::with_capacity(sheet.row_count());
        for (index, raw) in sheet.rows().iter().enumerate() {
            let row_number = index + 1;
            provider.set_values(raw);
            let converted = provider.row();
            report.record(row_number, &converted.diagnostics);

            if self.skip_invalid_rows && converted.diagnostics.has_errors() {
                report.rows_skipped += 1;
                continue;
            }

            let (columns, values) = plan.select(&plan.inserted, &converted.values);
            match self.executor.insert(&plan.table, &columns, &values) {
                Ok(count) => {
                    report.rows_inserted += count;
                    rows.push((row_number, converted.values));
                }
                Err(e) if e.is_constraint_violation() => {
                    warn!(table = %table, row = row_number, error = %e, "插入被约束拒绝");
                    report.row_error(row_number, e.to_string());
                    report.rows_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            table = %table,
            read = report.rows_read,
            inserted = report.rows_inserted,
            skipped = report.rows_skipped,
            "第一轮插入完成"
        );

        Ok(SheetLoad {
            report,
            plan: Some(plan),
            rows,
        })
    }

    /// 第二轮：按主键更新其余列
    #[instrument(skip_all, fields(sheet = %load.report.sheet))]
    pub fn update_pass(&self, load: &mut SheetLoad) -> LoadResult<()> {
        let Some(plan) = &load.plan else {
            return Ok(());
        };
        if plan.updated.is_empty() || plan.keys.is_empty() {
            return Ok(());
        }

        for (row_number, values) in &load.rows {
            let (key_columns, key_values) = plan.select(&plan.keys, values);
            if key_values.iter().any(Option::is_none) {
                debug!(row = row_number, "主键为空，跳过更新");
                continue;
            }

            let (columns, values) = plan.select(&plan.updated, values);
            match self
                .executor
                .update(&plan.table, &key_columns, &key_values, &columns, &values)
            {
                Ok(count) => load.report.rows_updated += count,
                Err(e) if e.is_constraint_violation() => {
                    warn!(table = %plan.table, row = row_number, error = %e, "更新被约束拒绝");
                    load.report.row_error(*row_number, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            table = %plan.table,
            updated = load.report.rows_updated,
            "第二轮更新完成"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::meta_type::NativeType;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn role_columns() -> Vec<MetaColumn> {
        vec![
            MetaColumn::new("role", "id", NativeType::Integer)
                .nullable(false)
                .primary(true),
            MetaColumn::new("role", "name", NativeType::Text).nullable(false),
            MetaColumn::new("role", "parent", NativeType::Integer),
        ]
    }

    #[test]
    fn test_plan_splits_mandatory_and_optional() {
        let plan = LoadPlan::new(
            "role",
            &strings(&["PARENT", "name", "id"]),
            &role_columns(),
            &strings(&["id"]),
        );
        assert_eq!(plan.columns, strings(&["parent", "name", "id"]));
        assert_eq!(plan.keys, vec![2]);
        assert_eq!(plan.inserted, vec![1, 2]);
        assert_eq!(plan.updated, vec![0]);
    }

    #[test]
    fn test_plan_without_key_inserts_everything() {
        let plan = LoadPlan::new("role", &strings(&["name", "parent"]), &role_columns(), &[]);
        assert_eq!(plan.inserted, vec![0, 1]);
        assert!(plan.updated.is_empty());
        assert!(plan.keys.is_empty());
    }

    #[test]
    fn test_select_missing_values_are_null() {
        let plan = LoadPlan::new("role", &strings(&["id", "name"]), &role_columns(), &strings(&["id"]));
        let (columns, values) = plan.select(&plan.inserted, &[Some(TypedValue::Text("x".to_string()))]);
        assert_eq!(columns, strings(&["id", "name"]));
        assert_eq!(values, vec![Some(TypedValue::Text("x".to_string())), None]);
    }
}
