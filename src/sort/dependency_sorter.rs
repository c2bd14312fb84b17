// ==========================================
// 表格数据导入 - 依赖顺序排序
// ==========================================
// 职责: 非空外键引用的表先于引用方加载
// 流程: 发现依赖 → 剪除不可满足（不动点）→ 拓扑排序（含环检测）→ 映射回工作表
// 红线: 每次调用重新构建依赖图，不持久化、不缓存
//       无法排序的表排除并记录原因，绝不乱序加载
// ==========================================

use crate::column::converter::value_converter::MessageTemplate;
use crate::column::diagnostics::Diagnostics;
use crate::schema::SchemaIntrospector;
use crate::sheet::Sheet;
use crate::sort::{Schedule, SheetSortingStrategy};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

const CANNOT_ACCESS: &str = "Cannot access table \"${table}\": ${cause}";
const NOT_PROVIDED: &str = "Table \"${table}\" depends on table \"${dependency}\" which is not provided.";
const REMOVED: &str = "Table \"${table}\" depends on removed table \"${dependency}\".";
const CYCLE: &str =
    "Table \"${table}\" cannot be ordered, unresolved mandatory dependency cycle on \"${dependencies}\".";
const BLOCKED: &str =
    "Table \"${table}\" cannot be ordered, mandatory dependencies \"${dependencies}\" are blocked by a dependency cycle.";

fn normalize(table: &str) -> String {
    table.trim().to_uppercase()
}

// ==========================================
// DependencyGraph - 单次调用内的依赖图
// ==========================================
struct DependencyGraph {
    order: Vec<String>,                         // 候选表（输入顺序，去重）
    mandatory: HashMap<String, BTreeSet<String>>, // 表 → 非空外键引用的表
    removed: HashSet<String>,
    faults: Diagnostics,
}

impl DependencyGraph {
    fn new(sheets: &[Sheet]) -> Self {
        let mut seen = HashSet::new();
        let order = sheets
            .iter()
            .map(|s| normalize(s.table_name()))
            .filter(|t| seen.insert(t.clone()))
            .collect();

        Self {
            order,
            mandatory: HashMap::new(),
            removed: HashSet::new(),
            faults: Diagnostics::new(),
        }
    }

    fn is_alive(&self, table: &str) -> bool {
        self.mandatory.contains_key(table)
    }

    fn alive(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|t| self.is_alive(t))
            .cloned()
            .collect()
    }

    fn remove(&mut self, table: &str) {
        self.mandatory.remove(table);
        self.removed.insert(table.to_string());
    }

    /// 阶段 1: 查询每个候选表的依赖，无法访问的表直接剔除
    fn discover(&mut self, introspector: &dyn SchemaIntrospector) {
        for table in self.order.clone() {
            let result = introspector
                .depends_on(&table)
                .and_then(|all| Ok((all, introspector.depends_mandatory_on(&table)?)));

            match result {
                Ok((all, mandatory)) => {
                    let mandatory: BTreeSet<String> = mandatory
                        .iter()
                        .map(|t| normalize(t))
                        .filter(|t| *t != table) // 自引用不影响顺序
                        .collect();
                    debug!(
                        table = %table,
                        depends_on = all.len(),
                        mandatory = mandatory.len(),
                        "发现依赖"
                    );
                    self.mandatory.insert(table, mandatory);
                }
                Err(e) => {
                    warn!(table = %table, error = %e, "无法访问表");
                    self.faults.error(
                        MessageTemplate::new(CANNOT_ACCESS)
                            .with("table", &table)
                            .with("cause", e)
                            .render(),
                    );
                    self.removed.insert(table);
                }
            }
        }
    }

    /// 阶段 2: 反复剔除依赖不在候选集中的表，直到不再有新的剔除
    fn prune(&mut self) {
        loop {
            let mut marked = Vec::new();

            for table in self.alive() {
                let Some(dependencies) = self.mandatory.get(&table) else {
                    continue;
                };
                let mut orphaned = false;
                for dependency in dependencies {
                    if self.is_alive(dependency) {
                        continue;
                    }
                    let template = if self.removed.contains(dependency) {
                        REMOVED
                    } else {
                        NOT_PROVIDED
                    };
                    self.faults.error(
                        MessageTemplate::new(template)
                            .with("table", &table)
                            .with("dependency", dependency)
                            .render(),
                    );
                    orphaned = true;
                }
                if orphaned {
                    marked.push(table);
                }
            }

            if marked.is_empty() {
                break;
            }
            for table in &marked {
                warn!(table = %table, "依赖不可满足，排除");
                self.remove(table);
            }
        }
    }

    /// 阶段 3: 拓扑排序；某轮无可加载表即为环，剩余表全部排除
    fn order(&mut self) -> Vec<String> {
        let mut remaining = self.alive();
        let mut pending = self.mandatory.clone();
        let mut sorted = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready: Vec<String> = remaining
                .iter()
                .filter(|t| pending.get(*t).map_or(true, BTreeSet::is_empty))
                .cloned()
                .collect();

            if ready.is_empty() {
                for table in &remaining {
                    let dependencies = pending
                        .get(table)
                        .map(|d| d.iter().cloned().collect::<Vec<_>>().join(", "))
                        .unwrap_or_default();
                    // 环上的表与仅依赖环的下游表分别说明
                    let template = if on_cycle(&pending, table) { CYCLE } else { BLOCKED };
                    warn!(table = %table, dependencies = %dependencies, "依赖环，排除");
                    self.faults.error(
                        MessageTemplate::new(template)
                            .with("table", table)
                            .with("dependencies", dependencies)
                            .render(),
                    );
                }
                break;
            }

            remaining.retain(|t| !ready.contains(t));
            for dependencies in pending.values_mut() {
                for table in &ready {
                    dependencies.remove(table);
                }
            }
            sorted.extend(ready);
        }

        sorted
    }
}

/// 表能否沿非空依赖回到自身
fn on_cycle(pending: &HashMap<String, BTreeSet<String>>, table: &str) -> bool {
    let mut visited = HashSet::new();
    let mut stack: Vec<&str> = pending
        .get(table)
        .map(|d| d.iter().map(String::as_str).collect())
        .unwrap_or_default();

    while let Some(current) = stack.pop() {
        if current == table {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(dependencies) = pending.get(current) {
            stack.extend(dependencies.iter().map(String::as_str));
        }
    }
    false
}

// ==========================================
// DependencySheetSorter
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencySheetSorter;

impl SheetSortingStrategy for DependencySheetSorter {
    #[instrument(skip_all, fields(sheets = sheets.len()))]
    fn sort(&self, introspector: &dyn SchemaIntrospector, sheets: Vec<Sheet>) -> Schedule {
        let mut graph = DependencyGraph::new(&sheets);
        graph.discover(introspector);
        graph.prune();
        let order = graph.order();

        // 阶段 4: 映射回工作表（同名表的全部工作表按输入顺序）
        let mut by_table: HashMap<String, Vec<Sheet>> = HashMap::new();
        for sheet in sheets {
            by_table
                .entry(normalize(sheet.table_name()))
                .or_default()
                .push(sheet);
        }
        let ordered: Vec<Sheet> = order
            .iter()
            .filter_map(|table| by_table.remove(table))
            .flatten()
            .collect();

        info!(
            ordered = ordered.len(),
            faults = graph.faults.len(),
            "工作表排序完成"
        );

        Schedule {
            sheets: ordered,
            diagnostics: graph.faults,
        }
    }
}
