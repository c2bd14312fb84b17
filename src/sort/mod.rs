// ==========================================
// 表格数据导入 - 工作表排序层
// ==========================================
// 职责: 决定工作表的加载顺序
// 实现者: SimpleSheetSorter（原样）, DependencySheetSorter（按非空外键依赖）
// ==========================================

pub mod dependency_sorter;
pub mod simple_sorter;

pub use dependency_sorter::DependencySheetSorter;
pub use simple_sorter::SimpleSheetSorter;

use crate::column::diagnostics::Diagnostics;
use crate::schema::SchemaIntrospector;
use crate::sheet::Sheet;
use serde::{Deserialize, Serialize};

/// 排序结果：可加载的工作表（按加载顺序）+ 被排除表的原因
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub sheets: Vec<Sheet>,
    pub diagnostics: Diagnostics,
}

pub trait SheetSortingStrategy: Send + Sync {
    /// 计算加载顺序
    ///
    /// # 参数
    /// - introspector: 表结构查询（每次调用重新查询，不缓存）
    /// - sheets: 输入顺序的工作表
    ///
    /// # 返回
    /// - Schedule: 无法排序的表被排除，原因写入 diagnostics
    fn sort(&self, introspector: &dyn SchemaIntrospector, sheets: Vec<Sheet>) -> Schedule;
}
