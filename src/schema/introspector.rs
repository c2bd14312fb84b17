// ==========================================
// 表格数据导入 - 表结构查询 Trait
// ==========================================
// 职责: 给定表名，返回列元数据 / 主键 / 外键依赖
// 实现者: SqliteIntrospector（测试中可替换为内存实现）
// 红线: 每次调用都是独立的一次查询，不缓存结果
// ==========================================

use crate::column::meta_column::MetaColumn;
use crate::error::LoadResult;
use std::collections::BTreeSet;

pub trait SchemaIntrospector: Send + Sync {
    /// 查询表的列元数据（按列定义顺序）
    ///
    /// # 返回
    /// - Ok(Vec<MetaColumn>): 列元数据
    /// - Err(LoadError::TableNotFound): 表不存在
    fn meta_columns(&self, table: &str) -> LoadResult<Vec<MetaColumn>>;

    /// 查询主键列名（按主键内位置排序）
    fn primary_keys(&self, table: &str) -> LoadResult<Vec<String>>;

    /// 查询该表通过外键引用的全部表
    fn depends_on(&self, table: &str) -> LoadResult<BTreeSet<String>>;

    /// 查询该表通过非空外键列引用的表（depends_on 的子集）
    fn depends_mandatory_on(&self, table: &str) -> LoadResult<BTreeSet<String>>;
}
