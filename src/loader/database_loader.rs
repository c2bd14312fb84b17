// ==========================================
// 表格数据导入 - 整本工作簿加载
// ==========================================
// 流程: 排序 → 第一轮（按排序逐表插入）→ 第二轮（逐表更新可空列）
// 红线: 不开启/提交事务，提交边界由调用方控制
// ==========================================

use crate::column::converter::ConverterRegistry;
use crate::config::LoaderConfig;
use crate::error::LoadResult;
use crate::loader::report::LoadReport;
use crate::loader::sheet_loader::SheetLoader;
use crate::loader::statement_executor::StatementExecutor;
use crate::schema::SchemaIntrospector;
use crate::sheet::Book;
use crate::sort::SheetSortingStrategy;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, Span};
use uuid::Uuid;

pub struct DatabaseLoader {
    introspector: Arc<dyn SchemaIntrospector>,
    executor: Arc<dyn StatementExecutor>,
    sorter: Box<dyn SheetSortingStrategy>,
    registry: Arc<ConverterRegistry>,
    update_pass: bool,
    skip_invalid_rows: bool,
}

impl DatabaseLoader {
    /// 按配置创建加载器
    ///
    /// # 参数
    /// - introspector: 表结构查询
    /// - executor: SQL 执行器
    /// - config: 排序策略 / 日期格式 / 加载选项
    pub fn new(
        introspector: Arc<dyn SchemaIntrospector>,
        executor: Arc<dyn StatementExecutor>,
        config: &LoaderConfig,
    ) -> Self {
        Self {
            introspector,
            executor,
            sorter: config.sorter(),
            registry: Arc::new(config.registry()),
            update_pass: config.update_pass,
            skip_invalid_rows: config.skip_invalid_rows,
        }
    }

    pub fn with_sorter(mut self, sorter: Box<dyn SheetSortingStrategy>) -> Self {
        self.sorter = sorter;
        self
    }

    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// 加载整本工作簿
    ///
    /// # 返回
    /// - Ok(LoadReport): 排序排除、结构不匹配、行级错误均记录在报告中
    /// - Err: 表不存在（排序未拦截时）/ 非约束类数据库错误
    #[instrument(skip_all, fields(batch_id))]
    pub fn load(&self, book: Book) -> LoadResult<LoadReport> {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let batch_id = Uuid::new_v4().to_string();
        Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, sheets = book.len(), "开始加载工作簿");

        let schedule = self.sorter.sort(self.introspector.as_ref(), book.into_sheets());
        info!(
            ordered = schedule.sheets.len(),
            excluded = schedule.diagnostics.len(),
            "排序完成"
        );

        let sheet_loader = SheetLoader::new(
            self.introspector.as_ref(),
            self.executor.as_ref(),
            self.registry.clone(),
            self.skip_invalid_rows,
        );

        // 第一轮：严格按排序顺序
        let mut loads = Vec::with_capacity(schedule.sheets.len());
        for sheet in &schedule.sheets {
            loads.push(sheet_loader.insert_pass(sheet)?);
        }

        // 第二轮：所有表都已插入，可空外键可以回填
        if self.update_pass {
            for load in &mut loads {
                sheet_loader.update_pass(load)?;
            }
        }

        let elapsed = start_time.elapsed();
        let report = LoadReport {
            batch_id,
            started_at,
            elapsed_ms: elapsed.as_millis() as u64,
            schedule: schedule.diagnostics,
            sheets: loads.into_iter().map(|l| l.into_report()).collect(),
        };

        info!(
            batch_id = %report.batch_id,
            inserted = report.rows_inserted(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            elapsed_ms = report.elapsed_ms,
            "工作簿加载完成"
        );

        Ok(report)
    }
}
