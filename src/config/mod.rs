// ==========================================
// 表格数据导入 - 配置层
// ==========================================
// 职责: 日期格式、排序策略、加载选项
// 存储: JSON 文件（<config_dir>/sheet-loader/config.json）
// ==========================================

pub mod loader_config;

pub use loader_config::{LoaderConfig, SortingKind};
