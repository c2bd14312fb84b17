// ==========================================
// 表格数据导入 - 列数据提供者
// ==========================================
// 职责: 源表头（按文件顺序）↔ 目标表列元数据 绑定
//       逐行提供类型化值，并做表级/行级校验
// 红线: 调用级可变状态（行缓冲、诊断），不可被多个调用方共享
// ==========================================

use crate::column::cell::Column;
use crate::column::converter::value_converter::MessageTemplate;
use crate::column::converter::ConverterRegistry;
use crate::column::diagnostics::Diagnostics;
use crate::column::meta_column::{find_by_column_name, MetaColumn};
use crate::column::typed_value::TypedValue;
use std::collections::HashMap;
use std::sync::Arc;

const COLUMN_REQUIRED: &str = "Table \"${table}\" requires values for column \"${column}\".";
const COLUMN_MISSING: &str = "Table \"${table}\" has no column \"${column}\".";

/// 一整行的转换结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowConversion {
    pub values: Vec<Option<TypedValue>>, // 与表头同序
    pub diagnostics: Diagnostics,
}

pub struct ColumnDataProvider {
    registry: Arc<ConverterRegistry>,
    table: Option<String>,
    meta_columns: Vec<MetaColumn>,

    headers: Vec<String>,
    indices: HashMap<String, usize>, // 小写表头 → 位置
    values: Vec<Option<String>>,     // 当前行，长度恒等于表头数

    columns: Option<Vec<Column>>,   // 按表头位置惰性构建
    structure: Option<Diagnostics>, // validate_table 结果缓存
    validations: Diagnostics,
}

impl ColumnDataProvider {
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            registry,
            table: None,
            meta_columns: Vec::new(),
            headers: Vec::new(),
            indices: HashMap::new(),
            values: Vec::new(),
            columns: None,
            structure: None,
            validations: Diagnostics::new(),
        }
    }

    /// 一次性绑定表名、列元数据与表头
    pub fn for_table(
        registry: Arc<ConverterRegistry>,
        table: &str,
        meta_columns: Vec<MetaColumn>,
        headers: Vec<String>,
    ) -> Self {
        let mut provider = Self::new(registry);
        provider.set_table(table);
        provider.set_meta_columns(meta_columns);
        provider.set_headers(headers);
        provider
    }

    // ===== 表 / 元数据 / 表头 =====

    /// 当前表名，未设置时为 "unknown"
    pub fn table(&self) -> &str {
        self.table
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("unknown")
    }

    pub fn set_table(&mut self, table: &str) {
        self.table = Some(table.to_string());
        self.structure = None;
        self.validations.clear();
    }

    pub fn meta_columns(&self) -> &[MetaColumn] {
        &self.meta_columns
    }

    /// 按列名查找列元数据（大小写不敏感）
    pub fn meta_column(&self, column: &str) -> Option<&MetaColumn> {
        find_by_column_name(column, &self.meta_columns)
    }

    pub fn set_meta_columns(&mut self, meta_columns: Vec<MetaColumn>) {
        self.meta_columns = meta_columns;
        self.columns = None;
        self.structure = None;
        self.validations.clear();
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 重置表头：重新索引、重新分配行缓冲、清空列缓存与诊断
    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.indices = headers
            .iter()
            .enumerate()
            .map(|(index, header)| (header.trim().to_lowercase(), index))
            .collect();
        self.values = vec![None; headers.len()];
        self.headers = headers;
        self.columns = None;
        self.structure = None;
        self.validations.clear();
    }

    /// 表头位置（大小写不敏感）
    pub fn index_of(&self, header: &str) -> Option<usize> {
        self.indices.get(&header.trim().to_lowercase()).copied()
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.index_of(header).is_some()
    }

    // ===== 行数据 =====

    /// 清空当前行（保留结构）
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
        self.validations.clear();
    }

    /// 按位置设置整行，多余的值丢弃，不足的置空
    pub fn set_values<S: AsRef<str>>(&mut self, values: &[S]) {
        self.clear();
        for (slot, value) in self.values.iter_mut().zip(values) {
            *slot = Some(value.as_ref().to_string());
        }
    }

    /// 按列名设置整行，未知列名忽略
    pub fn set_values_map(&mut self, values: &HashMap<String, String>) {
        self.clear();
        for (column, value) in values {
            if let Some(index) = self.index_of(column) {
                self.values[index] = Some(value.clone());
            }
        }
    }

    pub fn set_value(&mut self, column: &str, value: Option<&str>) {
        if let Some(index) = self.index_of(column) {
            self.set_value_at(index, value);
        } else {
            self.validations.clear();
        }
    }

    pub fn set_value_at(&mut self, index: usize, value: Option<&str>) {
        self.validations.clear();
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value.map(str::to_string);
        }
    }

    /// 当前行的原始文本
    pub fn raw_values(&self) -> &[Option<String>] {
        &self.values
    }

    // ===== 校验 =====

    /// 表级结构校验（与行数据无关）
    ///
    /// # 规则
    /// - 非空列不在表头中 → 错误 "requires values for column"
    /// - 表头在列元数据中不存在 → 错误 "has no column"
    ///
    /// # 返回
    /// - 新的 Diagnostics，无错误才允许转换行数据
    pub fn validate_table(&self) -> Diagnostics {
        check_structure(self.table(), &self.headers, &self.meta_columns)
    }

    /// 当前累计诊断（为空时先填入表级校验结果）
    pub fn validate(&mut self) -> &Diagnostics {
        if self.validations.is_empty() {
            let structure = self.structure().clone();
            self.validations.extend(structure);
        }
        &self.validations
    }

    // ===== 取值 =====

    /// 按位置取当前行的类型化值，诊断累计到 validate()
    ///
    /// 越界或行未填充时返回 None 且不产生诊断；表级校验失败时不转换
    pub fn value_at(&mut self, index: usize) -> Option<TypedValue> {
        self.validate();
        if self.structure().has_errors() {
            return None;
        }
        if index >= self.values.len() {
            return None;
        }

        if self.columns.is_none() {
            self.columns = Some(build_columns(&self.headers, &self.meta_columns));
        }

        let raw = self.values[index].clone();
        let column = self.columns.as_mut()?.get_mut(index)?;
        column.set_value(raw);
        let value = column.object(&self.registry);
        let diagnostics = column.validate(&self.registry).clone();
        self.validations.extend(diagnostics);
        value
    }

    /// 按表头名取值（大小写不敏感）
    pub fn value(&mut self, column: &str) -> Option<TypedValue> {
        let index = self.index_of(column)?;
        self.value_at(index)
    }

    /// 转换当前整行，返回本行的值与诊断
    pub fn row(&mut self) -> RowConversion {
        self.validations.clear();
        let values = (0..self.headers.len())
            .map(|index| self.value_at(index))
            .collect();
        RowConversion {
            values,
            diagnostics: self.validate().clone(),
        }
    }

    fn structure(&mut self) -> &Diagnostics {
        if self.structure.is_none() {
            self.structure = Some(self.validate_table());
        }
        self.structure.get_or_insert_with(Diagnostics::new)
    }
}

/// 表头 ↔ 列元数据 结构校验（与行数据无关）
pub fn check_structure(table: &str, headers: &[String], meta_columns: &[MetaColumn]) -> Diagnostics {
    let mut errors = Diagnostics::new();
    // 空表头照常校验：非空列全部缺失
    if meta_columns.is_empty() {
        return errors;
    }

    for column in meta_columns.iter().filter(|c| c.is_not_nullable()) {
        if !headers.iter().any(|h| column.matches_name(h)) {
            errors.error(structure_error(COLUMN_REQUIRED, table, column.name()));
        }
    }

    for header in headers {
        if find_by_column_name(header, meta_columns).is_none() {
            errors.error(structure_error(COLUMN_MISSING, table, header));
        }
    }

    errors
}

fn build_columns(headers: &[String], meta_columns: &[MetaColumn]) -> Vec<Column> {
    headers
        .iter()
        .map(|header| Column::new(find_by_column_name(header, meta_columns).cloned()))
        .collect()
}

fn structure_error(template: &str, table: &str, column: &str) -> String {
    MessageTemplate::new(template)
        .with("table", table)
        .with("column", column)
        .render()
}
