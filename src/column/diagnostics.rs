// ==========================================
// 表格数据导入 - 诊断信息
// ==========================================
// 职责: 有序的 {级别, 文本} 列表
// 说明: 每次操作返回新的 Diagnostics（值语义），由调用方合并
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// DiagnosticLevel - 诊断级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,   // 错误（无法按原样加载）
    Warning, // 警告（已修正，可加载但有损）
}

// ==========================================
// Diagnostic - 单条诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub text: String,
}

impl Diagnostic {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            DiagnosticLevel::Error => write!(f, "ERROR: {}", self.text),
            DiagnosticLevel::Warning => write!(f, "WARNING: {}", self.text),
        }
    }
}

// ==========================================
// Diagnostics - 诊断列表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Diagnostic::error(text));
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Diagnostic::warning(text));
    }

    /// 追加另一组诊断（保持顺序）
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_warning)
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_warning()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_warning())
    }

    /// 全部诊断文本（按出现顺序）
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.text.as_str()).collect()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(entries: Vec<Diagnostic>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, diagnostic) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning("first");
        diagnostics.error("second");
        diagnostics.warning("third");

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 2);
        assert_eq!(diagnostics.texts(), vec!["first", "second", "third"]);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut a = Diagnostics::new();
        a.error("a");
        let mut b = Diagnostics::new();
        b.warning("b");

        a.extend(b);
        assert_eq!(a.texts(), vec!["a", "b"]);
    }

    #[test]
    fn test_serialize_as_list() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error("boom");
        let json = serde_json::to_string(&diagnostics).unwrap();
        assert_eq!(json, r#"[{"level":"Error","text":"boom"}]"#);
    }
}
