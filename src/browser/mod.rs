pub mod pager;
pub mod probe;

pub use pager::{Pager, ITEMS_PER_PAGE};
pub use probe::ConnectionProbe;

use crate::api::{ApiError, Endpoint};
use serde_json::Value;
use std::collections::HashSet;

/// Configuration 视图：按所选集合分页展示任意 JSON 记录
#[derive(Debug, Default)]
pub struct BrowserState {
    pub endpoint: Endpoint,
    pub data: Vec<Value>,
    pub loading: bool,
    pub error: Option<String>,
    pub pager: Pager,
    pub expanded: HashSet<String>,
    /// 当前页内的行光标
    pub cursor: usize,
    pub probe: ConnectionProbe,
}

impl BrowserState {
    /// 切换集合，返回需要请求的集合
    pub fn select_endpoint(&mut self, endpoint: Endpoint) -> Endpoint {
        self.endpoint = endpoint;
        self.loading = true;
        endpoint
    }

    /// 处理请求结果；过期集合的结果直接丢弃
    pub fn apply_result(&mut self, endpoint: Endpoint, result: Result<Vec<Value>, ApiError>) -> bool {
        if endpoint != self.endpoint {
            return false;
        }
        self.loading = false;
        match result {
            Ok(rows) => {
                self.pager = Pager::new(rows.len());
                self.data = rows;
                self.error = None;
                self.expanded.clear();
                self.cursor = 0;
            }
            Err(e) => {
                self.error = Some(e.banner_message());
            }
        }
        true
    }

    pub fn subtitle(&self) -> String {
        format!(
            "Data from {} endpoint ({} items)",
            self.endpoint.label().to_lowercase(),
            self.data.len()
        )
    }

    /// 列名取第一条记录的键
    pub fn columns(&self) -> Vec<String> {
        match self.data.first() {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn page_rows(&self) -> &[Value] {
        self.pager.slice(&self.data)
    }

    /// 全局行号作为展开键
    pub fn row_key(&self, index_in_page: usize) -> String {
        let (start, _) = self.pager.bounds();
        (start + index_in_page).to_string()
    }

    pub fn page_has_nested(&self) -> bool {
        let columns = self.columns();
        self.page_rows().iter().any(|r| has_nested(r, &columns))
    }

    pub fn is_expanded(&self, index_in_page: usize) -> bool {
        self.expanded.contains(&self.row_key(index_in_page))
    }

    /// 只有含嵌套对象的行可以展开
    pub fn toggle_expanded(&mut self, index_in_page: usize) -> bool {
        let columns = self.columns();
        let Some(row) = self.page_rows().get(index_in_page) else {
            return false;
        };
        if !has_nested(row, &columns) {
            return false;
        }
        let key = self.row_key(index_in_page);
        if !self.expanded.remove(&key) {
            self.expanded.insert(key);
        }
        true
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        let len = self.page_rows().len();
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn next_page(&mut self) {
        self.pager.next();
        self.cursor = 0;
    }

    pub fn previous_page(&mut self) {
        self.pager.previous();
        self.cursor = 0;
    }
}

pub fn is_object(v: &Value) -> bool {
    matches!(v, Value::Object(_))
}

pub fn has_nested(row: &Value, columns: &[String]) -> bool {
    columns.iter().any(|k| row.get(k).map(is_object).unwrap_or(false))
}

/// 折叠状态下的单元格文本
pub fn cell_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::Object(_)) => "[Object - click to expand]".to_string(),
        Some(other) => plain_text(other),
    }
}

fn plain_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items.iter().map(plain_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// 展开后的嵌套内容：(列名, ["key: value", ...])
pub fn nested_sections(row: &Value, columns: &[String]) -> Vec<(String, Vec<String>)> {
    columns
        .iter()
        .filter_map(|k| match row.get(k) {
            Some(Value::Object(inner)) => Some((
                k.clone(),
                inner
                    .iter()
                    .map(|(ik, iv)| {
                        let text = if is_object(iv) {
                            "[Object]".to_string()
                        } else {
                            plain_text(iv)
                        };
                        format!("{}: {}", ik, text)
                    })
                    .collect(),
            )),
            _ => None,
        })
        .collect()
}
