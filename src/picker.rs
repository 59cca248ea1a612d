use crate::api::StreamInfo;

/// 选择框最多直接显示的名称数
pub const MAX_VISIBLE: usize = 2;

/// 可被多选框列出的条目
pub trait PickItem {
    fn item_id(&self) -> &str;
    fn item_name(&self) -> &str;
    fn item_description(&self) -> &str;
}

impl PickItem for StreamInfo {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn item_name(&self) -> &str {
        self.display_name()
    }

    fn item_description(&self) -> &str {
        &self.description
    }
}

/// 按搜索词过滤，已选条目排前，其余按 id 排序
pub fn filter_items<'a, T: PickItem>(items: &'a [T], search: &str, selected: &[String]) -> Vec<&'a T> {
    let needle = search.to_lowercase();
    let mut out: Vec<&T> = items
        .iter()
        .filter(|it| {
            needle.is_empty()
                || it.item_id().to_lowercase().contains(&needle)
                || it.item_name().to_lowercase().contains(&needle)
                || it.item_description().to_lowercase().contains(&needle)
        })
        .collect();
    out.sort_by(|a, b| {
        let a_sel = selected.iter().any(|s| s == a.item_id());
        let b_sel = selected.iter().any(|s| s == b.item_id());
        b_sel.cmp(&a_sel).then_with(|| a.item_id().cmp(b.item_id()))
    });
    out
}

/// 选中追加到末尾，取消则移除；保持选择顺序
pub fn toggle(selected: &mut Vec<String>, id: &str) {
    if let Some(pos) = selected.iter().position(|s| s == id) {
        selected.remove(pos);
    } else {
        selected.push(id.to_string());
    }
}

pub fn display_text<T: PickItem>(items: &[T], selected: &[String], placeholder: &str) -> String {
    let name_of = |id: &String| {
        items
            .iter()
            .find(|it| it.item_id() == id)
            .map(|it| it.item_name().to_string())
            .unwrap_or_else(|| id.clone())
    };
    match selected.len() {
        0 => placeholder.to_string(),
        n if n <= MAX_VISIBLE => selected.iter().map(name_of).collect::<Vec<_>>().join(", "),
        n => format!("{} items selected", n),
    }
}

pub fn footer(selected: usize) -> String {
    format!("{} stream(s) selected", selected)
}

pub fn empty_text(search: &str) -> &'static str {
    if search.is_empty() {
        "No items available"
    } else {
        "No items found"
    }
}

/// 弹出列表的搜索框与光标
#[derive(Debug, Clone, Default)]
pub struct PickerState {
    pub search: String,
    pub cursor: usize,
}

impl PickerState {
    pub fn push_char(&mut self, c: char) {
        self.search.push(c);
        self.cursor = 0;
    }

    pub fn pop_char(&mut self) {
        self.search.pop();
        self.cursor = 0;
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    pub fn reset(&mut self) {
        self.search.clear();
        self.cursor = 0;
    }

    /// 光标所在条目的 id
    pub fn current_id<T: PickItem>(&self, items: &[T], selected: &[String]) -> Option<String> {
        filter_items(items, &self.search, selected)
            .get(self.cursor)
            .map(|it| it.item_id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(id: &str, name: &str, desc: &str) -> StreamInfo {
        StreamInfo {
            id: id.to_string(),
            name: name.to_string(),
            description: desc.to_string(),
        }
    }

    fn catalog() -> Vec<StreamInfo> {
        vec![
            s("c", "Gamma", "outlet pressure"),
            s("a", "Alpha", "inlet flow"),
            s("b", "Beta", "Pump speed"),
        ]
    }

    fn ids(items: &[&StreamInfo]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let items = catalog();
        assert_eq!(ids(&filter_items(&items, "PUMP", &[])), vec!["b"]);
        assert_eq!(ids(&filter_items(&items, "alp", &[])), vec!["a"]);
        assert_eq!(ids(&filter_items(&items, "C", &[])), vec!["c"]);
        assert!(filter_items(&items, "zzz", &[]).is_empty());
    }

    #[test]
    fn selected_first_then_by_id() {
        let items = catalog();
        let selected = vec!["c".to_string()];
        assert_eq!(ids(&filter_items(&items, "", &selected)), vec!["c", "a", "b"]);
        assert_eq!(ids(&filter_items(&items, "", &[])), vec!["a", "b", "c"]);
    }

    #[test]
    fn toggle_keeps_selection_order() {
        let mut selected = Vec::new();
        toggle(&mut selected, "b");
        toggle(&mut selected, "a");
        toggle(&mut selected, "c");
        toggle(&mut selected, "a");
        assert_eq!(selected, vec!["b", "c"]);
        toggle(&mut selected, "a");
        assert_eq!(selected, vec!["b", "c", "a"]);
    }

    #[test]
    fn display_text_by_count() {
        let items = catalog();
        let none: Vec<String> = Vec::new();
        assert_eq!(display_text(&items, &none, "Select streams..."), "Select streams...");
        assert_eq!(display_text(&items, &["a".to_string()], ""), "Alpha");
        assert_eq!(
            display_text(&items, &["b".to_string(), "zz".to_string()], ""),
            "Beta, zz"
        );
        let all: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(display_text(&items, &all, ""), "3 items selected");
        assert_eq!(footer(1), "1 stream(s) selected");
    }

    #[test]
    fn typing_resets_cursor() {
        let items = catalog();
        let mut p = PickerState::default();
        p.down(3);
        p.down(3);
        p.down(3);
        assert_eq!(p.cursor, 2);
        assert_eq!(p.current_id(&items, &[]), Some("c".to_string()));
        p.push_char('b');
        assert_eq!(p.cursor, 0);
        assert_eq!(p.current_id(&items, &[]), Some("b".to_string()));
        p.clamp(0);
        assert_eq!(p.cursor, 0);
    }
}
