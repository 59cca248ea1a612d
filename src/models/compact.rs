/// 列表单元格默认显示的条目数
pub const MAX_VISIBLE: usize = 2;

/// 紧凑列表的显示结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactList {
    pub items: Vec<String>,
    /// "+N more" 或 "Show less"
    pub toggle: Option<String>,
    pub footer: Option<String>,
}

impl CompactList {
    pub fn is_none(&self) -> bool {
        self.items.is_empty() && self.footer.is_none()
    }

    /// 拼成单行文本，表格单元格用
    pub fn line(&self) -> String {
        if self.is_none() {
            return "None".to_string();
        }
        let mut parts = vec![self.items.join(", ")];
        if let Some(t) = &self.toggle {
            parts.push(format!("[{}]", t));
        }
        parts.join(" ")
    }
}

pub fn compact(items: &[String], label: &str, expanded: bool) -> CompactList {
    if items.is_empty() {
        return CompactList {
            items: Vec::new(),
            toggle: None,
            footer: None,
        };
    }
    let has_more = items.len() > MAX_VISIBLE;
    let visible = if expanded || !has_more {
        items.to_vec()
    } else {
        items[..MAX_VISIBLE].to_vec()
    };
    let toggle = has_more.then(|| {
        if expanded {
            "Show less".to_string()
        } else {
            format!("+{} more", items.len() - MAX_VISIBLE)
        }
    });
    CompactList {
        items: visible,
        toggle,
        footer: Some(format!("{} {}", items.len(), label.to_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("s{}", i)).collect()
    }

    #[test]
    fn empty_shows_none() {
        let c = compact(&[], "Past", false);
        assert!(c.is_none());
        assert_eq!(c.line(), "None");
    }

    #[test]
    fn short_list_has_no_toggle() {
        let c = compact(&list(1), "Past", false);
        assert_eq!(c.items, vec!["s1"]);
        assert_eq!(c.toggle, None);
        assert_eq!(c.footer.as_deref(), Some("1 past"));

        let c = compact(&list(2), "Targets", false);
        assert_eq!(c.footer.as_deref(), Some("2 targets"));
        assert_eq!(c.line(), "s1, s2");
    }

    #[test]
    fn long_list_collapses_and_expands() {
        let c = compact(&list(5), "Future", false);
        assert_eq!(c.items, vec!["s1", "s2"]);
        assert_eq!(c.toggle.as_deref(), Some("+3 more"));
        assert_eq!(c.line(), "s1, s2 [+3 more]");

        let c = compact(&list(5), "Future", true);
        assert_eq!(c.items.len(), 5);
        assert_eq!(c.toggle.as_deref(), Some("Show less"));
        assert_eq!(c.footer.as_deref(), Some("5 future"));
    }
}
