/// 每页固定条数
pub const ITEMS_PER_PAGE: usize = 20;

/// 客户端分页，页码从 1 开始
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    per_page: usize,
    total: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Pager {
    pub fn new(total: usize) -> Self {
        Self::with_page_size(total, ITEMS_PER_PAGE)
    }

    pub fn with_page_size(total: usize, per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            total,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn next(&mut self) {
        self.go_to(self.page + 1);
    }

    pub fn previous(&mut self) {
        self.go_to(self.page.saturating_sub(1));
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// 当前页在全量数据中的 [start, end) 下标
    pub fn bounds(&self) -> (usize, usize) {
        let start = ((self.page - 1) * self.per_page).min(self.total);
        let end = (start + self.per_page).min(self.total);
        (start, end)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.bounds();
        let end = end.min(items.len());
        &items[start.min(end)..end]
    }

    /// 数据不足一页时不显示分页栏
    pub fn is_visible(&self) -> bool {
        self.total > self.per_page
    }

    pub fn summary(&self) -> String {
        let (start, end) = self.bounds();
        format!(
            "Showing {} to {} of {} items",
            if self.total == 0 { 0 } else { start + 1 },
            end,
            self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn first_page_disables_previous() {
        let pager = Pager::new(100);
        assert_eq!(pager.page(), 1);
        assert!(!pager.has_previous());
        assert!(pager.has_next());
        assert_eq!(pager.summary(), "Showing 1 to 20 of 100 items");
    }

    #[test]
    fn last_page_disables_next() {
        let mut pager = Pager::new(45);
        pager.go_to(3);
        assert_eq!(pager.page(), 3);
        assert!(pager.has_previous());
        assert!(!pager.has_next());
        assert_eq!(pager.summary(), "Showing 41 to 45 of 45 items");
        pager.next();
        assert_eq!(pager.page(), 3);
    }

    #[test]
    fn navigation_follows_buttons() {
        let mut pager = Pager::new(100);
        pager.next();
        assert_eq!(pager.summary(), "Showing 21 to 40 of 100 items");
        pager.go_to(1);
        assert_eq!(pager.summary(), "Showing 1 to 20 of 100 items");
        pager.go_to(3);
        assert_eq!(pager.summary(), "Showing 41 to 60 of 100 items");
        pager.previous();
        pager.previous();
        pager.previous();
        assert_eq!(pager.page(), 1);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(20, 1)]
    #[case(21, 2)]
    #[case(100, 5)]
    #[case(101, 6)]
    fn total_pages(#[case] total: usize, #[case] pages: usize) {
        assert_eq!(Pager::new(total).total_pages(), pages);
    }

    #[test]
    fn every_page_but_last_is_full() {
        let items: Vec<usize> = (0..53).collect();
        let mut pager = Pager::new(items.len());
        let mut sizes = Vec::new();
        for p in 1..=pager.total_pages() {
            pager.go_to(p);
            sizes.push(pager.slice(&items).len());
        }
        assert_eq!(sizes, vec![20, 20, 13]);
        pager.go_to(2);
        assert_eq!(pager.slice(&items)[0], 20);
    }

    #[test]
    fn pagination_hidden_for_single_page() {
        assert!(!Pager::new(20).is_visible());
        assert!(Pager::new(21).is_visible());
        assert_eq!(Pager::new(0).summary(), "Showing 0 to 0 of 0 items");
    }
}
