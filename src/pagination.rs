use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Pages shown on each side of the current page in the page bar.
const WINDOW: usize = 2;

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// The items of 1-based `page`, clipped to the list bounds.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Current page and fixed page size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    current: usize,
    page_size: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            current: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Move to `page` if it lies in `1..=total_pages(count)`. Returns whether it moved.
    pub fn change_page(&mut self, page: usize, count: usize) -> bool {
        if page < 1 || page > total_pages(count, self.page_size) {
            return false;
        }
        self.current = page;
        true
    }

    /// Pull the current page back into range after the item count changed.
    pub fn clamp(&mut self, count: usize) {
        let last = total_pages(count, self.page_size).max(1);
        self.current = self.current.clamp(1, last);
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageItem {
    Previous { target: usize, enabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { target: usize, enabled: bool },
}

/// Lay out the page bar: prev, first, gap, window around `current`, gap, last, next.
/// Empty when there is at most one page.
pub fn page_bar(current: usize, total: usize) -> Vec<PageItem> {
    if total <= 1 {
        return Vec::new();
    }

    let mut items = vec![PageItem::Previous {
        target: current.saturating_sub(1),
        enabled: current != 1,
    }];

    let start = current.saturating_sub(WINDOW).max(1);
    let end = (current + WINDOW).min(total);

    if start > 1 {
        items.push(PageItem::Page { number: 1, active: false });
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }

    for number in start..=end {
        items.push(PageItem::Page {
            number,
            active: number == current,
        });
    }

    if end < total {
        if end < total - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page { number: total, active: false });
    }

    items.push(PageItem::Next {
        target: current + 1,
        enabled: current != total,
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(items: &[PageItem]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| match item {
                PageItem::Page { number, active: true } => Some(format!("[{}]", number)),
                PageItem::Page { number, .. } => Some(number.to_string()),
                PageItem::Ellipsis => Some("...".to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(30, 12), 3);
    }

    #[test]
    fn test_page_slice_clips() {
        let items: Vec<u32> = (0..30).collect();
        assert_eq!(page_slice(&items, 1, 12), &items[0..12]);
        assert_eq!(page_slice(&items, 3, 12), &items[24..30]);
        assert!(page_slice(&items, 4, 12).is_empty());
        assert!(page_slice::<u32>(&[], 1, 12).is_empty());
    }

    #[test]
    fn test_thirty_papers_scenario() {
        let mut pagination = Pagination::new(12);
        assert_eq!(total_pages(30, pagination.page_size()), 3);
        assert!(!pagination.change_page(4, 30));
        assert_eq!(pagination.current(), 1);
        assert!(pagination.change_page(3, 30));
        assert!(!pagination.change_page(4, 30));
        assert_eq!(pagination.current(), 3);
    }

    #[test]
    fn test_change_page_rejects_out_of_range() {
        let mut pagination = Pagination::new(12);
        assert!(!pagination.change_page(0, 30));
        assert!(!pagination.change_page(1, 0));
        assert_eq!(pagination.current(), 1);
    }

    #[test]
    fn test_clamp_after_list_shrinks() {
        let mut p = Pagination::new(12);
        assert!(p.change_page(3, 30));
        p.clamp(14);
        assert_eq!(p.current(), 2);
        p.clamp(0);
        assert_eq!(p.current(), 1);
        p.clamp(30);
        assert_eq!(p.current(), 1);
    }

    #[test]
    fn test_page_bar_empty_for_single_page() {
        assert!(page_bar(1, 0).is_empty());
        assert!(page_bar(1, 1).is_empty());
    }

    #[test]
    fn test_page_bar_small() {
        let bar = page_bar(1, 3);
        assert_eq!(numbers(&bar), vec!["[1]", "2", "3"]);
        assert_eq!(bar[0], PageItem::Previous { target: 0, enabled: false });
        assert_eq!(bar[bar.len() - 1], PageItem::Next { target: 2, enabled: true });
    }

    #[test]
    fn test_page_bar_ellipsis_both_sides() {
        assert_eq!(
            numbers(&page_bar(10, 20)),
            vec!["1", "...", "8", "9", "[10]", "11", "12", "...", "20"]
        );
    }

    #[test]
    fn test_page_bar_no_ellipsis_when_adjacent() {
        // window 2..=6 touches page 1, and 6 is adjacent to last page 7
        assert_eq!(
            numbers(&page_bar(4, 7)),
            vec!["1", "2", "3", "[4]", "5", "6", "7"]
        );
    }

    #[test]
    fn test_page_bar_last_page() {
        let bar = page_bar(20, 20);
        assert_eq!(numbers(&bar), vec!["1", "...", "18", "19", "[20]"]);
        assert_eq!(bar[bar.len() - 1], PageItem::Next { target: 21, enabled: false });
    }
}
