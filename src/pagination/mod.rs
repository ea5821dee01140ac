use std::num::NonZeroUsize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: NonZeroUsize,
    /// 1-based. Anything outside `[1, page_count]` is clamped.
    pub page_number: i64,
}

impl PageRequest {
    pub fn new(page_size: usize, page_number: i64) -> Option<Self> {
        Some(Self {
            page_size: NonZeroUsize::new(page_size)?,
            page_number,
        })
    }

    /// Callers go back here whenever the matched set changes.
    pub fn first_page(self) -> Self {
        Self {
            page_number: 1,
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Page actually served, after clamping.
    pub page_number: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T> Page<'_, T> {
    /// 1-based inclusive bounds of the served items, `None` when empty.
    pub fn window(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let start = (self.page_number - 1) * self.page_size;
        Some((start + 1, start + self.items.len()))
    }

    pub fn showing_label(&self) -> String {
        match self.window() {
            Some((first, last)) => format!("Showing {first}-{last} of {}", self.total),
            None => format!("Showing 0-0 of {}", self.total),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.page_count
    }
}

/// `max(1, ceil(total / page_size))`.
pub fn page_count(total: usize, page_size: NonZeroUsize) -> usize {
    total.div_ceil(page_size.get()).max(1)
}

pub fn clamp_page(page_number: i64, page_count: usize) -> usize {
    let max = i64::try_from(page_count).unwrap_or(i64::MAX);
    // fits: 1 <= clamped <= page_count
    page_number.clamp(1, max) as usize
}

pub fn paginate<T>(records: &[T], request: PageRequest) -> Page<'_, T> {
    let total = records.len();
    let size = request.page_size.get();
    let page_count = page_count(total, request.page_size);
    let page_number = clamp_page(request.page_number, page_count);
    let start = ((page_number - 1) * size).min(total);
    let end = start.saturating_add(size).min(total);
    Page {
        items: &records[start..end],
        page_number,
        page_count,
        page_size: size,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(size: usize, page: i64) -> PageRequest {
        PageRequest::new(size, page).unwrap()
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(PageRequest::new(0, 1).is_none());
    }

    #[test]
    fn page_count_law() {
        for size in 1..=7usize {
            let nz = NonZeroUsize::new(size).unwrap();
            for total in 0..=30usize {
                let expected = std::cmp::max(1, (total + size - 1) / size);
                assert_eq!(page_count(total, nz), expected, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn out_of_range_resolves_to_last_page() {
        let records: Vec<u32> = (1..=14).collect();
        let far = paginate(&records, req(6, 10));
        let last = paginate(&records, req(6, 3));
        assert_eq!(far, last);
        assert_eq!(far.items, &[13, 14]);
        assert_eq!(far.page_count, 3);
        assert_eq!(far.page_number, 3);
    }

    #[test]
    fn below_one_resolves_to_first_page() {
        let records: Vec<u32> = (1..=14).collect();
        for n in [0, -1, i64::MIN] {
            assert_eq!(paginate(&records, req(6, n)), paginate(&records, req(6, 1)));
        }
    }

    #[test]
    fn paginate_is_idempotent() {
        let records: Vec<u32> = (1..=20).collect();
        assert_eq!(paginate(&records, req(4, 2)), paginate(&records, req(4, 2)));
    }

    #[test]
    fn empty_input_has_one_empty_page() {
        let records: Vec<u32> = Vec::new();
        let page = paginate(&records, req(10, 4));
        assert!(page.items.is_empty());
        assert_eq!(page.page_count, 1);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.showing_label(), "Showing 0-0 of 0");
        assert!(!page.has_next());
    }

    #[test]
    fn window_reports_one_based_bounds() {
        let records: Vec<u32> = (1..=14).collect();
        assert_eq!(paginate(&records, req(6, 2)).window(), Some((7, 12)));
        assert_eq!(paginate(&records, req(6, 3)).showing_label(), "Showing 13-14 of 14");
    }

    #[test]
    fn first_page_resets_number_only() {
        let r = req(6, 5).first_page();
        assert_eq!(r.page_number, 1);
        assert_eq!(r.page_size.get(), 6);
    }
}
