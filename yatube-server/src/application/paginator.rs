//! Page-number pagination over ordered post collections.
//!
//! Requested page numbers never fail: anything that is not a positive integer
//! falls back to the first page, and numbers past the end clamp to the last
//! page. An empty collection still has one (empty) page.

pub const POSTS_PER_PAGE: i64 = 10;

/// The page number a client asked for, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(i64);

impl PageRequest {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn number(n: i64) -> Self {
        Self(n)
    }

    /// Parses the raw `page` query value; absent or non-numeric means page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map(Self)
            .unwrap_or_else(Self::first)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: i64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: i64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            1
        } else {
            (total + self.per_page - 1) / self.per_page
        }
    }

    /// Resolves the request against `total` items.
    pub fn window(&self, total: i64, request: PageRequest) -> PageWindow {
        let total = total.max(0);
        let num_pages = self.num_pages(total);
        PageWindow {
            number: request.0.clamp(1, num_pages),
            num_pages,
            per_page: self.per_page,
            total,
        }
    }

    /// Slices an in-memory ordered collection.
    pub fn paginate<T>(&self, items: Vec<T>, request: PageRequest) -> Page<T> {
        let window = self.window(items.len() as i64, request);
        let page_items = items
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .collect();
        window.into_page(page_items)
    }
}

/// Position of one page inside a collection of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    number: i64,
    num_pages: i64,
    per_page: i64,
    total: i64,
}

impl PageWindow {
    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<i64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<i64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn page_range(&self) -> std::ops::RangeInclusive<i64> {
        1..=self.num_pages
    }
}
