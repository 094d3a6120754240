//! Page arithmetic for feeds
//!
//! Requested page numbers never fail: a missing or non-numeric value means
//! the first page, a number past the end means the last page and a number
//! below one means the first page. An empty collection still has a single
//! (empty) page.

use serde::Serialize;

/// Posts per feed page.
pub const PAGE_SIZE: i64 = 10;

/// Canonical form of a raw `page` value. Two inputs share a token exactly
/// when they resolve to the same page for every collection size, so the
/// token is safe to key cached pages by.
pub fn page_token(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "1".to_string();
    };

    match raw.parse::<i64>() {
        Ok(number) => number.max(1).to_string(),
        Err(_) if raw.bytes().all(|b| b.is_ascii_digit()) => "last".to_string(),
        Err(_) => "1".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

impl Paginator {
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve a raw `page` query value to a valid page number.
    pub fn get_page(&self, raw: Option<&str>) -> i64 {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return 1;
        };

        match raw.parse::<i64>() {
            Ok(number) => self.clamp(number),
            // Too many digits for i64 is still "past the end".
            Err(_) if raw.bytes().all(|b| b.is_ascii_digit()) => self.num_pages(),
            Err(_) => 1,
        }
    }

    pub fn clamp(&self, number: i64) -> i64 {
        number.clamp(1, self.num_pages())
    }

    /// `(offset, limit)` of a valid page number.
    pub fn bounds(&self, number: i64) -> (i64, i64) {
        let number = self.clamp(number);
        ((number - 1) * self.per_page, self.per_page)
    }

    /// Wrap one page worth of items with navigation metadata.
    pub fn page<T>(&self, number: i64, object_list: Vec<T>) -> Page<T> {
        let number = self.clamp(number);
        let num_pages = self.num_pages();
        let has_next = number < num_pages;
        let has_previous = number > 1;

        Page {
            object_list,
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(number + 1),
            previous_page_number: has_previous.then_some(number - 1),
        }
    }
}

/// A bounded slice of an ordered collection plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}
