//! Page-number pagination for list views

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

/// `?page=` query parameter: a 1-based number or `last`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Fixed-size paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub per_page: i64,
}

/// Resolved window into a list of `total` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    pub total: i64,
}

/// One page of results, as handed to templates
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub total: i64,
    pub per_page: i64,
    pub is_paginated: bool,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<i64>,
    pub next_page_number: Option<i64>,
}

impl Paginator {
    pub const fn new(per_page: i64) -> Self {
        Self { per_page }
    }

    /// Number of pages; an empty list still has one (empty) first page
    pub fn num_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            1
        } else {
            (total + self.per_page - 1) / self.per_page
        }
    }

    /// Validate the requested page against `total` rows
    pub fn window(&self, requested: Option<&str>, total: i64) -> AppResult<PageWindow> {
        let num_pages = self.num_pages(total);
        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::NotFound("Page is not 'last', nor can it be converted to an int".to_string())
            })?,
        };

        if number < 1 || number > num_pages {
            return Err(AppError::NotFound(format!("Invalid page ({})", number)));
        }

        Ok(PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            total,
        })
    }
}

impl PageWindow {
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        let has_previous = self.number > 1;
        let has_next = self.number < self.num_pages;
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
            is_paginated: self.num_pages > 1,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| self.number - 1),
            next_page_number: has_next.then(|| self.number + 1),
        }
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
            is_paginated: self.is_paginated,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
        }
    }
}
