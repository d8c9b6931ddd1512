use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Page {
    pub fn new(page: i64, page_size: i64) -> Result<Self, AppError> {
        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::BadRequest(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Applies the defaults (first page, twenty items) to raw query values.
    pub fn from_query(page: Option<i64>, page_size: Option<i64>) -> Result<Self, AppError> {
        Page::new(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let page = Page::from_query(None, None).unwrap();
        assert_eq!(page, Page { page: 1, page_size: 20 });
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let page = Page::new(2, 2).unwrap();
        assert_eq!(page.offset(), 2);
        assert_eq!(page.limit(), 2);

        assert_eq!(Page::new(7, 15).unwrap().offset(), 90);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Page::new(0, 20).is_err());
        assert!(Page::new(-3, 20).is_err());
        assert!(Page::new(1, 0).is_err());
        assert!(Page::new(1, 101).is_err());
        assert!(Page::new(1, 100).is_ok());
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let page = Page::new(i64::MAX, 100).unwrap();
        assert_eq!(page.offset(), i64::MAX);
    }
}
