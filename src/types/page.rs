//! Pagination parameters shared by the list accessors

use super::error::BankError;

/// One page of a listing, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    size: u32,
}

impl Page {
    /// Largest page size a listing will return
    pub const MAX_SIZE: u32 = 100;

    /// Validate a page request
    ///
    /// # Errors
    ///
    /// `BankError::InvalidPage` if `page` is zero or `size` is outside `1..=MAX_SIZE`.
    pub fn new(page: u32, size: u32) -> Result<Self, BankError> {
        if page == 0 || size == 0 || size > Self::MAX_SIZE {
            return Err(BankError::InvalidPage { page, size });
        }
        Ok(Self { page, size })
    }

    pub fn limit(&self) -> u32 {
        self.size
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 5, 5, 0)]
    #[case(2, 5, 5, 5)]
    #[case(3, 10, 10, 20)]
    fn test_limit_and_offset(
        #[case] page: u32,
        #[case] size: u32,
        #[case] limit: u32,
        #[case] offset: u32,
    ) {
        let page = Page::new(page, size).unwrap();
        assert_eq!(page.limit(), limit);
        assert_eq!(page.offset(), offset);
    }

    #[rstest]
    #[case::zero_page(0, 5)]
    #[case::zero_size(1, 0)]
    #[case::oversized(1, Page::MAX_SIZE + 1)]
    fn test_rejects_out_of_range(#[case] page: u32, #[case] size: u32) {
        assert_eq!(
            Page::new(page, size).unwrap_err(),
            BankError::InvalidPage { page, size }
        );
    }
}
