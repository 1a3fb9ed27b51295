//! Service layer
//!
//! Business operations over an explicitly passed `SqlitePool`. Services return
//! [`crate::error::ServiceResult`]; handlers convert into `AppError`.

pub mod catalog;
pub mod orders;
pub mod roles;

/// Pagination defaults and ceiling for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

impl PageLimits {
    /// Product search uses fixed limits regardless of configuration
    pub const SEARCH: PageLimits = PageLimits {
        default_size: 20,
        max_size: 100,
    };

    pub fn clamp(self, limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
        shared::util::clamp_page(limit, offset, self.default_size, self.max_size)
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::SEARCH
    }
}
