use serde::Deserialize;

/// Page/limit query parameters shared by the listing endpoints.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    /// One-based page number, defaulting to the first page.
    pub fn page(&self) -> u64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit_or(&self, default: u64) -> u64 {
        self.limit.filter(|l| *l >= 1).unwrap_or(default)
    }
}

pub fn total_pages(total_items: u64, per_page: u64) -> u64 {
    total_items.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = PageQuery {
            page: None,
            limit: None,
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit_or(10), 10);
    }

    #[test]
    fn test_zero_page_falls_back_to_first() {
        let q = PageQuery {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit_or(5), 5);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(9, 5), 2);
    }
}
