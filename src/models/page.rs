use serde::Serialize;

/// One page of a listing plus the totals of the unpaginated result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_records: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(results: Vec<T>, total_records: u64, current_page: u64, page_size: u64) -> Self {
        Self {
            total_records,
            current_page,
            total_pages: total_records.div_ceil(page_size.max(1)),
            page_size,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_records: self.total_records,
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Page::new(vec![1, 2], 51, 3, 25).total_pages, 3);
        assert_eq!(Page::<i32>::new(vec![], 0, 1, 25).total_pages, 0);
        assert_eq!(Page::new(vec![1], 25, 1, 25).total_pages, 1);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Page::new(vec!["a"], 1, 1, 10)).unwrap();
        assert_eq!(json["totalRecords"], 1);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["results"][0], "a");
    }
}
