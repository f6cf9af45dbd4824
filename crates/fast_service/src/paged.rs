//! One page of a larger result set.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// A page of `items` out of `total`, with 1-based `page` numbering.
///
/// Serializes with the derived `pages`, `has_next` and `has_previous`
/// fields so clients don't recompute them. Deserializing ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, size: u32) -> Self {
        Self {
            items,
            total,
            page,
            size,
        }
    }

    /// No items on the given page.
    pub fn empty(page: u32, size: u32) -> Self {
        Self::new(Vec::new(), 0, page, size)
    }

    /// Number of pages, zero when `size` is zero.
    pub fn pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(u64::from(self.size))
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self::empty(1, 10)
    }
}

impl<T: Serialize> Serialize for PagedResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PagedResult", 7)?;
        state.serialize_field("items", &self.items)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("page", &self.page)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("pages", &self.pages())?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("has_previous", &self.has_previous())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(95, 20, 5)]
    #[case(42, 0, 0)]
    fn test_pages(#[case] total: u64, #[case] size: u32, #[case] expected: u64) {
        let page = PagedResult::<u8>::new(Vec::new(), total, 1, size);
        assert_eq!(page.pages(), expected);
    }

    #[rstest]
    #[case(1, false, true)]
    #[case(2, true, true)]
    #[case(3, true, false)]
    #[case(4, true, false)]
    fn test_navigation(#[case] page: u32, #[case] previous: bool, #[case] next: bool) {
        let result = PagedResult::<u8>::new(Vec::new(), 25, page, 10);
        assert_eq!(result.has_previous(), previous);
        assert_eq!(result.has_next(), next);
    }

    #[test]
    fn test_default_is_first_empty_page() {
        let page = PagedResult::<String>::default();
        assert!(page.items.is_empty());
        assert_eq!((page.total, page.page, page.size), (0, 1, 10));
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_serializes_derived_fields() {
        let page = PagedResult::new(vec!["a", "b"], 12, 1, 2);
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({
                "items": ["a", "b"],
                "total": 12,
                "page": 1,
                "size": 2,
                "pages": 6,
                "has_next": true,
                "has_previous": false,
            })
        );
    }

    #[test]
    fn test_deserialize_ignores_derived_fields() {
        let page: PagedResult<u32> = serde_json::from_value(json!({
            "items": [7],
            "total": 1,
            "page": 1,
            "size": 10,
            "pages": 99,
            "has_next": true,
        }))
        .unwrap();
        assert_eq!(page, PagedResult::new(vec![7], 1, 1, 10));
    }

    #[test]
    fn test_map_keeps_paging() {
        let page = PagedResult::new(vec![1, 2], 40, 3, 2).map(|n| n * 10);
        assert_eq!(page.items, [10, 20]);
        assert_eq!((page.total, page.page, page.size), (40, 3, 2));
    }
}
