use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

/// 列表查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub pagination: Option<Pagination>,
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.pagination = Some(Pagination { page, limit });
        self
    }

    pub fn filter<F: Into<String>, V: Into<String>>(mut self, field: F, value: V) -> Self {
        self.filters.push(Filter::new(field, value));
        self
    }

    pub fn sort_by<F: Into<String>>(mut self, field: F, order: SortOrder) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            order,
        });
        self
    }

    /// Query-string pairs in a stable order: pagination, filters, sort.
    /// Descending sort is encoded with a leading `-`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(pagination) = self.pagination {
            pairs.push(("page".to_string(), pagination.page.to_string()));
            pairs.push(("limit".to_string(), pagination.limit.to_string()));
        }

        for filter in &self.filters {
            pairs.push((filter.field.clone(), filter.value.clone()));
        }

        if let Some(sort) = &self.sort {
            let value = match sort.order {
                SortOrder::Asc => sort.field.clone(),
                SortOrder::Desc => format!("-{}", sort.field),
            };
            pairs.push(("sort".to_string(), value));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_pairs() {
        assert!(ListQuery::new().to_query_pairs().is_empty());
    }

    #[test]
    fn test_query_pairs_order() {
        let query = ListQuery::new()
            .page(2, 25)
            .filter("status", "failed")
            .filter("task_id", "t1")
            .sort_by("queuedAt", SortOrder::Desc);

        let pairs = query.to_query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["page", "limit", "status", "task_id", "sort"]);
        assert_eq!(pairs[1].1, "25");
        assert_eq!(pairs[4].1, "-queuedAt");
    }

    #[test]
    fn test_ascending_sort_has_no_prefix() {
        let pairs = ListQuery::new()
            .sort_by("name", SortOrder::Asc)
            .to_query_pairs();
        assert_eq!(pairs, vec![("sort".to_string(), "name".to_string())]);
    }
}
