use crate::config::ApiConfig;
use crate::scope::identity::DEMO_QUERY_PARAM;

use super::schema::{ResourceSchema, SortOrder};
use super::validate::ValidationFailure;

/// Equality filter on one column; several values mean "any of"
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: &'static str,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: &'static str,
    pub sort_order: SortOrder,
    pub search: Option<String>,
    pub filters: Vec<ColumnFilter>,
}

impl ListQuery {
    /// First page in the schema's default order
    pub fn first_page(schema: &ResourceSchema, limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            sort_by: schema.default_sort.0,
            sort_order: schema.default_sort.1,
            search: None,
            filters: Vec::new(),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Parse a raw query string against the schema.
    ///
    /// Reserved keys: `page`, `limit`, `sort_by`/`sortBy`, `sort_order`/`sortOrder`,
    /// `search` and `demo`. Any filterable field is an equality filter; repeated
    /// keys and comma-separated values are merged. `all` disables a filter.
    pub fn parse(schema: &ResourceSchema, raw: Option<&str>, api: &ApiConfig) -> Result<Self, ValidationFailure> {
        let mut query = Self::first_page(schema, api.default_page_size.clamp(1, api.max_page_size.max(1)));
        let mut sort_by: Option<String> = None;

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "page" => query.page = positive(&key, value)?,
                "limit" => query.limit = positive(&key, value)?.min(api.max_page_size.max(1)),
                "sort_by" | "sortBy" => sort_by = Some(value.to_string()),
                "sort_order" | "sortOrder" => {
                    query.sort_order = if value.eq_ignore_ascii_case("asc") {
                        SortOrder::Asc
                    } else {
                        SortOrder::Desc
                    };
                }
                "search" => {
                    if !value.is_empty() {
                        query.search = Some(value.to_string());
                    }
                }
                k if k == DEMO_QUERY_PARAM => {}
                other => {
                    let Some(spec) = schema.field_spec(other).filter(|f| f.filterable) else {
                        continue;
                    };
                    let values = value.split(',').map(str::trim).filter(|v| !v.is_empty());
                    match query.filters.iter_mut().find(|f| f.column == spec.name) {
                        Some(existing) => existing.values.extend(values.map(str::to_string)),
                        None => query.filters.push(ColumnFilter {
                            column: spec.name,
                            values: values.map(str::to_string).collect(),
                        }),
                    }
                }
            }
        }

        query
            .filters
            .retain(|f| !f.values.is_empty() && !f.values.iter().any(|v| v == "all"));

        if let Some(column) = sort_by.filter(|c| !c.is_empty()) {
            query.sort_by = sortable_column(schema, &column).ok_or_else(|| ValidationFailure::Query {
                field: "sort_by".to_string(),
                message: format!("cannot sort by '{}'", column),
            })?;
        }

        Ok(query)
    }
}

fn positive(key: &str, value: &str) -> Result<u32, ValidationFailure> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ValidationFailure::Query {
            field: key.to_string(),
            message: "must be a positive integer".to_string(),
        }),
    }
}

fn sortable_column(schema: &ResourceSchema, column: &str) -> Option<&'static str> {
    if !schema.is_sortable(column) {
        return None;
    }
    schema
        .columns()
        .into_iter()
        .find(|c| *c == column)
}
