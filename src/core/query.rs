//! Reusable filter/pagination scopes for list queries.
//!
//! Every repository list/count path goes through these helpers so that
//! pagination clamping, date ranges, free-text search and ID allow-lists
//! behave identically across modules. Column names are always repository
//! constants, never caller input.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{MySql, QueryBuilder};

/// Limit/offset pagination with server-side clamping
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn apply(&self, qb: &mut QueryBuilder<'_, MySql>) {
        qb.push(" LIMIT ");
        qb.push_bind(self.limit());
        qb.push(" OFFSET ");
        qb.push_bind(self.offset());
    }
}

/// Inclusive-from / exclusive-to timestamp range
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn apply(&self, qb: &mut QueryBuilder<'_, MySql>, column: &str) {
        if let Some(from) = self.from {
            qb.push(" AND ");
            qb.push(column);
            qb.push(" >= ");
            qb.push_bind(from);
        }
        if let Some(to) = self.to {
            qb.push(" AND ");
            qb.push(column);
            qb.push(" < ");
            qb.push_bind(to);
        }
    }
}

/// Result ordering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Case-insensitive LIKE search over the given columns
pub fn push_search(qb: &mut QueryBuilder<'_, MySql>, columns: &[&str], term: &str) {
    let pattern = format!("%{}%", term.trim());

    qb.push(" AND (");
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            qb.push(" OR ");
        }
        qb.push(*column);
        qb.push(" LIKE ");
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

/// Restrict results to an explicit ID allow-list
pub fn push_id_allow_list(qb: &mut QueryBuilder<'_, MySql>, column: &str, ids: &[String]) {
    qb.push(" AND ");
    qb.push(column);
    qb.push(" IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    qb.push(")");
}
