//! Video listing query: raw query-string parameters and their validated form.

use serde::Deserialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::{parse_id, parse_positive_int, require_non_blank};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Query string accepted by `GET /videos`. Everything arrives as text so that
/// malformed numbers are reported as validation errors naming the field.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VideoListParams {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub limit: Option<String>,
    /// Case-insensitive title substring, required
    pub query: Option<String>,
    /// createdAt, updatedAt, views, duration or title (default createdAt)
    pub sort_by: Option<String>,
    /// "desc" for descending, anything else ascending
    pub sort_type: Option<String>,
    /// Restrict to videos owned by this user
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Views,
    Duration,
    Title,
}

impl SortField {
    /// Column name in the `videos` table.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Views => "views",
            SortField::Duration => "duration",
            SortField::Title => "title",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "views" => Ok(SortField::Views),
            "duration" => Ok(SortField::Duration),
            "title" => Ok(SortField::Title),
            other => Err(AppError::InvalidInput(format!(
                "sortBy must be one of createdAt, updatedAt, views, duration, title (got '{}')",
                other
            ))),
        }
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Views => "views",
            SortField::Duration => "duration",
            SortField::Title => "title",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the exact string "desc" selects descending order.
    pub fn from_sort_type(sort_type: Option<&str>) -> Self {
        match sort_type {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Validated listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoListQuery {
    pub page: i64,
    pub limit: i64,
    pub search: String,
    pub sort_field: SortField,
    pub direction: SortDirection,
    pub owner_id: Option<Uuid>,
}

impl VideoListQuery {
    pub fn from_params(params: &VideoListParams) -> Result<Self, AppError> {
        let page = parse_positive_int("page", params.page.as_deref(), DEFAULT_PAGE)?;
        let limit = parse_positive_int("limit", params.limit.as_deref(), DEFAULT_LIMIT)?;
        let search = require_non_blank("query", params.query.as_deref())?;

        let sort_field = match params.sort_by.as_deref().map(str::trim) {
            None | Some("") => SortField::CreatedAt,
            Some(raw) => raw.parse()?,
        };
        let direction = SortDirection::from_sort_type(params.sort_type.as_deref());

        let owner_id = match params.user_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_id("userId", raw)?),
        };

        let query = Self {
            page,
            limit,
            search,
            sort_field,
            direction,
            owner_id,
        };
        // Reject pages whose offset cannot be represented
        query.offset()?;
        Ok(query)
    }

    /// Number of matching rows skipped before the page starts: `(page - 1) * limit`.
    pub fn offset(&self) -> Result<i64, AppError> {
        (self.page - 1)
            .checked_mul(self.limit)
            .ok_or_else(|| AppError::InvalidInput("page and limit are too large".to_string()))
    }
}
