//! API response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::storage::Error as StorageError;
use crate::storage::ItemQuery;
use crate::validation::FieldError;
use crate::validation::Violations;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: V,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data,
        }
    }

    pub fn created(data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            data,
        }
    }
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        (self.status_code, Json(self.data)).into_response()
    }
}

/// Confirmation message, used where an endpoint has no record to return
#[derive(Serialize)]
pub struct Message {
    message: String,
}

impl Message {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Position of a list response within the full result set
#[derive(Debug, Serialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
    total: u64,
    pages: u64,
}

impl Pagination {
    pub fn new(query: &ItemQuery, total: u64) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            total,
            pages: total.div_ceil(u64::from(query.limit)),
        }
    }
}

/// Hold data for a failed API interaction
pub struct Error {
    status_code: StatusCode,
    message: String,
    errors: Option<Vec<FieldError>>,
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            errors: None,
        }
    }

    /// A request body failing one or more field constraints
    ///
    /// Reports every violated field
    pub fn validation(violations: Violations) -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: "Validation failed".to_string(),
            errors: Some(violations.into_errors()),
        }
    }

    pub fn unauthorized<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::UNAUTHORIZED,
            message: message.to_string(),
            errors: None,
        }
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: message.to_string(),
            errors: None,
        }
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            errors: None,
        }
    }
}

/// The single place storage failures turn into HTTP responses
///
/// Details are logged here, the response body stays generic
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::Connection(_) | StorageError::Migration(_) => {
                tracing::error!("Storage failure: {err}");

                Self::internal_server_error("Server error")
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorBody {
                message: self.message,
                errors: self.errors,
            }),
        )
            .into_response()
    }
}
