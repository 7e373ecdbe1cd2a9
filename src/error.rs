use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("Catalog fetch failed: {0}")]
    ExternalFetch(String),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ExternalFetch(_) => StatusCode::BAD_GATEWAY,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let errors = match &self {
            AppError::Validation(map) => Some(map.clone()),
            _ => None,
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                errors,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Flatten `validator` derive output into the field -> message map the API
/// returns on 422, so referential checks can be merged into the same map.
pub fn validation_map(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (field, kinds) in errors.errors() {
        collect_errors(field, kinds, &mut map);
    }
    map
}

fn collect_errors(
    prefix: &str,
    kind: &validator::ValidationErrorsKind,
    map: &mut BTreeMap<String, String>,
) {
    match kind {
        validator::ValidationErrorsKind::Field(errs) => {
            if let Some(err) = errs.first() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {prefix} field is invalid ({})", err.code));
                map.insert(prefix.to_string(), message);
            }
        }
        validator::ValidationErrorsKind::Struct(nested) => {
            for (field, kinds) in nested.errors() {
                collect_errors(&format!("{prefix}.{field}"), kinds, map);
            }
        }
        validator::ValidationErrorsKind::List(items) => {
            for (index, nested) in items {
                for (field, kinds) in nested.errors() {
                    collect_errors(&format!("{prefix}.{index}.{field}"), kinds, map);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(range(min = 1))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[test]
    fn flattens_field_and_list_errors() {
        let payload = Outer {
            name: String::new(),
            email: "not-an-email".into(),
            items: vec![Inner { quantity: 0 }],
        };
        let errors = payload.validate().unwrap_err();
        let map = validation_map(&errors);

        assert!(map.contains_key("name"));
        assert!(map.contains_key("email"));
        assert!(map.contains_key("items.0.quantity"));
    }

    #[test]
    fn valid_payload_has_no_errors() {
        let payload = Outer {
            name: "ok".into(),
            email: "a@b.com".into(),
            items: vec![Inner { quantity: 2 }],
        };
        assert!(payload.validate().is_ok());
    }
}
