use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub current_page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
    pub last_page: Option<i64>,
}

impl Meta {
    pub fn new(current_page: i64, per_page: i64, total: i64) -> Self {
        let last_page = if per_page > 0 {
            ((total + per_page - 1) / per_page).max(1)
        } else {
            1
        };
        Self {
            current_page: Some(current_page),
            per_page: Some(per_page),
            total: Some(total),
            last_page: Some(last_page),
        }
    }

    pub fn empty() -> Self {
        Self {
            current_page: None,
            per_page: None,
            total: None,
            last_page: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_rounds_up() {
        let meta = Meta::new(1, 10, 25);
        assert_eq!(meta.last_page, Some(3));
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let meta = Meta::new(1, 10, 0);
        assert_eq!(meta.last_page, Some(1));
    }
}
