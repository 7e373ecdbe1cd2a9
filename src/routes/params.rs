use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

/// Page size comes from either `limit` (order/shipment endpoints) or
/// `per_page` (mirror listing); both default to 10.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.limit.or(self.per_page).unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

// The listing query structs repeat the pagination fields instead of
// flattening `Pagination`: serde_urlencoded deserializes every query value
// as a string, and numeric fields under `#[serde(flatten)]` fail to parse.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub per_page: Option<i64>,
    /// Exact status match: Pending, In Progress, Cancelled, Completed.
    pub status: Option<String>,
    /// Case-sensitive substring match on any line item's product brand.
    pub brand: Option<String>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteOrderQuery {
    /// Also soft-delete the order's customer. Off by default because a
    /// customer can own other orders.
    pub purge_customer: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub per_page: Option<i64>,
    pub brand: Option<String>,
    pub search: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderItemQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub per_page: Option<i64>,
    /// Exact brand match, unlike the order listing's substring filter.
    pub brand: Option<String>,
}

impl OrderItemQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DashboardQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    #[test]
    fn defaults_to_page_one_of_ten() {
        let p = Pagination::default();
        assert_eq!(p.normalize(), (1, 10, 0));
    }

    #[test]
    fn limit_wins_over_per_page() {
        let p = Pagination {
            page: Some(3),
            limit: Some(25),
            per_page: Some(50),
        };
        assert_eq!(p.normalize(), (3, 25, 50));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let p = Pagination {
            page: Some(0),
            limit: Some(1000),
            per_page: None,
        };
        assert_eq!(p.normalize(), (1, 100, 0));
    }

    #[test]
    fn order_listing_parses_numeric_pagination_from_query_string() {
        let uri: Uri = "/api/orders?page=2&limit=5&status=Pending".parse().unwrap();
        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination().normalize(), (2, 5, 5));
        assert_eq!(query.status.as_deref(), Some("Pending"));
        assert_eq!(query.brand, None);
    }

    #[test]
    fn product_and_item_listings_parse_numeric_pagination() {
        let uri: Uri = "/api/products?page=3&per_page=20&brand=Acme".parse().unwrap();
        let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination().normalize(), (3, 20, 40));
        assert_eq!(query.brand.as_deref(), Some("Acme"));

        let uri: Uri = "/api/order-item?limit=15".parse().unwrap();
        let Query(query) = Query::<OrderItemQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination().normalize(), (1, 15, 0));
    }
}
