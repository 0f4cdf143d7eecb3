use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 2500;
pub const CATEGORY_MAX_LEN: usize = 255;

/// Catalog item as owned by the product store. The id is store-assigned
/// and immutable; `created_date <= last_updated_date` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub created_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

/// Inbound create/update payload. Mutable fields are replaced wholesale
/// on update, not merged.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub stock: Option<u32>,
}

impl ProductRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.name.len() > NAME_MAX_LEN {
            return Err("Name must be at most 255 characters".to_string());
        }
        if let Some(description) = &self.description {
            if description.len() > DESCRIPTION_MAX_LEN {
                return Err("Description must be at most 2500 characters".to_string());
            }
        }
        if self.price <= Decimal::ZERO {
            return Err("Price must be greater than zero".to_string());
        }
        if let Some(category) = &self.category {
            if category.len() > CATEGORY_MAX_LEN {
                return Err("Category must be at most 255 characters".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub created_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    // Explicit field-by-field mapping between the persisted shape and the
    // response shape; a missing field here is a compile error.
    fn from(product: &Product) -> Self {
        ProductResponse {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            stock: product.stock,
            created_date: product.created_date,
            last_updated_date: product.last_updated_date,
        }
    }
}

/// Pagination envelope for the list-all endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub content: Vec<ProductResponse>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn valid_request() -> ProductRequest {
        ProductRequest {
            name: "Widget".to_string(),
            description: Some("A widget".to_string()),
            price: Decimal::new(999, 2),
            category: Some("tools".to_string()),
            stock: Some(5),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn blank_name_rejected() {
        let mut req = valid_request();
        req.name = "   ".to_string();
        assert_eq!(req.validate().unwrap_err(), "Product name is required");
    }

    #[test]
    fn oversized_name_rejected() {
        let mut req = valid_request();
        req.name = "x".repeat(256);
        assert_eq!(
            req.validate().unwrap_err(),
            "Name must be at most 255 characters"
        );
    }

    #[test]
    fn oversized_description_rejected() {
        let mut req = valid_request();
        req.description = Some("x".repeat(2501));
        assert_eq!(
            req.validate().unwrap_err(),
            "Description must be at most 2500 characters"
        );
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut req = valid_request();
        req.price = Decimal::ZERO;
        assert_eq!(
            req.validate().unwrap_err(),
            "Price must be greater than zero"
        );
        req.price = Decimal::new(-100, 2);
        assert!(req.validate().is_err());
    }

    #[test]
    fn response_maps_every_field() {
        let now = Utc::now();
        let product = Product {
            id: 7,
            name: "Widget".to_string(),
            description: None,
            price: Decimal::new(999, 2),
            category: Some("tools".to_string()),
            stock: Some(5),
            created_date: now,
            last_updated_date: now,
        };
        let response = ProductResponse::from(&product);
        assert_eq!(response.id, 7);
        assert_eq!(response.name, "Widget");
        assert_eq!(response.price, Decimal::new(999, 2));
        assert_eq!(response.category.as_deref(), Some("tools"));
        assert_eq!(response.created_date, now);
    }

    #[test]
    fn response_uses_camel_case_field_names() {
        let now = Utc::now();
        let product = Product {
            id: 1,
            name: "Widget".to_string(),
            description: None,
            price: Decimal::new(100, 2),
            category: None,
            stock: None,
            created_date: now,
            last_updated_date: now,
        };
        let json = serde_json::to_value(ProductResponse::from(&product)).unwrap();
        assert!(json.get("createdDate").is_some());
        assert!(json.get("lastUpdatedDate").is_some());
        assert!(json.get("created_date").is_none());
    }
}
