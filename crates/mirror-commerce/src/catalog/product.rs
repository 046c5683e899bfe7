//! Product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::discount::{calculate_discounted_price, DiscountResult};
use crate::error::CommerceError;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier (positive).
    pub id: i64,
    pub title: String,
    pub brand: String,
    pub description: String,
    /// Unit price.
    pub price: f64,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Price this product for a search made with `search_term`.
    pub fn priced_for(&self, search_term: &str) -> ProductWithDiscount {
        ProductWithDiscount::new(self, calculate_discounted_price(self.price, search_term))
    }

    /// This product at full price.
    pub fn undiscounted(&self) -> ProductWithDiscount {
        ProductWithDiscount::new(self, DiscountResult::undiscounted(self.price))
    }
}

/// Product data before the store assigns an id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub brand: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
}

impl NewProduct {
    pub fn new(title: impl Into<String>, brand: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            brand: brand.into(),
            description: String::new(),
            price,
            image_url: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    /// Check the record before it is stored.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.title.trim().is_empty() {
            return Err(CommerceError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }
        if self.brand.trim().is_empty() {
            return Err(CommerceError::ValidationError(
                "brand must not be empty".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CommerceError::ValidationError(format!(
                "price must be a non-negative number, got {}",
                self.price
            )));
        }
        Ok(())
    }

    /// Attach store-assigned fields.
    pub fn into_product(self, id: i64, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            title: self.title,
            brand: self.brand,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            created_at,
        }
    }
}

/// A product as returned by search: the record without its raw price,
/// plus the price breakdown for the search term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithDiscount {
    pub id: i64,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub original_price: f64,
    pub final_price: f64,
    pub discount_percentage: u8,
    pub discount_amount: f64,
}

impl ProductWithDiscount {
    pub fn new(product: &Product, pricing: DiscountResult) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            created_at: product.created_at,
            original_price: pricing.original_price,
            final_price: pricing.final_price,
            discount_percentage: pricing.discount_percentage,
            discount_amount: pricing.discount_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        NewProduct::new("level", "TestBrand", 49.99)
            .with_description("Producto de prueba")
            .into_product(9, Utc::now())
    }

    #[test]
    fn test_priced_for_palindrome() {
        let priced = sample().priced_for("Level");
        assert_eq!(priced.id, 9);
        assert_eq!(priced.original_price, 49.99);
        assert_eq!(priced.discount_percentage, 50);
        assert!((priced.final_price + priced.discount_amount - 49.99).abs() < 1e-9);
    }

    #[test]
    fn test_undiscounted() {
        let priced = sample().undiscounted();
        assert_eq!(priced.final_price, 49.99);
        assert_eq!(priced.discount_percentage, 0);
        assert_eq!(priced.discount_amount, 0.0);
    }

    #[test]
    fn test_json_field_names() {
        let value = serde_json::to_value(sample().undiscounted()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "id",
            "title",
            "brand",
            "description",
            "imageUrl",
            "createdAt",
            "originalPrice",
            "finalPrice",
            "discountPercentage",
            "discountAmount",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(!object.contains_key("price"));
    }

    #[test]
    fn test_validate() {
        assert!(NewProduct::new("Monitor 4K", "DisplayTech", 399.99)
            .validate()
            .is_ok());
        assert!(NewProduct::new(" ", "DisplayTech", 1.0).validate().is_err());
        assert!(NewProduct::new("Monitor", "", 1.0).validate().is_err());
        assert!(NewProduct::new("Monitor", "X", -1.0).validate().is_err());
        assert!(NewProduct::new("Monitor", "X", f64::NAN).validate().is_err());
    }
}
