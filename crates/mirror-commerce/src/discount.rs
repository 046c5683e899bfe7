//! Palindrome discount calculation.

use serde::{Deserialize, Serialize};

use crate::palindrome::is_palindrome;

/// Discount granted when the search term is a palindrome.
pub const PALINDROME_DISCOUNT_PERCENT: u8 = 50;

/// Price breakdown for one product under one search term.
///
/// `final_price + discount_amount == original_price`, and
/// `discount_percentage` is either 0 or [`PALINDROME_DISCOUNT_PERCENT`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResult {
    pub original_price: f64,
    pub final_price: f64,
    pub discount_percentage: u8,
    pub discount_amount: f64,
    pub is_palindrome: bool,
}

impl DiscountResult {
    /// Full price, no discount.
    pub fn undiscounted(original_price: f64) -> Self {
        Self {
            original_price,
            final_price: original_price,
            discount_percentage: 0,
            discount_amount: 0.0,
            is_palindrome: false,
        }
    }

    /// Whether any discount was applied.
    pub fn is_discounted(&self) -> bool {
        self.discount_percentage > 0
    }
}

/// Price `original_price` for a search made with `search_term`.
///
/// The price is not validated: a negative or NaN price flows through the
/// arithmetic unchanged.
///
/// ```
/// use mirror_commerce::discount::calculate_discounted_price;
///
/// let result = calculate_discounted_price(100.0, "abba");
/// assert_eq!(result.final_price, 50.0);
/// assert_eq!(result.discount_percentage, 50);
/// ```
pub fn calculate_discounted_price(original_price: f64, search_term: &str) -> DiscountResult {
    let is_palindrome = is_palindrome(search_term);
    let discount_percentage = if is_palindrome {
        PALINDROME_DISCOUNT_PERCENT
    } else {
        0
    };

    let discount_amount = original_price * f64::from(discount_percentage) / 100.0;

    DiscountResult {
        original_price,
        final_price: original_price - discount_amount,
        discount_percentage,
        discount_amount,
        is_palindrome,
    }
}
