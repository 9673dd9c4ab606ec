//! Value objects recorded on orders.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A price-frozen copy of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price at order creation.
    pub price: Money,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// Where and how to deliver. Address and phone are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub shipping_address: String,
    pub phone_number: String,
    pub notes: Option<String>,
}

impl ShippingDetails {
    pub fn new(
        shipping_address: &str,
        phone_number: &str,
        notes: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let shipping_address = shipping_address.trim();
        if shipping_address.is_empty() {
            return Err(ValidationError::MissingField {
                field: "shippingAddress",
            });
        }
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(ValidationError::MissingField {
                field: "phoneNumber",
            });
        }
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            shipping_address: shipping_address.to_string(),
            phone_number: phone_number.to_string(),
            notes,
        })
    }
}

/// Settlement method. Recorded only; nothing is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
}
