use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::catalog::PizzaSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Accepted,
    Cooking,
    Delivering,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Accepted => "accepted",
            Self::Cooking => "cooking",
            Self::Delivering => "delivering",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for OrderStatus {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, String> {
        match s {
            "new" => Ok(Self::New),
            "accepted" => Ok(Self::Accepted),
            "cooking" => Ok(Self::Cooking),
            "delivering" => Ok(Self::Delivering),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown order status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    #[default]
    Delivery,
    Pickup,
}

impl DeliveryType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }
}

impl TryFrom<&str> for DeliveryType {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, String> {
        match s {
            "delivery" => Ok(Self::Delivery),
            "pickup" => Ok(Self::Pickup),
            _ => Err(format!("Unknown delivery type: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub address: Option<String>,
    pub comment: Option<String>,
}

/// Case-insensitive size; `"single"` and unknown labels mean no size.
fn lenient_size<'de, D>(deserializer: D) -> std::result::Result<Option<PizzaSize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| PizzaSize::try_from(s.trim()).ok()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: i32,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<PizzaSize>,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub branch_id: i32,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub promo_code: Option<String>,
}

/// One cart line after server-side pricing. Persisted as part of the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: i32,
    pub name: String,
    pub size: Option<PizzaSize>,
    pub quantity: u32,
    pub unit_price: f64,
    pub discount_percent: i32,
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub lines: Vec<PricedLine>,
    /// Sum of lines before any discount.
    pub gross: f64,
    /// Sum of lines after per-product discounts.
    pub subtotal: f64,
    pub promo_code: Option<String>,
    pub promo_percent: i32,
    /// Everything taken off `gross`, product discounts and promo code together.
    pub discount_amount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub branch_id: i32,
    pub customer_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub delivery_type: DeliveryType,
    pub payment_method: Option<String>,
    pub items: Vec<PricedLine>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub total: f64,
    pub promo_code: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: i64,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub total: f64,
    pub status: OrderStatus,
}
