use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Branch {
    /// Strips the notification target before the branch leaves the admin surface.
    #[must_use]
    pub fn redacted(self) -> Self {
        Self {
            telegram_chat_id: None,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Subcategory joined with its parent category name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subcategory {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub category_name: String,
}

/// Product joined with branch, category, subcategory names and the active discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_small: Option<f64>,
    pub price_medium: Option<f64>,
    pub price_large: Option<f64>,
    pub price_single: Option<f64>,
    pub branch_id: i32,
    pub category_id: i32,
    pub sub_category_id: Option<i32>,
    pub is_pizza: bool,
    pub mini_recipe: Option<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub branch_name: Option<String>,
    pub category_name: Option<String>,
    pub subcategory_name: Option<String>,
    pub discount_percent: Option<i32>,
}

impl Product {
    #[must_use]
    pub const fn sized_price(&self, size: PizzaSize) -> Option<f64> {
        match size {
            PizzaSize::Small => self.price_small,
            PizzaSize::Medium => self.price_medium,
            PizzaSize::Large => self.price_large,
        }
    }

    /// Price for the requested size. Unknown or missing sizes fall back to the
    /// single price, then to the first size that has a price at all.
    #[must_use]
    pub fn price_for(&self, size: Option<PizzaSize>) -> Option<f64> {
        size.and_then(|s| self.sized_price(s))
            .or(self.price_single).or_else(|| {
            [self.price_small, self.price_medium, self.price_large]
                .into_iter()
                .flatten()
                .next()
        })
    }
}

/// Product fields written by create/update, after form parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price_small: Option<f64>,
    pub price_medium: Option<f64>,
    pub price_large: Option<f64>,
    pub price_single: Option<f64>,
    pub branch_id: i32,
    pub category_id: i32,
    pub sub_category_id: Option<i32>,
    pub is_pizza: bool,
    pub mini_recipe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Discount {
    pub id: i32,
    pub product_id: i32,
    pub discount_percent: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PromoCode {
    pub id: i32,
    pub code: String,
    pub discount_percent: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Story {
    pub id: i32,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PizzaSize {
    Small,
    Medium,
    Large,
}

impl PizzaSize {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for PizzaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PizzaSize {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(format!("Unknown size: {s}")),
        }
    }
}
