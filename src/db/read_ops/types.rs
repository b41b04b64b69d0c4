use sqlx::types::Json;
use sqlx::FromRow;

use crate::types::PricedLine;

#[derive(FromRow)]
pub(crate) struct OrderRow {
    pub(crate) id: i64,
    pub(crate) branch_id: i32,
    pub(crate) customer_name: String,
    pub(crate) phone: String,
    pub(crate) address: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) delivery_type: String,
    pub(crate) payment_method: Option<String>,
    pub(crate) items: Json<Vec<PricedLine>>,
    pub(crate) subtotal: f64,
    pub(crate) discount_amount: f64,
    pub(crate) total: f64,
    pub(crate) promo_code: Option<String>,
    pub(crate) status: String,
    pub(crate) created_at: chrono::DateTime<chrono::Utc>,
}
