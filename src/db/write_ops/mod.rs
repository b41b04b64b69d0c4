#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod catalog_ops;
mod order_ops;
mod product_ops;
mod promo_ops;
mod schema_ops;
mod story_ops;
mod types;
mod user_ops;

pub use order_ops::{branch_for_update, insert_order};
pub use schema_ops::SCHEMA_SQL;
pub use types::{NewDiscount, NewPromoCode, NewUser};
