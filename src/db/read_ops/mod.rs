mod catalog_queries;
mod order_queries;
pub(crate) mod types;
mod user_queries;
