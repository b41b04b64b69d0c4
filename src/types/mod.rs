mod catalog;
mod order;
mod user;

pub use catalog::{
    Branch, Category, Discount, PizzaSize, Product, ProductInput, PromoCode, Story, Subcategory,
};
pub use order::{
    CartItem, CustomerInfo, DeliveryType, Order, OrderQuote, OrderReceipt, OrderRequest,
    OrderStatus, PricedLine,
};
pub use user::{normalize_email, AuthResponse, PublicUser, UserRecord};
