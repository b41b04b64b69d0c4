use std::fmt::Write;

use itertools::Itertools;

use crate::types::{Branch, DeliveryType, OrderQuote, OrderRequest};

/// Escapes text for Telegram's HTML parse mode.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Renders the chat message sent to a branch for a new order.
#[must_use]
pub fn format_order_message(
    order_id: i64,
    branch: &Branch,
    request: &OrderRequest,
    quote: &OrderQuote,
) -> String {
    let customer = &request.customer;
    let mut text = String::new();

    let _ = writeln!(text, "🍕 <b>New order #{order_id}</b>");
    let _ = writeln!(text, "Branch: {}", escape_html(&branch.name));
    let _ = writeln!(text, "Customer: {}", escape_html(&customer.name));
    let _ = writeln!(text, "Phone: {}", escape_html(&customer.phone));

    match request.delivery_type {
        DeliveryType::Delivery => {
            let _ = writeln!(
                text,
                "Delivery: {}",
                escape_html(customer.address.as_deref().unwrap_or("-"))
            );
        }
        DeliveryType::Pickup => {
            let _ = writeln!(text, "Pickup");
        }
    }
    if let Some(payment) = request.payment_method.as_deref().filter(|p| !p.is_empty()) {
        let _ = writeln!(text, "Payment: {}", escape_html(payment));
    }
    if let Some(comment) = customer.comment.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = writeln!(text, "Comment: {}", escape_html(comment));
    }

    let lines = quote
        .lines
        .iter()
        .map(|line| {
            let size = line
                .size
                .map(|size| format!(" ({size})"))
                .unwrap_or_default();
            let discount = if line.discount_percent > 0 {
                format!(" -{}%", line.discount_percent)
            } else {
                String::new()
            };
            format!(
                "• {}{size} × {} = {}{discount}",
                escape_html(&line.name),
                line.quantity,
                money(line.line_total)
            )
        })
        .join("\n");
    let _ = writeln!(text, "\n<b>Items:</b>\n{lines}\n");

    let _ = writeln!(text, "Subtotal: {}", money(quote.subtotal));
    if let Some(code) = &quote.promo_code {
        let _ = writeln!(
            text,
            "Promo code: {} (-{}%)",
            escape_html(code),
            quote.promo_percent
        );
    }
    if quote.discount_amount > 0.0 {
        let _ = writeln!(text, "Discount: {}", money(quote.discount_amount));
    }
    let _ = write!(text, "<b>Total: {}</b>", money(quote.total));

    text
}
