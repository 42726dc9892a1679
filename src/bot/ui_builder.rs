//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html::escape;

use crate::cart::CartLine;
use crate::cms::Product;

/// Create the catalog keyboard, one product per row plus a cart shortcut
pub fn create_menu_keyboard(products: &[Product]) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|product| {
            vec![InlineKeyboardButton::callback(
                product.title.clone(),
                product.document_id.clone(),
            )]
        })
        .collect();

    buttons.push(vec![InlineKeyboardButton::callback("🧺 My cart", "my_cart")]);

    InlineKeyboardMarkup::new(buttons)
}

/// Create the keyboard shown under a product detail message
pub fn create_product_keyboard(product: &Product) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🛒 Add to cart",
            format!("add_to_cart:{}", product.document_id),
        )],
        vec![InlineKeyboardButton::callback("🧺 My cart", "my_cart")],
        vec![InlineKeyboardButton::callback(
            "⬅️ Back to the list",
            "back_to_menu",
        )],
    ])
}

/// Create the cart keyboard with a remove button per line
pub fn create_cart_keyboard(lines: &[CartLine]) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = lines
        .iter()
        .map(|line| {
            vec![InlineKeyboardButton::callback(
                format!("❌ Remove: {}", line.title),
                format!("remove_item:{}", line.document_id),
            )]
        })
        .collect();

    buttons.push(vec![InlineKeyboardButton::callback(
        "⬅️ Back to menu",
        "back_to_menu",
    )]);
    buttons.push(vec![InlineKeyboardButton::callback("💳 Checkout", "pay")]);

    InlineKeyboardMarkup::new(buttons)
}

/// Fallback keyboard when the cart itself could not be loaded
pub fn create_cart_error_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "⬅️ Back to menu",
        "back_to_menu",
    )]])
}

/// Format the HTML caption for a product detail message
pub fn format_product_caption(product: &Product) -> String {
    format!(
        "🐟 <b>{}</b>\n\n💰 <b>Price:</b> ${:.2}/kg\n\n📝 <b>Description:</b>\n{}",
        escape(&product.title),
        product.price,
        escape(&product.description)
    )
}

/// Format the cart contents with per-line subtotals and a grand total
pub fn format_cart_message(lines: &[CartLine]) -> String {
    if lines.is_empty() {
        return "🧺 Your cart is empty.".to_string();
    }

    let mut out: Vec<String> = vec!["🧺 <b>Your cart:</b>\n".to_string()];
    let mut total: Option<f64> = None;

    for line in lines {
        match (line.price, line.subtotal()) {
            (Some(price), Some(subtotal)) => {
                total = Some(total.unwrap_or(0.0) + subtotal);
                out.push(format!(
                    "• {}: {} × ${:.2} = <b>${:.2}</b>",
                    escape(&line.title),
                    line.quantity,
                    price,
                    subtotal
                ));
            }
            _ => out.push(format!("• {}: {}", escape(&line.title), line.quantity)),
        }
    }

    if let Some(total) = total {
        out.push(format!("\n<b>Total:</b> ${total:.2}"));
    }

    out.join("\n")
}
