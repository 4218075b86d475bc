//! WhatsApp hand-off: chat deep links and message templates.
//!
//! The storefront never sends messages itself. It composes the text and the
//! links that open a chat with the admin number; the client opens them.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::models::{ContactMessage, Product, QuoteRecord};

/// Characters left alone by a URI component encoder.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Shortest digit string accepted as a chat number.
const MIN_PHONE_DIGITS: usize = 7;

/// Message text plus the links that open it in a chat.
///
/// Without a usable admin number the links are absent and the client shares
/// `message` by hand.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHandoff {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_link: Option<String>,
}

impl ChatHandoff {
    /// Hand-off addressed to `number` when it is usable.
    pub fn to_number(message: String, number: Option<&str>) -> Self {
        match number.and_then(usable_number) {
            Some(digits) => ChatHandoff {
                link: Some(wa_me_link(&digits, &message)),
                native_link: Some(native_link(&digits, &message)),
                message,
            },
            None => ChatHandoff {
                message,
                link: None,
                native_link: None,
            },
        }
    }
}

/// Keep ASCII digits only.
pub fn sanitize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Sanitised number, when it has enough digits to dial.
pub fn usable_number(raw: &str) -> Option<String> {
    let digits = sanitize_phone(raw);
    (digits.len() >= MIN_PHONE_DIGITS).then_some(digits)
}

pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

pub fn wa_me_link(digits: &str, text: &str) -> String {
    format!("https://wa.me/{}?text={}", digits, encode_component(text))
}

pub fn native_link(digits: &str, text: &str) -> String {
    format!(
        "whatsapp://send?phone={}&text={}",
        digits,
        encode_component(text)
    )
}

/// Share link with no recipient; the user picks the chat.
pub fn web_share_link(text: &str) -> String {
    format!(
        "https://web.whatsapp.com/send?text={}",
        encode_component(text)
    )
}

/// Colombian pesos without decimals: `$ 35.000`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "$ 0".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("-$ {}", grouped)
    } else {
        format!("$ {}", grouped)
    }
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

/// Text sent to the admin for a new quote request.
pub fn quote_message(quote: &QuoteRecord) -> String {
    let items = quote
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            format!(
                "{}. {} x{} - {} each",
                idx + 1,
                item.product_name.as_deref().unwrap_or(&item.product_id),
                item.quantity,
                format_price(item.base_price)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Hola, solicito una cotización:\n\nNombre: {}\nTel: {}\nEmail: {}\n\nItems:\n{}\n\nTotal estimado: {}\nUrgencia: {}\nDetalles: {}",
        quote.customer_name,
        or_dash(quote.customer_phone.as_deref()),
        or_dash(quote.customer_email.as_deref()),
        items,
        format_price(quote.total_estimate),
        quote.urgency.as_str(),
        or_dash(quote.special_requests.as_deref()),
    )
}

/// Text sent to the admin for a new contact form message.
pub fn contact_message(message: &ContactMessage) -> String {
    let record = &message.record;
    format!(
        "Nuevo mensaje de contacto:\n\nNombre: {}\nTel: {}\nEmail: {}\nAsunto: {}\n\nMensaje:\n{}\n\nID: {}",
        record.name,
        or_dash(record.phone.as_deref()),
        record.email,
        record.subject,
        record.message,
        message.id,
    )
}

/// Hand-off asking about one product. Falls back to a share link when there
/// is no admin number.
pub fn product_inquiry(product: &Product, admin_number: Option<&str>) -> ChatHandoff {
    let message = format!(
        "Hola, quiero cotizar este producto: {} (id: {}). Precio base: {}.",
        product.name,
        product.id,
        format_price(product.base_price)
    );
    let mut handoff = ChatHandoff::to_number(message, admin_number);
    if handoff.link.is_none() {
        handoff.link = Some(web_share_link(&handoff.message));
    }
    handoff
}
