//! Fiat price formatting for notifications and the price board

use rust_decimal::{Decimal, RoundingStrategy};

/// Currencies that write decimals with a comma and group thousands with a dot
const COMMA_DECIMAL_CURRENCIES: &[&str] = &["BRL", "EUR"];

fn currency_sign(currency: &str) -> String {
    match currency {
        "BRL" => "R$".to_string(),
        "EUR" => "€".to_string(),
        "USD" => "$".to_string(),
        other => other.to_string(),
    }
}

/// Render a price with two decimals and thousands grouping
///
/// `format_amount(dec!(615576), "BRL") == "615.576,00"`
pub fn format_amount(price: Decimal, currency: &str) -> String {
    let currency = currency.to_ascii_uppercase();
    let (thousands, decimal) = if COMMA_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        ('.', ',')
    } else {
        (',', '.')
    };

    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    format!(
        "{}{}{}{}",
        if negative { "-" } else { "" },
        grouped,
        decimal,
        frac_part
    )
}

/// Render a price prefixed with its currency sign, e.g. `R$ 615.576,00`
pub fn format_fiat(price: Decimal, currency: &str) -> String {
    let currency = currency.to_ascii_uppercase();
    format!("{} {}", currency_sign(&currency), format_amount(price, &currency))
}
