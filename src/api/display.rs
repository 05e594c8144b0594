//! Plain-text price board and its self-refreshing HTML page

use chrono::{DateTime, Utc};

use crate::common::types::{AlertThreshold, Direction};
use crate::engine::PriceBatch;
use crate::notify::format::{format_amount, format_fiat};

const WIDTH: usize = 62;

/// Reload period of the `/display/auto-refresh` page
pub const REFRESH_SECONDS: u32 = 2;

fn rule(left: char, right: char) -> String {
    format!("{}{}{}\n", left, "═".repeat(WIDTH), right)
}

fn row(text: &str) -> String {
    let len = text.chars().count();
    let pad = WIDTH.saturating_sub(len);
    format!("║{}{}║\n", text, " ".repeat(pad))
}

/// Render the board shown at `/display`
///
/// `batch` is `None` before the first successful fetch.
pub fn render_board(
    batch: Option<&PriceBatch>,
    thresholds: &[AlertThreshold],
    currency: &str,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    out.push_str(&rule('╔', '╗'));
    out.push_str(&row(&format!("{:^width$}", "CRYPTO ANALYSER", width = WIDTH)));
    out.push_str(&rule('╠', '╣'));
    out.push_str(&row(&format!(" Now: {}", now.format("%Y-%m-%d %H:%M:%S UTC"))));

    let Some(batch) = batch else {
        out.push_str(&row(" Waiting for the first price fetch..."));
        out.push_str(&rule('╚', '╝'));
        return out;
    };

    out.push_str(&row(&format!(
        " Last update: {} (v{})",
        batch.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        batch.version
    )));
    out.push_str(&rule('╠', '╣'));

    let breaches: Vec<String> = batch
        .snapshots
        .iter()
        .filter_map(|snapshot| {
            let threshold = thresholds.iter().find(|t| t.asset == snapshot.asset)?;
            let label = match threshold.breach(snapshot.price)? {
                Direction::Below => "LOW",
                Direction::Above => "HIGH",
            };
            Some(format!(" {} {} ALERT", snapshot.asset, label))
        })
        .collect();
    if !breaches.is_empty() {
        for line in &breaches {
            out.push_str(&row(line));
        }
        out.push_str(&rule('╠', '╣'));
    }

    for snapshot in &batch.snapshots {
        out.push_str(&row(&format!(
            " {:<16}{}",
            format!("{} ({}):", snapshot.asset.name(), snapshot.asset),
            format_fiat(snapshot.price, currency)
        )));
    }

    if !thresholds.is_empty() {
        out.push_str(&rule('╠', '╣'));
        for threshold in thresholds {
            out.push_str(&row(&format!(
                " {} L={} H={}",
                threshold.asset,
                format_amount(threshold.lower_bound, currency),
                format_amount(threshold.upper_bound, currency)
            )));
        }
    }

    out.push_str(&rule('╚', '╝'));
    out
}

/// Wrap a rendered board in an HTML page that reloads itself
pub fn render_board_page(board: &str) -> String {
    let escaped = board
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta http-equiv="refresh" content="{refresh}">
<title>Crypto Analyser - Display</title>
<style>
body {{ background-color: #000; color: #00ff00; font-family: 'Courier New', monospace; margin: 20px; font-size: 14px; }}
#display {{ border: 1px solid #00ff00; padding: 10px; background-color: #001100; }}
</style>
</head>
<body>
<pre id="display">{board}</pre>
</body>
</html>
"#,
        refresh = REFRESH_SECONDS,
        board = escaped
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Asset, PriceSnapshot};
    use rust_decimal_macros::dec;

    #[test]
    fn test_board_before_first_fetch() {
        let board = render_board(None, &[], "BRL", Utc::now());
        assert!(board.contains("Waiting for the first price fetch"));
    }

    #[test]
    fn test_board_shows_prices_and_breaches() {
        let now = Utc::now();
        let batch = PriceBatch {
            version: 3,
            snapshots: vec![
                PriceSnapshot::new(Asset::Btc, dec!(605000), now),
                PriceSnapshot::new(Asset::Eth, dec!(23000), now),
            ],
            updated_at: now,
        };
        let thresholds = vec![
            AlertThreshold::new(Asset::Btc, dec!(610000), dec!(630000)).unwrap(),
            AlertThreshold::new(Asset::Eth, dec!(20000), dec!(26000)).unwrap(),
        ];

        let board = render_board(Some(&batch), &thresholds, "BRL", now);
        assert!(board.contains("BTC LOW ALERT"));
        assert!(!board.contains("ETH HIGH ALERT"));
        assert!(board.contains("R$ 605.000,00"));
        assert!(board.contains("BTC L=610.000,00 H=630.000,00"));

        // every line has the same visible width
        let widths: Vec<usize> = board.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == WIDTH + 2));
    }

    #[test]
    fn test_board_page_wraps_and_escapes() {
        let page = render_board_page("BTC <LOW> & more");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<meta http-equiv="refresh" content="2">"#));
        assert!(page.contains(r#"<pre id="display">BTC &lt;LOW&gt; &amp; more</pre>"#));
    }
}
