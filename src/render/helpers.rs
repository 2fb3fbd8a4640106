//! Handlebars helpers exposed to the markup skeleton.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

/// Register every helper the skeleton uses.
pub fn register(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("eq", Box::new(eq));
    handlebars.register_helper("ne", Box::new(ne));
    handlebars.register_helper("gt", Box::new(gt));
    handlebars.register_helper("lt", Box::new(lt));
    handlebars.register_helper("and", Box::new(and));
    handlebars.register_helper("or", Box::new(or));
    handlebars.register_helper("not", Box::new(not));
    handlebars.register_helper("default", Box::new(default));
    handlebars.register_helper("format_date", Box::new(format_date));
    handlebars.register_helper("format_currency", Box::new(format_currency));
    handlebars.register_helper("format_number", Box::new(format_number));
    handlebars.register_helper("truncate", Box::new(truncate));
    handlebars.register_helper("countdown_days", Box::new(countdown_days));
    handlebars.register_helper("countdown_hours", Box::new(countdown_hours));
    handlebars.register_helper("countdown_minutes", Box::new(countdown_minutes));
    handlebars.register_helper("countdown_seconds", Box::new(countdown_seconds));
    handlebars.register_helper("is_expired", Box::new(is_expired));
}

handlebars_helper!(eq: |x: Json, y: Json| x == y);
handlebars_helper!(ne: |x: Json, y: Json| x != y);
handlebars_helper!(gt: |x: f64, y: f64| x > y);
handlebars_helper!(lt: |x: f64, y: f64| x < y);
handlebars_helper!(and: |x: Json, y: Json| truthy(x) && truthy(y));
handlebars_helper!(or: |x: Json, y: Json| truthy(x) || truthy(y));
handlebars_helper!(not: |x: Json| !truthy(x));

// Missing paths arrive as null in non-strict mode, which is what makes
// this usable for attribute defaults in the skeleton.
handlebars_helper!(default: |value: Json, fallback: Json| {
    if value.is_null() { fallback.clone() } else { value.clone() }
});

handlebars_helper!(format_date: |value: str, style: str| format_date_impl(value, style));
handlebars_helper!(format_currency: |amount: f64, currency: str| format_currency_impl(amount, currency));
handlebars_helper!(format_number: |value: f64| group_thousands(value));
handlebars_helper!(truncate: |text: str, len: u64| truncate_impl(text, len as usize));

handlebars_helper!(countdown_days: |target: str| remaining(target).num_days());
handlebars_helper!(countdown_hours: |target: str| remaining(target).num_hours() % 24);
handlebars_helper!(countdown_minutes: |target: str| remaining(target).num_minutes() % 60);
handlebars_helper!(countdown_seconds: |target: str| remaining(target).num_seconds() % 60);
handlebars_helper!(is_expired: |target: str| remaining(target).is_zero());

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Accepts an RFC 3339 instant or a plain YYYY-MM-DD date (midnight UTC).
fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Time left until the target instant, clamped to zero once passed.
fn remaining(target: &str) -> Duration {
    parse_instant(target)
        .map(|instant| instant.signed_duration_since(Utc::now()))
        .filter(|left| *left > Duration::zero())
        .unwrap_or_else(Duration::zero)
}

fn format_date_impl(value: &str, style: &str) -> String {
    let Some(instant) = parse_instant(value) else {
        // unparseable input passes through rather than failing the render
        return value.to_string();
    };

    match style {
        "short" => instant.format("%b %-d, %Y").to_string(),
        "long" => instant.format("%B %-d, %Y").to_string(),
        "time" => instant.format("%-I:%M %p").to_string(),
        "iso" => instant.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        _ => instant.format("%Y-%m-%d").to_string(),
    }
}

fn format_currency_impl(amount: f64, currency: &str) -> String {
    let symbol = match currency {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        other => return format!("{} {}", other, with_decimals(amount)),
    };
    format!("{}{}", symbol, with_decimals(amount))
}

fn with_decimals(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();
    format!("{}.{:02}", group_thousands_int(whole), frac)
}

fn group_thousands_int(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        format!("-{out}")
    } else {
        out
    }
}

fn group_thousands(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        group_thousands_int(value as i64)
    } else {
        with_decimals(value)
    }
}

fn truncate_impl(text: &str, len: usize) -> String {
    if text.chars().count() <= len {
        text.to_string()
    } else {
        let cut: String = text.chars().take(len).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, data: &Value) -> String {
        let mut handlebars = Handlebars::new();
        register(&mut handlebars);
        handlebars.render_template(template, data).unwrap()
    }

    #[test]
    fn test_comparison_helpers() {
        let data = json!({"a": 1, "b": 2, "s": "x"});
        assert_eq!(render("{{#if (eq a 1)}}y{{else}}n{{/if}}", &data), "y");
        assert_eq!(render("{{#if (ne a b)}}y{{else}}n{{/if}}", &data), "y");
        assert_eq!(render("{{#if (gt b a)}}y{{else}}n{{/if}}", &data), "y");
        assert_eq!(render("{{#if (lt b a)}}y{{else}}n{{/if}}", &data), "n");
        assert_eq!(render("{{#if (and a s)}}y{{else}}n{{/if}}", &data), "y");
        assert_eq!(render("{{#if (or missing s)}}y{{else}}n{{/if}}", &data), "y");
        assert_eq!(render("{{#if (not missing)}}y{{else}}n{{/if}}", &data), "y");
    }

    #[test]
    fn test_default_helper() {
        let data = json!({"theme": {"text_color": "#333333"}});
        assert_eq!(
            render("{{default theme.text_color \"#111111\"}}", &data),
            "#333333"
        );
        assert_eq!(
            render("{{default theme.font_size \"16px\"}}", &data),
            "16px"
        );
    }

    #[test]
    fn test_format_date_styles() {
        let data = json!({"d": "2026-03-05T15:04:00Z"});
        assert_eq!(render("{{format_date d \"short\"}}", &data), "Mar 5, 2026");
        assert_eq!(render("{{format_date d \"long\"}}", &data), "March 5, 2026");
        assert_eq!(render("{{format_date d \"time\"}}", &data), "3:04 PM");
        assert_eq!(
            render("{{format_date d \"iso\"}}", &data),
            "2026-03-05T15:04:00Z"
        );
    }

    #[test]
    fn test_format_date_plain_date_and_garbage() {
        let data = json!({"d": "2026-03-05", "g": "someday"});
        assert_eq!(render("{{format_date d \"short\"}}", &data), "Mar 5, 2026");
        assert_eq!(render("{{format_date g \"short\"}}", &data), "someday");
    }

    #[test]
    fn test_format_currency() {
        let data = json!({"n": 1234.5});
        assert_eq!(render("{{format_currency n \"USD\"}}", &data), "$1,234.50");
        assert_eq!(render("{{format_currency n \"EUR\"}}", &data), "€1,234.50");
        assert_eq!(
            render("{{format_currency n \"SEK\"}}", &data),
            "SEK 1,234.50"
        );
    }

    #[test]
    fn test_format_number() {
        let data = json!({"whole": 1234567.0, "frac": 12.345});
        assert_eq!(render("{{format_number whole}}", &data), "1,234,567");
        assert_eq!(render("{{format_number frac}}", &data), "12.35");
    }

    #[test]
    fn test_truncate() {
        let data = json!({"s": "abcdefgh"});
        assert_eq!(render("{{truncate s 4}}", &data), "abcd…");
        assert_eq!(render("{{truncate s 20}}", &data), "abcdefgh");
    }

    #[test]
    fn test_countdown_clamps_past_targets() {
        let data = json!({"t": "2001-01-01T00:00:00Z"});
        assert_eq!(render("{{countdown_days t}}", &data), "0");
        assert_eq!(render("{{countdown_hours t}}", &data), "0");
        assert_eq!(render("{{#if (is_expired t)}}over{{/if}}", &data), "over");
    }

    #[test]
    fn test_countdown_future_target() {
        let target = (Utc::now() + Duration::days(3) + Duration::hours(1)).to_rfc3339();
        let data = json!({"t": target});
        assert_eq!(render("{{countdown_days t}}", &data), "3");
        assert_eq!(render("{{#if (is_expired t)}}over{{else}}on{{/if}}", &data), "on");
    }
}
