use bania_common::models::{Event, DEFAULT_CURRENCY, TELEGRAM_UTM_SOURCE};
use bania_common::{internal_error, BaniaError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder tile color for events without one.
pub const DEFAULT_COLOR: &str = "#6B7280";

// --- Request Structs ---

/// Telegram identity forwarded by the Mini App page.
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[derive(Debug, Default, Deserialize)]
pub struct EmbedQuery {
    /// Telegram user id, sent to Calendly as `utm_content`.
    pub tg_user_id: Option<i64>,
    /// Prefills the invitee name in the widget.
    pub name: Option<String>,
}

// --- Response Structs ---

/// An active event with its display labels.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniAppEvent {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description_plain: Option<String>,
    pub photo_url: Option<String>,
    pub color: String,
    /// Minutes.
    pub duration: i32,
    pub duration_label: String,
    pub price: Option<f64>,
    pub currency: String,
    pub price_label: String,
    pub max_guests: Option<i32>,
    pub guests_label: Option<String>,
    /// Shown instead of a photo.
    pub initials: String,
    pub calendly_url: String,
}

impl From<&Event> for MiniAppEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            slug: event.slug.clone(),
            description_plain: event
                .description_plain
                .clone()
                .filter(|d| !d.trim().is_empty()),
            photo_url: event.photo_url.clone().filter(|u| !u.is_empty()),
            color: event
                .color
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            duration: event.duration,
            duration_label: format_duration(event.duration),
            price: event.price,
            currency: event.currency.clone(),
            price_label: format_price(event.price, &event.currency),
            max_guests: event.max_guests,
            guests_label: guests_label(event.max_guests),
            initials: initials(&event.name),
            calendly_url: event.calendly_url.clone(),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize, Deserialize)]
pub struct EventDetail {
    pub event: MiniAppEvent,
    /// Calendly scheduling url with embed and attribution parameters.
    pub embed_url: String,
}

// --- Display helpers ---

/// `45 min`, `1 hour`, `2 hours`, `1h 30min`.
pub fn format_duration(minutes: i32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{} min", m),
        (1, 0) => "1 hour".to_string(),
        (h, 0) => format!("{} hours", h),
        (h, m) => format!("{}h {}min", h, m),
    }
}

/// `€25` for euros, `USD40` otherwise, empty without a price.
pub fn format_price(price: Option<f64>, currency: &str) -> String {
    let Some(price) = price else {
        return String::new();
    };
    let symbol = if currency.eq_ignore_ascii_case(DEFAULT_CURRENCY) {
        "€"
    } else {
        currency
    };
    format!("{}{:.0}", symbol, price.round())
}

pub fn guests_label(max_guests: Option<i32>) -> Option<String> {
    max_guests
        .filter(|&n| n > 1)
        .map(|n| format!("up to {} guests", n))
}

/// First two characters, upper-cased.
pub fn initials(name: &str) -> String {
    name.trim().chars().take(2).collect::<String>().to_uppercase()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Calendly inline-embed url for an event.
///
/// Always hides the GDPR banner and the landing page details. A positive
/// Telegram user id is attached as `utm_source=telegram_miniapp` /
/// `utm_content=<id>`, which the webhook reads back to attribute the booking.
pub fn build_embed_url(
    calendly_url: &str,
    telegram_user_id: Option<i64>,
    name: Option<&str>,
) -> Result<Url, BaniaError> {
    let mut url = Url::parse(calendly_url)
        .map_err(|e| internal_error(format!("invalid Calendly url '{}': {}", calendly_url, e)))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("hide_gdpr_banner", "1")
            .append_pair("hide_landing_page_details", "1");
        if let Some(id) = telegram_user_id.filter(|&id| id > 0) {
            query
                .append_pair("utm_source", TELEGRAM_UTM_SOURCE)
                .append_pair("utm_content", &id.to_string());
        }
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            query.append_pair("name", name);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(60), "1 hour");
        assert_eq!(format_duration(120), "2 hours");
        assert_eq!(format_duration(90), "1h 30min");
        assert_eq!(format_duration(150), "2h 30min");
    }

    #[test]
    fn prices() {
        assert_eq!(format_price(Some(25.0), "EUR"), "€25");
        assert_eq!(format_price(Some(24.6), "EUR"), "€25");
        assert_eq!(format_price(Some(40.0), "USD"), "USD40");
        assert_eq!(format_price(None, "EUR"), "");
    }

    #[test]
    fn labels() {
        assert_eq!(initials("banya 2h"), "BA");
        assert_eq!(initials("й"), "Й");
        assert_eq!(guests_label(Some(6)).as_deref(), Some("up to 6 guests"));
        assert_eq!(guests_label(Some(1)), None);
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn embed_url_carries_attribution() {
        let url = build_embed_url("https://calendly.com/bania/2h", Some(12345), Some("Olga P")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://calendly.com/bania/2h?hide_gdpr_banner=1&hide_landing_page_details=1\
             &utm_source=telegram_miniapp&utm_content=12345&name=Olga+P"
        );
    }

    #[test]
    fn embed_url_without_telegram_user() {
        let url = build_embed_url("https://calendly.com/bania/2h?month=2026-05", Some(0), Some(" ")).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("month".to_string(), "2026-05".to_string()),
                ("hide_gdpr_banner".to_string(), "1".to_string()),
                ("hide_landing_page_details".to_string(), "1".to_string()),
            ]
        );
        assert!(build_embed_url("not a url", None, None).is_err());
    }
}
