//! Server-rendered Mini App pages.

use crate::logic::{escape_html, MiniAppEvent};

pub const APP_TITLE: &str = "Banya Portugal";
const TAGLINE: &str = "Traditional Russian banya in Portugal";

const TELEGRAM_SCRIPT: &str = r#"<script src="https://telegram.org/js/telegram-web-app.js"></script>"#;

const STYLE: &str = r#"<style>
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
  background: var(--tg-theme-secondary-bg-color, #f4f4f5); color: var(--tg-theme-text-color, #111); }
header { padding: 16px 16px 8px; background: var(--tg-theme-bg-color, #fff); text-align: center; }
h1 { font-size: 20px; margin: 0; }
.hint { color: var(--tg-theme-hint-color, #6b7280); font-size: 14px; margin: 6px 0 0; }
main { padding: 16px; }
.card { display: flex; gap: 12px; padding: 16px; margin-bottom: 12px; border-radius: 12px;
  background: var(--tg-theme-bg-color, #fff); color: inherit; text-decoration: none; }
.thumb { width: 64px; height: 64px; border-radius: 8px; flex-shrink: 0; object-fit: cover;
  display: flex; align-items: center; justify-content: center; color: #fff; font-weight: 700; }
.info { flex: 1; min-width: 0; }
.top { display: flex; justify-content: space-between; align-items: flex-start; }
.top h2 { font-size: 16px; margin: 0; }
.price { font-size: 18px; font-weight: 700; margin-left: 8px; color: var(--tg-theme-button-color, #2481cc); }
.empty { text-align: center; padding: 32px 0; }
footer { padding: 16px; text-align: center; font-size: 12px; color: var(--tg-theme-hint-color, #6b7280); }
.calendly-inline-widget { min-width: 320px; height: 100vh; }
</style>"#;

/// Greets the Telegram user and forwards their id and name on every booking link.
const LIST_SCRIPT: &str = r#"<script>
(function () {
  var tg = window.Telegram && window.Telegram.WebApp;
  if (!tg) return;
  tg.ready();
  tg.expand();
  var user = tg.initDataUnsafe && tg.initDataUnsafe.user;
  if (!user) return;
  document.getElementById("welcome").textContent = "Welcome, " + user.first_name + "!";
  var name = [user.first_name, user.last_name].filter(Boolean).join(" ");
  document.querySelectorAll("a.card").forEach(function (a) {
    var url = new URL(a.href, window.location.href);
    url.searchParams.set("tg_user_id", user.id);
    url.searchParams.set("name", name);
    a.href = url.toString();
  });
})();
</script>"#;

/// Back button, and a reload with the Telegram identity when the page was opened without it.
const BOOKING_SCRIPT: &str = r#"<script>
(function () {
  var tg = window.Telegram && window.Telegram.WebApp;
  if (!tg) return;
  tg.ready();
  tg.expand();
  tg.BackButton.show();
  tg.BackButton.onClick(function () { window.history.back(); });
  var user = tg.initDataUnsafe && tg.initDataUnsafe.user;
  var url = new URL(window.location.href);
  if (user && !url.searchParams.has("tg_user_id")) {
    url.searchParams.set("tg_user_id", user.id);
    url.searchParams.set("name", [user.first_name, user.last_name].filter(Boolean).join(" "));
    window.location.replace(url.toString());
  }
})();
</script>"#;

fn page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
{telegram}
{style}
{head_extra}
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        telegram = TELEGRAM_SCRIPT,
        style = STYLE,
        head_extra = head_extra,
        body = body,
    )
}

fn event_card(event: &MiniAppEvent, booking_base: &str) -> String {
    let name = escape_html(&event.name);
    let thumb = match &event.photo_url {
        Some(url) => format!(
            r#"<img class="thumb" src="{}" alt="{}">"#,
            escape_html(url),
            name
        ),
        None => format!(
            r#"<div class="thumb" style="background-color: {}">{}</div>"#,
            escape_html(&event.color),
            escape_html(&event.initials)
        ),
    };
    let guests = event
        .guests_label
        .as_deref()
        .map(|label| format!(" · {}", escape_html(label)))
        .unwrap_or_default();
    let description = event
        .description_plain
        .as_deref()
        .map(|d| format!(r#"<p class="hint">{}</p>"#, escape_html(d)))
        .unwrap_or_default();

    format!(
        r#"<a class="card" href="{base}/{slug}">{thumb}<div class="info"><div class="top"><h2>{name}</h2><span class="price">{price}</span></div><p class="hint">{duration}{guests}</p>{description}</div></a>"#,
        base = booking_base,
        slug = escape_html(&event.slug),
        thumb = thumb,
        name = name,
        price = escape_html(&event.price_label),
        duration = escape_html(&event.duration_label),
        guests = guests,
        description = description,
    )
}

/// Active events as tappable cards linking to `{booking_base}/{slug}`.
pub fn render_event_list(events: &[MiniAppEvent], booking_base: &str) -> String {
    let cards = if events.is_empty() {
        r#"<div class="empty hint">No events available</div>"#.to_string()
    } else {
        events
            .iter()
            .map(|e| event_card(e, booking_base))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let body = format!(
        r#"<header><h1>{title}</h1><p class="hint" id="welcome"></p><p class="hint">Choose your session type</p></header>
<main>
{cards}
</main>
<footer>{tagline}</footer>
{script}"#,
        title = APP_TITLE,
        cards = cards,
        tagline = TAGLINE,
        script = LIST_SCRIPT,
    );
    page(APP_TITLE, "", &body)
}

/// Full-screen Calendly inline widget for one event.
pub fn render_booking_page(event: &MiniAppEvent, embed_url: &str) -> String {
    let body = format!(
        r#"<div class="calendly-inline-widget" data-url="{url}"></div>
<script src="https://assets.calendly.com/assets/external/widget.js" async></script>
{script}"#,
        url = escape_html(embed_url),
        script = BOOKING_SCRIPT,
    );
    page(
        &event.name,
        r#"<link rel="stylesheet" href="https://assets.calendly.com/assets/external/widget.css">"#,
        &body,
    )
}

pub fn render_not_found(list_url: &str) -> String {
    let body = format!(
        r#"<main class="empty"><p class="hint">Event not found</p><p><a href="{}">Back to events</a></p></main>"#,
        escape_html(list_url)
    );
    page(APP_TITLE, "", &body)
}

pub fn render_unavailable() -> String {
    page(
        APP_TITLE,
        "",
        r#"<main class="empty"><p class="hint">Booking is temporarily unavailable</p></main>"#,
    )
}
