//! Booking fields recovered from free-text custom questions and UTM tracking.

use crate::models::{QuestionAndAnswer, Tracking};

/// Question keywords (lowercase substrings) that mark the phone answer.
pub const PHONE_KEYWORDS: &[&str] = &["phone", "телефон"];

/// Question keywords (lowercase substrings) that mark the head-count answer.
pub const GUEST_KEYWORDS: &[&str] = &["guest", "people", "человек", "гост"];

pub use bania_common::models::TELEGRAM_UTM_SOURCE;

pub const DEFAULT_GUESTS: i32 = 1;

fn find_question<'a>(
    questions: &'a [QuestionAndAnswer],
    keywords: &[&str],
) -> Option<&'a QuestionAndAnswer> {
    questions.iter().find(|q| {
        let question = q.question.to_lowercase();
        keywords.iter().any(|k| question.contains(k))
    })
}

/// Leading integer of `s`, ignoring leading whitespace and trailing text.
/// `" 3 people"` is 3, `"three"` is `None`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    rest[..digits_len].parse::<i64>().ok().map(|n| sign * n)
}

/// Answer of the first phone question, if it is non-empty.
pub fn extract_phone(questions: &[QuestionAndAnswer]) -> Option<String> {
    find_question(questions, PHONE_KEYWORDS)
        .map(|q| q.answer.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

/// Head count from the first guests question; [`DEFAULT_GUESTS`] when absent,
/// unparseable or not positive.
pub fn extract_guests_count(questions: &[QuestionAndAnswer]) -> i32 {
    find_question(questions, GUEST_KEYWORDS)
        .and_then(|q| parse_leading_int(&q.answer))
        .filter(|n| *n > 0)
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(DEFAULT_GUESTS)
}

/// Telegram user id carried in `utm_content` by Mini App bookings.
pub fn extract_telegram_user_id(tracking: Option<&Tracking>) -> Option<i64> {
    let tracking = tracking?;
    if tracking.utm_source.as_deref() != Some(TELEGRAM_UTM_SOURCE) {
        return None;
    }
    tracking
        .utm_content
        .as_deref()
        .and_then(parse_leading_int)
        .filter(|id| *id > 0)
}
