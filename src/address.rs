use std::sync::LazyLock;

use regex::Regex;

/// Trailing run of non-word characters; one `x` is allowed for extensions,
/// as in `(800) 326-3264 x771`.
static PHONE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[[:digit:][:punct:][:space:]]+(?:x[[:digit:][:punct:][:space:]]+)?$")
        .expect("valid phone regex")
});
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*").expect("valid separator regex"));

/// Splits a cinema's `address - phone` line into its two parts.
///
/// The phone is only split off when at least half of its characters are
/// digits; otherwise the whole text is the address and the phone is `None`.
#[must_use]
pub fn split_address_phone(text: &str) -> (String, Option<String>) {
    let Some(tail) = PHONE_TAIL_RE.find(text) else {
        return (text.to_owned(), None);
    };

    let phone = SEPARATOR_RE.replace(tail.as_str(), "");
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits == 0 || digits * 2 < phone.chars().count() {
        return (text.to_owned(), None);
    }

    (text[..tail.start()].to_owned(), Some(phone.into_owned()))
}
