//! Record extractors for the three fragment kinds on a result page:
//! `div.theater`, `div.movie` and `div.times`.
//!
//! Extractors never fail. A fragment missing what it needs yields nothing
//! and the page parse carries on.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::address::split_address_phone;
use crate::meridiem;
use crate::redirect::cleanup_redirect;
use crate::{Cinema, Film, Showtime};

static NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".name").expect("valid name selector"));
static ADDRESS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".address").expect("valid address selector"));
static INFO_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".info").expect("valid info selector"));
static DESC_TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.desc h2").expect("valid title selector"));
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

static IMDB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"imdb\.com/title/tt(-?[0-9]*)/").expect("valid imdb regex"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]:[0-9]{2}").expect("valid time regex"));

/// All text below `node`, concatenated in document order.
pub(crate) fn element_text(node: ElementRef<'_>) -> String {
    node.text().collect::<String>()
}

fn first_text(fragment: ElementRef<'_>, selector: &Selector) -> Option<String> {
    fragment.select(selector).next().map(element_text)
}

/// Cinema name plus address (and phone, when one can be split off).
#[must_use]
pub fn extract_theater(fragment: ElementRef<'_>) -> Option<Cinema> {
    let name = first_text(fragment, &NAME_SEL);
    let address = first_text(fragment, &ADDRESS_SEL).or_else(|| first_text(fragment, &INFO_SEL));

    let (Some(name), Some(address)) = (name, address) else {
        tracing::debug!("theater fragment without name or address, skipping");
        return None;
    };

    let (address, phone) = split_address_phone(address.trim());
    Some(Cinema {
        name: name.trim().to_owned(),
        address,
        phone,
    })
}

/// Film title plus the IMDB id from the first IMDB title link, if any.
#[must_use]
pub fn extract_movie(fragment: ElementRef<'_>) -> Option<Film> {
    let Some(name) =
        first_text(fragment, &DESC_TITLE_SEL).or_else(|| first_text(fragment, &NAME_SEL))
    else {
        tracing::debug!("movie fragment without a title, skipping");
        return None;
    };

    let imdb_id = fragment
        .select(&ANCHOR_SEL)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| IMDB_RE.captures(href).map(|caps| caps[1].to_owned()));

    Some(Film {
        name: name.trim().to_owned(),
        imdb_id,
    })
}

/// Raw showtime text and its ticket link, before time normalization.
struct RawShowtime {
    text: String,
    ticket_url: Option<String>,
}

/// Every distinct time listed in a `times` fragment.
///
/// Times without a ticket link come first, followed by the linked ones; a
/// time that has a link is never repeated as a plain time. Missing am/pm
/// markers are filled from the next time that has one, and every time is
/// placed on `date`.
#[must_use]
pub fn extract_showtimes(fragment: ElementRef<'_>, date: NaiveDate) -> Vec<Showtime> {
    let mut seen = HashSet::new();

    let mut linked = Vec::new();
    for a in fragment.select(&ANCHOR_SEL) {
        let text = element_text(a).trim().to_owned();
        if !TIME_RE.is_match(&text) || !seen.insert(text.clone()) {
            continue;
        }
        linked.push(RawShowtime {
            text,
            ticket_url: a.value().attr("href").map(cleanup_redirect),
        });
    }

    let mut entries = Vec::new();
    for token in element_text(fragment).split_whitespace() {
        let text: String = token
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(*c, ':' | 'a' | 'm' | 'p'))
            .collect();
        if !TIME_RE.is_match(&text) || !seen.insert(text.clone()) {
            continue;
        }
        entries.push(RawShowtime {
            text,
            ticket_url: None,
        });
    }
    entries.extend(linked);

    let texts: Vec<&str> = entries.iter().map(|entry| entry.text.as_str()).collect();
    let times = meridiem::normalize(&texts, date);

    entries
        .into_iter()
        .zip(times)
        .filter_map(|(entry, time)| match time {
            Some(time) => Some(Showtime {
                time,
                ticket_url: entry.ticket_url,
            }),
            None => {
                tracing::debug!(text = %entry.text, "unparseable showtime, skipping");
                None
            }
        })
        .collect()
}
