use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extract::{element_text, extract_movie, extract_showtimes, extract_theater};
use crate::{Cinema, Film, PageParseResult, ResultRow};

static FRAGMENT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.movie, div.theater, div.times").expect("valid fragment selector")
});
static H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid heading selector"));
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Showtimes for (.*)$").expect("valid location regex"));

enum Fragment {
    Movie,
    Theater,
    Times,
}

fn classify(element: ElementRef<'_>) -> Option<Fragment> {
    element.value().classes().find_map(|class| match class {
        "movie" => Some(Fragment::Movie),
        "theater" => Some(Fragment::Theater),
        "times" => Some(Fragment::Times),
        _ => None,
    })
}

/// Parses one result page.
///
/// Rows are built positionally: each `times` fragment is paired with the
/// most recent movie and theater seen before it in document order.
/// Showtimes are placed on `date`.
#[must_use]
pub fn parse_page(html: &str, date: NaiveDate) -> PageParseResult {
    let document = Html::parse_document(html);

    let mut rows = Vec::new();
    let mut film: Option<Film> = None;
    let mut cinema: Option<Cinema> = None;

    for element in document.select(&FRAGMENT_SEL) {
        match classify(element) {
            Some(Fragment::Movie) => {
                if let Some(next) = extract_movie(element) {
                    film = Some(next);
                }
            }
            Some(Fragment::Theater) => {
                if let Some(next) = extract_theater(element) {
                    cinema = Some(next);
                }
            }
            Some(Fragment::Times) => {
                let showtimes = extract_showtimes(element, date);
                if showtimes.is_empty() {
                    continue;
                }
                rows.push(ResultRow {
                    film: film.clone(),
                    cinema: cinema.clone(),
                    showtimes,
                });
            }
            None => {}
        }
    }

    PageParseResult {
        rows,
        location: parse_location(&document),
        next_page_url: parse_next_link(&document),
    }
}

/// The service's disambiguated location, from the `Showtimes for ...` heading.
fn parse_location(document: &Html) -> Option<String> {
    document.select(&H1_SEL).find_map(|h1| {
        LOCATION_RE
            .captures(&element_text(h1))
            .map(|caps| caps[1].trim().to_owned())
    })
}

/// Target of the last anchor whose text is exactly `Next`.
fn parse_next_link(document: &Html) -> Option<String> {
    document
        .select(&ANCHOR_SEL)
        .filter(|a| element_text(*a).trim() == "Next")
        .last()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_owned)
}
