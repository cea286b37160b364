//! Scraper for a movie-showtime search service (google.com/movies).
//!
//! Given a location and optionally a film title, [`ShowtimesScraper`] walks
//! every result page and returns the disambiguated location together with
//! one [`ResultRow`] per film/cinema listing.

pub mod address;
pub mod client;
pub mod error;
pub mod extract;
pub mod meridiem;
pub mod page;
pub mod redirect;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

pub use client::{ClientConfig, PageErrorPolicy, ShowtimesScraper};
pub use error::ScrapeError;
pub use page::parse_page;

/// What to search for. `movie` narrows the listing to one film.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub location: String,
    pub movie: Option<String>,
}

impl Query {
    pub fn new(location: impl Into<String>, movie: Option<String>) -> Self {
        Self {
            location: location.into(),
            movie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cinema {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

/// A film as listed by the service. `imdb_id` is an opaque token; the
/// service occasionally emits negative ids such as `-1949659688`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Film {
    pub name: String,
    pub imdb_id: Option<String>,
}

/// One screening: a time of day on the query date (UTC, zero seconds) and
/// the unwrapped ticket-purchase link if the listing carried one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Showtime {
    pub time: DateTime<Utc>,
    pub ticket_url: Option<String>,
}

/// All showtimes for one film at one cinema, as found contiguously on a page.
///
/// Film and cinema are whatever records preceded the times in document
/// order; either can be missing if the page listed times first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub film: Option<Film>,
    pub cinema: Option<Cinema>,
    pub showtimes: Vec<Showtime>,
}

/// Everything extracted from a single result page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageParseResult {
    pub rows: Vec<ResultRow>,
    pub location: Option<String>,
    pub next_page_url: Option<String>,
}

/// Aggregated result of a whole query across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Showtimes {
    pub location: Option<String>,
    pub rows: Vec<ResultRow>,
}

/// Trait implemented by showtime search backends.
#[async_trait::async_trait]
pub trait ShowtimeSource {
    /// Run `query` against the service, following pagination to the end.
    async fn fetch_showtimes(
        &self,
        client: &Client,
        query: &Query,
    ) -> Result<Showtimes, ScrapeError>;
}
