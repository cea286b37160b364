use std::time::Duration;

use chrono::{NaiveDate, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Url, header};

use crate::error::ScrapeError;
use crate::page::parse_page;
use crate::{Query, ShowtimeSource, Showtimes};

pub const DEFAULT_BASE_URL: &str = "http://www.google.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";
const SEARCH_PATH: &str = "/movies";

/// What to do when a page after the first cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageErrorPolicy {
    /// Fail the whole query; rows from earlier pages are discarded.
    #[default]
    Abort,
    /// Stop paginating and return the rows gathered so far.
    KeepPartial,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host of the search service, without a trailing path.
    pub base_url: String,
    pub user_agent: String,
    /// `None` keeps reqwest's default (no timeout).
    pub timeout_secs: Option<u64>,
    /// Upper bound on pages followed for one query.
    pub max_pages: usize,
    pub on_page_error: PageErrorPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: None,
            max_pages: 50,
            on_page_error: PageErrorPolicy::Abort,
        }
    }
}

/// Scraper for the google.com/movies showtime search.
pub struct ShowtimesScraper {
    config: ClientConfig,
}

impl ShowtimesScraper {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Builds the HTTP client described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the client cannot be constructed.
    pub fn build_client(config: &ClientConfig) -> Result<Client, ScrapeError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }

    /// Path and query string of the first result page.
    #[must_use]
    pub fn search_path(query: &Query) -> String {
        let near = utf8_percent_encode(&query.location, NON_ALPHANUMERIC);
        match &query.movie {
            Some(movie) => {
                let q = utf8_percent_encode(movie, NON_ALPHANUMERIC);
                format!("{SEARCH_PATH}?q={q}&near={near}")
            }
            None => format!("{SEARCH_PATH}?near={near}"),
        }
    }

    /// Resolves a search path or "Next" link against the configured host.
    fn resolve(&self, target: &str) -> Result<Url, ScrapeError> {
        let invalid = |reason: String| ScrapeError::InvalidUrl {
            url: target.to_owned(),
            reason,
        };
        let base = Url::parse(&self.config.base_url).map_err(|e| invalid(e.to_string()))?;
        base.join(target).map_err(|e| invalid(e.to_string()))
    }

    async fn fetch_page(&self, client: &Client, url: &Url) -> Result<String, ScrapeError> {
        let resp = client
            .get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }

    /// Follows "Next" links from the first result page until none is left,
    /// placing every showtime on `date`.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Http`] / [`ScrapeError::UnexpectedStatus`] when a
    ///   page cannot be fetched. Under [`PageErrorPolicy::KeepPartial`] only
    ///   a failure on the first page is reported.
    /// - [`ScrapeError::InvalidUrl`] when a page URL cannot be resolved.
    /// - [`ScrapeError::PaginationLimit`] after `max_pages` pages.
    pub async fn fetch_on(
        &self,
        client: &Client,
        query: &Query,
        date: NaiveDate,
    ) -> Result<Showtimes, ScrapeError> {
        tracing::info!(
            location = %query.location,
            movie = query.movie.as_deref().unwrap_or("-"),
            "searching showtimes"
        );

        let mut result = Showtimes::default();
        let mut next = Some(Self::search_path(query));
        let mut pages = 0usize;

        while let Some(target) = next.take() {
            let url = self.resolve(&target)?;
            if pages >= self.config.max_pages {
                return Err(ScrapeError::PaginationLimit {
                    url: url.to_string(),
                    max_pages: self.config.max_pages,
                });
            }

            let body = match self.fetch_page(client, &url).await {
                Ok(body) => body,
                Err(err)
                    if pages > 0
                        && err.is_network()
                        && self.config.on_page_error == PageErrorPolicy::KeepPartial =>
                {
                    tracing::warn!(%url, error = %err, "page fetch failed, keeping earlier pages");
                    break;
                }
                Err(err) => return Err(err),
            };
            pages += 1;

            let page = parse_page(&body, date);
            tracing::debug!(%url, rows = page.rows.len(), "parsed result page");

            if result.location.is_none() {
                result.location = page.location;
            }
            result.rows.extend(page.rows);
            next = page.next_page_url;
        }

        tracing::info!(pages, rows = result.rows.len(), "showtime search finished");
        Ok(result)
    }
}

#[async_trait::async_trait]
impl ShowtimeSource for ShowtimesScraper {
    async fn fetch_showtimes(
        &self,
        client: &Client,
        query: &Query,
    ) -> Result<Showtimes, ScrapeError> {
        self.fetch_on(client, query, Utc::now().date_naive()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_path_for_location_only() {
        let query = Query::new("02139", None);
        assert_eq!(ShowtimesScraper::search_path(&query), "/movies?near=02139");
    }

    #[test]
    fn search_path_encodes_film_and_location() {
        let query = Query::new("London UK", Some("Valentine's Day".to_owned()));
        assert_eq!(
            ShowtimesScraper::search_path(&query),
            "/movies?q=Valentine%27s%20Day&near=London%20UK"
        );
    }

    #[test]
    fn next_links_resolve_against_base_host() {
        let scraper = ShowtimesScraper::new(ClientConfig::default());
        let url = scraper.resolve("/movies?near=02139&start=10").unwrap();
        assert_eq!(
            url.as_str(),
            "http://www.google.com/movies?near=02139&start=10"
        );
    }

    #[test]
    fn absolute_next_link_is_kept() {
        let scraper = ShowtimesScraper::new(ClientConfig::default());
        let url = scraper
            .resolve("http://movies.example.com/movies?near=02139&start=10")
            .unwrap();
        assert_eq!(url.host_str(), Some("movies.example.com"));
    }

    #[test]
    fn bad_base_url_is_reported() {
        let scraper = ShowtimesScraper::new(ClientConfig {
            base_url: "not a url".to_owned(),
            ..ClientConfig::default()
        });
        assert!(matches!(
            scraper.resolve("/movies?near=02139"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
    }
}
