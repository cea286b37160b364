use clap::Parser;
use showtimes_scrape::client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use showtimes_scrape::{
    ClientConfig, PageErrorPolicy, Query, ResultRow, ShowtimeSource, Showtimes, ShowtimesScraper,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "showtimes")]
#[command(about = "Look up today's movie showtimes near a location")]
struct Cli {
    /// Zip code, city, address or neighbourhood to search near.
    location: String,

    /// Only list showtimes for this film.
    #[arg(long)]
    movie: Option<String>,

    #[arg(long, env = "SHOWTIMES_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "SHOWTIMES_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Request timeout in seconds (default: none).
    #[arg(long, env = "SHOWTIMES_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Most result pages to follow; a longer listing fails the query
    /// instead of being truncated.
    #[arg(long, env = "SHOWTIMES_MAX_PAGES", default_value_t = 50)]
    max_pages: usize,

    /// Return rows from pages fetched before a later page fails.
    #[arg(long)]
    keep_partial: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

fn print_row(row: &ResultRow) {
    let film = row.film.as_ref();
    let cinema = row.cinema.as_ref();
    println!("FILM        : {}", film.map_or("?", |f| f.name.as_str()));
    println!(
        "IMDB        : {}",
        film.and_then(|f| f.imdb_id.as_deref()).unwrap_or("-")
    );
    println!("CINEMA      : {}", cinema.map_or("?", |c| c.name.as_str()));
    println!("ADDRESS     : {}", cinema.map_or("", |c| c.address.as_str()));
    println!(
        "PHONE       : {}",
        cinema.and_then(|c| c.phone.as_deref()).unwrap_or("-")
    );
    for showtime in &row.showtimes {
        match &showtime.ticket_url {
            Some(url) => println!("TIME        : {} ({})", showtime.time.format("%H:%M"), url),
            None => println!("TIME        : {}", showtime.time.format("%H:%M")),
        }
    }
    println!();
}

fn print_listing(showtimes: &Showtimes) {
    println!(
        "LOCATION    : {}",
        showtimes.location.as_deref().unwrap_or("(unknown)")
    );
    println!();
    for row in &showtimes.rows {
        print_row(row);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig {
        base_url: cli.base_url,
        user_agent: cli.user_agent,
        timeout_secs: cli.timeout_secs,
        max_pages: cli.max_pages,
        on_page_error: if cli.keep_partial {
            PageErrorPolicy::KeepPartial
        } else {
            PageErrorPolicy::Abort
        },
    };

    let client = ShowtimesScraper::build_client(&config)?;
    let scraper = ShowtimesScraper::new(config);
    let query = Query::new(cli.location, cli.movie);

    let showtimes = scraper.fetch_showtimes(&client, &query).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&showtimes)?);
    } else {
        print_listing(&showtimes);
    }

    Ok(())
}
