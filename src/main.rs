use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use space_timeline::config;
use space_timeline::search::SearchExecutor;
use space_timeline::state::{DateBounds, FeedStatus, QueryTicket, Timeline};
use space_timeline::transport::{HttpTransport, Retrying};
use space_timeline::{generate, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "space-timeline")]
#[command(about = "This day in space history, from the NASA image archive")]
#[command(long_about = "\
This day in space history, from the NASA image archive

Pick a date (or let the timeline pick one) and see what NASA photographed
that day. When nothing matches the exact day, the whole year is shown.
Keyword searches ignore the date.

Dates range from 1958-01-01 (NASA's founding year) to today.

Examples:

  space-timeline today
  space-timeline date 1969-07-20 --expand <ID>
  space-timeline random --html feed.html
  space-timeline search hubble deep field --json

Run 'space-timeline gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Also write the feed as an HTML page
    #[arg(long, global = true)]
    html: Option<PathBuf>,

    /// Print the normalized result as JSON instead of the feed
    #[arg(long, global = true)]
    json: bool,

    /// Show every field of the record with this id
    #[arg(long, global = true, value_name = "ID")]
    expand: Option<String>,

    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Images from today's date in history
    Today,
    /// Images from a specific date (YYYY-MM-DD)
    Date { date: NaiveDate },
    /// Images from a random date
    Random,
    /// Search by keywords, ignoring the date
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// List popular search keywords
    Keywords,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Keywords => {
            output::print_keyword_suggestions();
            return Ok(());
        }
        _ => {}
    }

    let config = config::load_config(&cli.config_dir)?;
    let bounds = DateBounds::today();
    let timeline = Timeline::new(bounds).with_media_type(config.api.media_type.clone());
    let ticket = select(&timeline, &cli.command, bounds)?;

    let transport = Retrying::new(HttpTransport::new(config.timeout())?, config.retry_policy());
    let executor = SearchExecutor::new(transport, config.base_url()?).with_cache(config.cache_ttl());
    timeline.refresh(&executor, &ticket);

    if let Some(id) = &cli.expand {
        timeline.toggle_expanded(id);
    }
    let view = timeline.view();

    if cli.json {
        if let FeedStatus::Loaded(result) = &view.status {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    } else {
        output::print_feed(&view, &config.feed.title, &config.preview());
    }

    if let Some(path) = &cli.html {
        generate::write_feed(path, &view, &config)?;
        if !cli.json {
            println!("Wrote {}", path.display());
        }
    }

    if let FeedStatus::Failed(detail) = view.status {
        return Err(detail.into());
    }
    Ok(())
}

/// Apply the subcommand's selection and return the ticket to resolve.
fn select(
    timeline: &Timeline,
    command: &Command,
    bounds: DateBounds,
) -> Result<QueryTicket, Box<dyn std::error::Error>> {
    let ticket = match command {
        Command::Today => timeline.start(),
        Command::Date { date } => {
            if !bounds.contains(*date) {
                return Err(format!(
                    "{date} is outside the timeline ({} to {})",
                    bounds.earliest, bounds.latest
                )
                .into());
            }
            timeline.set_date(*date)
        }
        Command::Random => timeline.set_random_date(&mut rand::thread_rng()),
        Command::Search { keywords } => timeline
            .set_keywords(&keywords.join(" "))
            .ok_or("search keywords must not be blank")?,
        Command::Keywords | Command::GenConfig => {
            return Err("command does not select a feed".into());
        }
    };
    Ok(ticket)
}

/// Logs go to stderr so feed output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
