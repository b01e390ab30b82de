use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use listings::{ListSummary, ListingQuery, PropertySource, StaticCatalog};
use map_core::{
    config::clamp_suggestions, load_settings, Credential, Geocoder, MapSession, MapSettings,
    NominatimGeocoder, ProviderKind, Selection,
};
use tracing_subscriber::EnvFilter;

mod simulate;

use simulate::Action;

#[derive(Parser, Debug)]
#[command(about = "Query rental listings and drive the map controller from a terminal")]
struct Args {
    /// JSON catalog to use instead of the built-in listings.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List properties, optionally filtered.
    List {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        min_rating: Option<f32>,
        /// Print matching records as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Resolve a free-text location to coordinates.
    Geocode {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Nominatim-compatible search endpoint.
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Click through the map: property ids, `bg`, or `@x,y` screen points.
    Simulate {
        #[arg(long)]
        provider: Option<ProviderKind>,
        #[arg(long)]
        token: Option<String>,
        #[arg(required = true)]
        actions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(catalog) = args.catalog {
        settings.catalog_path = Some(catalog);
    }

    match args.command {
        Command::List {
            text,
            kind,
            min_rating,
            json,
        } => {
            let query = ListingQuery {
                text,
                kind,
                min_rating,
            };
            run_list(&settings, &query, json).await
        }
        Command::Geocode {
            query,
            limit,
            endpoint,
        } => {
            if let Some(endpoint) = endpoint {
                settings.geocoder_url = endpoint;
            }
            run_geocode(&settings, &query, limit).await
        }
        Command::Simulate {
            provider,
            token,
            actions,
        } => {
            if let Some(provider) = provider {
                settings.provider = provider;
            }
            if let Some(token) = token.as_deref() {
                settings.credential = Credential::from_input(token);
            }
            run_simulate(settings, &actions).await
        }
    }
}

fn open_catalog(settings: &MapSettings) -> Result<StaticCatalog> {
    match &settings.catalog_path {
        Some(path) => StaticCatalog::from_path(path)
            .with_context(|| format!("failed to load catalog {}", path.display())),
        None => Ok(StaticCatalog::builtin()),
    }
}

async fn run_list(settings: &MapSettings, query: &ListingQuery, json: bool) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let properties = catalog.list(query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&properties)?);
        return Ok(());
    }

    println!("{}", ListSummary::for_results(query, properties.len()).headline());
    for property in &properties {
        println!(
            "{:>3}  {:<8} {:<28} {:<34} ★ {:.1}",
            property.id, property.price, property.name, property.address, property.rating
        );
    }
    Ok(())
}

async fn run_geocode(settings: &MapSettings, query: &str, limit: usize) -> Result<()> {
    let geocoder = NominatimGeocoder::from_settings(settings).context("failed to set up geocoder")?;
    let candidates = geocoder
        .lookup(query, clamp_suggestions(limit))
        .await
        .with_context(|| format!("geocoding '{query}' failed"))?;
    if candidates.is_empty() {
        println!("No locations match \"{query}\"");
    }
    for candidate in candidates {
        println!(
            "{:>10.6} {:>11.6}  {}",
            candidate.position.lat, candidate.position.lng, candidate.label
        );
    }
    Ok(())
}

async fn run_simulate(settings: MapSettings, raw_actions: &[String]) -> Result<()> {
    let actions = raw_actions
        .iter()
        .map(|raw| raw.parse::<Action>())
        .collect::<Result<Vec<_>>>()?;
    let properties = open_catalog(&settings)?
        .list(&ListingQuery::default())
        .await?;

    let mut session = MapSession::open(settings, properties);
    if let Some(prompt) = session.prompt() {
        bail!(
            "{} map unavailable ({:?}): {}; pass --token",
            prompt.provider(),
            prompt.code(),
            prompt.reason()
        );
    }
    let controller = session
        .controller_mut()
        .context("map session is not live")?;
    println!(
        "{} markers on {}",
        controller.marker_count(),
        controller.provider().kind()
    );

    for action in actions {
        match simulate::apply(controller, action) {
            Ok(step) => {
                println!("{:<32} -> {}", step.action, describe(step.selection));
                if let Some(popup) = step.popup {
                    println!("    popup: {popup}");
                }
            }
            Err(err) => println!("{:<32} -> error: {err}", format!("{action:?}")),
        }
    }
    Ok(())
}

fn describe(selection: Selection) -> String {
    match selection {
        Selection::Unselected => "no selection".to_string(),
        Selection::Selected(id) => format!("selected property {id}"),
    }
}
