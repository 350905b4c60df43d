use std::io::IsTerminal;

use aidex::{
    catalog::{build_http_client, fetch_catalog},
    cli::Args,
    commands::{Outcome, execute},
    config::AidexConfig,
    observability,
    search::SearchIndex,
    series::SeriesClassifier,
};
use clap::Parser;
use termcolor::{ColorChoice, StandardStream};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let request = match args.to_request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut config = match AidexConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    if let Some(url) = &args.catalog_url {
        config.catalog.api_url = url.clone();
        if let Err(e) = config.catalog.validate() {
            eprintln!("Invalid --catalog-url: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = observability::init_tracing(&config.logging, args.verbosity()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let classifier = match SeriesClassifier::load(&config.series) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load series rules: {e}");
            std::process::exit(1);
        }
    };

    let client = match build_http_client(&config.catalog) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let catalog = fetch_catalog(&client, &config.catalog).await;
    let index = SearchIndex::build(&catalog, &config.search, args.verbosity());

    let mut stdout = StandardStream::stdout(color_choice());
    match execute(&request, &index, &classifier, &mut stdout) {
        Ok(Outcome::Rendered { shown, hidden }) => {
            tracing::debug!(shown, hidden, "Report written");
        }
        Ok(Outcome::EmptyCatalog) => {}
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Color only on an interactive stdout, and never when `NO_COLOR` is set.
fn color_choice() -> ColorChoice {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    if no_color || !std::io::stdout().is_terminal() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}
