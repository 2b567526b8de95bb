mod cli;

use cinefeed::{
    catalog::TmdbCatalog,
    config::{self, Config},
    continue_watching::{ContinueWatchingStore, WatchEntry},
    hero::{render_slides, Carousel, HeroFeed, HeroStatus, ImageUrls, SlideBackground, SlideHeading},
    rows,
};
use cinefeed_common::{MediaKey, MediaKind};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ContinueAction};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cinefeed=trace,cinefeed_common=debug".to_string()
        } else {
            "cinefeed=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Hero {
            small_screen,
            json,
            timeout_secs,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_hero(config, small_screen, json, timeout_secs))
        }
        Commands::Rows { json } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_rows(config, json))
        }
        Commands::Continue { action } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            run_continue(&config, action)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cinefeed {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn catalog(config: &Config) -> Result<TmdbCatalog> {
    let catalog = TmdbCatalog::new(&config.catalog).context("Failed to create TMDB client")?;
    if !catalog.is_available() {
        anyhow::bail!(
            "No TMDB API key configured; set catalog.api_key or export {}",
            config::API_KEY_ENV
        );
    }
    Ok(catalog)
}

async fn run_hero(config: Config, small_screen: bool, json: bool, timeout_secs: u64) -> Result<()> {
    let catalog = catalog(&config)?;
    let handle = HeroFeed::new(Arc::new(catalog), config.hero.clone()).activate();

    let snapshot = match tokio::time::timeout(Duration::from_secs(timeout_secs), handle.settled()).await
    {
        Ok(snapshot) => snapshot,
        Err(_) => {
            tracing::warn!(timeout_secs, "Hero feed did not settle in time; printing partial state");
            handle.snapshot()
        }
    };
    handle.deactivate().await;

    if let HeroStatus::Failed { message } = &snapshot.status {
        anyhow::bail!("Hero discovery failed: {}", message);
    }

    let mut carousel = Carousel::from_config(&config.hero);
    carousel.set_slides(snapshot.keys());
    let urls = ImageUrls::new(config.catalog.image_base_url.clone());
    let slides = render_slides(&snapshot, &carousel, small_screen, &urls);

    if json {
        println!("{}", serde_json::to_string_pretty(&slides)?);
        return Ok(());
    }

    println!("Hero slides: {}", slides.len());
    for (i, slide) in slides.iter().enumerate() {
        let marker = if slide.active { ">" } else { " " };
        println!("{} [{}] {} ({})", marker, i, slide.title, slide.key);
        match &slide.heading {
            SlideHeading::Logo { url } => println!("      Logo: {}", url),
            SlideHeading::Title { .. } => println!("      Logo: none"),
        }
        match &slide.background {
            SlideBackground::Trailer { embed_url, .. } => println!("      Trailer: {}", embed_url),
            SlideBackground::Backdrop { url: Some(url) } => println!("      Backdrop: {}", url),
            SlideBackground::Backdrop { url: None } => println!("      Backdrop: none"),
        }
        println!("      Phase: {:?}", slide.phase);
        println!("      Links: {} {}", slide.watch_link, slide.info_link);
    }

    Ok(())
}

async fn run_rows(config: Config, json: bool) -> Result<()> {
    let catalog = catalog(&config)?;
    let loaded = rows::load_rows(&catalog, &rows::default_rows()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&loaded)?);
        return Ok(());
    }

    for row in &loaded {
        println!("{} ({})", row.title, row.items.len());
        for item in row.items.iter().take(5) {
            println!("  {} {}", item.key(), item.title);
        }
        if row.items.len() > 5 {
            println!("  ... {} more", row.items.len() - 5);
        }
    }

    Ok(())
}

fn run_continue(config: &Config, action: ContinueAction) -> Result<()> {
    let path = config.storage.resolved_continue_watching_path();
    let store = ContinueWatchingStore::new(&path);

    match action {
        ContinueAction::List { json } => {
            let entries = store
                .load()
                .with_context(|| format!("Failed to read {:?}", path))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("Continue watching list is empty");
            } else {
                for entry in &entries {
                    let label = entry.progress_label();
                    if label.is_empty() {
                        println!("{}  {}", entry.key(), entry.display_title());
                    } else {
                        println!("{}  {}  {}", entry.key(), entry.display_title(), label);
                    }
                }
            }
        }
        ContinueAction::Add {
            kind,
            id,
            season,
            episode,
            title,
        } => {
            let title = title.unwrap_or_default();
            let entry = match kind {
                MediaKind::Movie => {
                    WatchEntry::movie(id, serde_json::json!({"id": id, "title": title}))
                }
                MediaKind::Series => WatchEntry::episode(
                    id,
                    season.unwrap_or(1),
                    episode.unwrap_or(1),
                    serde_json::json!({"id": id, "name": title}),
                ),
            };
            let key = entry.key();
            store.record(entry)?;
            println!("Recorded {}", key);
        }
        ContinueAction::Remove { kind, id } => {
            let key = MediaKey::new(kind, id);
            if store.remove(key)? {
                println!("Removed {}", key);
            } else {
                println!("No entry for {}", key);
            }
        }
        ContinueAction::Clear => {
            store.clear()?;
            println!("Cleared continue watching list");
        }
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Catalog: {}", config.catalog.base_url);
    println!(
        "  API key: {}",
        if config.catalog.api_key.is_empty() { "not set" } else { "set" }
    );
    println!(
        "  Hero sources: {}",
        config
            .hero
            .sources
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Autoplay delay: {} ms", config.hero.default_delay_ms);
    println!("  Unmuted policy: {:?}", config.hero.unmuted_policy);
    println!(
        "  Small screen: <= {}x{}",
        config.viewport.max_width, config.viewport.max_height
    );
    println!(
        "  Continue watching: {}",
        config.storage.resolved_continue_watching_path().display()
    );

    Ok(())
}
