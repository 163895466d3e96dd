//! `satdash` - Terminal dashboard for a satellite-tracking backend
//!
//! This binary opens the interactive dashboard and offers one-shot commands
//! for listing satellites, printing positions and poking the backend.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use anyhow::{bail, Context};
use clap::Parser;

use satdash::cli::{
    Cli, Command, ConfigCommand, HealthCommand, ListCommand, OutputFormat, PositionsCommand,
    ShowCommand,
};
use satdash::model::{Position, SatelliteQuery};
use satdash::render::{format_date, satellite_list_markup, satellite_table};
use satdash::tui::{self, WatchOptions};
use satdash::{
    init_logging, Config, Dashboard, HttpApi, RefreshControl, RefreshOutcome, SatelliteApi,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load_from(cli.config.clone())
        .and_then(|config| config.with_base_url(cli.api_url.clone()))
        .context("failed to load configuration")?;

    // The dashboard owns the screen, so it always logs to a file
    let log_file = if cli.is_interactive() {
        Some(cli.log_file.clone().unwrap_or_else(|| config.log_file()))
    } else {
        cli.log_file.clone()
    };
    init_logging(cli.verbosity(), log_file.as_deref())?;

    match cli.command {
        Command::Watch(watch) => {
            let api = HttpApi::from_config(&config)?;
            let options = WatchOptions {
                search: watch.view.search.unwrap_or_default(),
                sort: watch.view.sort.into(),
            };
            tui::run(&config, api, options).await?;
        }
        Command::List(list) => handle_list(&config, list).await?,
        Command::Show(show) => handle_show(&config, &show).await?,
        Command::Positions(positions) => handle_positions(&config, positions).await?,
        Command::Refresh => handle_refresh(&config).await?,
        Command::Health(health) => handle_health(&config, &health).await?,
        Command::Config(config_cmd) => handle_config(&config, config_cmd)?,
    }
    Ok(())
}

fn api(config: &Config) -> anyhow::Result<Arc<dyn SatelliteApi>> {
    Ok(Arc::new(HttpApi::from_config(config)?))
}

/// A dashboard whose position batches are discarded.
fn list_only(api: Arc<dyn SatelliteApi>, config: &Config) -> Dashboard {
    Dashboard::new(api, |_: Vec<Position>| {}, config.polling.position_batch_limit)
}

async fn handle_list(config: &Config, cmd: ListCommand) -> anyhow::Result<()> {
    let api = api(config)?;
    let query = SatelliteQuery {
        limit: cmd.limit,
        offset: cmd.offset,
        updated_since: cmd.updated_since,
    };
    let mut dashboard = list_only(api, config);
    dashboard.set_sort(cmd.view.sort.into());
    dashboard.set_search(cmd.view.search.unwrap_or_default());
    dashboard.load_satellites(&query).await?;

    match cmd.format {
        OutputFormat::Table => {
            print!("{}", satellite_table(dashboard.entries()));
            println!();
            println!(
                "Showing {} of {} active satellites (last update: {})",
                dashboard.entries().len(),
                dashboard.active_count(),
                format_date(dashboard.last_update())
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(dashboard.filtered())?);
        }
        OutputFormat::Html => print!("{}", satellite_list_markup(dashboard.entries())),
    }
    Ok(())
}

async fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let Some(satellite) = api(config)?.satellite(cmd.norad_id).await? else {
        bail!("no satellite with NORAD ID {}", cmd.norad_id);
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&satellite)?);
        return Ok(());
    }

    let optional = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    println!("{}", satellite.name);
    println!("{}", "-".repeat(satellite.name.chars().count().max(8)));
    println!("NORAD ID:      {}", satellite.norad_id);
    println!(
        "Object ID:     {}",
        satellite.object_id.as_deref().unwrap_or("-")
    );
    println!("Epoch:         {}", format_date(satellite.launch_epoch));
    println!("Inclination:   {}", optional(satellite.inclination));
    println!("Eccentricity:  {}", optional(satellite.eccentricity));
    println!("Mean motion:   {}", optional(satellite.mean_motion));
    println!("B*:            {}", optional(satellite.bstar));
    println!("Updated:       {}", format_date(satellite.last_updated));
    Ok(())
}

async fn handle_positions(config: &Config, cmd: PositionsCommand) -> anyhow::Result<()> {
    let api = api(config)?;
    let (tx, rx) = mpsc::channel();
    let sink = move |positions: Vec<Position>| {
        let _ = tx.send(positions);
    };
    let mut dashboard = Dashboard::new(Arc::clone(&api), sink, config.polling.position_batch_limit);
    dashboard.set_sort(cmd.view.sort.into());
    dashboard.set_search(cmd.view.search.unwrap_or_default());
    dashboard.load_satellites(&SatelliteQuery::default()).await?;

    let Some(request) = dashboard.begin_update_positions() else {
        println!("No satellites match.");
        return Ok(());
    };
    let batch = api.positions(&request.norad_ids).await?;
    dashboard.apply_positions(request.ticket, Ok(batch));
    let positions = rx.try_recv().unwrap_or_default();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&positions)?);
        return Ok(());
    }

    println!(
        "{:<9} {:<28} {:>9} {:>10} {:>9}",
        "NORAD ID", "NAME", "LAT", "LON", "ALT (km)"
    );
    for position in &positions {
        let name = dashboard
            .filtered()
            .iter()
            .find(|s| s.norad_id == position.norad_id)
            .map_or("", |s| s.name.as_str());
        println!(
            "{:<9} {:<28} {:>9.3} {:>10.3} {:>9.1}",
            position.norad_id, name, position.lat, position.lon, position.alt_km
        );
    }
    if positions.len() < request.norad_ids.len() {
        println!();
        println!(
            "{} of {} requested satellites had no position.",
            request.norad_ids.len() - positions.len(),
            request.norad_ids.len()
        );
    }
    Ok(())
}

async fn handle_refresh(config: &Config) -> anyhow::Result<()> {
    let api = api(config)?;
    let completed = Arc::new(AtomicBool::new(false));
    let control = {
        let completed = Arc::clone(&completed);
        RefreshControl::new(Arc::clone(&api), move || {
            completed.store(true, Ordering::SeqCst);
        })
    };

    println!("Requesting refresh from {}...", config.api.base_url);
    match control.press().await {
        RefreshOutcome::Completed(status) => {
            match status.count {
                Some(count) => println!("Refresh completed: {count} satellites processed."),
                None => println!("Refresh completed."),
            }
        }
        RefreshOutcome::NotCompleted(status) => bail!(
            "refresh {}: {}",
            status.status,
            status.message.as_deref().unwrap_or("no detail")
        ),
        RefreshOutcome::Failed(e) => return Err(e.into()),
        RefreshOutcome::Ignored => bail!("refresh already in progress"),
    }

    if completed.load(Ordering::SeqCst) {
        let mut dashboard = list_only(api, config);
        dashboard
            .load_satellites(&SatelliteQuery::default())
            .await
            .context("refresh completed but the satellite list could not be reloaded")?;
        println!(
            "Satellite list reloaded: {} active (last update: {}).",
            dashboard.active_count(),
            format_date(dashboard.last_update())
        );
    }
    Ok(())
}

async fn handle_health(config: &Config, cmd: &HealthCommand) -> anyhow::Result<()> {
    let health = api(config)?.health().await?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!("satdash health");
        println!("--------------");
        println!("Backend:       {}", config.api.base_url);
        println!("Status:        {}", health.status);
        println!("Backend time:  {}", format_date(health.timestamp));
    }
    if health.status != "ok" {
        bail!("backend reported status {}", health.status);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Base URL:           {}", config.api.base_url);
                println!("  Timeout (secs):     {}", config.api.request_timeout_secs);
                println!();
                println!("[Polling]");
                println!(
                    "  Satellites (secs):  {}",
                    config.polling.satellites_interval_secs
                );
                println!(
                    "  Positions (secs):   {}",
                    config.polling.positions_interval_secs
                );
                println!(
                    "  Batch limit:        {}",
                    config.polling.position_batch_limit
                );
                println!();
                println!("[Globe]");
                println!("  Rotation speed:     {}", config.globe.rotation_speed);
                println!("  Drag sensitivity:   {}", config.globe.drag_sensitivity);
                println!("  Visibility:         {}", config.globe.visibility);
                println!("  Graticule:          {}", config.globe.show_graticule);
                println!("  Altitude rings:     {}", config.globe.show_altitude_rings);
                println!("  Frame (ms):         {}", config.globe.frame_interval_ms);
                println!("  Atlas:              {}", config.globe.atlas_url);
                println!();
                println!("[Logging]");
                println!("  Log file:           {}", config.log_file().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
