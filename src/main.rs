use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use skycast_core::{AppError, Config, WeatherError};
use skycast_weather::{
    spawn_refresh, AggregatedWeather, AggregatorConfig, FetchGateway, GatewayConfig,
    LocationResolver, RecentSearch, RecentSearchStore, WeatherAggregator,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let (config, _validation) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => {
            let err = AppError::from(e);
            tracing::error!("{}", err.user_message());
            return Err(err.into());
        }
    };
    let recent = RecentSearchStore::new(
        config.recent_searches_path(),
        config.location.max_recent_searches,
    );

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--recent") {
        for entry in recent.load().entries() {
            println!("{}  ({})", entry.to_query(), entry.timestamp.to_rfc3339());
        }
        return Ok(());
    }

    let watch = args.first().map(String::as_str) == Some("--watch");
    let search = args.first().map(String::as_str) == Some("--search");
    if watch || search {
        args.remove(0);
    }

    let location = if args.is_empty() {
        config.weather.default_location.clone()
    } else {
        args.join(" ")
    };

    if !config.weather.has_api_key() {
        tracing::warn!(
            "No API key configured; set {} or edit the config file",
            skycast_core::config::API_KEY_ENV
        );
    }

    let gateway = FetchGateway::new(GatewayConfig::from(&config.weather))
        .map_err(AppError::from)
        .context("Failed to build HTTP client")?;
    let gateway = Arc::new(gateway);

    if search {
        let resolver = LocationResolver::from_config(gateway, &config.location);
        let suggestions = match resolver.search(&location).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("{} ({})", WeatherError::from(&e).user_message(), e.message);
                return Err(e.into());
            }
        };
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    let aggregator = WeatherAggregator::new(gateway, AggregatorConfig::from(&config.weather));

    if watch {
        if config.weather.refresh_minutes == 0 {
            tracing::info!("Refresh is disabled in config; fetching once");
        }
        let every = Duration::from_secs(u64::from(config.weather.refresh_minutes) * 60);
        let token = CancellationToken::new();
        let (handle, mut updates) = spawn_refresh(aggregator, location, every, token.clone());

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                update = updates.recv() => match update {
                    Some(result) => report(&result?, &recent)?,
                    None => break,
                },
            }
        }

        token.cancel();
        handle.await?;
        return Ok(());
    }

    tracing::info!("Fetching weather for {}", location);
    let weather = aggregator.get_complete_weather_data(&location).await?;
    report(&weather, &recent)
}

/// Log per-source failures, remember the place and print the envelope.
fn report(weather: &AggregatedWeather, recent: &RecentSearchStore) -> Result<()> {
    for err in &weather.errors {
        tracing::error!(
            endpoint = %err.endpoint,
            "{} ({})",
            WeatherError::from(err).user_message(),
            err.message
        );
    }

    if let Some(current) = &weather.current {
        if let Err(e) = recent.record(RecentSearch::from(&current.location)) {
            tracing::warn!("Failed to update recent searches: {:#}", e);
        }
    }

    println!("{}", serde_json::to_string_pretty(weather)?);
    Ok(())
}
