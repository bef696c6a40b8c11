use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::json;
use std::sync::Arc;
use weather_gateway::{
    load_config, OpenWeatherClient, RedisStore, Units, WeatherFetcher,
};

#[derive(Parser, Debug)]
#[command(name = "weather-gateway", about = "Cache-aside weather data gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Unit system for the upstream request
    #[arg(long, global = true, default_value = "metric")]
    units: Units,

    /// Resolve a city name instead of passing coordinates
    #[arg(long, global = true, conflicts_with_all = ["lat", "lon"])]
    city: Option<String>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Current conditions for a location
    Current,
    /// Multi-day forecast for a location
    Forecast,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config().context("configuration")?;

    let store = Arc::new(
        RedisStore::new(&config.redis_url)
            .await
            .context("connecting to Redis")?,
    );
    let client = Arc::new(OpenWeatherClient::new(
        &config.openweather_base_url,
        &config.openweather_geo_url,
        &config.openweather_api_key,
        config.upstream_timeout_secs,
    )?);
    let fetcher = WeatherFetcher::new(store, client.clone(), config);

    let (lat, lon, place) = match (&cli.city, cli.lat, cli.lon) {
        (Some(city), _, _) => {
            let loc = client.geocode_city(city).await?;
            info!("Resolved {:?} to ({}, {})", loc.name, loc.lat, loc.lon);
            (loc.lat, loc.lon, Some(loc))
        }
        (None, Some(lat), Some(lon)) => (lat, lon, None),
        _ => bail!("pass either --city or both --lat and --lon"),
    };

    let result = match cli.command {
        Command::Current => fetcher.fetch_current(lat, lon, cli.units).await?,
        Command::Forecast => fetcher.fetch_forecast(lat, lon, cli.units).await?,
    };

    let report = json!({
        "location": {
            "lat": lat,
            "lon": lon,
            "name": place.as_ref().map(|p| p.name.clone()),
            "country": place.as_ref().map(|p| p.country.clone()),
        },
        "units": cli.units.to_string(),
        "origin": result.origin,
        "cache": result.cache,
        "payload": result.payload,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
