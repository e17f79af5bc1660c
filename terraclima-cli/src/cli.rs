use std::io::{self, Write};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password};
use serde_json::{Value, json};
use terraclima_core::{
    ApiResponse, Config, HumidityReading, ProviderFactory, ProviderId, WeatherService, handle,
};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "terraclima", version, about = "TerraClima humidity service")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset, e.g. "debug".
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve POST /api/humidity over HTTP.
    Serve {
        /// Address to listen on; defaults to the configured `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Produce one humidity reading and print it.
    Show {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        /// Calendar date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Provider id; defaults to the configured default, then "mockdata".
        #[arg(long)]
        provider: Option<String>,

        /// Print the raw JSON response instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// List available providers.
    Providers,

    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let config = Config::load()?;
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                server::serve(&bind, WeatherService::from_config(&config)).await
            }
            Command::Show {
                latitude,
                longitude,
                date,
                provider,
                json,
            } => {
                let config = Config::load()?;
                let provider = match provider {
                    Some(p) => p,
                    None => config
                        .default_provider_id()
                        .map(|id| id.as_str().to_string())
                        .unwrap_or_else(|_| ProviderId::MockData.as_str().to_string()),
                };
                let date = date.unwrap_or_else(|| {
                    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
                });

                let body = json!({
                    "latitude": latitude,
                    "longitude": longitude,
                    "date": date,
                    "provider": provider,
                });

                let service = WeatherService::from_config(&config);
                let res = handle(&service, "POST", &serde_json::to_vec(&body)?).await;

                report(&res, json, &mut io::stdout().lock())
            }
            Command::Providers => {
                let config = Config::load()?;
                for option in ProviderFactory::available_providers() {
                    let marker = match option.id {
                        ProviderId::MockData => "synthetic",
                        id if config.is_provider_configured(id) => "api key configured",
                        _ => "synthetic fallback",
                    };
                    println!("{:<12} {:<30} ({marker})", option.id.as_str(), option.label);
                }
                Ok(())
            }
            Command::Configure { provider } => configure(&provider),
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id == ProviderId::MockData {
        config.set_default_provider(id);
        config.save()?;
        println!("'{id}' needs no credentials; set as default provider.");
        return Ok(());
    }

    let api_key = Password::new(&format!("API key for {}:", id.label()))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key.trim().to_string());

    let make_default = Confirm::new(&format!("Use '{id}' as the default provider?"))
        .with_default(false)
        .prompt()
        .unwrap_or(false);
    if make_default {
        config.set_default_provider(id);
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn describe_failure(body: &Value) -> String {
    let error = body["error"].as_str().unwrap_or("Request failed");
    match body["details"].as_object() {
        Some(details) => {
            let fields: Vec<_> = details
                .iter()
                .map(|(field, msg)| format!("  {field}: {}", msg.as_str().unwrap_or_default()))
                .collect();
            format!("{error}\n{}", fields.join("\n"))
        }
        None => error.to_string(),
    }
}

/// Writes the endpoint response to `out`. A non-200 response fails the
/// command, after its raw body has been written when `json` is set.
fn report(res: &ApiResponse, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&res.body)?)?;
    }

    if res.status != 200 {
        bail!(describe_failure(&res.body));
    }

    if !json {
        let reading: HumidityReading = serde_json::from_value(res.body["data"].clone())
            .context("Unexpected response shape from humidity endpoint")?;
        write_reading(out, &reading)?;
    }
    Ok(())
}

fn write_reading(out: &mut impl Write, reading: &HumidityReading) -> io::Result<()> {
    let at = reading.location;

    writeln!(out, "{}", reading.message)?;
    writeln!(out)?;
    writeln!(out, "  provider:    {}", reading.provider.label())?;
    writeln!(out, "  location:    {:.4}, {:.4}", at.latitude, at.longitude)?;
    writeln!(out, "  date:        {}", reading.date)?;
    writeln!(out, "  humidity:    {}% ({})", reading.humidity, reading.level)?;
    if let Some(t) = reading.temperature {
        writeln!(out, "  temperature: {t:.1} °C")?;
    }
    if let Some(p) = reading.pressure {
        writeln!(out, "  pressure:    {p:.1} hPa")?;
    }
    if let Some(w) = reading.wind_speed {
        writeln!(out, "  wind:        {w:.1} m/s")?;
    }
    Ok(())
}
