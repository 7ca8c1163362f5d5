// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shirokuma - birth date and MBTI diagnoses over LINE.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shirokuma_config::ShirokumaConfig;
use shirokuma_core::BirthDate;

/// Shirokuma - birth date and MBTI diagnoses over LINE.
#[derive(Parser, Debug)]
#[command(name = "shirokuma", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server (default).
    Serve,
    /// Validate configuration and assets, then exit.
    Check,
    /// Print the calendar classification of a date.
    Classify {
        /// Date as YYYY-MM-DD.
        date: String,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = load_validated(cli.config.as_deref());
            serve::init_tracing(&config.server.log_level, serve::register_secrets(&config));
            if let Err(e) = serve::run_serve(config).await {
                tracing::error!(error = %e, "shirokuma exited with error");
                std::process::exit(1);
            }
        }
        Commands::Check => {
            let config = load_validated(cli.config.as_deref());
            match serve::load_assets(&config).and_then(|assets| {
                serve::build_dispatcher(&config, assets).map(|_| ())
            }) {
                Ok(()) => {
                    println!("shirokuma: configuration and assets OK");
                    println!("  listen:   {}:{}", config.server.host, config.server.port);
                    println!("  model:    {}", config.openai.model);
                    println!("  reports:  {}", if config.report.enabled { "pdf" } else { "text" });
                    println!(
                        "  forward:  {}",
                        config.server.secondary_webhook_url.as_deref().unwrap_or("off")
                    );
                }
                Err(e) => {
                    eprintln!("shirokuma: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Classify { date, json } => {
            // Secrets are not needed to classify, so skip validation.
            let loaded = match cli.config.as_deref() {
                Some(path) => shirokuma_config::load_config_from_path(path),
                None => shirokuma_config::load_config(),
            };
            let config = match loaded {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("shirokuma: config error: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(message) = classify(&config, &date, json) {
                eprintln!("shirokuma: {message}");
                std::process::exit(1);
            }
        }
    }
}

fn load_validated(path: Option<&std::path::Path>) -> ShirokumaConfig {
    let result = match path {
        Some(path) => shirokuma_config::load_and_validate_path(path),
        None => shirokuma_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            shirokuma_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn classify(config: &ShirokumaConfig, date: &str, json: bool) -> Result<(), String> {
    let birth = BirthDate::parse_iso(date.trim())
        .ok_or_else(|| format!("`{date}` is not a valid YYYY-MM-DD date"))?;
    let assets = serve::load_assets(config).map_err(|e| e.to_string())?;
    let result = assets.classifier.classify(&birth);

    if json {
        let out = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        println!("{} ({birth})", birth.iso());
        println!("  cycle:    {} {}", result.cycle_index, result.animal);
        println!("  stem:     {} (index {})", result.stem_symbol, result.stem_index);
        println!("  element:  {}", result.element);
        println!("  guardian: {}", result.guardian);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["shirokuma"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn classify_takes_a_date() {
        let cli = Cli::try_parse_from(["shirokuma", "classify", "1996-04-24", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Classify { date, json }) => {
                assert_eq!(date, "1996-04-24");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn classify_rejects_bad_dates() {
        let config = ShirokumaConfig::default();
        assert!(classify(&config, "1996-02-30", false).is_err());
    }
}
