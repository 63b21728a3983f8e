use std::fs;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use contracts::{
    ControlValues, PersonaControls, PersonaRecommendationRequest,
    ScenarioCompareRequest, DEFAULT_HORIZON_YEARS,
};
use decision_api::{serve, DecisionApi, ServerConfig};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "decision-cli")]
#[command(about = "Persona-weighted post-fire land-use decision support")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides DECISION_BIND_ADDR)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Print every persona definition
    Personas,
    /// Print the weight vector for a persona and slider values
    Weights {
        persona: String,
        /// Slider value as name=value; repeatable
        #[arg(short, long = "control", value_parser = parse_control)]
        controls: Vec<(String, f64)>,
    },
    /// Rank actions for one or more parcels
    Recommend {
        persona: String,
        #[arg(required = true)]
        parcels: Vec<String>,
        #[arg(short, long = "control", value_parser = parse_control)]
        controls: Vec<(String, f64)>,
        #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS)]
        horizon: u32,
    },
    /// Compare two scenarios from a JSON request file ("-" reads stdin)
    Compare { request: PathBuf },
}

fn parse_control(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {raw}"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid control value: {raw}"))?;
    Ok((name.trim().to_string(), value))
}

fn read_request(path: &PathBuf) -> Result<ScenarioCompareRequest, String> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| format!("failed to read stdin: {err}"))?;
        buffer
    } else {
        fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?
    };
    serde_json::from_str(&raw).map_err(|err| format!("invalid scenario request: {err}"))
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

async fn run(command: Command) -> Result<(), String> {
    debug!(?command, "running command");
    let config = ServerConfig::from_env().map_err(|err| err.to_string())?;
    let api = DecisionApi::from_config(&config);

    match command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or(config.bind_addr);
            println!("serving api on http://{addr}");
            serve(addr, api)
                .await
                .map_err(|err| format!("server error: {err}"))
        }
        Command::Personas => print_json(&api.personas()),
        Command::Weights { persona, controls } => {
            let controls = controls.into_iter().collect::<ControlValues>();
            let weights = api
                .weights(&persona, &controls)
                .map_err(|err| err.to_string())?;
            print_json(&weights)
        }
        Command::Recommend {
            persona,
            parcels,
            controls,
            horizon,
        } => {
            let request = PersonaRecommendationRequest {
                persona,
                controls: PersonaControls {
                    values: controls.into_iter().collect(),
                },
                parcels,
                horizon,
            };
            let response = api.recommend(&request).map_err(|err| err.to_string())?;
            print_json(&response)
        }
        Command::Compare { request } => {
            let request = read_request(&request)?;
            let response = api.compare(&request).map_err(|err| err.to_string())?;
            print_json(&response)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_pairs_parse() {
        assert_eq!(
            parse_control("scenic_recovery=0.9"),
            Ok(("scenic_recovery".to_string(), 0.9))
        );
        assert!(parse_control("scenic_recovery").is_err());
        assert!(parse_control("scenic_recovery=high").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn recommend_requires_parcels() {
        assert!(Args::try_parse_from(["decision-cli", "recommend", "hiker"]).is_err());
        let parsed = Args::try_parse_from([
            "decision-cli",
            "recommend",
            "hiker",
            "p1",
            "p2",
            "-c",
            "avoid_reburn=0.2",
        ])
        .expect("valid recommend args");
        match parsed.command {
            Command::Recommend {
                parcels, controls, ..
            } => {
                assert_eq!(parcels, vec!["p1", "p2"]);
                assert_eq!(controls, vec![("avoid_reburn".to_string(), 0.2)]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
