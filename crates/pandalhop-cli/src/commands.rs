//! Command parsing and execution.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::debug;

use pandalhop_core::api::{ApiClient, NearbyQuery};
use pandalhop_core::auth::SessionManager;
use pandalhop_core::config::Config;
use pandalhop_core::models::{CreatePandalInput, Pandal};
use pandalhop_core::services::{data_service, DataService};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Login { email: String },
    Register { name: String, email: String },
    Logout,
    Status,
    Pandals { near: Option<NearbyQuery> },
    Districts,
    Food,
    Routes,
    Route { id: String },
    Regions { country: Option<String>, state: Option<String> },
    Pending,
    Create { file: PathBuf },
    Approve { id: String },
}

fn parse_number(value: &str, name: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid {}: {}", name, value))
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            [] | ["help"] | ["--help"] | ["-h"] => Command::Help,
            ["login", email] => Command::Login {
                email: email.to_string(),
            },
            ["register", name, email] => Command::Register {
                name: name.to_string(),
                email: email.to_string(),
            },
            ["logout"] => Command::Logout,
            ["status"] => Command::Status,
            ["pandals"] => Command::Pandals { near: None },
            ["pandals", lng, lat, radius] => Command::Pandals {
                near: Some(NearbyQuery {
                    longitude: parse_number(lng, "longitude")?,
                    latitude: parse_number(lat, "latitude")?,
                    radius: parse_number(radius, "radius")?,
                }),
            },
            ["districts"] => Command::Districts,
            ["food"] => Command::Food,
            ["routes"] => Command::Routes,
            ["route", id] => Command::Route { id: id.to_string() },
            ["regions", rest @ ..] if rest.len() <= 2 => Command::Regions {
                country: rest.first().map(|s| s.to_string()),
                state: rest.get(1).map(|s| s.to_string()),
            },
            ["pending"] => Command::Pending,
            ["create", file] => Command::Create {
                file: PathBuf::from(*file),
            },
            ["approve", id] => Command::Approve { id: id.to_string() },
            [name, ..] => return Err(format!("Unknown command or wrong arguments: {}", name)),
        };
        Ok(command)
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}

fn print_pandal(pandal: &Pandal) {
    println!(
        "{:<10} {:<32} {:<28} {:>14}  {}",
        pandal.id,
        pandal.name,
        pandal.place_display(),
        pandal.rating_display(),
        pandal.location.display()
    );
}

pub async fn run(command: Command, mut config: Config) -> Result<()> {
    let store = config.credential_store();
    let client = ApiClient::new(&config, store).context("Failed to create API client")?;
    debug!(command = ?command, "Running command");

    match command {
        Command::Help => {}

        Command::Login { email } => {
            let password = prompt_password("Password: ")?;
            let session = SessionManager::new(client);
            session.login(&email, &password).await?;
            config.last_email = Some(email.clone());
            config.save().context("Failed to save config")?;
            println!("Logged in as {}", email);
        }

        Command::Register { name, email } => {
            let password = prompt_password("Choose a password: ")?;
            let confirm = prompt_password("Confirm password: ")?;
            if password != confirm {
                bail!("Passwords do not match");
            }
            let session = SessionManager::new(client);
            let (registered, _) = session.register(&name, &email, &password).await?;
            config.last_email = Some(email.clone());
            config.save().context("Failed to save config")?;
            if registered.message.is_empty() {
                println!("Registered and logged in as {}", email);
            } else {
                println!("{} - logged in as {}", registered.message, email);
            }
        }

        Command::Logout => {
            SessionManager::new(client).logout()?;
            println!("Logged out");
        }

        Command::Status => {
            let session = SessionManager::new(client);
            println!("API:            {}", config.api_base_url);
            println!("Mock data:      {}", config.use_mock_data);
            println!("Refresh policy: {:?}", config.refresh_policy);
            match (session.is_authenticated(), config.last_email.as_deref()) {
                (true, Some(email)) => println!("Session:        logged in ({})", email),
                (true, None) => println!("Session:        logged in"),
                (false, _) => println!("Session:        logged out"),
            }
        }

        Command::Pandals { near } => {
            let pandals = match near {
                Some(near) => client.list_approved(Some(near)).await?,
                None => data_service(&config, client).get_pandals().await?,
            };
            if pandals.is_empty() {
                println!("No pandals found");
            }
            pandals.iter().for_each(print_pandal);
        }

        Command::Districts => {
            for district in data_service(&config, client).get_districts().await? {
                println!("{:<24} {:>5} pandals", district.name, district.pandal_count);
            }
        }

        Command::Food => {
            for stop in data_service(&config, client).get_food_stops().await? {
                println!("{:<32} {:<14} {}", stop.name, stop.kind, stop.place_display());
            }
        }

        Command::Routes => {
            for route in data_service(&config, client).get_routes().await? {
                println!("{:<10} {:<32} {:<12} {}", route.id, route.title, route.duration, route.stops_display());
                if !route.description.is_empty() {
                    println!("           {}", route.description);
                }
            }
        }

        Command::Route { id } => {
            let route = client.get_route(&id).await?;
            println!("{} ({})", route.title, route.duration);
            if !route.description.is_empty() {
                println!("{}", route.description);
            }
            println!();
            for (i, stop) in route.stops.iter().enumerate() {
                println!("{:>3}. {} - {}", i + 1, stop.name, stop.place_display());
            }
        }

        Command::Regions { country, state } => {
            let data = client
                .administrative_data(country.as_deref(), state.as_deref())
                .await?;
            println!("{} ({})", data.country.name, data.country.code);
            for state in data.active_states() {
                println!("  {} ({})", state.name, state.code);
                for district in state.districts.iter().filter(|d| d.is_active) {
                    println!("    {:<8} {}", district.code, district.name);
                }
            }
        }

        Command::Pending => {
            let pandals = client.list_pending().await?;
            if pandals.is_empty() {
                println!("Nothing waiting for approval");
            }
            for pandal in &pandals {
                println!(
                    "{:<10} {:<32} {:<28} {} approvals",
                    pandal.id,
                    pandal.name,
                    pandal.place_display(),
                    pandal.approval_count
                );
            }
        }

        Command::Create { file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let input: CreatePandalInput = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse pandal from {}", file.display()))?;
            let id = client.create_pandal(&input).await?;
            println!("Submitted {} ({}) - awaiting approval", input.name.trim(), id);
        }

        Command::Approve { id } => {
            let pandal = client.approve_pandal(&id).await?;
            println!(
                "Approved {} - {} approvals, status: {}",
                pandal.name,
                pandal.approval_count,
                pandal.status.as_str()
            );
        }
    }

    Ok(())
}
