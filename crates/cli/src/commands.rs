//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use digs_core::SessionSnapshot;
use digs_http::{
    ApiResponse, ClientConfig, LoginRequest, RefreshOutcome, SessionClient, SessionObserver,
};
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and persist the session
    Login {
        /// Account email or username
        username: String,

        /// Account password
        #[arg(long, env = "DIGS_PASSWORD", hide_env_values = true)]
        password: String,

        /// University to scope the login to
        #[arg(long)]
        university: Option<String>,
    },

    /// Revoke the refresh token and clear the local session
    Logout,

    /// Show the stored session
    Status,

    /// Exchange the refresh token for a new token pair
    Refresh,

    /// Check that the backend is reachable
    Ping,

    /// Show the effective client configuration
    Config,

    /// Send an authenticated GET
    Get {
        /// Path relative to the base URL, or an absolute URL
        path: String,
    },

    /// Send an authenticated POST with a JSON body
    Post {
        path: String,

        /// JSON request body
        #[arg(long, default_value = "{}")]
        body: String,
    },

    /// Send an authenticated PUT with a JSON body
    Put {
        path: String,

        /// JSON request body
        #[arg(long, default_value = "{}")]
        body: String,
    },

    /// Send an authenticated DELETE
    Delete { path: String },
}

/// Reports session loss to the terminal user
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn forced_logout(&self, notice: &str) {
        warn!("Forced logout");
        eprintln!("{notice}");
    }

    fn session_expired(&self) {
        warn!("Session expired");
        eprintln!("Your session has expired. Please log in again.");
    }
}

impl Commands {
    pub async fn execute(self, client: &SessionClient, config: &ClientConfig) -> Result<()> {
        match self {
            Self::Login {
                username,
                password,
                university,
            } => {
                let mut request = LoginRequest::new(username, password);
                if let Some(university) = university {
                    request = request.university(university);
                }
                let outcome = client.login(&request).await?;
                println!("Logged in as {} ({})", outcome.user_id, outcome.role);
                if let Some(message) = outcome.message {
                    println!("{message}");
                }
                if !outcome.device_registered {
                    eprintln!("Warning: this device could not be registered");
                }
                Ok(())
            }
            Self::Logout => {
                client.logout().await?;
                println!("Logged out");
                Ok(())
            }
            Self::Status => {
                print_session(&client.session().await?);
                Ok(())
            }
            Self::Refresh => match client.refresh().await? {
                RefreshOutcome::Refreshed | RefreshOutcome::Shared => {
                    println!("Access token refreshed");
                    Ok(())
                }
                RefreshOutcome::NoRefreshToken => bail!("Not logged in"),
                RefreshOutcome::Rejected(status) => {
                    bail!("Refresh rejected ({status}); please log in again")
                }
                RefreshOutcome::Unreachable => bail!("Backend unreachable"),
            },
            Self::Ping => {
                let reply = client.ping().await?;
                println!("{}", serde_json::to_string_pretty(&reply)?);
                Ok(())
            }
            Self::Config => {
                println!("{config:#?}");
                Ok(())
            }
            Self::Get { path } => print_response(client.get(&path).await?),
            Self::Post { path, body } => {
                print_response(client.post(&path, &parse_body(&body)?).await?)
            }
            Self::Put { path, body } => {
                print_response(client.put(&path, &parse_body(&body)?).await?)
            }
            Self::Delete { path } => print_response(client.delete(&path).await?),
        }
    }
}

fn parse_body(body: &str) -> Result<serde_json::Value> {
    serde_json::from_str(body).context("--body must be valid JSON")
}

fn print_response(response: ApiResponse) -> Result<()> {
    info!(
        status = %response.status(),
        disposition = ?response.disposition(),
        "Request finished"
    );

    if !response.body().is_empty() {
        match response.json::<serde_json::Value>() {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{}", response.text()),
        }
    }

    match response.error_for_status() {
        Ok(_) => Ok(()),
        Err(e) if e.requires_login() => bail!("{e}. Run `digs login` to sign in again"),
        Err(e) => Err(e.into()),
    }
}

fn print_session(session: &SessionSnapshot) {
    if !session.is_signed_in() && session.refresh_token.is_none() {
        println!("Not logged in");
        if let Some(device) = &session.device_token {
            println!("Device:     {device}");
        }
        return;
    }

    let present = |value: &Option<String>| if value.is_some() { "stored" } else { "missing" };
    println!("User:       {}", session.user_id.as_deref().unwrap_or("-"));
    println!("Role:       {}", session.role.as_deref().unwrap_or("-"));
    println!("University: {}", session.university.as_deref().unwrap_or("-"));
    println!("Device:     {}", session.device_token.as_deref().unwrap_or("-"));
    println!("Access:     {}", present(&session.access_token));
    println!("Refresh:    {}", present(&session.refresh_token));
}
