mod auth_client;
mod clock;
mod config;
mod controllers;
mod credentials;
mod mock_api;
mod models;
mod routes;
mod state;
mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

use auth_client::{AuthClient, AuthError};
use auth_client::http::HttpAuthApi;
use clock::SystemClock;
use config::PortalConfig;
use controllers::PageOutcome;
use credentials::CredentialStore;
use mock_api::{ApiError, MockApi};
use storage::{FileStore, KeyValueStore, StorageError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("mock backend failed: {0}")]
    Mock(#[from] ApiError),
    #[error("auth failed: {0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Parser, Debug)]
#[command(name = "pensionados", about = "Portal Pensionados — mock user API server and portal client")]
struct Cli {
    /// API base (e.g. `http://127.0.0.1:3000/api`). Unset runs the mock backend in-process.
    #[arg(long, env = "PENSIONADOS_BASE_URL")]
    base_url: Option<String>,

    /// Credential file; overrides `PENSIONADOS_STORAGE_PATH`.
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the mock user API and the guarded portal pages.
    Serve,
    #[command(flatten)]
    Client(ClientCommand),
}

/// Commands that act as the portal's browser.
#[derive(Subcommand, Debug)]
enum ClientCommand {
    /// Log in through the login page.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Open the dashboard.
    Dashboard,
    /// Open the profile page.
    Me,
    /// Change the display name from the profile page.
    UpdateProfile {
        #[arg(long)]
        name: String,
    },
    /// Log out locally.
    Logout,
    /// Report whether the stored credentials are usable.
    Status,
    /// Restore the in-process mock data and log out.
    Reset,
}

/// Client-side wiring: auth client plus the in-process backend when one is used.
struct Portal {
    client: AuthClient,
    mock: Option<Arc<MockApi>>,
}

impl Portal {
    fn open(base_url: Option<&str>, config: &PortalConfig) -> Result<Self, CliError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage_path)?);
        let credentials = CredentialStore::new(store.clone(), Arc::new(SystemClock), config.token_ttl);

        if let Some(url) = base_url {
            tracing::debug!(%url, "using HTTP user API");
            let client = AuthClient::new(Arc::new(HttpAuthApi::new(url)), credentials);
            return Ok(Self { client, mock: None });
        }

        let mock = Arc::new(MockApi::new(store, config.latency));
        let client = AuthClient::new(mock.clone(), credentials);
        Ok(Self { client, mock: Some(mock) })
    }
}

fn outcome_json<T: Serialize>(outcome: &PageOutcome<T>) -> Value {
    match outcome {
        PageOutcome::Render(view) => json!({ "render": view }),
        PageOutcome::Redirect(location) => json!({ "redirect": location }),
    }
}

fn emit(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()));
}

async fn serve(config: &PortalConfig) -> Result<(), CliError> {
    let mock = match &config.mock_db_path {
        Some(path) => MockApi::new(Arc::new(FileStore::open(path)?), config.latency),
        None => MockApi::in_memory(config.latency),
    };
    let app = routes::app(state::AppState::new(mock));

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(%port, "pensionados listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run(cli: Cli, mut config: PortalConfig) -> Result<(), CliError> {
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }
    match cli.command {
        Command::Serve => serve(&config).await,
        Command::Client(command) => {
            let portal = Portal::open(cli.base_url.as_deref(), &config)?;
            run_client(command, &portal).await
        }
    }
}

async fn run_client(command: ClientCommand, portal: &Portal) -> Result<(), CliError> {
    let client = &portal.client;

    match command {
        ClientCommand::Login { email, password } => {
            if let entry @ PageOutcome::Redirect(_) = controllers::login_page(client) {
                emit(&outcome_json(&entry));
                return Ok(());
            }
            let outcome = controllers::submit_login(client, &email, &password)
                .await
                .map_err(CliError::Rejected)?;
            emit(&outcome_json(&outcome));
        }
        ClientCommand::Dashboard => emit(&outcome_json(&controllers::dashboard_page(client))),
        ClientCommand::Me => emit(&outcome_json(&controllers::profile_page(client).await)),
        ClientCommand::UpdateProfile { name } => match controllers::save_profile(client, &name).await {
            PageOutcome::Render(Ok(view)) => emit(&json!({ "render": view })),
            PageOutcome::Render(Err(message)) => return Err(CliError::Rejected(message)),
            redirect @ PageOutcome::Redirect(_) => emit(&outcome_json(&redirect)),
        },
        ClientCommand::Logout => emit(&outcome_json(&controllers::logout(client))),
        ClientCommand::Status => {
            let creds = client.credentials();
            emit(&json!({
                "authenticated": client.is_authenticated(),
                "expiresAt": creds.credentials().map(|c| c.expires_at),
                "user": creds.cached_user(),
            }));
        }
        ClientCommand::Reset => {
            match &portal.mock {
                Some(mock) => mock.reset().await?,
                None => tracing::warn!("remote API in use; only local credentials are reset"),
            }
            client.logout()?;
            emit(&json!({ "reset": true }));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = PortalConfig::from_env();

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
