use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use gophora_session::api;
use gophora_session::backend::Registration;
use gophora_session::navigation::HistoryNavigator;
use gophora_session::{AppState, ClientConfig, PendingAction, Role, RouteGuard, SessionError};

#[derive(Parser, Debug)]
#[command(name = "gophora", about = "Gophora session client")]
struct Cli {
    /// Backend base URL (overrides `GOPHORA_API_URL`).
    #[arg(long)]
    api_url: Option<String>,

    /// Credential storage file (overrides `GOPHORA_STORAGE_PATH`).
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GOPHORA_PASSWORD")]
        password: String,
        #[arg(long)]
        role: Role,
    },
    Logout,
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
    },
    /// Show the stored session and the backend's view of the user.
    Whoami,
    /// Show the cached profile, fetching it if nothing is cached.
    Profile,
    /// Apply to an opportunity, deferring until login when anonymous.
    Apply { opportunity_id: String },
    /// Evaluate the route guard for the current session.
    Guard {
        #[arg(long)]
        role: Option<Role>,
    },
    Status,
}

#[tokio::main]
async fn main() -> Result<(), SessionError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }

    let navigator = Arc::new(HistoryNavigator::new());
    let state = AppState::boot(&config, navigator.clone())?;
    let output = run(&state, cli.command).await?;

    let navigated = navigator.current().map(|route| route.path());
    print_json(&json!({ "result": output, "navigated_to": navigated }));
    Ok(())
}

async fn run(state: &AppState, command: Command) -> Result<Value, SessionError> {
    let context = &state.context;
    match command {
        Command::Login { email, password, role } => {
            let report = state.login(&email, &password, role).await?;
            Ok(json!({
                "role": report.outcome.role,
                "home": report.outcome.home.path(),
                "replay": report.replay,
            }))
        }
        Command::Logout => {
            context.logout().await;
            Ok(json!({ "phase": context.phase().label() }))
        }
        Command::Register { email, password, confirm_password, name, skills } => {
            let registration = Registration { email, password, confirm_password, full_name: name, skills };
            let user = context.register(&registration).await?;
            Ok(json!({ "user_id": user.user_id, "email": user.email }))
        }
        Command::Whoami => {
            let Some(session) = context.current_session() else {
                return Ok(json!({ "phase": context.phase().label() }));
            };
            let user = api::fetch_current_user(&state.client).await?;
            Ok(json!({ "session": session, "user": user }))
        }
        Command::Profile => match context.store().cached_profile() {
            Some(profile) => Ok(profile),
            None => {
                let profile = api::fetch_profile(&state.client).await?;
                if let Err(e) = context.store().cache_profile(&profile) {
                    tracing::warn!(error = %e, "profile cache write failed");
                }
                Ok(profile)
            }
        },
        Command::Apply { opportunity_id } => {
            let outcome = state.apply(&opportunity_id).await?;
            serde_json::to_value(outcome).map_err(|e| SessionError::Parse(e.to_string()))
        }
        Command::Guard { role } => {
            let guard = RouteGuard { required_role: role };
            serde_json::to_value(guard.enforce(context)).map_err(|e| SessionError::Parse(e.to_string()))
        }
        Command::Status => Ok(json!({
            "phase": context.phase().label(),
            "session": context.current_session(),
            "pending_application_id": context.store().pending_action().map(|PendingAction::Apply { opportunity_id }| opportunity_id),
            "applications_sent": context.store().applications_sent(),
        })),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!(error = %e, "output encode failed"),
    }
}
