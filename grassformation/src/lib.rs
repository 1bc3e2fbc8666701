mod config;
mod state;

use std::{
    env,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand, ValueEnum};
use grassformation_api::MemoryGreengrass;
use grassformation_event::{CustomResourceEvent, CustomResourceResponse, Status};
use grassformation_handler::{Context, dispatch, handle};
use grassformation_resource::ResourceKind;
use grassformation_template::{MacroEvent, MacroStatus, handle_macro};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::{AsyncReadExt, stdin};
use tracing::info;

pub use crate::config::{CONFIG_FILE_NAME, Config, ConfigError};
pub use crate::state::{StateError, load_state, save_state};

#[derive(Parser, Debug)]
#[command(
    name = "grassformation",
    version,
    about = "Greengrass definitions as CloudFormation custom resources"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    #[arg(long = "log", global = true, default_value = "info")]
    pub log: String,

    #[arg(long = "log-format", global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Handle a custom-resource event, picking the resource kind from its
    /// GrassFormationResourceType property
    Dispatch {
        /// Event JSON file, or "-" for stdin
        #[arg(long = "event")]
        event_path: PathBuf,

        /// State file backing the in-memory Greengrass
        #[arg(long = "state")]
        state_path: Option<PathBuf>,
    },
    /// Handle a custom-resource event for one resource kind
    Handle {
        /// core, device, function, logger, resource, subscription or group
        #[arg(long = "kind")]
        kind: ResourceKind,

        /// Event JSON file, or "-" for stdin
        #[arg(long = "event")]
        event_path: PathBuf,

        /// State file backing the in-memory Greengrass
        #[arg(long = "state")]
        state_path: Option<PathBuf>,
    },
    /// Run the template macro over a macro event
    Transform {
        /// Macro event JSON file, or "-" for stdin
        #[arg(long = "event")]
        event_path: PathBuf,

        /// ARN of the dispatch handler
        #[arg(long = "service-token", env = "DISPATCH_HANDLER_LAMBDA_ARN")]
        service_token: Option<String>,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("failed to read event {path}: {source}")]
    ReadEvent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse event {path}: {source}")]
    ParseEvent {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize response: {0}")]
    WriteResponse(#[source] serde_json::Error),

    #[error("no service token: pass --service-token or set dispatch_handler_lambda_arn")]
    MissingServiceToken,

    #[error("request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("template macro failed")]
    MacroFailed,
}

pub async fn get_config(cli: &Cli) -> Result<Config, AppError> {
    let config_path = cli
        .config_path
        .clone()
        .or_else(|| env::var("GRASSFORMATION_CONFIG").ok().map(PathBuf::from))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load(&config_path).await?;
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = get_config(&cli).await?;
    match cli.command {
        Command::Dispatch {
            event_path,
            state_path,
        } => cmd_reconcile(config, None, event_path, state_path).await,
        Command::Handle {
            kind,
            event_path,
            state_path,
        } => cmd_reconcile(config, Some(kind), event_path, state_path).await,
        Command::Transform {
            event_path,
            service_token,
        } => cmd_transform(config, event_path, service_token).await,
    }
}

async fn cmd_reconcile(
    config: Config,
    kind: Option<ResourceKind>,
    event_path: PathBuf,
    state_path: Option<PathBuf>,
) -> Result<(), AppError> {
    let event: CustomResourceEvent = read_event(&event_path).await?;
    let state_path = state_path.or(config.state_path);
    let api = match &state_path {
        Some(path) => load_state(path).await?,
        None => MemoryGreengrass::new(),
    };

    let ctx = Context::new(&api, &event);
    let response = match kind {
        Some(kind) => handle(&ctx, kind, &event).await,
        None => dispatch(&ctx, &event).await,
    };

    if let Some(path) = &state_path {
        save_state(path, &api).await?;
    }
    print_json(&response)?;

    let CustomResourceResponse { status, reason, .. } = response;
    match status {
        Status::Success => Ok(()),
        Status::Failed => Err(AppError::RequestFailed {
            reason: reason.unwrap_or_default(),
        }),
    }
}

async fn cmd_transform(
    config: Config,
    event_path: PathBuf,
    service_token: Option<String>,
) -> Result<(), AppError> {
    let event: MacroEvent = read_event(&event_path).await?;
    let service_token = service_token
        .or(config.dispatch_handler_lambda_arn)
        .ok_or(AppError::MissingServiceToken)?;
    info!(request_id = %event.request_id, "running template macro");
    let response = handle_macro(event, &service_token);
    print_json(&response)?;
    match response.status {
        MacroStatus::Success => Ok(()),
        MacroStatus::Failure => Err(AppError::MacroFailed),
    }
}

async fn read_event<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let read_error = |source| AppError::ReadEvent {
        path: path.to_owned(),
        source,
    };
    let string = if path.as_os_str() == "-" {
        let mut string = String::new();
        stdin()
            .read_to_string(&mut string)
            .await
            .map_err(read_error)?;
        string
    } else {
        tokio::fs::read_to_string(path).await.map_err(read_error)?
    };
    serde_json::from_str(&string).map_err(|source| AppError::ParseEvent {
        path: path.to_owned(),
        source,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let string = serde_json::to_string_pretty(value).map_err(AppError::WriteResponse)?;
    println!("{string}");
    Ok(())
}
