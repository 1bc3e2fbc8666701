use std::path::{Path, PathBuf};

use grassformation_api::{MemoryGreengrass, MemoryState};
use thiserror::Error;
use tokio::fs::{read_to_string, try_exists, write};

#[derive(Error, Debug)]
pub enum StateError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Restores the in-memory backend from `path`, starting empty if the file
/// does not exist yet.
pub async fn load_state(path: &Path) -> Result<MemoryGreengrass, StateError> {
    let read_error = |source| StateError::Read {
        path: path.to_owned(),
        source,
    };
    if !try_exists(path).await.map_err(read_error)? {
        tracing::info!(path = %path.display(), "starting from empty state");
        return Ok(MemoryGreengrass::new());
    }
    let string = read_to_string(path).await.map_err(read_error)?;
    let state: MemoryState =
        serde_json::from_str(&string).map_err(|source| StateError::Parse {
            path: path.to_owned(),
            source,
        })?;
    Ok(MemoryGreengrass::from_state(state))
}

pub async fn save_state(path: &Path, api: &MemoryGreengrass) -> Result<(), StateError> {
    let string = serde_json::to_string_pretty(&api.snapshot()).map_err(StateError::Serialize)?;
    write(path, string)
        .await
        .map_err(|source| StateError::Write {
            path: path.to_owned(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "saved state");
    Ok(())
}
