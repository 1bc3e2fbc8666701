use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{metadata, read_to_string, try_exists};

pub const CONFIG_FILE_NAME: &str = "grassformation.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    #[serde(default)]
    dispatch_handler_lambda_arn: Option<String>,
    #[serde(default)]
    state_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// File the config was read from, if one existed.
    pub path: Option<PathBuf>,
    pub dispatch_handler_lambda_arn: Option<String>,
    /// State file, resolved against the config file's directory.
    pub state_path: Option<PathBuf>,
}

impl Config {
    /// Loads `path`, or `grassformation.toml` inside it when it is a
    /// directory. A missing file gives the default config.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let is_dir = metadata(path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        let path = if is_dir {
            path.join(CONFIG_FILE_NAME)
        } else {
            path.to_owned()
        };
        let exists = try_exists(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        if !exists {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(Self::default());
        }
        let string = read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        Self::parse(path, &string)
    }

    fn parse(path: PathBuf, string: &str) -> Result<Self, ConfigError> {
        let config: ConfigToml = toml::from_str(string).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        let ConfigToml {
            dispatch_handler_lambda_arn,
            state_path,
        } = config;
        let state_path = state_path.map(|state_path| resolve_path(&path, state_path));
        Ok(Config {
            path: Some(path),
            dispatch_handler_lambda_arn,
            state_path,
        })
    }
}

fn resolve_path(base_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match base_path.parent() {
        Some(parent) => parent.join(path),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_resolves_state_path() {
        let config = Config::parse(
            PathBuf::from("/etc/gg/grassformation.toml"),
            r#"
                dispatch_handler_lambda_arn = "arn:aws:lambda:eu-west-1:123456789012:function:dispatch"
                state_path = "state.json"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.dispatch_handler_lambda_arn.as_deref(),
            Some("arn:aws:lambda:eu-west-1:123456789012:function:dispatch")
        );
        assert_eq!(config.state_path, Some(PathBuf::from("/etc/gg/state.json")));
    }

    #[test]
    fn absolute_state_path_is_kept() {
        let config = Config::parse(
            PathBuf::from("/etc/gg/grassformation.toml"),
            r#"state_path = "/var/lib/gg.json""#,
        )
        .unwrap();
        assert_eq!(config.state_path, Some(PathBuf::from("/var/lib/gg.json")));
        assert_eq!(config.dispatch_handler_lambda_arn, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::parse(PathBuf::from("grassformation.toml"), "machines = 1");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn directory_resolves_to_config_file() {
        let dir = std::env::temp_dir().join(cuid2::create_id());
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(CONFIG_FILE_NAME), r#"state_path = "state.json""#)
            .await
            .unwrap();

        let config = Config::load(&dir).await.unwrap();
        assert_eq!(config.path, Some(dir.join(CONFIG_FILE_NAME)));
        assert_eq!(config.state_path, Some(dir.join("state.json")));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join(cuid2::create_id());
        let config = Config::load(&dir.join(CONFIG_FILE_NAME)).await.unwrap();
        assert_eq!(config, Config::default());
    }
}
