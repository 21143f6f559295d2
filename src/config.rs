use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no Firebase configuration found: create {0} with api_key and project_id \
         under [firebase], or set FIREBASE_API_KEY and FIREBASE_PROJECT_ID"
    )]
    Missing(String),
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Connection credentials for the remote store. Missing configuration is a
/// fatal startup condition; the caller aborts with the error message.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub firebase: Firebase,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Firebase {
    pub api_key: String,
    pub project_id: String,
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deadline-tui")
}

impl Config {
    /// Environment variables win over the config file, so a `.env` next to the
    /// binary is enough to run without a config directory.
    pub fn load() -> Result<Config, ConfigError> {
        if let (Ok(api_key), Ok(project_id)) =
            (env::var("FIREBASE_API_KEY"), env::var("FIREBASE_PROJECT_ID"))
        {
            return Ok(Config {
                firebase: Firebase {
                    api_key,
                    project_id,
                },
            });
        }

        let path = config_dir().join("config.toml");
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::Missing(display));
        }
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::parse(&raw, &display)
    }

    fn parse(raw: &str, path: &str) -> Result<Config, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

/// Persisted refresh token, exchanged at startup to restore the last session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedSession {
    pub refresh_token: String,
}

fn session_path() -> PathBuf {
    config_dir().join("session.toml")
}

pub fn load_saved_session() -> Option<SavedSession> {
    let raw = fs::read_to_string(session_path()).ok()?;
    toml::from_str(&raw).ok()
}

pub fn save_session(refresh_token: &str) {
    let saved = SavedSession {
        refresh_token: refresh_token.to_string(),
    };
    if let Ok(raw) = toml::to_string(&saved) {
        let dir = config_dir();
        let _ = fs::create_dir_all(&dir);
        let _ = fs::write(session_path(), raw);
    }
}

pub fn clear_saved_session() {
    let _ = fs::remove_file(session_path());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_config() {
        let raw = r#"
[firebase]
api_key = "AIza-test"
project_id = "my-project"
"#;
        let config = Config::parse(raw, "config.toml").unwrap();
        assert_eq!(config.firebase.api_key, "AIza-test");
        assert_eq!(config.firebase.project_id, "my-project");
    }

    #[test]
    fn test_parse_config_missing_key_fails() {
        let raw = r#"
[firebase]
project_id = "my-project"
"#;
        assert!(Config::parse(raw, "config.toml").is_err());
    }
}
