//! Credential resolution: config file < environment < command-line flags.
//!
//! The environment and flag layers are merged by clap (`env = ...` on each
//! flag); this module supplies the file layer underneath.

use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_FILE: &str = ".koillection.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no home directory to look up {0}")]
    NoHome(String),
    #[error("missing {0}: set it in the config file, the environment or with --{0}")]
    Missing(&'static str),
}

/// Contents of the JSON config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    pub server: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server: String,
    pub user: String,
    pub password: String,
}

/// Where to look for the config file, and whether it must exist.
///
/// A value containing a path separator is used as given; a bare file name
/// is looked up in `home`. Without a value or a home directory there is no
/// file to read.
pub fn locate(value: Option<&str>, home: Option<&Path>) -> Result<Option<(PathBuf, bool)>, ConfigError> {
    match value {
        None => Ok(home.map(|h| (h.join(DEFAULT_FILE), false))),
        Some(v) if v.contains('/') || v.contains(MAIN_SEPARATOR) => Ok(Some((PathBuf::from(v), true))),
        Some(v) => home
            .map(|h| Some((h.join(v), true)))
            .ok_or_else(|| ConfigError::NoHome(v.to_string())),
    }
}

/// Read `path`. A missing file is an error only when `required`.
pub fn load(path: &Path, required: bool) -> Result<FileConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => return Ok(FileConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay `overrides` (environment and flags) on the file values.
pub fn resolve(file: FileConfig, overrides: FileConfig) -> Result<Credentials, ConfigError> {
    let present = |v: Option<String>| v.filter(|v| !v.is_empty());
    let pick = |over: Option<String>, base: Option<String>, name: &'static str| {
        present(over).or(present(base)).ok_or(ConfigError::Missing(name))
    };
    Ok(Credentials {
        server: pick(overrides.server, file.server, "server")?,
        user: pick(overrides.user, file.user, "user")?,
        password: pick(overrides.password, file.password, "password")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("koi-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn bare_names_resolve_in_home() {
        let home = Path::new("/home/koi");
        assert_eq!(locate(None, Some(home)).unwrap(), Some((home.join(DEFAULT_FILE), false)));
        assert_eq!(locate(Some("work.json"), Some(home)).unwrap(), Some((home.join("work.json"), true)));
        assert_eq!(
            locate(Some("./work.json"), Some(home)).unwrap(),
            Some((PathBuf::from("./work.json"), true))
        );
        assert!(matches!(locate(Some("work.json"), None), Err(ConfigError::NoHome(_))));
    }

    #[test]
    fn no_home_means_no_default_file() {
        assert_eq!(locate(None, None).unwrap(), None);
        assert_eq!(
            locate(Some("/etc/koi.json"), None).unwrap(),
            Some((PathBuf::from("/etc/koi.json"), true))
        );
    }

    #[test]
    fn missing_default_file_is_empty() {
        let path = std::env::temp_dir().join(format!("koi-missing-{}.json", uuid::Uuid::new_v4()));
        assert_eq!(load(&path, false).unwrap(), FileConfig::default());
        assert!(matches!(load(&path, true), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn file_values_are_read() {
        let path = scratch("koi.json", r#"{"server":"https://koi.example","user":"admin","password":"pw"}"#);
        let file = load(&path, true).unwrap();
        assert_eq!(file.server.as_deref(), Some("https://koi.example"));
        assert_eq!(file.password.as_deref(), Some("pw"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let path = scratch("koi.json", "{server");
        assert!(matches!(load(&path, true), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn overrides_win_over_file() {
        let file = FileConfig {
            server: Some("https://file".into()),
            user: Some("file-user".into()),
            password: Some("file-pw".into()),
        };
        let overrides = FileConfig {
            user: Some("flag-user".into()),
            ..FileConfig::default()
        };
        let credentials = resolve(file, overrides).unwrap();
        assert_eq!(credentials.server, "https://file");
        assert_eq!(credentials.user, "flag-user");
        assert_eq!(credentials.password, "file-pw");
    }

    #[test]
    fn empty_override_falls_back_to_file() {
        let file = FileConfig {
            server: Some("https://file".into()),
            user: Some("file-user".into()),
            password: Some("file-pw".into()),
        };
        let overrides = FileConfig {
            user: Some(String::new()),
            password: Some("flag-pw".into()),
            ..FileConfig::default()
        };
        let credentials = resolve(file, overrides).unwrap();
        assert_eq!(credentials.user, "file-user");
        assert_eq!(credentials.password, "flag-pw");
    }

    #[test]
    fn missing_value_names_the_setting() {
        let err = resolve(FileConfig::default(), FileConfig { server: Some("s".into()), ..FileConfig::default() })
            .unwrap_err();
        assert_eq!(err.to_string(), "missing user: set it in the config file, the environment or with --user");
    }
}
