use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_DATA_DIR: &str = ".movieshelf";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub access_token: String,
    pub language: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                Error::Configuration(format!("missing required environment variable: {key}"))
            })
        };

        let base_url = required("TMDB_BASE_URL")?.trim_end_matches('/').to_string();
        let access_token = required("TMDB_ACCESS_TOKEN")?;
        let language = get("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let data_dir = get("MOVIESHELF_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        info!("Catalog at {} (language {})", base_url, language);
        Ok(Self {
            base_url,
            access_token,
            language,
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn applies_defaults_and_trims_base_url() {
        let env = vars(&[
            ("TMDB_BASE_URL", "https://api.themoviedb.org/3/"),
            ("TMDB_ACCESS_TOKEN", "token"),
        ]);
        let cfg = Config::from_lookup(|k| env.get(k).cloned()).expect("config");
        assert_eq!(cfg.base_url, "https://api.themoviedb.org/3");
        assert_eq!(cfg.language, DEFAULT_LANGUAGE);
        assert_eq!(cfg.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn missing_or_blank_token_is_a_configuration_error() {
        let env = vars(&[("TMDB_BASE_URL", "http://localhost")]);
        let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("TMDB_ACCESS_TOKEN")));

        let env = vars(&[("TMDB_BASE_URL", "http://localhost"), ("TMDB_ACCESS_TOKEN", "  ")]);
        assert!(matches!(
            Config::from_lookup(|k| env.get(k).cloned()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn missing_base_url_is_a_configuration_error() {
        let env = vars(&[("TMDB_ACCESS_TOKEN", "token")]);
        let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("TMDB_BASE_URL")));
    }

    #[test]
    fn optional_values_override_defaults() {
        let env = vars(&[
            ("TMDB_BASE_URL", "http://localhost"),
            ("TMDB_ACCESS_TOKEN", "token"),
            ("TMDB_LANGUAGE", "id-ID"),
            ("MOVIESHELF_DATA_DIR", "/tmp/shelf"),
        ]);
        let cfg = Config::from_lookup(|k| env.get(k).cloned()).expect("config");
        assert_eq!(cfg.language, "id-ID");
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/shelf"));
    }
}
