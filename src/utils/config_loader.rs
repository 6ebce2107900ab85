use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::{env, fs};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[async_trait]
pub trait DexConfigLoader {
    type SectionType;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError>;
}

pub trait DexConfigLoaderSync {
    type SectionType;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError>;
}

/// Merge a `.env` file from the working directory (or a parent) into the process
/// environment. Runs once per process; returns the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    static LOADED: OnceLock<Option<PathBuf>> = OnceLock::new();
    LOADED
        .get_or_init(|| {
            let path = dotenvy::dotenv().ok();
            if let Some(path) = &path {
                debug!(file = %path.display(), "Loaded .env");
            }
            path
        })
        .clone()
}

pub async fn load_from_file<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    debug!(file = %file_name, "Loading config");
    let contents = tokio::fs::read_to_string(file_name).await?;
    parse_config(&contents)
}

pub fn load_from_file_sync<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    debug!(file = %file_name, "Loading config");
    let contents = fs::read_to_string(file_name)?;
    parse_config(&contents)
}

/// Expand `${VAR}` references, `.env` included, then deserialize the TOML document.
pub fn parse_config<T: DeserializeOwned>(contents: &str) -> Result<T, LoadConfigError> {
    load_dotenv();
    Ok(toml::from_str(&expand_vars(contents)?)?)
}

/// Replace `${VAR}` with the value of the environment variable; unknown variables stay as written.
pub fn expand_vars(raw_config: &str) -> Result<String, LoadConfigError> {
    let re = Regex::new(r"\$\{([a-zA-Z_][0-9a-zA-Z_]*)\}")?;
    Ok(re
        .replace_all(raw_config, |caps: &Captures| env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string()))
        .into_owned())
}
