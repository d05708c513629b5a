use std::{env, path::PathBuf};

use reqwest::Url;
use tracing::info;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_SESSION_DB: &str = "tasklist-session.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub session_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let api_url = var_or_default("TASKLIST_API_URL", DEFAULT_API_URL);
        let session_path = var_or_default("TASKLIST_SESSION_DB", DEFAULT_SESSION_DB);

        Ok(Self {
            api_url: parse_api_url(&api_url)?,
            session_path: PathBuf::from(session_path),
        })
    }
}

fn var_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

/// Parses the backend base URL. Only absolute http(s) URLs are accepted.
pub fn parse_api_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim()).map_err(|e| AppError::Config(format!("{raw}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(AppError::Config(format!("{raw}: expected an http(s) URL")));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_urls() {
        let url = parse_api_url("http://localhost:3000/api/").unwrap();
        assert_eq!(url.path(), "/api/");
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            parse_api_url("mailto:someone@example.com"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(parse_api_url("not a url"), Err(AppError::Config(_))));
    }
}
