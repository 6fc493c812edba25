use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub template_config_dir: PathBuf,
    pub template_store_dir: PathBuf,
    pub render_temp_dir: PathBuf,
    pub compile_timeout_secs: u64,
    pub cleanup_grace_secs: u64,
    pub max_concurrent_renders: usize,
    pub compiler_output_limit_bytes: usize,
    /// Include log excerpts and field errors in error responses.
    pub render_diagnostics: bool,
    /// Directory holding the TeX engines when they are not on `PATH`.
    pub tex_bin_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: parse(&lookup, "PORT", 8080)?,
            rust_log: string("RUST_LOG", "info"),
            template_config_dir: string("TEMPLATE_CONFIG_DIR", "templates/config").into(),
            template_store_dir: string("TEMPLATE_STORE_DIR", "templates/store").into(),
            render_temp_dir: string("RENDER_TEMP_DIR", "temp").into(),
            compile_timeout_secs: parse(&lookup, "COMPILE_TIMEOUT_SECS", 60)?,
            cleanup_grace_secs: parse(&lookup, "CLEANUP_GRACE_SECS", 30)?,
            max_concurrent_renders: parse(&lookup, "MAX_CONCURRENT_RENDERS", 4)?,
            compiler_output_limit_bytes: parse(&lookup, "COMPILER_OUTPUT_LIMIT_BYTES", 10 * 1024 * 1024)?,
            render_diagnostics: parse_flag(&lookup, "RENDER_DIAGNOSTICS")?,
            tex_bin_dir: lookup("TEX_BIN_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<bool> {
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}
