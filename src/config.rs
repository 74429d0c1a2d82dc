use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Where the schedule spreadsheets live and which files count.
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Processing order follows the order of these globs.
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    /// Descend into subdirectories of `root`.
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            recursive: false,
            follow_symlinks: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_include_globs() -> Vec<String> {
    vec!["*.xlsx".to_string(), "*.csv".to_string()]
}

/// Spreadsheet header names. Matched case-insensitively after trimming.
#[derive(Debug, Deserialize, Clone)]
pub struct ColumnsConfig {
    #[serde(default = "default_week_column")]
    pub week: String,
    #[serde(default = "default_day_column")]
    pub day: String,
    #[serde(default = "default_topic_column")]
    pub topic: String,
    #[serde(default = "default_lesson_column")]
    pub lesson: String,
    #[serde(default = "default_lesson_link_column")]
    pub lesson_link: String,
    #[serde(default = "default_free_link_column")]
    pub free_link: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            week: default_week_column(),
            day: default_day_column(),
            topic: default_topic_column(),
            lesson: default_lesson_column(),
            lesson_link: default_lesson_link_column(),
            free_link: default_free_link_column(),
        }
    }
}

fn default_week_column() -> String {
    "semana".to_string()
}
fn default_day_column() -> String {
    "dia".to_string()
}
fn default_topic_column() -> String {
    "tema do dia".to_string()
}
fn default_lesson_column() -> String {
    "aula".to_string()
}
fn default_lesson_link_column() -> String {
    "link aula".to_string()
}
fn default_free_link_column() -> String {
    "link gratuito".to_string()
}

impl ColumnsConfig {
    fn all(&self) -> [(&'static str, &str); 6] {
        [
            ("week", &self.week),
            ("day", &self.day),
            ("topic", &self.topic),
            ("lesson", &self.lesson),
            ("lesson_link", &self.lesson_link),
            ("free_link", &self.free_link),
        ]
    }
}

/// Name of the environment variable that overrides the port of
/// `[server].bind`.
pub const PORT_ENV: &str = "PORT";

impl Config {
    /// Zero-config defaults: spreadsheets in the working directory, served
    /// on port 5000.
    pub fn minimal() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0:5000".to_string(),
            },
            data: DataConfig::default(),
            columns: ColumnsConfig::default(),
        }
    }

    /// The address to bind, with the port replaced by `$PORT` when set.
    pub fn bind_addr(&self) -> Result<String> {
        match std::env::var(PORT_ENV) {
            Ok(port) => override_port(&self.server.bind, &port),
            Err(_) => Ok(self.server.bind.clone()),
        }
    }
}

fn override_port(bind: &str, port: &str) -> Result<String> {
    let port: u16 = port
        .trim()
        .parse()
        .with_context(|| format!("{} must be a port number, got '{}'", PORT_ENV, port))?;
    let host = match bind.rsplit_once(':') {
        Some((host, _)) => host,
        None => bind,
    };
    Ok(format!("{}:{}", host, port))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

/// Loads `path` when it exists, otherwise falls back to [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(
            "config file {} not found, using defaults",
            path.display()
        );
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.data.include_globs.is_empty() {
        anyhow::bail!("data.include_globs must list at least one pattern");
    }

    let columns = config.columns.all();
    for (field, name) in &columns {
        if name.trim().is_empty() {
            anyhow::bail!("columns.{} must not be empty", field);
        }
    }

    // week/day/topic must resolve to distinct headers
    let required = [&config.columns.week, &config.columns.day, &config.columns.topic];
    for (i, a) in required.iter().enumerate() {
        for b in &required[i + 1..] {
            if a.trim().eq_ignore_ascii_case(b.trim()) {
                anyhow::bail!(
                    "columns.week, columns.day and columns.topic must be distinct (got '{}' twice)",
                    a.trim()
                );
            }
        }
    }

    Ok(())
}
