//! Loader for vaxtrack configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are attached: files and inline YAML
//! first, then `VAXTRACK__`-prefixed environment variables (`__` separates
//! nested keys, e.g. `VAXTRACK__HTTP__TIMEOUT_SECS=10`). `${VAR}` placeholders
//! inside string values are expanded after merging. Every field has a
//! default, so an empty configuration runs the built-in Hong Kong source.
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use vaxtrack_common::observability::LogFormat;

mod timezone;

pub use timezone::TimeZoneSpec;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_ORIGIN: &str = "https://www.info.gov.hk";
pub const DEFAULT_LINK_CLASS: &str = "NEW";
pub const DEFAULT_MARKER: &str = "COVID-19 Vaccination Programme";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaxtrackConfig {
    #[serde(deserialize_with = "string_or_scalar")]
    pub version: Option<String>,
    /// Zone in which "yesterday" is computed.
    pub timezone: TimeZoneSpec,
    pub http: HttpSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
    pub sources: Vec<SourceSpec>,
}

impl Default for VaxtrackConfig {
    fn default() -> Self {
        Self {
            version: None,
            timezone: TimeZoneSpec::default(),
            http: HttpSettings::default(),
            output: OutputSettings::default(),
            logging: LoggingSettings::default(),
            sources: vec![SourceSpec::hong_kong()],
        }
    }
}

impl VaxtrackConfig {
    /// Sources that are not explicitly disabled, in declaration order.
    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceSpec> {
        self.sources.iter().filter(|s| s.enabled.unwrap_or(true))
    }
}

/// `version: 1` and `VAXTRACK__VERSION=1` arrive as numbers.
fn string_or_scalar<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory holding one CSV file per location.
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "info".into(),
            dir: None,
            stderr: false,
        }
    }
}

/// Shared fields + the per-kind “details”
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub details: SourceDetails,
}

impl SourceSpec {
    pub fn hong_kong() -> Self {
        Self {
            id: "hong_kong".into(),
            enabled: Some(true),
            details: SourceDetails::PressRelease {
                config: PressReleaseConfig {
                    location: "Hong Kong".into(),
                    vaccine: "Pfizer/BioNTech, Sinovac".into(),
                    origin: DEFAULT_ORIGIN.into(),
                    link_class: DEFAULT_LINK_CLASS.into(),
                    marker: DEFAULT_MARKER.into(),
                },
            },
        }
    }
}

/// The tag is `kind`; the payload lives in `config`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum SourceDetails {
    /// Daily government press-release index with a vaccination bulletin.
    #[serde(rename = "press_release")]
    PressRelease { config: PressReleaseConfig },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PressReleaseConfig {
    pub location: String,
    /// Comma-separated vaccine brand names attached to every record.
    pub vaccine: String,
    /// Scheme and host, no trailing slash after loading.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Class marking fresh entries on the index page.
    #[serde(default = "default_link_class")]
    pub link_class: String,
    /// Phrase the bulletin's link text must contain.
    #[serde(default = "default_marker")]
    pub marker: String,
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.into()
}
fn default_link_class() -> String {
    DEFAULT_LINK_CLASS.into()
}
fn default_marker() -> String {
    DEFAULT_MARKER.into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn normalize(cfg: &mut VaxtrackConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for spec in &mut cfg.sources {
        if spec.id.trim().is_empty() {
            return Err(ConfigError::Message("source id must not be empty".into()));
        }
        if !seen.insert(spec.id.clone()) {
            return Err(ConfigError::Message(format!(
                "duplicate source id: {}",
                spec.id
            )));
        }
        match &mut spec.details {
            SourceDetails::PressRelease { config } => {
                if config.location.trim().is_empty() {
                    return Err(ConfigError::Message(format!(
                        "source {}: location must not be empty",
                        spec.id
                    )));
                }
                let trimmed = config.origin.trim_end_matches('/').len();
                config.origin.truncate(trimmed);
            }
        }
    }
    if cfg.http.timeout_secs == 0 {
        return Err(ConfigError::Message("http.timeout_secs must be positive".into()));
    }
    Ok(())
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct VaxtrackConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for VaxtrackConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VaxtrackConfigLoader {
    /// Start with no files; `VAXTRACK__` env overrides are applied last.
    ///
    /// ```
    /// use vaxtrack_config::VaxtrackConfigLoader;
    ///
    /// let config = VaxtrackConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.sources.len(), 1);
    /// assert_eq!(config.http.timeout_secs, 30);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`Self::with_file`], but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use vaxtrack_config::{SourceDetails, VaxtrackConfigLoader};
    ///
    /// let cfg = VaxtrackConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// sources:
    ///   - id: "hk"
    ///     kind: "press_release"
    ///     config:
    ///       location: "Hong Kong"
    ///       vaccine: "Pfizer/BioNTech, Sinovac"
    ///       origin: "https://www.info.gov.hk/"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// let SourceDetails::PressRelease { config } = &cfg.sources[0].details;
    /// assert_eq!(config.origin, "https://www.info.gov.hk");
    /// assert_eq!(config.link_class, "NEW");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    pub fn load(self) -> Result<VaxtrackConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("VAXTRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: VaxtrackConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        normalize(&mut typed)?;

        Ok(typed)
    }
}
