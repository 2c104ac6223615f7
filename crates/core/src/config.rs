//! Configuration management for Folio.
//!
//! Configuration is merged from, in increasing precedence:
//! - Built-in defaults
//! - A YAML config file (`.folio/config.yaml` or `FOLIO_CONFIG`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)
//!
//! Chunking settings are validated exactly once into an immutable
//! [`ChunkConfig`] before any document is processed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ConfigurationError};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .folio/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Maximum number of documents ingested concurrently
    pub concurrency: usize,

    /// Chunking settings (validated into `ChunkConfig`)
    pub chunking: ChunkingSettings,

    /// Where finished units are sent
    pub output: OutputSettings,
}

/// Raw chunking settings as read from file, environment, or flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingSettings {
    /// Split content units at all; when false each unit is stored whole
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// One of "fixed", "sentence", "semantic"
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Maximum chunk size, in tokens when a tokenizer is available, else characters
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Size repeated between consecutive chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Optional `tokenizer.json` used for token counting
    #[serde(default)]
    pub tokenizer_path: Option<PathBuf>,

    /// Sentence boundary detector
    #[serde(default)]
    pub sentence_detector: SentenceDetector,
}

fn default_enabled() -> bool {
    true
}

fn default_strategy() -> String {
    "semantic".to_string()
}

fn default_max_size() -> usize {
    512
}

fn default_overlap() -> usize {
    50
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            strategy: default_strategy(),
            max_size: default_max_size(),
            overlap: default_overlap(),
            tokenizer_path: None,
            sentence_detector: SentenceDetector::default(),
        }
    }
}

/// Which sentence boundary detector to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceDetector {
    /// Unicode sentence boundaries (UAX #29), when compiled in
    #[default]
    Unicode,
    /// Punctuation heuristic, requires nothing
    Punctuation,
}

/// Output settings for the storage sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// "jsonl" or "stdout"
    #[serde(default = "default_sink")]
    pub sink: String,

    /// JSONL file, relative paths resolve against the workspace
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Entry format for stdout: "plain", "markdown", "json", "xml"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_sink() -> String {
    "jsonl".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(".folio").join("units.jsonl")
}

fn default_format() -> String {
    "plain".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            path: default_output_path(),
            format: default_format(),
        }
    }
}

/// Chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Sliding window of `max_size`, advancing by `max_size - overlap`
    Fixed,
    /// Greedy sentence packing with sentence-granular overlap
    Sentence,
    /// Paragraph chunks, oversized paragraphs fall back to sentences
    Semantic,
}

impl ChunkStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkStrategy::Fixed => "fixed",
            ChunkStrategy::Sentence => "sentence",
            ChunkStrategy::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkStrategy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(ChunkStrategy::Fixed),
            "sentence" => Ok(ChunkStrategy::Sentence),
            "semantic" => Ok(ChunkStrategy::Semantic),
            _ => Err(ConfigurationError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Validated, immutable chunker configuration.
///
/// Only obtainable through [`ChunkConfig::new`] or
/// [`ChunkingSettings::validate`], so `0 <= overlap < max_size` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    enabled: bool,
    strategy: ChunkStrategy,
    max_size: usize,
    overlap: usize,
}

impl ChunkConfig {
    pub fn new(
        strategy: ChunkStrategy,
        max_size: usize,
        overlap: usize,
    ) -> Result<Self, ConfigurationError> {
        if max_size == 0 {
            return Err(ConfigurationError::InvalidMaxSize);
        }
        if overlap >= max_size {
            return Err(ConfigurationError::InvalidOverlap { overlap, max_size });
        }
        Ok(Self {
            enabled: true,
            strategy,
            max_size,
            overlap,
        })
    }

    /// Same bounds, but content units are passed through unsplit.
    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Window advance for the fixed strategy.
    pub fn step(&self) -> usize {
        self.max_size - self.overlap
    }
}

impl ChunkingSettings {
    /// Validate into an immutable `ChunkConfig`.
    pub fn validate(&self) -> Result<ChunkConfig, ConfigurationError> {
        let strategy = self.strategy.parse::<ChunkStrategy>()?;
        let config = ChunkConfig::new(strategy, self.max_size, self.overlap)?;
        Ok(if self.enabled {
            config
        } else {
            config.disabled()
        })
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    chunking: Option<ChunkingSettings>,
    output: Option<OutputSettings>,
    logging: Option<LoggingConfig>,
    concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
    pub log_json: bool,
    pub concurrency: Option<usize>,
    pub output_sink: Option<String>,
    pub output_path: Option<PathBuf>,
    pub output_format: Option<String>,
    pub enable_chunking: Option<bool>,
    pub strategy: Option<String>,
    pub max_size: Option<usize>,
    pub overlap: Option<usize>,
    pub tokenizer_path: Option<PathBuf>,
    pub sentence_detector: Option<SentenceDetector>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            concurrency: 4,
            chunking: ChunkingSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `FOLIO_WORKSPACE`: Override workspace path
    /// - `FOLIO_CONFIG`: Path to config file
    /// - `FOLIO_ENABLE_CHUNKING`: "true" / "false"
    /// - `FOLIO_CHUNK_STRATEGY`: fixed, sentence, semantic
    /// - `FOLIO_MAX_CHUNK_SIZE`: positive integer
    /// - `FOLIO_CHUNK_OVERLAP`: integer below the max size
    /// - `FOLIO_TOKENIZER`: path to a tokenizer.json
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`load`](Self::load), with an explicit workspace and config file
    /// taking precedence over `FOLIO_WORKSPACE` and `FOLIO_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var_os("FOLIO_WORKSPACE").map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        if let Some(config_file) =
            config_file.or_else(|| std::env::var_os("FOLIO_CONFIG").map(PathBuf::from))
        {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.folio_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.merge_env()?;

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(chunking) = config_file.chunking {
            result.chunking = chunking;
        }

        if let Some(output) = config_file.output {
            result.output = output;
        }

        if let Some(concurrency) = config_file.concurrency {
            result.concurrency = concurrency;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        Ok(result)
    }

    /// Apply `FOLIO_*` environment variables.
    fn merge_env(&mut self) -> AppResult<()> {
        if let Ok(enabled) = std::env::var("FOLIO_ENABLE_CHUNKING") {
            self.chunking.enabled = enabled.eq_ignore_ascii_case("true") || enabled == "1";
        }

        if let Ok(strategy) = std::env::var("FOLIO_CHUNK_STRATEGY") {
            self.chunking.strategy = strategy;
        }

        if let Ok(max_size) = std::env::var("FOLIO_MAX_CHUNK_SIZE") {
            self.chunking.max_size = parse_env_number("FOLIO_MAX_CHUNK_SIZE", &max_size)?;
        }

        if let Ok(overlap) = std::env::var("FOLIO_CHUNK_OVERLAP") {
            self.chunking.overlap = parse_env_number("FOLIO_CHUNK_OVERLAP", &overlap)?;
        }

        if let Ok(tokenizer) = std::env::var("FOLIO_TOKENIZER") {
            self.chunking.tokenizer_path = Some(PathBuf::from(tokenizer));
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over the file and the environment.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        self.no_color |= overrides.no_color;
        self.log_json |= overrides.log_json;

        if let Some(concurrency) = overrides.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(sink) = overrides.output_sink {
            self.output.sink = sink;
        }
        if let Some(path) = overrides.output_path {
            self.output.path = path;
        }
        if let Some(format) = overrides.output_format {
            self.output.format = format;
        }
        if let Some(enabled) = overrides.enable_chunking {
            self.chunking.enabled = enabled;
        }
        if let Some(strategy) = overrides.strategy {
            self.chunking.strategy = strategy;
        }
        if let Some(max_size) = overrides.max_size {
            self.chunking.max_size = max_size;
        }
        if let Some(overlap) = overrides.overlap {
            self.chunking.overlap = overlap;
        }
        if let Some(path) = overrides.tokenizer_path {
            self.chunking.tokenizer_path = Some(path);
        }
        if let Some(detector) = overrides.sentence_detector {
            self.chunking.sentence_detector = detector;
        }

        self
    }

    /// Get the path to the .folio directory.
    pub fn folio_dir(&self) -> PathBuf {
        self.workspace.join(".folio")
    }

    /// Resolve the JSONL output path against the workspace.
    pub fn output_path(&self) -> PathBuf {
        if self.output.path.is_absolute() {
            self.output.path.clone()
        } else {
            self.workspace.join(&self.output.path)
        }
    }

    /// Validate the whole configuration, returning the immutable chunk config.
    pub fn validate(&self) -> AppResult<ChunkConfig> {
        if self.concurrency == 0 {
            return Err(AppError::Config(
                "Concurrency must be at least 1".to_string(),
            ));
        }

        let known_sinks = ["jsonl", "stdout"];
        if !known_sinks.contains(&self.output.sink.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown sink: {}. Supported: {}",
                self.output.sink,
                known_sinks.join(", ")
            )));
        }

        let chunk_config = self.chunking.validate()?;
        tracing::debug!(
            concurrency = self.concurrency,
            sink = %self.output.sink,
            strategy = %chunk_config.strategy(),
            "Configuration validated"
        );
        Ok(chunk_config)
    }
}

fn parse_env_number(name: &str, value: &str) -> AppResult<usize> {
    value.trim().parse::<usize>().map_err(|e| {
        AppError::Config(format!("{} must be a non-negative integer ('{}'): {}", name, value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chunking.strategy, "semantic");
        assert_eq!(config.chunking.max_size, 512);
        assert_eq!(config.chunking.overlap, 50);
        assert!(config.chunking.enabled);
        assert!(!config.verbose);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("fixed".parse::<ChunkStrategy>(), Ok(ChunkStrategy::Fixed));
        assert_eq!(" Sentence ".parse::<ChunkStrategy>(), Ok(ChunkStrategy::Sentence));
        assert_eq!(
            "paragraph".parse::<ChunkStrategy>(),
            Err(ConfigurationError::InvalidStrategy("paragraph".to_string()))
        );
    }

    #[test]
    fn test_validate_overlap_bounds() {
        let mut settings = ChunkingSettings {
            strategy: "fixed".to_string(),
            max_size: 100,
            overlap: 100,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigurationError::InvalidOverlap {
                overlap: 100,
                max_size: 100
            })
        );

        settings.overlap = 99;
        let config = settings.validate().unwrap();
        assert_eq!(config.step(), 1);
        assert_eq!(config.strategy(), ChunkStrategy::Fixed);
    }

    #[test]
    fn test_validate_zero_max_size() {
        let settings = ChunkingSettings {
            max_size: 0,
            overlap: 0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(ConfigurationError::InvalidMaxSize));
    }

    #[test]
    fn test_disabled_chunking_keeps_bounds() {
        let settings = ChunkingSettings {
            enabled: false,
            ..Default::default()
        };
        let config = settings.validate().unwrap();
        assert!(!config.enabled());
        assert_eq!(config.max_size(), 512);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(ConfigOverrides {
            strategy: Some("fixed".to_string()),
            max_size: Some(300),
            overlap: Some(50),
            verbose: true,
            ..Default::default()
        });

        assert_eq!(config.chunking.strategy, "fixed");
        assert_eq!(config.chunking.max_size, 300);
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            "chunking:\n  strategy: sentence\n  max_size: 256\n  overlap: 32\n  sentence_detector: punctuation\nlogging:\n  color: false\nconcurrency: 2\n",
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.chunking.strategy, "sentence");
        assert_eq!(config.chunking.max_size, 256);
        assert_eq!(config.chunking.sentence_detector, SentenceDetector::Punctuation);
        assert!(config.chunking.enabled);
        assert!(config.no_color);
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("folio.yaml");
        std::fs::write(&path, "output:\n  sink: stdout\n  format: markdown\n").unwrap();

        let config =
            AppConfig::load_from(Some(temp.path().to_path_buf()), Some(path.clone())).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.output.sink, "stdout");
        assert_eq!(config.output.format, "markdown");
    }

    #[test]
    fn test_load_from_missing_workspace() {
        let result = AppConfig::load_from(Some(PathBuf::from("/nonexistent/folio-ws")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_concurrency_override_is_rejected() {
        let config = AppConfig::default().with_overrides(ConfigOverrides {
            concurrency: Some(0),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let config = AppConfig::default().with_overrides(ConfigOverrides {
            concurrency: Some(8),
            output_sink: Some("stdout".to_string()),
            output_format: Some("markdown".to_string()),
            ..Default::default()
        });
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.output.sink, "stdout");
        assert_eq!(config.output.format, "markdown");
    }

    #[test]
    fn test_validate_unknown_sink() {
        let mut config = AppConfig::default();
        config.output.sink = "qdrant".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_output_path_relative_to_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/data/ws");
        assert_eq!(config.output_path(), PathBuf::from("/data/ws/.folio/units.jsonl"));
    }
}
