use serde::Deserialize;
use sevens_bot::BotDifficulty;
use sevens_core::model::deck::MAX_SEATS;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_STEP_SIZE: f64 = 1.0;
const DEFAULT_LEARNER_SEAT: usize = 3;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root weight-search configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrainingConfig {
    pub run_id: String,
    pub search: SearchConfig,
    #[serde(default)]
    pub table: TableConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrainingConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: TrainingConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.search.validate()?;
        self.table.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
            weights: resolve_template(&self.run_id, &self.outputs.weights),
        }
    }
}

/// Hill-climbing parameters.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchConfig {
    pub seed: Option<u64>,
    pub iterations: usize,
    pub trials: usize,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    /// Fraction of `trials` a candidate must beat the best win count by.
    #[serde(default)]
    pub win_margin: f64,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl SearchConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.iterations == 0 {
            return Err(ValidationError::InvalidField {
                field: "search.iterations".to_string(),
                message: "iterations must be greater than zero".to_string(),
            });
        }

        if self.trials == 0 {
            return Err(ValidationError::InvalidField {
                field: "search.trials".to_string(),
                message: "trials must be greater than zero".to_string(),
            });
        }

        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(ValidationError::InvalidField {
                field: "search.step_size".to_string(),
                message: "step size must be a positive number".to_string(),
            });
        }

        if !self.win_margin.is_finite() || !(0.0..1.0).contains(&self.win_margin) {
            return Err(ValidationError::InvalidField {
                field: "search.win_margin".to_string(),
                message: "win margin must be in [0, 1)".to_string(),
            });
        }

        Ok(())
    }
}

fn default_step_size() -> f64 {
    DEFAULT_STEP_SIZE
}

fn default_parallel() -> bool {
    true
}

/// Who sits at the training table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_opponents")]
    pub opponents: Vec<BotDifficulty>,
    #[serde(default = "default_learner_seat")]
    pub learner_seat: usize,
    #[serde(default)]
    pub initial_weights: Option<PathBuf>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            opponents: default_opponents(),
            learner_seat: DEFAULT_LEARNER_SEAT,
            initial_weights: None,
        }
    }
}

impl TableConfig {
    pub fn seat_count(&self) -> usize {
        self.opponents.len() + 1
    }

    /// Difficulty for every seat, the learner's included.
    pub fn seat_difficulties(&self) -> Vec<BotDifficulty> {
        let mut seats = self.opponents.clone();
        let learner = self.learner_seat.min(seats.len());
        seats.insert(learner, BotDifficulty::Weighted);
        seats
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.opponents.is_empty() || self.seat_count() > MAX_SEATS {
            return Err(ValidationError::InvalidField {
                field: "table.opponents".to_string(),
                message: format!("between 1 and {} opponents are required", MAX_SEATS - 1),
            });
        }

        if self.learner_seat >= self.seat_count() {
            return Err(ValidationError::InvalidField {
                field: "table.learner_seat".to_string(),
                message: format!(
                    "learner seat {} is outside a {}-seat table",
                    self.learner_seat,
                    self.seat_count()
                ),
            });
        }

        if let Some(path) = self.initial_weights.as_ref() {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: "table.initial_weights".to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn default_opponents() -> Vec<BotDifficulty> {
    vec![BotDifficulty::Random; MAX_SEATS - 1]
}

fn default_learner_seat() -> usize {
    DEFAULT_LEARNER_SEAT
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    pub weights: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.weights", &self.weights),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub weights: PathBuf,
}

impl ResolvedOutputs {
    /// Directory that holds the summary; telemetry is written beside it.
    pub fn summary_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "weights_smoke"
search:
  seed: 123
  iterations: 10
  trials: 50
table:
  opponents: ["random", "random", "distance"]
  learner_seat: 1
outputs:
  jsonl: "bench/out/{run_id}/iterations.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
  weights: "bench/out/{run_id}/weights.json"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: TrainingConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.search.step_size, DEFAULT_STEP_SIZE);
        assert_eq!(cfg.search.win_margin, 0.0);
        assert!(cfg.search.parallel);
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/weights_smoke/iterations.jsonl")
        );
        assert_eq!(outputs.summary_dir(), PathBuf::from("bench/out/weights_smoke"));
    }

    #[test]
    fn learner_is_inserted_at_its_seat() {
        let mut cfg: TrainingConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");
        assert_eq!(
            cfg.table.seat_difficulties(),
            vec![
                BotDifficulty::Random,
                BotDifficulty::Weighted,
                BotDifficulty::Random,
                BotDifficulty::Distance,
            ]
        );
    }

    #[test]
    fn table_defaults_to_three_random_opponents() {
        let yaml = BASIC_YAML.replace(
            "table:\n  opponents: [\"random\", \"random\", \"distance\"]\n  learner_seat: 1\n",
            "",
        );
        let mut cfg: TrainingConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.table.opponents, vec![BotDifficulty::Random; 3]);
        assert_eq!(cfg.table.learner_seat, DEFAULT_LEARNER_SEAT);
    }

    #[test]
    fn rejects_learner_seat_outside_table() {
        let yaml = BASIC_YAML.replace("learner_seat: 1", "learner_seat: 4");
        let mut cfg: TrainingConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("seat out of range");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "table.learner_seat"
        ));
    }

    #[test]
    fn rejects_unknown_opponent_level() {
        let yaml = BASIC_YAML.replace("\"distance\"", "\"expert\"");
        assert!(serde_yaml::from_str::<TrainingConfig>(&yaml).is_err());
    }

    #[test]
    fn rejects_zero_trials() {
        let yaml = BASIC_YAML.replace("trials: 50", "trials: 0");
        let mut cfg: TrainingConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero trials");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "search.trials"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("weights_smoke", "weights smoke");
        let mut cfg: TrainingConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }
}
