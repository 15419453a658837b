//! Run configuration: task mode, prompt focus, backend settings.
//!
//! Settings are layered. Built-in defaults are overridden by an optional
//! YAML config file, which is overridden by environment variables, which
//! the CLI overrides with flags. Environment variables are read once, by
//! the caller, and passed in as a lookup function.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detect::DEFAULT_PARAM_THRESHOLD;
use crate::llm::{BackendError, BackendKind};

/// Default config file names to search for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["gocodeai.yaml", ".gocodeai.yaml"];

/// Default prompt template path, relative to the working directory.
pub const DEFAULT_PROMPT_PATH: &str = "prompt.txt";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

pub const ENV_BACKEND: &str = "GOCODEAI_BACKEND";
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_GOOGLE_MODEL: &str = "GOOGLE_AI_MODEL";

pub const DEFAULT_OLLAMA_MODEL: &str = "gpt-oss:20b";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Which pipeline stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    /// Heuristics only; the backend is never called.
    Static,
    /// Heuristics are recorded but not sent to the model.
    Ai,
    /// Heuristics are recorded and forwarded into the prompt.
    #[default]
    #[serde(alias = "all")]
    Both,
}

impl TaskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskMode::Static => "static",
            TaskMode::Ai => "ai",
            TaskMode::Both => "both",
        }
    }

    /// Whether the backend is invoked.
    pub fn runs_ai(&self) -> bool {
        !matches!(self, TaskMode::Static)
    }

    /// Whether detected findings are rendered into the prompt.
    pub fn forwards_findings(&self) -> bool {
        matches!(self, TaskMode::Both)
    }
}

impl std::fmt::Display for TaskMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(TaskMode::Static),
            "ai" => Ok(TaskMode::Ai),
            "both" | "all" => Ok(TaskMode::Both),
            _ => Err(format!(
                "unknown task mode {:?}, expected static, ai, both or all",
                s
            )),
        }
    }
}

/// What the model is asked to concentrate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    CommentSuggestion,
    Refactor,
    Summary,
    AntiPattern,
    #[default]
    All,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::CommentSuggestion => "comment_suggestion",
            Focus::Refactor => "refactor",
            Focus::Summary => "summary",
            Focus::AntiPattern => "anti_pattern",
            Focus::All => "all",
        }
    }
}

impl std::fmt::Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comment_suggestion" => Ok(Focus::CommentSuggestion),
            "refactor" => Ok(Focus::Refactor),
            "summary" => Ok(Focus::Summary),
            "anti_pattern" => Ok(Focus::AntiPattern),
            "all" => Ok(Focus::All),
            _ => Err(format!("unknown focus {:?}", s)),
        }
    }
}

/// Options for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Only analyze functions with exactly this name.
    pub name_filter: Option<String>,
    pub task: TaskMode,
    pub focus: Focus,
    /// Prompt template, read fresh for every function.
    pub prompt_path: PathBuf,
    pub temperature: f32,
    pub param_threshold: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            name_filter: None,
            task: TaskMode::default(),
            focus: Focus::default(),
            prompt_path: PathBuf::from(DEFAULT_PROMPT_PATH),
            temperature: DEFAULT_TEMPERATURE,
            param_threshold: DEFAULT_PARAM_THRESHOLD,
        }
    }
}

impl AnalyzeOptions {
    /// Apply the `analysis` section of a config file.
    pub fn with_file_config(mut self, file: &AnalysisSection) -> Self {
        if let Some(task) = file.task {
            self.task = task;
        }
        if let Some(focus) = file.focus {
            self.focus = focus;
        }
        if let Some(prompt) = &file.prompt {
            self.prompt_path = prompt.clone();
        }
        if let Some(t) = file.temperature {
            self.temperature = t;
        }
        if let Some(n) = file.max_params {
            self.param_threshold = n;
        }
        self
    }
}

/// Settings handed to the backend factory.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model: String,
    /// Credential for hosted backends; empty when unset.
    pub api_key: String,
    /// Base URL of the backend API.
    pub host: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Defaults for a backend kind.
    pub fn defaults(kind: BackendKind) -> Self {
        let (model, host) = match kind {
            BackendKind::Ollama => (DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_HOST),
            BackendKind::Gemini => (DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_BASE_URL),
        };
        Self {
            kind,
            model: model.to_string(),
            api_key: String::new(),
            host: host.to_string(),
            max_tokens: 4096,
            timeout: Duration::from_secs(120),
        }
    }

    /// Resolve settings from a config file section and environment lookup.
    ///
    /// Environment values win over the file; empty variables count as unset.
    pub fn resolve<F>(file: &BackendSection, env: F) -> Result<Self, BackendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        let kind = match var(ENV_BACKEND) {
            Some(k) => k
                .parse::<BackendKind>()
                .map_err(BackendError::UnknownBackend)?,
            None => file.kind.unwrap_or_default(),
        };

        let mut config = Self::defaults(kind);
        if let Some(model) = &file.model {
            config.model = model.clone();
        }
        if let Some(host) = &file.host {
            config.host = host.clone();
        }
        if let Some(key) = &file.api_key {
            config.api_key = key.clone();
        }
        if let Some(n) = file.max_tokens {
            config.max_tokens = n;
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }

        match kind {
            BackendKind::Ollama => {
                if let Some(model) = var(ENV_OLLAMA_MODEL) {
                    config.model = model;
                }
                if let Some(host) = var(ENV_OLLAMA_HOST) {
                    config.host = host;
                }
            }
            BackendKind::Gemini => {
                if let Some(model) = var(ENV_GOOGLE_MODEL) {
                    config.model = model;
                }
                if let Some(key) = var(ENV_GOOGLE_API_KEY) {
                    config.api_key = key;
                }
            }
        }

        Ok(config)
    }
}

/// `backend` section of the config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendSection {
    #[serde(default)]
    pub kind: Option<BackendKind>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `analysis` section of the config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisSection {
    #[serde(default)]
    pub task: Option<TaskMode>,
    #[serde(default)]
    pub focus: Option<Focus>,
    #[serde(default)]
    pub prompt: Option<PathBuf>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_params: Option<usize>,
}

/// Top-level config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub analysis: AnalysisSection,
}

impl FileConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: FileConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Find a config file in the working directory, then the user config dir.
    pub fn discover() -> Option<PathBuf> {
        for name in DEFAULT_CONFIG_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Some(path);
            }
        }
        directories::ProjectDirs::from("", "", "gocodeai")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .filter(|p| p.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_task_mode_parse() {
        assert_eq!("static".parse::<TaskMode>(), Ok(TaskMode::Static));
        assert_eq!("AI".parse::<TaskMode>(), Ok(TaskMode::Ai));
        assert_eq!("all".parse::<TaskMode>(), Ok(TaskMode::Both));
        assert_eq!("both".parse::<TaskMode>(), Ok(TaskMode::Both));
        assert!("lint".parse::<TaskMode>().is_err());
    }

    #[test]
    fn test_task_mode_stages() {
        assert!(!TaskMode::Static.runs_ai());
        assert!(TaskMode::Ai.runs_ai() && !TaskMode::Ai.forwards_findings());
        assert!(TaskMode::Both.runs_ai() && TaskMode::Both.forwards_findings());
    }

    #[test]
    fn test_backend_defaults_without_env() {
        let config = BackendConfig::resolve(&BackendSection::default(), lookup(&[])).unwrap();
        assert_eq!(config.kind, BackendKind::Ollama);
        assert_eq!(config.model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.host, DEFAULT_OLLAMA_HOST);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = BackendSection {
            kind: Some(BackendKind::Ollama),
            model: Some("llama3".into()),
            ..Default::default()
        };
        let config = BackendConfig::resolve(
            &file,
            lookup(&[
                (ENV_BACKEND, "gemini"),
                (ENV_GOOGLE_API_KEY, "secret"),
                (ENV_OLLAMA_MODEL, "ignored"),
            ]),
        )
        .unwrap();
        assert_eq!(config.kind, BackendKind::Gemini);
        assert_eq!(config.api_key, "secret");
        // The file's model still applies since GOOGLE_AI_MODEL is unset.
        assert_eq!(config.model, "llama3");
    }

    #[test]
    fn test_empty_env_is_unset() {
        let config =
            BackendConfig::resolve(&BackendSection::default(), lookup(&[(ENV_OLLAMA_MODEL, "")]))
                .unwrap();
        assert_eq!(config.model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_unknown_backend_kind() {
        let err = BackendConfig::resolve(&BackendSection::default(), lookup(&[(ENV_BACKEND, "gpt")]))
            .unwrap_err();
        assert!(matches!(err, BackendError::UnknownBackend(_)));
        assert!(err.to_string().contains("gpt"));
    }

    #[test]
    fn test_parse_config_file() {
        let yaml = r#"
backend:
  kind: gemini
  model: gemini-2.5-pro
  timeout_secs: 30
analysis:
  task: all
  focus: refactor
  max_params: 4
"#;
        let config: FileConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.kind, Some(BackendKind::Gemini));
        assert_eq!(config.analysis.task, Some(TaskMode::Both));

        let opts = AnalyzeOptions::default().with_file_config(&config.analysis);
        assert_eq!(opts.focus, Focus::Refactor);
        assert_eq!(opts.param_threshold, 4);
        assert_eq!(opts.prompt_path, PathBuf::from(DEFAULT_PROMPT_PATH));
    }
}
