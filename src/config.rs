//! Project configuration, read from `projtask.toml` at the repository root.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::{TaskError, TaskResult};

/// Name of the configuration file that marks the repository root.
pub const CONFIG_FILE: &str = "projtask.toml";

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "PROJTASK_";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Paths {
    /// Python source root, relative to the repository root.
    pub source: PathBuf,
    pub workflows: PathBuf,
    pub actions: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            workflows: PathBuf::from(".github/workflows"),
            actions: PathBuf::from(".github/actions"),
        }
    }
}

/// Executables of the external tools.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Tools {
    pub ruff: String,
    pub pytest: String,
    pub mypy: String,
    pub coverage: String,
    pub import_linter: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ruff: "ruff".into(),
            pytest: "pytest".into(),
            mypy: "mypy".into(),
            coverage: "coverage".into(),
            import_linter: "lint-imports".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Ci {
    /// Integration branch the default triggers watch.
    pub branch: String,
    pub runs_on: String,
    pub container: String,
    /// How CI jobs call back into this runner.
    pub invoke: String,
    /// Shell commands installing the project's dependencies.
    pub install: Vec<String>,
}

impl Default for Ci {
    fn default() -> Self {
        Self {
            branch: "main".into(),
            runs_on: "ubuntu-latest".into(),
            container: "python:3.12-slim-bookworm".into(),
            invoke: "projtask".into(),
            install: vec![
                "pip install -r requirements.txt".into(),
                "poetry install --with=dev".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Pytest {
    pub options: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Mypy {
    pub files: Vec<String>,
}

impl Default for Mypy {
    fn default() -> Self {
        Self {
            files: vec![".".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Coverage {
    /// Report directory, relative to the source root.
    pub report_dir: PathBuf,
}

impl Default for Coverage {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("coverage"),
        }
    }
}

/// A named pytest suite.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Suite {
    pub name: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Working directory, relative to the repository root.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub tools: Tools,
    pub ci: Ci,
    pub pytest: Pytest,
    pub mypy: Mypy,
    pub coverage: Coverage,
    pub suites: Vec<Suite>,
}

impl Config {
    /// Defaults, then `path`, then `PROJTASK_*` environment variables.
    pub fn load(path: &Path) -> TaskResult<Self> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }
}

/// The repository a command runs against.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load the project whose configuration file sits directly in `root`.
    pub fn load(root: impl Into<PathBuf>) -> TaskResult<Self> {
        let root = root.into();
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Err(TaskError::ConfigNotFound(CONFIG_FILE.to_string()));
        }

        let config = Config::load(&path)?;
        Ok(Self::new(root, config))
    }

    /// Walk up from the current directory to the first `projtask.toml`.
    pub fn discover() -> TaskResult<Self> {
        let cwd = env::current_dir()?;
        Self::discover_from(&cwd)
    }

    pub fn discover_from(start: &Path) -> TaskResult<Self> {
        let root = start
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE).is_file())
            .ok_or_else(|| TaskError::ConfigNotFound(CONFIG_FILE.to_string()))?;

        debug!("project root: {}", root.display());
        Self::load(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source_root(&self) -> PathBuf {
        self.root.join(&self.config.paths.source)
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.workflows)
    }

    pub fn actions_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.actions)
    }

    pub fn suites(&self) -> &[Suite] {
        &self.config.suites
    }
}
