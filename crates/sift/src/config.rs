use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sift_fetch::FetchOptions;
use sift_pipeline::PipelineOptions;

use crate::cli::FetchArg;
use crate::manifest::Filter;

const DEFAULT_CONFIG_FILE: &str = "sift.toml";
const ENV_PREFIX: &str = "SIFT_";

/// Resolved settings for a run.
///
/// Layers, later ones winning: built-in defaults, the config file,
/// `SIFT_*` environment variables (`SIFT_FILTER__CONTAINS` for nested keys),
/// command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir:           PathBuf,
    /// Defaults to `.staging` inside the output directory.
    pub staging_dir:          Option<PathBuf>,
    pub concurrency:          usize,
    pub max_retries:          u32,
    pub retry_backoff_ms:     u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent:           Option<String>,
    pub filter:               Filter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir:           PathBuf::from("images"),
            staging_dir:          None,
            concurrency:          4,
            max_retries:          0,
            retry_backoff_ms:     100,
            connect_timeout_secs: 30,
            request_timeout_secs: 120,
            user_agent:           None,
            filter:               Filter::default(),
        }
    }
}

/// Flag values that override every other layer when given.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir:  Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter:      Option<Filter>,
}

impl From<&FetchArg> for Overrides {
    fn from(arg: &FetchArg) -> Self {
        let filter = (!arg.contains.is_empty() || !arg.extensions.is_empty()).then(|| Filter {
            contains:   arg.contains.clone(),
            extensions: arg.extensions.clone(),
        });
        Self {
            output_dir: arg.output_dir.clone(),
            staging_dir: arg.staging_dir.clone(),
            concurrency: arg.concurrency,
            max_retries: arg.max_retries,
            filter,
        }
    }
}

impl Config {
    /// Load from all layers. An explicit `config_file` must exist; the
    /// default one is optional.
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Self> {
        let file = match config_file {
            Some(path) if !path.is_file() => bail!("config file {} not found", path.display()),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides));
        Self::from_figment(figment).with_context(|| format!("invalid configuration (file {})", file.display()))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        Ok(())
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join(".staging"))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        let options = FetchOptions::default()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .request_timeout(Duration::from_secs(self.request_timeout_secs));
        match &self.user_agent {
            Some(agent) => options.user_agent(agent.clone()),
            None => options,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::default()
            .concurrency_limit(self.concurrency)
            .max_retries(self.max_retries)
            .retry_backoff(Duration::from_millis(self.retry_backoff_ms))
    }
}
