use crate::{command::TransferOptions, handlebars::render};
use anyhow::{Context, Result};
use handlebars::Handlebars;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
};

pub type Groups = HashMap<String, Vec<Target>>;

/// One synchronization destination.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub source: PathBuf,
    /// `user@address`
    pub host: String,
    pub remote_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Proxy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    /// Handlebars template, rendered with `host` and `port`.
    #[serde(default = "default_proxy_command")]
    pub command: String,
}

impl Default for Proxy {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_proxy_host(),
            port: default_proxy_port(),
            command: default_proxy_command(),
        }
    }
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_proxy_port() -> u16 {
    7890
}

fn default_proxy_command() -> String {
    "nc -X 5 -x {{host}}:{{port}} %h %p".to_owned()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Transfer {
    /// Relative to each target's source.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Relative to each target's source.
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
}

impl Default for Transfer {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            ignore_file: default_ignore_file(),
        }
    }
}

fn default_cache_dir() -> String {
    "test_cache".to_owned()
}

fn default_ignore_file() -> String {
    ".gitignore".to_owned()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(flatten)]
    groups: Groups,
    #[serde(default)]
    proxy: Proxy,
    #[serde(default)]
    transfer: Transfer,
}

#[derive(Debug, Default, Clone)]
pub struct Configuration {
    pub groups: Groups,
    pub proxy: Proxy,
    pub transfer: Transfer,
}

impl Configuration {
    pub fn group(&self, name: &str) -> Result<&[Target]> {
        self.groups
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow::anyhow!("target group {name:?} not found in config"))
    }

    pub fn transfer_options(
        &self,
        force_proxy: bool,
        handlebars: &Handlebars<'_>,
    ) -> Result<TransferOptions> {
        let proxy_command = if self.proxy.enabled || force_proxy {
            let rendered = render(handlebars, &self.proxy.command, &self.proxy)
                .context("render proxy command")?;
            debug!("using proxy command {rendered:?}");
            Some(rendered)
        } else {
            None
        };

        Ok(TransferOptions {
            proxy_command,
            cache_dir: self.transfer.cache_dir.to_owned(),
            ignore_file: self.transfer.ignore_file.to_owned(),
        })
    }
}

pub fn load_config(config_path: &Path) -> Result<Configuration> {
    let config: Config = load_file(config_path).and_then(|c| {
        c.ok_or_else(|| anyhow::anyhow!("config file {config_path:?} not found"))
    })?;

    let groups = config
        .groups
        .into_iter()
        .map(|(name, targets)| -> Result<_, anyhow::Error> {
            Ok((name, expand_sources(targets)?))
        })
        .collect::<Result<Groups, _>>()?;

    Ok(Configuration {
        groups,
        proxy: config.proxy,
        transfer: config.transfer,
    })
}

pub fn load_file<T>(filename: &Path) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let mut buf = String::new();
    let mut f = match File::open(filename) {
        Ok(f) => Ok(f),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        e => e,
    }
    .context("open file")?;
    f.read_to_string(&mut buf).context("read file")?;
    let data = serde_yaml::from_str::<T>(&buf).context("deserialize file contents")?;
    Ok(Some(data))
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(&path.to_string_lossy())?.to_string();

    Ok(PathBuf::from(expanded))
}

fn expand_sources(targets: Vec<Target>) -> Result<Vec<Target>> {
    targets
        .into_iter()
        .map(|mut target| -> Result<_, anyhow::Error> {
            target.source = expand_path(&target.source)
                .with_context(|| format!("expand source path of {}", target.host))?;
            Ok(target)
        })
        .collect()
}
