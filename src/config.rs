use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::output::DEFAULT_OUTPUT_PATH;
use crate::pbp_parquet::{DEFAULT_URL_TEMPLATE, LocalParquetSource, NflverseSource};
use crate::pipeline::Execution;
use crate::season_loader::PlaySource;
use crate::synthetic_pbp::SyntheticSource;

const CACHE_DIR: &str = "nfl_probability";
const DEFAULT_PROXY_HOST: &str = "0.0.0.0";
const DEFAULT_PROXY_PORT: u16 = 8001;

/// Loads `.env.local` then `.env`; both are optional.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    Nflverse {
        url_template: String,
        cache_dir: PathBuf,
    },
    LocalDir(PathBuf),
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub out_path: PathBuf,
    pub season: Option<u16>,
    pub source: SourceChoice,
    pub execution: Execution,
}

impl GeneratorConfig {
    pub fn from_process() -> Result<Self> {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_args(&args, |key| std::env::var(key).ok())
    }

    /// Flags win over environment variables, which win over defaults.
    pub fn from_args(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let setting = |flag: &str, key: &str| {
            parse_value_arg(args, flag).or_else(|| env(key).filter(|v| !v.trim().is_empty()))
        };

        let out_path = setting("--out", "PROBABILITY_OUT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let season = setting("--season", "PBP_SEASON")
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .with_context(|| format!("invalid season {raw:?}"))
            })
            .transpose()?;

        let source = if has_flag(args, "--synthetic") || env_flag(env("PBP_SYNTHETIC")) {
            SourceChoice::Synthetic
        } else if let Some(dir) = setting("--input-dir", "PBP_INPUT_DIR") {
            SourceChoice::LocalDir(PathBuf::from(dir))
        } else {
            SourceChoice::Nflverse {
                url_template: setting("--source-url", "PBP_PARQUET_URL_TEMPLATE")
                    .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string()),
                cache_dir: setting("--cache-dir", "PBP_CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_cache_dir(&env)),
            }
        };

        let execution = if has_flag(args, "--sequential") || env_flag(env("PBP_SEQUENTIAL")) {
            Execution::Sequential
        } else {
            Execution::Parallel
        };

        Ok(Self {
            out_path,
            season,
            source,
            execution,
        })
    }

    pub fn play_source(&self) -> Box<dyn PlaySource> {
        match &self.source {
            SourceChoice::Nflverse {
                url_template,
                cache_dir,
            } => Box::new(NflverseSource {
                url_template: url_template.clone(),
                cache_dir: cache_dir.clone(),
            }),
            SourceChoice::LocalDir(dir) => Box::new(LocalParquetSource { dir: dir.clone() }),
            SourceChoice::Synthetic => Box::new(SyntheticSource::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn from_process() -> Result<Self> {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_args(&args, |key| std::env::var(key).ok())
    }

    pub fn from_args(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = parse_value_arg(args, "--host")
            .or_else(|| env("PROXY_HOST"))
            .unwrap_or_else(|| DEFAULT_PROXY_HOST.to_string());
        let port = match parse_value_arg(args, "--port").or_else(|| env("PROXY_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid port {raw:?}"))?,
            None => DEFAULT_PROXY_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_cache_dir(env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(base) = env("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return PathBuf::from(base).join(CACHE_DIR);
    }
    if let Some(home) = env("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".cache").join(CACHE_DIR);
    }
    std::env::temp_dir().join(CACHE_DIR)
}

fn parse_value_arg(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&format!("{name}="))
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn env_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("yes")
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_download_from_nflverse() {
        let cfg = GeneratorConfig::from_args(&[], env_of(&[("HOME", "/home/fan")])).unwrap();
        assert_eq!(cfg.out_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(cfg.season, None);
        assert_eq!(cfg.execution, Execution::Parallel);
        assert_eq!(
            cfg.source,
            SourceChoice::Nflverse {
                url_template: DEFAULT_URL_TEMPLATE.to_string(),
                cache_dir: PathBuf::from("/home/fan/.cache/nfl_probability"),
            }
        );
    }

    #[test]
    fn flags_override_environment() {
        let cfg = GeneratorConfig::from_args(
            &args(&["--out=web/data.json", "--season", "2023", "--sequential"]),
            env_of(&[("PROBABILITY_OUT", "ignored.json"), ("PBP_SEASON", "2019")]),
        )
        .unwrap();
        assert_eq!(cfg.out_path, PathBuf::from("web/data.json"));
        assert_eq!(cfg.season, Some(2023));
        assert_eq!(cfg.execution, Execution::Sequential);
    }

    #[test]
    fn environment_selects_local_and_synthetic_sources() {
        let local =
            GeneratorConfig::from_args(&[], env_of(&[("PBP_INPUT_DIR", "/data/pbp")])).unwrap();
        assert_eq!(local.source, SourceChoice::LocalDir(PathBuf::from("/data/pbp")));

        let synthetic = GeneratorConfig::from_args(
            &args(&["--input-dir", "/data/pbp"]),
            env_of(&[("PBP_SYNTHETIC", "1")]),
        )
        .unwrap();
        assert_eq!(synthetic.source, SourceChoice::Synthetic);
    }

    #[test]
    fn bad_season_is_rejected() {
        assert!(GeneratorConfig::from_args(&args(&["--season=next"]), env_of(&[])).is_err());
    }

    #[test]
    fn proxy_defaults_and_overrides() {
        let cfg = ProxyConfig::from_args(&[], env_of(&[])).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8001");

        let cfg = ProxyConfig::from_args(
            &args(&["--port", "9000"]),
            env_of(&[("PROXY_HOST", "127.0.0.1"), ("PROXY_PORT", "1")]),
        )
        .unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert!(ProxyConfig::from_args(&args(&["--port=http"]), env_of(&[])).is_err());
    }
}
