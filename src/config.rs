use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "slurmsim.toml";

/// Layered driver configuration. Only the `run` subcommand's defaults are configurable —
/// CLI flags that are explicitly passed always win.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub nodes: u32,
    pub cpus_per_node: u32,
    pub gpus_per_node: u32,
    pub policy: String,
    pub tick: u64,
    pub duration: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            nodes: 4,
            cpus_per_node: 16,
            gpus_per_node: 2,
            policy: "fifo".to_string(),
            tick: 5,
            duration: 60,
        }
    }
}

/// Loads defaults from an optional TOML file plus `SLURMSIM_`-prefixed environment
/// overrides. A missing file (default search path) is not an error; an explicitly
/// requested file that doesn't exist is.
pub fn load_config(config_path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut sources = Vec::new();

    match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(config::ConfigError::NotFound(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            sources.push(path.to_path_buf());
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                sources.push(default_path);
            }
        }
    }

    let settings = sources.iter().fold(config::Config::builder(), |builder, path| {
        builder.add_source(config::File::from(path.as_path()))
    });

    settings
        .add_source(
            config::Environment::with_prefix("SLURMSIM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_config_default_when_no_file_present() {
        let config = load_config(None).unwrap();
        assert_eq!(config.run.nodes, 4);
        assert_eq!(config.run.policy, "fifo");
    }

    #[test]
    fn load_config_reads_explicit_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[run]\npolicy = \"backfill\"\nnodes = 8").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.run.policy, "backfill");
        assert_eq!(config.run.nodes, 8);
        assert_eq!(config.run.tick, 5);
    }

    #[test]
    fn load_config_rejects_missing_explicit_file() {
        let result = load_config(Some(Path::new("/tmp/does-not-exist-slurmsim.toml")));
        assert!(result.is_err());
    }
}
