use regex::Regex;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "sysmetrics.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Root of the procfs tree to read; point at a bind-mounted host /proc inside containers.
    /// Only CPU ticks, processes and TCP tables follow it. Load, memory, swap and
    /// mounts are still read from this process's own namespace, so inside a
    /// container a report mixes host CPU and process data with container figures.
    #[serde(default = "default_proc_root")]
    pub proc_root: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
        }
    }
}

fn default_proc_root() -> String {
    "/proc".into()
}

/// Which metric families one collection cycle gathers.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// Load average, aggregate CPU, memory and swap.
    #[serde(default = "default_true")]
    pub system: bool,
    #[serde(default)]
    pub cpu_per_core: bool,
    #[serde(default = "default_true")]
    pub process: bool,
    #[serde(default = "default_true")]
    pub connections: bool,
    #[serde(default = "default_true")]
    pub filesystem: bool,
    /// Regexes matched against process names; a process is reported if any matches.
    #[serde(default = "default_procs")]
    pub procs: Vec<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            system: true,
            cpu_per_core: false,
            process: true,
            connections: true,
            filesystem: true,
            procs: default_procs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_procs() -> Vec<String> {
    vec![".*".into()]
}

impl CollectionConfig {
    /// Compile `procs`. Patterns are checked by `AppConfig::validate`.
    pub fn proc_patterns(&self) -> anyhow::Result<Vec<Regex>> {
        self.procs
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| anyhow::anyhow!("collection.procs: invalid regex {:?}: {}", p, e))
            })
            .collect()
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE`, else `sysmetrics.toml`; built-in defaults when
    /// `CONFIG_FILE` is unset and the default file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = match std::env::var("CONFIG_FILE") {
            Ok(p) => p,
            Err(_) if !std::path::Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                let config = AppConfig::default();
                config.validate()?;
                return Ok(config);
            }
            Err(_) => DEFAULT_CONFIG_FILE.into(),
        };
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("read config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.provider.proc_root.is_empty(),
            "provider.proc_root must be non-empty"
        );
        anyhow::ensure!(
            self.collection.system || self.collection.process || self.collection.filesystem,
            "collection: at least one of system, process, filesystem must be enabled"
        );
        anyhow::ensure!(
            !self.collection.procs.is_empty(),
            "collection.procs must list at least one pattern"
        );
        self.collection.proc_patterns()?;
        Ok(())
    }
}
