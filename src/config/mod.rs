use serde::Deserialize;
use std::path::PathBuf;

fn default_latency_ms() -> u64 {
    200
}
fn default_show_areas() -> bool {
    false
}
fn default_per_unit_timing() -> bool {
    false
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_show_areas")]
    pub show_areas: bool,
    #[serde(default = "default_per_unit_timing")]
    pub per_unit_timing: bool,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub source: Option<SourceConfig>,
}

fn default_source_urls() -> Vec<String> {
    vec![
        "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_plates.json"
            .to_string(),
        "https://cdn.jsdelivr.net/gh/fraxen/tectonicplates@master/GeoJSON/PB2002_plates.json"
            .to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_source_urls")]
    pub urls: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            urls: default_source_urls(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("platebench.toml"));
    paths.push(PathBuf::from(".platebench.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("platebench").join("config.toml"));
        paths.push(config_dir.join("platebench.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".platebench.toml"));
        paths.push(home.join(".config").join("platebench").join("config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();

        assert!(config.input.is_none());
        assert!(config.workers.is_none());
        assert_eq!(config.latency_ms, 200);
        assert!(config.timeout_secs.is_none());
        assert!(!config.show_areas);
        assert!(!config.verbose);
        assert!(config.source.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let config: FileConfig = toml::from_str(
            r#"
            input = "data/plates.json"
            workers = 4
            latency_ms = 0
            show_areas = true

            [source]
            urls = ["https://example.com/plates.json"]
            max_retries = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.input, Some(PathBuf::from("data/plates.json")));
        assert_eq!(config.workers, Some(4));
        assert_eq!(config.latency_ms, 0);
        assert!(config.show_areas);

        let source = config.source.unwrap();
        assert_eq!(source.urls, vec!["https://example.com/plates.json"]);
        assert_eq!(source.max_retries, 1);
        // Unspecified source fields keep their defaults
        assert_eq!(source.timeout_secs, 60);
    }

    #[test]
    fn test_source_config_default_mirrors() {
        let source = SourceConfig::default();
        assert!(!source.urls.is_empty());
        assert_eq!(source.max_retries, 3);
    }
}
