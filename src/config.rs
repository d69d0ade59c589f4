use serde::Deserialize;

fn default_dataset_path() -> String {
    "data.csv".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    /// Path to the reference data CSV, relative to the working directory.
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UiConfig {
    /// Source URL for the decorative sidebar animation. Optional: when unset
    /// the animation endpoint answers 204 and the frontend shows nothing.
    #[serde(default)]
    pub animation_url: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
