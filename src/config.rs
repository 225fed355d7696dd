use std::path::PathBuf;

use crate::data::loader::LoadOptions;

pub const DEFAULT_DATASET: &str = "data_input/alpukat_fix.csv";
pub const WINDOW_TITLE: &str = "Avocado Analytics: Understand Your Avocados!";
pub const HEADER_TITLE: &str = "Avocado Analytics";
pub const HEADER_DESCRIPTION: &str = "Analyze the behavior of avocado prices and the number of \
     avocados sold in the Indonesia between 2017 and 2020";

/// Startup configuration. Nothing here changes after the window opens.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,
    pub load: LoadOptions,
    /// Type selected initially when the dataset contains it.
    pub preferred_organic: String,
    pub window_title: String,
    /// Debug mode only raises the default log level.
    pub debug: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            load: LoadOptions::default(),
            preferred_organic: "organic".to_string(),
            window_title: WINDOW_TITLE.to_string(),
            debug: cfg!(debug_assertions),
        }
    }
}

impl DashboardConfig {
    /// Defaults, with the dataset path replaced by the first positional
    /// argument if one is given. `args` excludes the program name.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut config = DashboardConfig::default();
        if let Some(path) = args.into_iter().next() {
            config.dataset_path = PathBuf::from(path);
        }
        config
    }

    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Install the global logger. `RUST_LOG` overrides the mode's default level.
    pub fn init_logging(&self) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(self.log_level()))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.dataset_path, PathBuf::from("data_input/alpukat_fix.csv"));
        assert_eq!(config.load.delimiter, b';');
        assert_eq!(config.load.date_format, "%Y-%m-%d");
        assert_eq!(config.preferred_organic, "organic");
    }

    #[test]
    fn test_positional_path_overrides() {
        let config = DashboardConfig::from_args(vec!["other.parquet".to_string()]);
        assert_eq!(config.dataset_path, PathBuf::from("other.parquet"));
        let config = DashboardConfig::from_args(Vec::new());
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET));
    }

    #[test]
    fn test_log_level_follows_mode() {
        let mut config = DashboardConfig::default();
        config.debug = false;
        assert_eq!(config.log_level(), "info");
        config.debug = true;
        assert_eq!(config.log_level(), "debug");
    }
}
