use crate::data::loader::ResourceSource;
use crate::data::model::DatasetKind;

/// Environment variable holding the base path (directory or URL) the two
/// dataset resources are resolved against.
pub const BASE_PATH_ENV: &str = "VIZ_BASE_PATH";

/// Base path used when the environment does not provide one.
pub const DEFAULT_BASE_PATH: &str = "public";

const TEST_RESOURCE: &str = "data/ecg/test_small.json";
const TRAIN_RESOURCE: &str = "data/ecg/train_small.json";

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base(DEFAULT_BASE_PATH)
    }
}

impl Config {
    pub fn with_base(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Read the base path from `VIZ_BASE_PATH`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var(BASE_PATH_ENV) {
            Ok(base) if !base.trim().is_empty() => Self::with_base(base.trim()),
            _ => Self::default(),
        }
    }

    /// Location of the given dataset.
    pub fn resource(&self, kind: DatasetKind) -> ResourceSource {
        let relative = match kind {
            DatasetKind::Test => TEST_RESOURCE,
            DatasetKind::Train => TRAIN_RESOURCE,
        };
        ResourceSource::resolve(&self.base_path, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_resources_live_under_public() {
        let config = Config::default();
        assert_eq!(
            config.resource(DatasetKind::Test),
            ResourceSource::File(PathBuf::from("public/data/ecg/test_small.json"))
        );
        assert_eq!(
            config.resource(DatasetKind::Train),
            ResourceSource::File(PathBuf::from("public/data/ecg/train_small.json"))
        );
    }

    #[test]
    fn url_base_yields_urls() {
        let config = Config::with_base("http://localhost:3000");
        assert_eq!(
            config.resource(DatasetKind::Test),
            ResourceSource::Url("http://localhost:3000/data/ecg/test_small.json".into())
        );
    }
}
