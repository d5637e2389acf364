//! Engine configuration loader.

use std::path::Path;

use tabula_core::EngineConfig;

use crate::loaders::{read_file, LoadError, LoadResult};

/// Loader for engine configuration from TOML files.
///
/// Every field is optional in the file; omitted fields fall back to the
/// compiled defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        let config: EngineConfig =
            toml::from_str(&content).map_err(|source| LoadError::ConfigFormat {
                path: path.to_owned(),
                source,
            })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_directives_per_pump = 64").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.max_directives_per_pump, 64);
        assert_eq!(config.default_roll_max, 6);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ConfigLoader::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn bad_toml_is_a_format_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_directives_per_pump = \"lots\"").unwrap();

        let err = ConfigLoader::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::ConfigFormat { .. }));
    }
}
