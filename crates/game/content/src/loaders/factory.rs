//! Content factory for loading a session's data directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use tabula_core::{Board, EngineConfig};

use crate::loaders::{BoardLoader, ConfigLoader};

/// Loads all session content from one data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── boards/
///     ├── classic.json
///     └── gauntlet.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads engine configuration from `config.toml`. A missing file
    /// yields the compiled defaults.
    pub fn load_config(&self) -> Result<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(EngineConfig::default());
        }
        Ok(ConfigLoader::load(&path)?)
    }

    /// Loads a board from `boards/{board_name}.json`.
    pub fn load_board(&self, board_name: &str) -> Result<Board> {
        let path = self
            .data_dir
            .join("boards")
            .join(format!("{board_name}.json"));
        Ok(BoardLoader::load(&path).with_context(|| format!("loading board '{board_name}'"))?)
    }

    /// Names of the boards available under `boards/`.
    pub fn list_boards(&self) -> Result<Vec<String>> {
        let dir = self.data_dir.join("boards");
        let mut names = Vec::new();
        for entry in
            std::fs::read_dir(&dir).with_context(|| format!("failed to read {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn seed_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("boards")).unwrap();
        fs::write(
            dir.path().join("boards/demo.json"),
            r#"{"spaces": [{"id": 0, "name": "s", "type": "START"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("config.toml"), "default_roll_max = 4\n").unwrap();
        dir
    }

    #[test]
    fn loads_config_and_board_from_directory() {
        let dir = seed_dir();
        let factory = ContentFactory::new(dir.path());

        let config = factory.load_config().unwrap();
        assert_eq!(config.default_roll_max, 4);

        let board = factory.load_board("demo").unwrap();
        assert_eq!(board.spaces().len(), 1);

        assert_eq!(factory.list_boards().unwrap(), vec!["demo".to_owned()]);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        let config = factory.load_config().unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
