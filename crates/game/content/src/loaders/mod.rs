//! Loaders that convert authored data files into engine inputs.

pub mod board;
pub mod config;
pub mod factory;

pub use board::BoardLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while turning authored files into engine inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed board definition in {}", path.display())]
    BoardFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed engine config in {}", path.display())]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Common result type for loaders.
pub type LoadResult<T> = Result<T, LoadError>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })
}
