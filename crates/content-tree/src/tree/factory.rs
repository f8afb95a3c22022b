//! Adapter selection by path

use std::path::Path;

use derive_more::Display;
use log::debug;

use crate::config::BrowserConfig;
use crate::error::UnsupportedTypeError;
use crate::tree::{
    ContentAdapter, FileSystemAdapter, HierarchicalFileAdapter, StructuredFileAdapter,
};

/// The adapter variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AdapterKind {
    #[display(fmt = "filesystem")]
    FileSystem,
    #[display(fmt = "structured")]
    Structured,
    #[display(fmt = "hierarchical")]
    Hierarchical,
}

/// Recognized file extensions and the adapter that handles each
///
/// Both `kind_for` and `supported_extensions` read this table.
const FORMATS: &[(&str, AdapterKind)] = &[
    ("mat", AdapterKind::Structured),
    ("h5", AdapterKind::Hierarchical),
    ("hdf5", AdapterKind::Hierarchical),
    ("hdf", AdapterKind::Hierarchical),
    ("he5", AdapterKind::Hierarchical),
    ("nc", AdapterKind::Hierarchical),
    ("nc4", AdapterKind::Hierarchical),
    ("nwb", AdapterKind::Hierarchical),
    ("h5ad", AdapterKind::Hierarchical),
    ("loom", AdapterKind::Hierarchical),
];

/// Picks the adapter for a path: directories, MAT files, HDF5-family files
#[derive(Debug, Clone, Default)]
pub struct AdapterFactory {
    config: BrowserConfig,
}

impl AdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Created structured-file adapters use `config.structured`
    pub fn with_config(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Which adapter handles `locator`
    pub fn kind_for(&self, locator: &Path) -> Result<AdapterKind, UnsupportedTypeError> {
        if locator.is_dir() {
            return Ok(AdapterKind::FileSystem);
        }

        let extension = locator
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        FORMATS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, kind)| *kind)
            .ok_or(UnsupportedTypeError { extension })
    }

    /// A fresh, unopened adapter for `locator`
    pub fn create_adapter(
        &self,
        locator: &Path,
    ) -> Result<Box<dyn ContentAdapter>, UnsupportedTypeError> {
        let kind = self.kind_for(locator)?;
        debug!("Using {} adapter for {}", kind, locator.display());
        Ok(match kind {
            AdapterKind::FileSystem => Box::new(FileSystemAdapter::new()),
            AdapterKind::Structured => {
                Box::new(StructuredFileAdapter::with_options(self.config.structured))
            }
            AdapterKind::Hierarchical => Box::new(HierarchicalFileAdapter::new()),
        })
    }

    /// Every recognized extension, without the leading dot
    pub fn supported_extensions() -> Vec<&'static str> {
        FORMATS.iter().map(|(ext, _)| *ext).collect()
    }

    /// Recognized extensions handled by the adapter `kind`
    pub fn extensions_for(kind: AdapterKind) -> Vec<&'static str> {
        FORMATS
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(ext, _)| *ext)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_kind_for_files() {
        let factory = AdapterFactory::new();
        assert_eq!(
            factory.kind_for(Path::new("run.mat")).unwrap(),
            AdapterKind::Structured
        );
        assert_eq!(
            factory.kind_for(Path::new("RUN.MAT")).unwrap(),
            AdapterKind::Structured
        );
        assert_eq!(
            factory.kind_for(Path::new("cells.h5ad")).unwrap(),
            AdapterKind::Hierarchical
        );
    }

    #[test]
    fn test_kind_for_directory() {
        let temp = TempDir::new().unwrap();
        // the extension does not matter for directories
        let dir = temp.path().join("looks_like.mat");
        std::fs::create_dir(&dir).unwrap();
        assert_eq!(
            AdapterFactory::new().kind_for(&dir).unwrap(),
            AdapterKind::FileSystem
        );
    }

    #[test]
    fn test_unsupported() {
        let factory = AdapterFactory::new();
        let err = factory.kind_for(Path::new("notes.txt")).unwrap_err();
        assert_eq!(err.extension, "txt");
        let err = factory.create_adapter(Path::new("Makefile")).err().unwrap();
        assert_eq!(err.extension, "");
    }

    #[test]
    fn test_every_extension_has_an_adapter() {
        let factory = AdapterFactory::new();
        for ext in AdapterFactory::supported_extensions() {
            let path = format!("file.{}", ext);
            let adapter = factory.create_adapter(Path::new(&path)).unwrap();
            assert_ne!(adapter.kind(), AdapterKind::FileSystem);
        }
        assert_eq!(
            AdapterFactory::extensions_for(AdapterKind::Structured),
            vec!["mat"]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(AdapterKind::Hierarchical.to_string(), "hierarchical");
    }
}
