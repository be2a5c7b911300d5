//! Catalog loader — merges catalog files from search paths over the built-in
//! default.
//!
//! 1. Start from the embedded default catalog (or an empty one)
//! 2. Read every `.yaml` / `.yml` / `.json` file in each search path
//! 3. Merge each file in; files that fail to parse or collide are skipped

use std::path::{Path, PathBuf};

use super::catalog_def::Catalog;
use super::error::CatalogError;

/// Default catalog compiled into the binary.
const BUILTIN_CATALOG: &str = include_str!("../../catalogs/default.yaml");

/// The embedded default catalog.
pub fn builtin() -> Result<Catalog, CatalogError> {
    Catalog::from_yaml(BUILTIN_CATALOG)
}

/// Loads catalog files from directories.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    /// Directories (or single files) to read.
    search_paths: Vec<PathBuf>,
    /// Whether to start from the built-in catalog.
    include_builtin: bool,
}

impl CatalogLoader {
    /// Create a loader that yields the built-in catalog until search paths
    /// are added.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            include_builtin: true,
        }
    }

    /// Create a loader reading only `path`, without the built-in catalog.
    pub fn with_search_path(path: impl Into<PathBuf>) -> Self {
        Self {
            search_paths: vec![path.into()],
            include_builtin: false,
        }
    }

    /// Add an additional search path.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Toggle the built-in catalog as the merge base.
    pub fn include_builtin(mut self, include: bool) -> Self {
        self.include_builtin = include;
        self
    }

    /// Load and merge everything.
    ///
    /// A search path may be a single catalog file, in which case its errors
    /// are returned rather than skipped.
    pub fn load_all(&self) -> Result<Catalog, CatalogError> {
        let mut catalog = if self.include_builtin {
            builtin()?
        } else {
            Catalog::default()
        };

        for search_path in &self.search_paths {
            if !search_path.exists() {
                continue;
            }
            if search_path.is_file() {
                catalog.merge(Catalog::from_file(search_path)?)?;
                continue;
            }

            let mut files: Vec<PathBuf> = std::fs::read_dir(search_path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_catalog_file(p))
                .collect();
            // read_dir order is platform-dependent
            files.sort();

            for path in files {
                if let Err(e) = Catalog::from_file(&path).and_then(|loaded| catalog.merge(loaded)) {
                    log::warn!("Skipping catalog {:?}: {}", path, e);
                }
            }
        }

        Ok(catalog)
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_catalog_file(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == "yaml" || ext == "yml" || ext == "json")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRA_PERSONA: &str = r#"
personas:
  - id: lighthouse_keeper
    name: Lighthouse Keeper
    summary: Gruff, loyal, allergic to small talk.
"#;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = builtin().unwrap();
        assert!(!catalog.blocks.is_empty());
        assert!(!catalog.values.is_empty());
        assert!(!catalog.personas.is_empty());
        for persona in &catalog.personas {
            assert!(!persona.summary.trim().is_empty(), "{}", persona.id);
        }
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extra.yaml"), EXTRA_PERSONA).unwrap();
        std::fs::write(dir.path().join("values.json"), r#"{"values": [{"id": "v", "name": "V"}]}"#)
            .unwrap();
        // Non-catalog files are ignored
        std::fs::write(dir.path().join("readme.txt"), "not a catalog").unwrap();

        let catalog = CatalogLoader::with_search_path(dir.path()).load_all().unwrap();
        assert_eq!(catalog.personas.len(), 1);
        assert_eq!(catalog.values.len(), 1);
        assert!(catalog.blocks.is_empty());
    }

    #[test]
    fn test_bad_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_good.yaml"), EXTRA_PERSONA).unwrap();
        std::fs::write(dir.path().join("b_broken.yaml"), "personas: [[[").unwrap();
        // same persona id again: collides and is skipped
        std::fs::write(dir.path().join("c_dup.yaml"), EXTRA_PERSONA).unwrap();

        let catalog = CatalogLoader::with_search_path(dir.path()).load_all().unwrap();
        assert_eq!(catalog.personas.len(), 1);
    }

    #[test]
    fn test_merges_over_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extra.yaml"), EXTRA_PERSONA).unwrap();

        let builtin_count = builtin().unwrap().personas.len();
        let catalog = CatalogLoader::with_search_path(dir.path())
            .include_builtin(true)
            .load_all()
            .unwrap();
        assert_eq!(catalog.personas.len(), builtin_count + 1);
        assert!(catalog.persona("lighthouse_keeper").is_ok());
    }

    #[test]
    fn test_default_loader_is_builtin() {
        assert_eq!(CatalogLoader::new().load_all().unwrap(), builtin().unwrap());
    }

    #[test]
    fn test_single_file_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "personas: [[[").unwrap();
        assert!(CatalogLoader::with_search_path(&path).load_all().is_err());
    }

    #[test]
    fn test_nonexistent_path_is_empty() {
        let catalog = CatalogLoader::with_search_path("/nonexistent/path")
            .load_all()
            .unwrap();
        assert_eq!(catalog, Catalog::default());
    }
}
