//! Catalog definition — the YAML/JSON schema for essence blocks, value nodes
//! and persona presets.
//!
//! # Example YAML
//!
//! ```yaml
//! blocks:
//!   - id: still_water
//!     name: Still Water
//!     interpretX: observe facts with clinical precision
//!     defaultVector: { x: 0.8, y: 0.1, z: 0.5 }
//!     keywords: [calm, stillness]
//! values:
//!   - id: curiosity
//!     name: Curiosity
//!     keywords: [why, wonder]
//! personas:
//!   - id: archivist
//!     name: The Archivist
//!     summary: A quiet keeper of forgotten records.
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persona::{EssenceBlock, PersonaPreset, ValueNode};

use super::error::CatalogError;

/// Read-only table of blocks, value nodes and personas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub blocks: Vec<EssenceBlock>,
    #[serde(default)]
    pub values: Vec<ValueNode>,
    #[serde(default)]
    pub personas: Vec<PersonaPreset>,
}

impl Catalog {
    /// Parse and validate a catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file; `.json` is read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().map_or(false, |ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Append another catalog's entries. Ids already present are rejected
    /// and leave `self` untouched.
    pub fn merge(&mut self, other: Catalog) -> Result<(), CatalogError> {
        let mut next = self.clone();
        next.blocks.extend(other.blocks);
        next.values.extend(other.values);
        next.personas.extend(other.personas);
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn block(&self, id: &str) -> Result<&EssenceBlock, CatalogError> {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| not_found("block", id))
    }

    pub fn persona(&self, id: &str) -> Result<&PersonaPreset, CatalogError> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("persona", id))
    }

    pub fn value(&self, id: &str) -> Result<&ValueNode, CatalogError> {
        self.values
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| not_found("value", id))
    }

    /// Check every entry and reject duplicate ids within each table.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for block in &self.blocks {
            block.validate()?;
        }
        for persona in &self.personas {
            if persona.id.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "catalog persona without an id".to_string(),
                ));
            }
            persona.validate()?;
        }
        for value in &self.values {
            if value.id.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "catalog value node without an id".to_string(),
                ));
            }
        }

        unique_ids("block", self.blocks.iter().map(|b| b.id.as_str()))?;
        unique_ids("value", self.values.iter().map(|v| v.id.as_str()))?;
        unique_ids("persona", self.personas.iter().map(|p| p.id.as_str()))?;
        Ok(())
    }
}

fn not_found(kind: &'static str, id: &str) -> CatalogError {
    CatalogError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn unique_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::Validation(format!(
                "duplicate {} id '{}'",
                kind, id
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
blocks:
  - id: still_water
    name: Still Water
    interpretX: observe facts with clinical precision
    interpretZ: speak like still water under moonlight
    defaultVector: { x: 0.8, y: 0.1, z: 0.5 }
    keywords: [calm, stillness]
    essenceProperties: { temperature: -0.4 }
    operatorType: transform
values:
  - id: curiosity
    name: Curiosity
    keywords: [why, wonder]
personas:
  - id: archivist
    name: The Archivist
    summary: A quiet keeper of forgotten records.
    valueChain:
      - { id: patience, name: Patience, weight: 0.8 }
"#
    }

    #[test]
    fn test_from_yaml_minimal() {
        let catalog = Catalog::from_yaml(minimal_yaml()).unwrap();
        assert_eq!(catalog.blocks.len(), 1);
        assert_eq!(catalog.block("still_water").unwrap().keywords.len(), 2);
        assert_eq!(catalog.persona("archivist").unwrap().value_chain[0].weight, 0.8);
        assert_eq!(catalog.value("curiosity").unwrap().name, "Curiosity");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"values": [{"id": "v", "name": "V"}]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert!(catalog.blocks.is_empty());
        assert_eq!(catalog.values.len(), 1);
    }

    #[test]
    fn test_unknown_id_not_found() {
        let catalog = Catalog::from_yaml(minimal_yaml()).unwrap();
        let err = catalog.persona("nobody").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { kind: "persona", .. }));
        assert_eq!(err.to_string(), "persona not found: nobody");
    }

    #[test]
    fn test_out_of_range_vector_rejected() {
        let yaml = r#"
blocks:
  - id: bad
    name: Bad
    defaultVector: { x: 1.5, y: 0.0, z: 0.0 }
"#;
        let err = Catalog::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("defaultVector"));
    }

    #[test]
    fn test_persona_without_summary_rejected() {
        let yaml = r#"
personas:
  - id: ghost
    name: Ghost
"#;
        let err = Catalog::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut catalog = Catalog::from_yaml(minimal_yaml()).unwrap();
        let again = Catalog::from_yaml(minimal_yaml()).unwrap();
        let err = catalog.merge(again).unwrap_err();
        assert!(err.to_string().contains("duplicate block id 'still_water'"));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Catalog::from_yaml("blocks: [[["),
            Err(CatalogError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Catalog::from_file("/nonexistent/catalog.yaml"),
            Err(CatalogError::Io(_))
        ));
    }
}
