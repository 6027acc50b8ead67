use std::collections::{BTreeMap, HashSet};
use std::io::{IsTerminal, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::layout::AuthoredLayout;
use crate::graph::registry::{EntityRegistry, RelationshipRegistry};
use crate::graph::sample;
use crate::graph::types::{Entity, EntityId, Point, Relationship};

/// A network as stored on disk: families, connections, and optionally the
/// authored position of each family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, alias = "entities")]
    pub families: Vec<Entity>,
    #[serde(default, alias = "relationships")]
    pub connections: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub positions: BTreeMap<EntityId, Point>,
}

/// A loaded network ready for layout and rendering.
#[derive(Debug, Clone)]
pub struct Network {
    pub entities: EntityRegistry,
    pub relationships: RelationshipRegistry,
    /// `None` when the dataset carries no position table.
    pub authored: Option<AuthoredLayout>,
}

impl Dataset {
    /// The built-in fifteen-family demo network.
    pub fn sample() -> Self {
        Self {
            families: sample::families(),
            connections: sample::connections(),
            positions: sample::positions().into_iter().collect(),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Dataset(format!("invalid JSON: {}", e)))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Dataset(format!("invalid YAML: {}", e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Dataset(format!("invalid TOML: {}", e)))
    }

    /// JSON from `reader`. Blank input gives the built-in sample.
    pub fn from_json_reader(mut reader: impl Read) -> Result<Self> {
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        if buffer.trim().is_empty() {
            log::info!("no dataset on input, using the built-in sample");
            return Ok(Self::sample());
        }
        Self::from_json_str(&buffer)
    }

    /// Load by extension (`.json`, `.yaml`/`.yml`, `.toml`). `-` reads JSON
    /// from stdin, falling back to the sample when stdin is a terminal or
    /// empty.
    pub fn load(path: &Path) -> Result<Self> {
        if path.to_str() == Some("-") {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                log::info!("stdin is a terminal, using the built-in sample");
                return Ok(Self::sample());
            }
            return Self::from_json_reader(stdin.lock());
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let parse: fn(&str) -> Result<Self> = match ext.as_str() {
            "json" => Self::from_json_str,
            "yaml" | "yml" => Self::from_yaml_str,
            "toml" => Self::from_toml_str,
            _ => {
                return Err(Error::Dataset(format!(
                    "{}: unsupported dataset format (use .json, .yaml or .toml)",
                    path.display()
                )));
            }
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Dataset(format!("{}: {}", path.display(), e)))?;
        let dataset = parse(&content).map_err(|e| match e {
            Error::Dataset(msg) => Error::Dataset(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        log::info!(
            "loaded {} families and {} connections from {}",
            dataset.families.len(),
            dataset.connections.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Build the registries. Out-of-range values and dangling endpoints are
    /// kept and only logged; the renderer copes with both.
    pub fn into_network(self) -> Result<Network> {
        let known: HashSet<&EntityId> = self.families.iter().map(|f| &f.id).collect();
        for rel in &self.connections {
            for end in [&rel.from, &rel.to] {
                if !known.contains(end) {
                    log::warn!("connection {} references unknown family {}", rel.id, end);
                }
            }
            if !(0.0..=1.0).contains(&rel.strength) {
                log::warn!(
                    "connection {} has strength {} outside [0, 1]",
                    rel.id,
                    rel.strength
                );
            }
        }
        for family in &self.families {
            if !(0.0..=10.0).contains(&family.trust_score) {
                log::warn!(
                    "family {} has trust score {} outside [0, 10]",
                    family.id,
                    family.trust_score
                );
            }
        }

        let authored = (!self.positions.is_empty()).then(|| AuthoredLayout::new(self.positions));
        Ok(Network {
            entities: EntityRegistry::new(self.families)?,
            relationships: RelationshipRegistry::new(self.connections)?,
            authored,
        })
    }
}
