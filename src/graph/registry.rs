use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

use super::types::{Entity, EntityId, Relationship, RelationshipId};

/// Immutable list of entities with id lookup.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
}

impl EntityRegistry {
    /// Build a registry, rejecting duplicate ids.
    pub fn new(entities: Vec<Entity>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entities.len());
        for (i, entity) in entities.iter().enumerate() {
            if index.insert(entity.id.clone(), i).is_some() {
                return Err(Error::DuplicateId(entity.id.to_string()));
            }
        }
        Ok(Self { entities, index })
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.entities[i])
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Immutable list of relationships. Endpoint pairs may repeat; only the
/// relationship ids themselves must be unique.
#[derive(Debug, Clone, Default)]
pub struct RelationshipRegistry {
    relationships: Vec<Relationship>,
}

impl RelationshipRegistry {
    pub fn new(relationships: Vec<Relationship>) -> Result<Self> {
        let mut seen: HashSet<&RelationshipId> = HashSet::with_capacity(relationships.len());
        for rel in &relationships {
            if !seen.insert(&rel.id) {
                return Err(Error::DuplicateId(rel.id.to_string()));
            }
        }
        Ok(Self { relationships })
    }

    pub fn get(&self, id: &RelationshipId) -> Option<&Relationship> {
        self.relationships.iter().find(|r| &r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    pub fn as_slice(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}
