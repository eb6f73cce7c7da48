// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory scene: the single owner of every entity
//!
//! Entities are keyed by unique name. Iteration follows name order, so
//! every pipeline sees a stable entity ordering for a given scene.

use crate::entity::{Entity, EntityKind, Geometry};
use crate::error::{ReconstructError, Result};
use crate::naming::unique_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    entities: BTreeMap<String, Entity>,
}

/// Wire form exchanged with the scene I/O collaborator
#[derive(Serialize, Deserialize)]
struct SceneFile {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    /// Entity by exact name, or a lookup error
    pub fn lookup(&self, name: &str) -> Result<&Entity> {
        self.get(name)
            .ok_or_else(|| ReconstructError::Lookup(name.to_string()))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Result<&mut Entity> {
        self.entities
            .get_mut(name)
            .ok_or_else(|| ReconstructError::Lookup(name.to_string()))
    }

    /// Insert an entity, suffixing its name with `.NNN` when taken
    ///
    /// Returns the name the entity was stored under.
    pub fn insert(&mut self, mut entity: Entity) -> String {
        let name = unique_name(&entity.name, |n| self.entities.contains_key(n));
        entity.name = name.clone();
        self.entities.insert(name.clone(), entity);
        name
    }

    /// Insert an entity under its exact name
    pub fn insert_exact(&mut self, entity: Entity) -> Result<()> {
        if self.entities.contains_key(&entity.name) {
            return Err(ReconstructError::NameCollision(entity.name));
        }
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Entity> {
        self.entities.remove(name)
    }

    /// Rename an entity, suffixing the new name when taken
    ///
    /// Returns the final name.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<String> {
        if old == new {
            return self.lookup(old).map(|e| e.name.clone());
        }
        let mut entity = self
            .entities
            .remove(old)
            .ok_or_else(|| ReconstructError::Lookup(old.to_string()))?;
        entity.name = new.to_string();
        Ok(self.insert(entity))
    }

    /// Names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }

    /// Names starting with `prefix`, in sorted order
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entities
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names of entities of one kind, in sorted order
    pub fn names_of_kind(&self, kind: EntityKind) -> Vec<String> {
        self.entities
            .values()
            .filter(|e| e.kind() == kind)
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn to_json(&self) -> Result<String> {
        let file = SceneFile {
            entities: self.entities.values().cloned().collect(),
        };
        serde_json::to_string(&file).map_err(|e| ReconstructError::Serialization(e.to_string()))
    }

    /// Load a scene; duplicate names and out-of-range mesh indices are rejected
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SceneFile =
            serde_json::from_str(json).map_err(|e| ReconstructError::Serialization(e.to_string()))?;
        let mut scene = Scene::new();
        for entity in file.entities {
            if let Geometry::Mesh(mesh) = &entity.geometry {
                mesh.validate().map_err(|e| {
                    ReconstructError::Serialization(format!("{}: {}", entity.name, e))
                })?;
            }
            scene.insert_exact(entity)?;
        }
        Ok(scene)
    }

    /// Entities renamed to their exported names, metadata encoded in the name
    pub fn export_snapshot(&self) -> Vec<Entity> {
        self.entities
            .values()
            .map(|e| {
                let mut exported = e.clone();
                exported.name = e.export_name();
                exported
            })
            .collect()
    }
}
