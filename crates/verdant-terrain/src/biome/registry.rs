//! Biome registry: an ordered arena of [`Biome`]s with stable ids.
//!
//! The position of a biome in the registry is its *biome index*: the value stored
//! in vertex biome channels and drawn by the Voronoi seeds. Ids survive reordering
//! and removal; indices do not.

use serde::{Deserialize, Serialize};

use super::{Biome, BiomeId};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeRegistry {
    biomes: Vec<Biome>,
    next_id: u32,
}

impl BiomeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a biome and returns its newly assigned id.
    pub fn add(&mut self, mut biome: Biome) -> BiomeId {
        let id = BiomeId(self.next_id);
        self.next_id += 1;
        biome.id = id;
        log::debug!("Registered biome '{}' as {id}", biome.name);
        self.biomes.push(biome);
        id
    }

    /// Adds a default biome with the given name.
    pub fn create(&mut self, name: impl Into<String>) -> BiomeId {
        self.add(Biome::new(name))
    }

    /// Removes a biome. Unknown ids are a logged no-op.
    pub fn remove(&mut self, id: BiomeId) -> Option<Biome> {
        match self.index_of(id) {
            Some(index) => Some(self.biomes.remove(index)),
            None => {
                log::warn!("Cannot remove biome {id}: not found");
                None
            }
        }
    }

    /// Biome with `id`, logging a warning when it is missing.
    pub fn get(&self, id: BiomeId) -> Option<&Biome> {
        let found = self.biomes.iter().find(|b| b.id == id);
        if found.is_none() {
            log::warn!("Biome {id} not found");
        }
        found
    }

    /// Mutable biome with `id`, logging a warning when it is missing.
    pub fn get_mut(&mut self, id: BiomeId) -> Option<&mut Biome> {
        let found = self.biomes.iter_mut().find(|b| b.id == id);
        if found.is_none() {
            log::warn!("Biome {id} not found");
        }
        found
    }

    /// Current biome index of `id`.
    pub fn index_of(&self, id: BiomeId) -> Option<usize> {
        self.biomes.iter().position(|b| b.id == id)
    }

    /// Biome at a biome index.
    pub fn by_index(&self, index: usize) -> Option<&Biome> {
        self.biomes.get(index)
    }

    /// First biome with the given name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.biomes.iter().find(|b| b.name == name).map(|b| b.id)
    }

    /// Moves a biome to `new_index` (clamped to the last slot), shifting the others.
    /// Returns `false` if the id is unknown.
    pub fn move_biome(&mut self, id: BiomeId, new_index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            log::warn!("Cannot move biome {id}: not found");
            return false;
        };
        let biome = self.biomes.remove(from);
        let to = new_index.min(self.biomes.len());
        self.biomes.insert(to, biome);
        true
    }

    /// Spawn weights in biome-index order.
    pub fn weights(&self) -> Vec<f32> {
        self.biomes.iter().map(|b| b.frequency_weight).collect()
    }

    /// Biomes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.iter()
    }

    pub fn as_slice(&self) -> &[Biome] {
        &self.biomes
    }

    /// Number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}
