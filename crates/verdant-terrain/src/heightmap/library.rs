//! Arena of named heightmaps addressed by [`HeightmapId`].

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{HeightImage, Heightmap, HeightmapError, HeightmapId};

/// Step used for finite-difference normals.
const NORMAL_EPSILON: f32 = 0.05;

/// One library slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightmapEntry {
    pub id: HeightmapId,
    pub name: String,
    pub heightmap: Heightmap,
}

/// Owns every heightmap of a terrain. Ids are never reused after removal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapLibrary {
    entries: Vec<HeightmapEntry>,
    next_id: u32,
}

impl HeightmapLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a heightmap and return its id.
    pub fn add(&mut self, name: impl Into<String>, heightmap: Heightmap) -> HeightmapId {
        let id = HeightmapId(self.next_id);
        self.next_id += 1;
        self.entries.push(HeightmapEntry {
            id,
            name: name.into(),
            heightmap,
        });
        id
    }

    /// Remove a heightmap. Multi heightmaps still referencing it will fail validation.
    pub fn remove(&mut self, id: HeightmapId) -> Option<Heightmap> {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => Some(self.entries.remove(index).heightmap),
            None => {
                log::warn!("Cannot remove heightmap {id}: not found");
                None
            }
        }
    }

    pub fn get(&self, id: HeightmapId) -> Option<&Heightmap> {
        let found = self.find(id);
        if found.is_none() {
            log::warn!("Heightmap {id} not found");
        }
        found
    }

    pub fn get_mut(&mut self, id: HeightmapId) -> Option<&mut Heightmap> {
        let found = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.heightmap);
        if found.is_none() {
            log::warn!("Heightmap {id} not found");
        }
        found
    }

    pub fn name(&self, id: HeightmapId) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    pub fn contains(&self, id: HeightmapId) -> bool {
        self.find(id).is_some()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &HeightmapEntry> {
        self.entries.iter()
    }

    /// Number of heightmaps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, id: HeightmapId) -> Option<&Heightmap> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.heightmap)
    }

    fn lookup(&self, id: HeightmapId) -> Result<&Heightmap, HeightmapError> {
        self.find(id).ok_or(HeightmapError::UnknownId(id))
    }

    /// Image heightmaps that name a source file, for the host to decode.
    pub fn image_sources(&self) -> impl Iterator<Item = (HeightmapId, &Path)> {
        self.entries.iter().filter_map(|e| match &e.heightmap {
            Heightmap::Image(img) => img.source.as_deref().map(|path| (e.id, path)),
            _ => None,
        })
    }

    /// Attach decoded pixels to an image heightmap.
    pub fn attach_image(&mut self, id: HeightmapId, image: HeightImage) -> Result<(), HeightmapError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(HeightmapError::UnknownId(id))?;
        match &mut entry.heightmap {
            Heightmap::Image(img) => {
                img.image = Some(image);
                Ok(())
            }
            _ => Err(HeightmapError::NotAnImage(id)),
        }
    }

    /// Evaluate heightmap `id` at world position `(x, z)`.
    ///
    /// A multi heightmap that reaches itself through its children returns
    /// [`HeightmapError::SelfReference`] instead of recursing forever.
    pub fn get_height(&self, id: HeightmapId, x: f32, z: f32) -> Result<f32, HeightmapError> {
        let mut stack = Vec::new();
        self.height_inner(id, x, z, &mut stack)
    }

    fn height_inner(
        &self,
        id: HeightmapId,
        x: f32,
        z: f32,
        stack: &mut Vec<HeightmapId>,
    ) -> Result<f32, HeightmapError> {
        match self.lookup(id)? {
            Heightmap::Multi(multi) => {
                stack.push(id);
                let mut total = 0.0;
                for &child in &multi.children {
                    if stack.contains(&child) {
                        return Err(HeightmapError::SelfReference(child));
                    }
                    total += self.height_inner(child, x, z, stack)?;
                }
                stack.pop();
                Ok(total)
            }
            leaf => leaf.get_height(x, z),
        }
    }

    /// Surface normal of heightmap `id` at `(x, z)`.
    ///
    /// Flat and sinusoidal heightmaps are exact; everything else uses central
    /// differences.
    pub fn normal(&self, id: HeightmapId, x: f32, z: f32) -> Result<Vec3, HeightmapError> {
        match self.lookup(id)? {
            Heightmap::Flat(_) => Ok(Vec3::Y),
            Heightmap::Sinusoidal(wave) => Ok(wave.normal(x, z)),
            _ => {
                let e = NORMAL_EPSILON;
                let dh_dx = (self.get_height(id, x + e, z)? - self.get_height(id, x - e, z)?) / (2.0 * e);
                let dh_dz = (self.get_height(id, x, z + e)? - self.get_height(id, x, z - e)?) / (2.0 * e);
                Ok(Vec3::new(-dh_dx, 1.0, -dh_dz).normalize())
            }
        }
    }

    /// Reseed heightmap `id`. Multi heightmaps pass `multi_hash(seed, child_index)` to
    /// each child so siblings of the same kind decorrelate.
    pub fn set_seed(&mut self, id: HeightmapId, seed: i32) -> Result<(), HeightmapError> {
        let mut stack = Vec::new();
        self.seed_inner(id, seed, &mut stack)
    }

    fn seed_inner(
        &mut self,
        id: HeightmapId,
        seed: i32,
        stack: &mut Vec<HeightmapId>,
    ) -> Result<(), HeightmapError> {
        let children = match self.lookup(id)? {
            Heightmap::Multi(multi) => Some(multi.children.clone()),
            _ => None,
        };
        let Some(children) = children else {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
                entry.heightmap.set_seed(seed);
            }
            return Ok(());
        };
        stack.push(id);
        for (index, child) in children.into_iter().enumerate() {
            if stack.contains(&child) {
                return Err(HeightmapError::SelfReference(child));
            }
            self.seed_inner(child, crate::multi_hash!(seed, index), stack)?;
        }
        stack.pop();
        Ok(())
    }

    /// Check that `id` exists and that no multi heightmap below it references an
    /// unknown id or itself. Does not evaluate anything.
    pub fn validate(&self, id: HeightmapId) -> Result<(), HeightmapError> {
        let mut stack = Vec::new();
        self.validate_inner(id, &mut stack)
    }

    fn validate_inner(&self, id: HeightmapId, stack: &mut Vec<HeightmapId>) -> Result<(), HeightmapError> {
        if let Heightmap::Multi(multi) = self.lookup(id)? {
            stack.push(id);
            for &child in &multi.children {
                if stack.contains(&child) {
                    return Err(HeightmapError::SelfReference(child));
                }
                self.validate_inner(child, stack)?;
            }
            stack.pop();
        }
        Ok(())
    }
}
