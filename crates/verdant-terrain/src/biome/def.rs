//! Biome definition: heightmap, materials, spawn weight and scatter features.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Feature, FeatureId, SkyboxHandle, TextureHandle};
use crate::heightmap::HeightmapId;

/// Stable biome identifier, assigned by the [`BiomeRegistry`](super::BiomeRegistry).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BiomeId(pub u32);

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything needed to build and dress one kind of terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Biome {
    pub(super) id: BiomeId,
    pub name: String,
    heightmap: Option<HeightmapId>,
    texture: Option<TextureHandle>,
    skybox: Option<SkyboxHandle>,
    /// Relative likelihood of a Voronoi seed picking this biome. Zero means never.
    pub frequency_weight: f32,
    features: Vec<Feature>,
    next_feature_id: u32,
}

impl Default for Biome {
    fn default() -> Self {
        Self {
            id: BiomeId::default(),
            name: String::from("New Biome"),
            heightmap: None,
            texture: None,
            skybox: None,
            frequency_weight: 100.0,
            features: Vec::new(),
            next_feature_id: 0,
        }
    }
}

impl Biome {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_heightmap(mut self, heightmap: HeightmapId) -> Self {
        self.heightmap = Some(heightmap);
        self
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_skybox(mut self, skybox: SkyboxHandle) -> Self {
        self.skybox = Some(skybox);
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.frequency_weight = weight;
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.add_feature(feature);
        self
    }

    pub fn id(&self) -> BiomeId {
        self.id
    }

    /// Heightmap driving this biome's surface. Logs an error when unassigned.
    pub fn heightmap(&self) -> Option<HeightmapId> {
        if self.heightmap.is_none() {
            log::error!("Biome '{}' has no heightmap assigned", self.name);
        }
        self.heightmap
    }

    pub fn has_heightmap(&self) -> bool {
        self.heightmap.is_some()
    }

    pub fn set_heightmap(&mut self, heightmap: Option<HeightmapId>) {
        self.heightmap = heightmap;
    }

    /// Ground texture. Logs an error when unassigned.
    pub fn texture(&self) -> Option<&TextureHandle> {
        if self.texture.is_none() {
            log::error!("Biome '{}' has no texture assigned", self.name);
        }
        self.texture.as_ref()
    }

    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.texture = texture;
    }

    /// Skybox. Logs an error when unassigned.
    pub fn skybox(&self) -> Option<&SkyboxHandle> {
        if self.skybox.is_none() {
            log::error!("Biome '{}' has no skybox assigned", self.name);
        }
        self.skybox.as_ref()
    }

    pub fn set_skybox(&mut self, skybox: Option<SkyboxHandle>) {
        self.skybox = skybox;
    }

    // -- Features -----------------------------------------------------------

    /// Append a feature and return the id it was given.
    pub fn add_feature(&mut self, mut feature: Feature) -> FeatureId {
        let id = FeatureId(self.next_feature_id);
        self.next_feature_id += 1;
        feature.id = id;
        self.features.push(feature);
        id
    }

    /// Remove a feature. Unknown ids are a logged no-op.
    pub fn delete_feature(&mut self, id: FeatureId) -> Option<Feature> {
        match self.features.iter().position(|f| f.id == id) {
            Some(index) => Some(self.features.remove(index)),
            None => {
                log::warn!("Biome '{}': cannot delete feature {}: not found", self.name, id.0);
                None
            }
        }
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        let found = self.features.iter().find(|f| f.id == id);
        if found.is_none() {
            log::warn!("Biome '{}': feature {} not found", self.name, id.0);
        }
        found
    }

    pub fn feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        let name = &self.name;
        let found = self.features.iter_mut().find(|f| f.id == id);
        if found.is_none() {
            log::warn!("Biome '{name}': feature {} not found", id.0);
        }
        found
    }

    /// Features in insertion order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Replace the whole feature list. Every feature receives a fresh id.
    pub fn set_features(&mut self, features: impl IntoIterator<Item = Feature>) {
        self.features.clear();
        for feature in features {
            self.add_feature(feature);
        }
    }

    /// Features in ascending frequency order; equal frequencies keep insertion order.
    pub fn sorted_features(&self) -> Vec<&Feature> {
        let mut sorted: Vec<&Feature> = self.features.iter().collect();
        sorted.sort_by_key(|f| f.frequency());
        sorted
    }
}
