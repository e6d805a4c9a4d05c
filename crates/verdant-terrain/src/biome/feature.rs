//! Scatter feature definition: what a biome may spawn on its vertices and how often.

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};

use super::PrefabHandle;

/// Highest feature frequency; larger values are clamped.
pub const MAX_FREQUENCY: u32 = 100;

/// Identifier of a feature, unique within its biome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub u32);

/// A decorative object a biome scatters over its surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub(super) id: FeatureId,
    pub name: String,
    #[serde(deserialize_with = "clamped_frequency")]
    frequency: u32,
    #[serde(deserialize_with = "non_negative_scale")]
    scale: Vec3,
    /// Align the prefab's up axis with the surface normal instead of a random yaw.
    pub set_normal: bool,
    pub prefab: Option<PrefabHandle>,
}

impl Default for Feature {
    fn default() -> Self {
        Self {
            id: FeatureId::default(),
            name: String::new(),
            frequency: 0,
            scale: Vec3::ONE,
            set_normal: false,
            prefab: None,
        }
    }
}

impl Feature {
    pub fn new(name: impl Into<String>, frequency: u32) -> Self {
        Self {
            name: name.into(),
            frequency: frequency.min(MAX_FREQUENCY),
            ..Default::default()
        }
    }

    pub fn with_prefab(mut self, prefab: PrefabHandle) -> Self {
        self.prefab = Some(prefab);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn aligned_to_normal(mut self) -> Self {
        self.set_normal = true;
        self
    }

    /// Assigned by the owning biome when the feature is added.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Spawn frequency in `0..=100`. Zero never spawns.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: u32) {
        self.frequency = frequency.min(MAX_FREQUENCY);
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Negative components are clamped to zero.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale.max(Vec3::ZERO);
    }
}

fn clamped_frequency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(MAX_FREQUENCY)) as u32)
}

fn non_negative_scale<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
    Ok(Vec3::deserialize(deserializer)?.max(Vec3::ZERO))
}
