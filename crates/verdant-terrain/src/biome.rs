//! Biome system: biome definitions, scatter features and the registry that orders them.

mod def;
mod feature;
mod handle;
mod registry;

pub use def::{Biome, BiomeId};
pub use feature::{Feature, FeatureId, MAX_FREQUENCY};
pub use handle::{PrefabHandle, SkyboxHandle, TextureHandle};
pub use registry::BiomeRegistry;
