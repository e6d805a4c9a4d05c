//! Opaque asset handles. The terrain core only carries them through to the host.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! asset_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

asset_handle!(
    /// Ground texture or material painted where a biome dominates.
    TextureHandle
);
asset_handle!(
    /// Sky shown while the player stands in a biome.
    SkyboxHandle
);
asset_handle!(
    /// Object the host instantiates for a feature placement.
    PrefabHandle
);
