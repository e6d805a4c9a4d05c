//! End-to-end generation properties over the public API.

use verdant_terrain::{
    Biome, BiomeMap, BiomeRegistry, ChunkCoord, Feature, Heightmap, HeightmapLibrary, PrefabHandle,
    Terrain, TerrainConfig, dominant_index,
};

fn world(world_seed: &str, weights: [f32; 3]) -> TerrainConfig {
    let mut heightmaps = HeightmapLibrary::new();
    let low = heightmaps.add("low", Heightmap::flat(0.0));
    let mid = heightmaps.add("mid", Heightmap::perlin(10.0, 8.0));
    let high = heightmaps.add("high", Heightmap::flat(500.0));

    let mut biomes = BiomeRegistry::new();
    for (name, hm, weight) in [("low", low, weights[0]), ("mid", mid, weights[1]), ("high", high, weights[2])] {
        biomes.add(
            Biome::new(name)
                .with_heightmap(hm)
                .with_weight(weight)
                .with_feature(Feature::new("marker", 80).with_prefab(PrefabHandle::new(name))),
        );
    }

    TerrainConfig {
        world_seed: world_seed.to_owned(),
        feature_seed: String::from("features"),
        chunk_size: 10.0,
        chunk_resolution: 10,
        biomes_per_chunk: 3,
        biomes,
        heightmaps,
        ..Default::default()
    }
}

#[test]
fn test_same_config_same_terrain() {
    let cfg = world("alpha", [100.0, 100.0, 100.0]);
    let mut a = Terrain::new();
    let mut b = Terrain::new();
    a.generate(&cfg).unwrap();
    b.generate(&cfg).unwrap();
    assert_eq!(a.chunks(), b.chunks());
    assert_eq!(a.placements(), b.placements());
}

#[test]
fn test_world_seed_changes_terrain() {
    let mut a = Terrain::new();
    let mut b = Terrain::new();
    a.generate(&world("alpha", [100.0, 100.0, 100.0])).unwrap();
    b.generate(&world("beta", [100.0, 100.0, 100.0])).unwrap();
    assert_ne!(a.chunks(), b.chunks());
}

#[test]
fn test_regeneration_replaces_state() {
    let mut terrain = Terrain::new();
    let mut cfg = world("alpha", [100.0, 100.0, 100.0]);
    terrain.generate(&cfg).unwrap();
    cfg.grid_radius = 0;
    terrain.generate(&cfg).unwrap();
    assert_eq!(terrain.chunks().len(), 1);
    assert!(
        terrain
            .placements()
            .iter()
            .all(|p| p.chunk == ChunkCoord::new(0, 0)),
        "Placements from the previous run must be gone"
    );
}

#[test]
fn test_zero_weight_biome_absent_everywhere() {
    let mut terrain = Terrain::new();
    terrain.generate(&world("gamma", [100.0, 100.0, 0.0])).unwrap();
    for chunk in terrain.chunks() {
        for vertex in 0..chunk.mesh.vertex_count() {
            assert_ne!(chunk.dominant_biome(vertex), 2);
            assert!(chunk.mesh.positions[vertex][1] < 100.0, "The 500-high biome leaked in");
        }
    }
    assert!(terrain.placements().iter().all(|p| p.prefab.as_str() != "high"));
}

#[test]
fn test_heavier_biome_dominates_in_proportion() {
    // Weight 100 against weight 1 should leave the light biome dominant at roughly
    // one point in a hundred. Its regions shrink slightly where several heavy seeds
    // add up, so the ratio lands a little above 100.
    const SIZE: f32 = 10.0;
    const STEPS: usize = 8;
    let coord = |k: usize| (k as f32 + 0.5) * SIZE / STEPS as f32 - SIZE / 2.0;
    let mut counts = [0u64; 2];
    let mut weights = vec![0.0; 2];
    for world_seed in 0..20_000 {
        let map = BiomeMap::new(world_seed, 0, 0, SIZE, &[100.0, 1.0], 3).unwrap();
        for j in 0..STEPS {
            for i in 0..STEPS {
                map.sample_into(coord(i), coord(j), &mut weights).unwrap();
                counts[dominant_index(&weights)] += 1;
            }
        }
    }
    assert!(counts[1] > 0, "The light biome must dominate somewhere: {counts:?}");
    let ratio = counts[0] as f64 / counts[1] as f64;
    assert!(
        (90.0..=250.0).contains(&ratio),
        "Expected roughly 100:1 dominance, got {counts:?} ({ratio:.1}:1)"
    );
}

#[test]
fn test_chunk_borders_are_seamless() {
    let mut terrain = Terrain::new();
    terrain.generate(&world("delta", [100.0, 100.0, 100.0])).unwrap();
    let last = 9;
    for chunk in terrain.chunks() {
        let Some(east) = terrain.chunk(ChunkCoord::new(chunk.coord.x + 1, chunk.coord.z)) else {
            continue;
        };
        for k in 0..=last {
            assert_eq!(chunk.mesh.height(last, k), east.mesh.height(0, k));
            let a = chunk.world_position(chunk.mesh.vertex_index(last, k));
            let b = east.world_position(east.mesh.vertex_index(0, k));
            assert!((a - b).length() < 1e-4, "Border vertices must coincide: {a} vs {b}");
        }
    }
}

#[test]
fn test_player_biome_matches_vertex_data() {
    let mut terrain = Terrain::new();
    terrain.generate(&world("epsilon", [100.0, 100.0, 100.0])).unwrap();
    for chunk in terrain.chunks() {
        // Interior vertices only: border vertices also belong to the neighbour.
        for vertex in [11, 23, 45, 88] {
            let position = chunk.world_position(vertex);
            let biome = terrain.sample_player_biome(position).expect("inside the grid");
            assert_eq!(biome.id(), terrain.biomes()[chunk.dominant_biome(vertex)].id());
        }
    }
}
