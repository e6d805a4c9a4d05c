//! Shared lattice tables for the gradient-noise heightmaps.

/// Fixed 256-entry permutation. Seeding offsets the sample position instead of
/// reshuffling this table.
const BASE: [u8; 256] = [
    241, 126, 133, 49, 234, 73, 255, 200, 112, 99, 249, 217, 135, 219, 31, 89,
    115, 141, 170, 218, 230, 172, 164, 106, 15, 254, 181, 169, 157, 26, 41, 144,
    119, 224, 229, 44, 113, 187, 18, 110, 12, 5, 72, 250, 62, 45, 235, 225,
    252, 70, 60, 174, 69, 248, 27, 88, 56, 28, 128, 76, 153, 121, 0, 194,
    107, 177, 147, 57, 54, 102, 64, 38, 37, 207, 152, 226, 140, 186, 94, 65,
    145, 237, 82, 117, 6, 208, 32, 17, 136, 47, 2, 7, 201, 4, 75, 29,
    210, 191, 199, 118, 167, 246, 221, 184, 114, 139, 155, 173, 55, 231, 222, 59,
    196, 91, 178, 148, 183, 158, 216, 195, 166, 137, 125, 90, 42, 213, 202, 236,
    232, 215, 190, 192, 233, 101, 3, 98, 179, 242, 79, 180, 168, 40, 120, 46,
    24, 111, 51, 161, 228, 103, 212, 205, 159, 116, 77, 67, 10, 86, 209, 165,
    214, 63, 16, 220, 104, 150, 22, 227, 34, 134, 154, 129, 1, 14, 253, 244,
    81, 240, 33, 124, 146, 61, 43, 53, 35, 239, 80, 162, 21, 100, 95, 211,
    68, 23, 83, 11, 48, 243, 132, 176, 198, 50, 58, 84, 223, 30, 127, 19,
    175, 185, 109, 247, 93, 25, 188, 206, 193, 149, 74, 8, 189, 197, 142, 163,
    36, 108, 171, 245, 97, 130, 251, 105, 138, 78, 9, 92, 87, 238, 156, 71,
    204, 52, 143, 96, 160, 39, 85, 123, 66, 122, 203, 20, 131, 13, 182, 151,
];

/// [`BASE`] repeated twice so lattice lookups never need to wrap.
pub(super) const PERMUTATION: [u8; 512] = {
    let mut table = [0u8; 512];
    let mut i = 0;
    while i < 512 {
        table[i] = BASE[i & 255];
        i += 1;
    }
    table
};

/// `(x, z)` components of the twelve classic gradient directions.
pub(super) const GRADIENTS: [[f32; 2]; 12] = [
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [0.0, 1.0],
    [0.0, -1.0],
];

/// Dot product of gradient `hash % 12` with the offset `(x, z)`.
#[inline]
pub(super) fn gradient_dot(hash: u8, x: f32, z: f32) -> f32 {
    let g = GRADIENTS[(hash % 12) as usize];
    g[0] * x + g[1] * z
}

/// Derive the sample-space offset a seed applies to a noise heightmap.
pub(super) fn seed_offsets(seed: i32) -> (f32, f32) {
    let x = crate::multi_hash!(seed, 0) % 100_000;
    let z = crate::multi_hash!(seed, 1) % 100_000;
    (x as f32, z as f32)
}
