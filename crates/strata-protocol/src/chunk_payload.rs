use std::collections::HashMap;

/// Packed heightmap longs keyed by heightmap kind id. Carried through the
/// chunk column without interpretation.
pub type Heightmaps = HashMap<i32, Vec<i64>>;

/// A block entity entry from the chunk data packet. The NBT payload stays an
/// opaque blob at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntity {
    /// Local X in the high nibble, local Z in the low nibble.
    pub packed_xz: u8,
    pub y: i16,
    pub kind: i32,
    pub data: Vec<u8>,
}

/// The terrain portion of a chunk data packet: section bytes plus the
/// auxiliary payloads owned by adjacent layers.
#[derive(Debug, Clone, Default)]
pub struct ChunkData {
    pub heightmaps: Heightmaps,
    /// Back-to-back encoded chunk sections.
    pub data: Vec<u8>,
    pub block_entities: Vec<BlockEntity>,
}

/// Light arrays and masks for one chunk column. Each present light array is
/// 2048 half-byte-packed values.
#[derive(Debug, Clone, Default)]
pub struct LightData {
    pub sky_light_mask: Vec<i64>,
    pub block_light_mask: Vec<i64>,
    pub empty_sky_light_mask: Vec<i64>,
    pub empty_block_light_mask: Vec<i64>,
    pub sky_light: Vec<Vec<u8>>,
    pub block_light: Vec<Vec<u8>>,
}
