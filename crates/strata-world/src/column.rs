use crate::section::ChunkSection;
use std::io;
use strata_protocol::{BlockEntity, ChunkData, Heightmaps, LightData, PacketBuffer};

/// Vertical sections per chunk column (world Y -64 to 319).
pub const SECTION_COUNT: usize = 24;
/// Lowest world Y coordinate.
pub const MIN_Y: i32 = -64;
/// One past the highest world Y coordinate.
pub const MAX_Y: i32 = MIN_Y + (SECTION_COUNT as i32) * 16;

/// Section array index for a world Y coordinate, or `-1` outside the world
/// height.
pub fn section_index(world_y: i32) -> i32 {
    let index = (world_y - MIN_Y) >> 4;
    if index < 0 || index >= SECTION_COUNT as i32 {
        return -1;
    }
    index
}

/// Local 0-15 coordinates within a section.
pub fn local_coords(world_x: i32, world_y: i32, world_z: i32) -> (usize, usize, usize) {
    (
        (world_x & 0xF) as usize,
        (world_y & 0xF) as usize,
        (world_z & 0xF) as usize,
    )
}

/// Chunk coordinates for world X/Z. Arithmetic shift, so negative
/// coordinates floor toward the correct chunk.
pub fn chunk_pos(world_x: i32, world_z: i32) -> (i32, i32) {
    (world_x >> 4, world_z >> 4)
}

/// The full vertical stack of sections at one horizontal chunk position,
/// along with the auxiliary payloads carried through unmodified.
///
/// An absent section reads as all air with biome 0 and is only materialized
/// when written to.
#[derive(Debug, Clone)]
pub struct ChunkColumn {
    pub x: i32,
    pub z: i32,
    pub sections: [Option<ChunkSection>; SECTION_COUNT],
    pub heightmaps: Heightmaps,
    pub block_entities: Vec<BlockEntity>,
    pub light: Option<LightData>,
}

impl ChunkColumn {
    pub fn new(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            sections: std::array::from_fn(|_| None),
            heightmaps: Heightmaps::new(),
            block_entities: Vec::new(),
            light: None,
        }
    }

    /// Decodes a column from the terrain portion of a chunk data packet:
    /// exactly `SECTION_COUNT` sections back-to-back, no delimiters. The
    /// heightmaps, block entities and light data ride along untouched.
    pub fn parse(x: i32, z: i32, data: ChunkData, light: Option<LightData>) -> io::Result<Self> {
        let mut column = Self::new(x, z);
        column.heightmaps = data.heightmaps;
        column.block_entities = data.block_entities;
        column.light = light;

        let mut buf = PacketBuffer::from_bytes(data.data);
        for slot in column.sections.iter_mut() {
            *slot = Some(ChunkSection::decode(&mut buf)?);
        }
        Ok(column)
    }

    /// Encodes all sections back to raw bytes, substituting an empty section
    /// for every absent slot.
    pub fn encode_sections(&self) -> io::Result<Vec<u8>> {
        let mut buf = PacketBuffer::new();
        let empty = ChunkSection::empty();
        for slot in &self.sections {
            slot.as_ref().unwrap_or(&empty).encode(&mut buf)?;
        }
        Ok(buf.into_bytes())
    }

    /// Block state at absolute world coordinates. 0 (air) for out-of-range Y
    /// or an absent section.
    pub fn get_block_state(&self, x: i32, y: i32, z: i32) -> i32 {
        let index = section_index(y);
        if index < 0 {
            return 0;
        }
        let Some(section) = &self.sections[index as usize] else {
            return 0;
        };
        let (lx, ly, lz) = local_coords(x, y, z);
        section.get_block_state(lx, ly, lz)
    }

    /// Sets the block state at absolute world coordinates, materializing an
    /// empty section on first write. Out-of-range Y is a no-op.
    pub fn set_block_state(&mut self, x: i32, y: i32, z: i32, state_id: i32) {
        let index = section_index(y);
        if index < 0 {
            return;
        }
        let section = self.sections[index as usize].get_or_insert_with(ChunkSection::empty);
        let (lx, ly, lz) = local_coords(x, y, z);
        section.set_block_state(lx, ly, lz, state_id);
    }

    /// Biome at absolute world coordinates. Biome cells are 4x4x4 blocks.
    pub fn get_biome(&self, x: i32, y: i32, z: i32) -> i32 {
        let index = section_index(y);
        if index < 0 {
            return 0;
        }
        let Some(section) = &self.sections[index as usize] else {
            return 0;
        };
        let (lx, ly, lz) = local_coords(x, y, z);
        section.get_biome(lx / 4, ly / 4, lz / 4)
    }

    pub fn set_biome(&mut self, x: i32, y: i32, z: i32, biome_id: i32) {
        let index = section_index(y);
        if index < 0 {
            return;
        }
        let section = self.sections[index as usize].get_or_insert_with(ChunkSection::empty);
        let (lx, ly, lz) = local_coords(x, y, z);
        section.set_biome(lx / 4, ly / 4, lz / 4, biome_id);
    }
}
