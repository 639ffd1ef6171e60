use crate::container::{PalettedContainer, BIOMES, BLOCK_STATES};
use std::io;
use strata_protocol::PacketBuffer;

/// One 16x16x16 cube of block states plus its 4x4x4 biome grid.
///
/// `block_count` is the number of non-air block-state entries. It is
/// maintained by whatever mutates the section, not recomputed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSection {
    pub block_count: i16,
    pub block_states: PalettedContainer,
    pub biomes: PalettedContainer,
}

impl ChunkSection {
    /// All air, biome 0.
    pub fn empty() -> Self {
        Self {
            block_count: 0,
            block_states: PalettedContainer::single_value(BLOCK_STATES, 0),
            biomes: PalettedContainer::single_value(BIOMES, 0),
        }
    }

    /// Block state at local coordinates, 0-15 each.
    pub fn get_block_state(&self, x: usize, y: usize, z: usize) -> i32 {
        self.block_states.get_xyz(x, y, z)
    }

    pub fn set_block_state(&mut self, x: usize, y: usize, z: usize, state_id: i32) {
        self.block_states.set_xyz(x, y, z, state_id)
    }

    /// Biome at local biome coordinates, 0-3 each.
    pub fn get_biome(&self, x: usize, y: usize, z: usize) -> i32 {
        self.biomes.get_xyz(x, y, z)
    }

    pub fn set_biome(&mut self, x: usize, y: usize, z: usize, biome_id: i32) {
        self.biomes.set_xyz(x, y, z, biome_id)
    }

    /// Reads block count, block states, then biomes, in that order.
    pub fn decode(buf: &mut PacketBuffer) -> io::Result<Self> {
        Ok(Self {
            block_count: buf.read_i16()?,
            block_states: PalettedContainer::decode(BLOCK_STATES, buf)?,
            biomes: PalettedContainer::decode(BIOMES, buf)?,
        })
    }

    pub fn encode(&self, buf: &mut PacketBuffer) -> io::Result<()> {
        buf.write_i16(self.block_count);
        self.block_states.encode(buf)?;
        self.biomes.encode(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_section() {
        let section = ChunkSection::empty();
        assert_eq!(section.block_count, 0);
        assert_eq!(section.get_block_state(8, 8, 8), 0);
        assert_eq!(section.get_biome(2, 2, 2), 0);
    }

    #[test]
    fn test_decode_encode_round_trip() {
        let mut section = ChunkSection::empty();
        section.block_count = 2;
        section.set_block_state(0, 0, 0, 1);
        section.set_block_state(1, 0, 0, 2);
        section.set_biome(0, 0, 0, 5);

        let mut buf = PacketBuffer::new();
        section.encode(&mut buf).unwrap();
        let bytes = buf.into_bytes();

        let mut read = PacketBuffer::from_bytes(bytes.clone());
        let decoded = ChunkSection::decode(&mut read).unwrap();
        assert_eq!(read.remaining(), 0);

        assert_eq!(decoded.block_count, 2);
        assert_eq!(decoded.get_block_state(0, 0, 0), 1);
        assert_eq!(decoded.get_block_state(1, 0, 0), 2);
        assert_eq!(decoded.get_block_state(5, 5, 5), 0);
        assert_eq!(decoded.get_biome(0, 0, 0), 5);

        let mut out = PacketBuffer::new();
        decoded.encode(&mut out).unwrap();
        assert_eq!(out.bytes(), &bytes[..]);
    }

    #[test]
    fn test_decode_truncated() {
        let mut buf = PacketBuffer::from_bytes(vec![0, 2]); // count only, then EOF
        assert!(ChunkSection::decode(&mut buf).is_err());
    }
}
