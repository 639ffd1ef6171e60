use log::{debug, warn};
use std::io;
use strata_protocol::PacketBuffer;

/// Palette strategy parameters for one container use-site. Fixed constants,
/// never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerKind {
    pub entry_count: usize,
    pub min_indirect_bits: u8,
    pub max_indirect_bits: u8,
    pub direct_bits: u8,
}

/// 16x16x16 block-state volumes.
pub const BLOCK_STATES: ContainerKind = ContainerKind {
    entry_count: 4096,
    min_indirect_bits: 4,
    max_indirect_bits: 8,
    direct_bits: 15,
};

/// 4x4x4 biome volumes.
pub const BIOMES: ContainerKind = ContainerKind {
    entry_count: 64,
    min_indirect_bits: 1,
    max_indirect_bits: 3,
    direct_bits: 6,
};

/// Fixed-length array of block-state or biome ids packed into 64-bit words,
/// with an optional palette indirection layer.
///
/// Storage runs through three modes, promoted only by [`set`](Self::set) and
/// never demoted:
///   - single-value: every entry shares one id, no backing array
///   - indirect: packed entries index into a palette of ids
///   - direct: packed entries are the ids themselves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalettedContainer {
    kind: ContainerKind,
    storage: Storage,
}

/// One variant per storage mode, each carrying only the fields that mode
/// actually uses.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Storage {
    Single {
        value: i32,
    },
    Indirect {
        bits: u8,
        palette: Vec<i32>,
        data: Vec<u64>,
    },
    Direct {
        data: Vec<u64>,
    },
}

/// Words needed to pack `entry_count` entries at the given width. Entries
/// never span a word boundary, so each word holds `64 / bits` entries.
fn packed_len(bits: u8, entry_count: usize) -> usize {
    let entries_per_word = 64 / bits as usize;
    entry_count.div_ceil(entries_per_word)
}

fn packed_get(data: &[u64], bits: u8, index: usize) -> u64 {
    let entries_per_word = 64 / bits as usize;
    let word = index / entries_per_word;
    let offset = (index % entries_per_word) * bits as usize;
    (data[word] >> offset) & ((1u64 << bits) - 1)
}

fn packed_set(data: &mut [u64], bits: u8, index: usize, value: u64) {
    let entries_per_word = 64 / bits as usize;
    let word = index / entries_per_word;
    let offset = (index % entries_per_word) * bits as usize;
    let mask = (1u64 << bits) - 1;
    data[word] &= !(mask << offset);
    data[word] |= (value & mask) << offset;
}

impl PalettedContainer {
    /// Creates a container where every entry holds `value`. This is the
    /// initial state of every container.
    pub fn single_value(kind: ContainerKind, value: i32) -> Self {
        Self {
            kind,
            storage: Storage::Single { value },
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Current packing width: 0 in single-value mode, the indirect width in
    /// indirect mode, `direct_bits` in direct mode.
    pub fn bits_per_entry(&self) -> u8 {
        match &self.storage {
            Storage::Single { .. } => 0,
            Storage::Indirect { bits, .. } => *bits,
            Storage::Direct { .. } => self.kind.direct_bits,
        }
    }

    /// Side length of the cubic volume: 16 for blocks, 4 for biomes.
    fn side_len(&self) -> usize {
        1 << (self.kind.entry_count.trailing_zeros() / 3)
    }

    fn flat_index(&self, x: usize, y: usize, z: usize) -> usize {
        let side = self.side_len();
        (y * side + z) * side + x
    }

    /// Returns the id at the given flat index. A packed palette index that
    /// somehow exceeds the palette reads as id 0 rather than faulting.
    pub fn get(&self, index: usize) -> i32 {
        match &self.storage {
            Storage::Single { value } => *value,
            Storage::Indirect {
                bits,
                palette,
                data,
            } => {
                let raw = packed_get(data, *bits, index) as usize;
                palette.get(raw).copied().unwrap_or(0)
            }
            Storage::Direct { data } => packed_get(data, self.kind.direct_bits, index) as i32,
        }
    }

    pub fn get_xyz(&self, x: usize, y: usize, z: usize) -> i32 {
        self.get(self.flat_index(x, y, z))
    }

    /// Sets the id at the given flat index, promoting the storage mode as
    /// needed to make room.
    pub fn set(&mut self, index: usize, value: i32) {
        // promote ahead of the write so every arm below has room
        match &self.storage {
            Storage::Single { value: current } if *current != value => {
                self.expand_from_single();
            }
            Storage::Indirect { bits, palette, .. }
                if !palette.contains(&value) && palette.len() == 1 << *bits =>
            {
                self.grow();
            }
            _ => {}
        }

        match &mut self.storage {
            Storage::Single { .. } => {} // value already present everywhere
            Storage::Indirect {
                bits,
                palette,
                data,
            } => {
                let palette_index = match palette.iter().position(|&id| id == value) {
                    Some(i) => i,
                    None => {
                        palette.push(value);
                        palette.len() - 1
                    }
                };
                packed_set(data, *bits, index, palette_index as u64);
            }
            Storage::Direct { data } => {
                packed_set(data, self.kind.direct_bits, index, value as u64);
            }
        }
    }

    pub fn set_xyz(&mut self, x: usize, y: usize, z: usize, value: i32) {
        self.set(self.flat_index(x, y, z), value)
    }

    /// Single-value to indirect at the minimum width. The old value lands at
    /// palette index 0, so the zeroed packed array already describes every
    /// existing entry.
    fn expand_from_single(&mut self) {
        let Storage::Single { value } = self.storage else {
            return;
        };
        let bits = self.kind.min_indirect_bits;
        self.storage = Storage::Indirect {
            bits,
            palette: vec![value],
            data: vec![0; packed_len(bits, self.kind.entry_count)],
        };
    }

    /// Widens a full indirect palette by one bit, or switches to direct
    /// storage once the indirect maximum is exceeded.
    fn grow(&mut self) {
        let Storage::Indirect {
            bits,
            palette,
            data,
        } = &self.storage
        else {
            return;
        };
        let entry_count = self.kind.entry_count;

        if bits + 1 > self.kind.max_indirect_bits {
            debug!(
                "palette full at {} bits, promoting container to direct storage",
                bits
            );
            let direct_bits = self.kind.direct_bits;
            let mut new_data = vec![0u64; packed_len(direct_bits, entry_count)];
            for i in 0..entry_count {
                let raw = packed_get(data, *bits, i) as usize;
                let id = palette.get(raw).copied().unwrap_or(0);
                packed_set(&mut new_data, direct_bits, i, id as u64);
            }
            self.storage = Storage::Direct { data: new_data };
        } else {
            let new_bits = bits + 1;
            let mut new_data = vec![0u64; packed_len(new_bits, entry_count)];
            for i in 0..entry_count {
                packed_set(&mut new_data, new_bits, i, packed_get(data, *bits, i));
            }
            self.storage = Storage::Indirect {
                bits: new_bits,
                palette: palette.clone(),
                data: new_data,
            };
        }
    }

    /// Reads a container from the buffer.
    ///
    /// Wire format: one byte of bits-per-entry, then for single-value a lone
    /// VarInt, for indirect a VarInt-prefixed VarInt palette, then (in both
    /// packed modes) the fixed-size big-endian word array with no length
    /// prefix — its length is derived from the kind and the effective width.
    pub fn decode(kind: ContainerKind, buf: &mut PacketBuffer) -> io::Result<Self> {
        let transmitted = buf.read_u8()?;

        if transmitted == 0 {
            let value = buf.read_varint()?;
            return Ok(Self::single_value(kind, value));
        }

        let storage = if transmitted <= kind.max_indirect_bits {
            let bits = transmitted.max(kind.min_indirect_bits);
            if bits != transmitted {
                warn!(
                    "palette width {} below container minimum, clamping to {}",
                    transmitted, bits
                );
            }

            let palette_len = buf.read_varint()?;
            if palette_len < 0 || palette_len as u64 > 1 << bits {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "palette length {} does not fit {} bits per entry",
                        palette_len, bits
                    ),
                ));
            }
            let mut palette = Vec::with_capacity(palette_len as usize);
            for _ in 0..palette_len {
                palette.push(buf.read_varint()?);
            }

            Storage::Indirect {
                bits,
                palette,
                data: read_packed_words(buf, bits, kind.entry_count)?,
            }
        } else {
            Storage::Direct {
                data: read_packed_words(buf, kind.direct_bits, kind.entry_count)?,
            }
        };

        Ok(Self { kind, storage })
    }

    /// Writes the container in the wire format `decode` reads. Encoding is
    /// canonical: re-encoding a decoded container reproduces its bytes.
    pub fn encode(&self, buf: &mut PacketBuffer) -> io::Result<()> {
        match &self.storage {
            Storage::Single { value } => {
                buf.write_u8(0);
                buf.write_varint(*value);
            }
            Storage::Indirect {
                bits,
                palette,
                data,
            } => {
                buf.write_u8(*bits);
                buf.write_varint(palette.len() as i32);
                for &id in palette {
                    buf.write_varint(id);
                }
                for &word in data {
                    buf.write_i64(word as i64);
                }
            }
            Storage::Direct { data } => {
                buf.write_u8(self.kind.direct_bits);
                for &word in data {
                    buf.write_i64(word as i64);
                }
            }
        }
        Ok(())
    }
}

fn read_packed_words(buf: &mut PacketBuffer, bits: u8, entry_count: usize) -> io::Result<Vec<u64>> {
    let len = packed_len(bits, entry_count);
    let mut data = Vec::with_capacity(len);
    for i in 0..len {
        let word = buf.read_i64().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("reading packed word {}/{}: {}", i, len, e),
            )
        })?;
        data.push(word as u64);
    }
    Ok(data)
}
