//! Bit codecs for the incremental "section blocks update" packet: a packed
//! section position plus one packed long per changed block.

/// Unpacks a section position: X in the top 22 bits, Z in the next 22, Y in
/// the low 20, each field independently sign-extended. Rust's `>>` on `i64`
/// is arithmetic, which is what the shift pairs rely on.
pub fn decode_section_position(packed: i64) -> (i32, i32, i32) {
    let x = (packed >> 42) as i32;
    let z = ((packed << 22) >> 42) as i32;
    let y = ((packed << 44) >> 44) as i32;
    (x, y, z)
}

/// Packs a section position in the layout `decode_section_position` reads.
pub fn encode_section_position(x: i32, y: i32, z: i32) -> i64 {
    ((x as i64 & 0x3FFFFF) << 42) | ((z as i64 & 0x3FFFFF) << 20) | (y as i64 & 0xFFFFF)
}

/// Unpacks one block update entry: state id at bits 12 and up, then local
/// X at bits 8-11, Z at 4-7, Y at 0-3. The X/Z/Y bit order is fixed by the
/// wire format and does not follow the flat-index order used elsewhere.
pub fn decode_block_entry(entry: i64) -> (i32, u8, u8, u8) {
    let state_id = (entry >> 12) as i32;
    let pos = (entry & 0xFFF) as u16;
    let local_x = ((pos >> 8) & 0xF) as u8;
    let local_z = ((pos >> 4) & 0xF) as u8;
    let local_y = (pos & 0xF) as u8;
    (state_id, local_x, local_y, local_z)
}

/// Packs one block update entry in the layout `decode_block_entry` reads.
pub fn encode_block_entry(state_id: i32, local_x: u8, local_y: u8, local_z: u8) -> i64 {
    ((state_id as i64) << 12)
        | (((local_x & 0xF) as i64) << 8)
        | (((local_z & 0xF) as i64) << 4)
        | ((local_y & 0xF) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_section_position() {
        let packed = (3i64 << 42) | (5i64 << 20) | 0xFFFFF;
        assert_eq!(decode_section_position(packed), (3, -1, 5));
    }

    #[test]
    fn test_decode_section_position_negative_x_z() {
        let packed = ((-2i64 & 0x3FFFFF) << 42) | ((-4i64 & 0x3FFFFF) << 20) | 3;
        assert_eq!(decode_section_position(packed), (-2, 3, -4));
    }

    #[test]
    fn test_section_position_round_trip() {
        for &(x, y, z) in &[(0, 0, 0), (3, -1, 5), (-2000000, 100, 1999999), (-1, -1, -1)] {
            let packed = encode_section_position(x, y, z);
            assert_eq!(decode_section_position(packed), (x, y, z));
        }
    }

    #[test]
    fn test_decode_block_entry() {
        let entry = (42i64 << 12) | (3 << 8) | (7 << 4) | 12;
        assert_eq!(decode_block_entry(entry), (42, 3, 12, 7));
    }

    #[test]
    fn test_block_entry_round_trip() {
        for &(state_id, x, y, z) in &[(0, 0, 0, 0), (42, 3, 12, 7), (24101, 15, 15, 15)] {
            let entry = encode_block_entry(state_id, x, y, z);
            assert_eq!(decode_block_entry(entry), (state_id, x, y, z));
        }
    }
}
