pub mod chunk_payload;
pub mod packet;

pub use chunk_payload::{BlockEntity, ChunkData, Heightmaps, LightData};
pub use packet::PacketBuffer;
