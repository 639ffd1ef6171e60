//! In-memory terrain model and its wire codecs: the block-state registry,
//! the paletted container packing scheme, chunk sections/columns, and the
//! bit codecs for incremental block-update packets.

pub mod block_state;
pub mod column;
pub mod container;
pub mod section;
pub mod updates;

pub use block_state::{BlockRegistry, BlockStateDefinition, PropertyDefinition};
pub use column::{ChunkColumn, MAX_Y, MIN_Y, SECTION_COUNT};
pub use container::{ContainerKind, PalettedContainer, BIOMES, BLOCK_STATES};
pub use section::ChunkSection;
