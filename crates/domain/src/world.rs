//! In-memory island world: a sparse set of block chunks around the origin.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Horizontal edge length of a chunk, in blocks.
pub const CHUNK_EDGE: usize = 16;
/// Vertical extent of a chunk, in blocks.
pub const CHUNK_HEIGHT: usize = 32;
/// Number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_EDGE * CHUNK_EDGE * CHUNK_HEIGHT;

/// Block id for air.
pub const AIR: u16 = 0;

/// Chunk column coordinate (chunk units, not blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const ORIGIN: ChunkPos = ChunkPos { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given block column.
    pub fn containing(block_x: i32, block_z: i32) -> Self {
        let edge = CHUNK_EDGE as i32;
        Self {
            x: block_x.div_euclid(edge),
            z: block_z.div_euclid(edge),
        }
    }

    /// Chebyshev distance to the origin chunk (a square radius).
    pub fn distance_from_origin(&self) -> u32 {
        self.x.unsigned_abs().max(self.z.unsigned_abs())
    }
}

/// Block storage for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkBlocks {
    Empty,
    Uniform(u16),
    Dense(Vec<u16>),
}

impl ChunkBlocks {
    fn get(&self, index: usize) -> u16 {
        match self {
            Self::Empty => AIR,
            Self::Uniform(block) => *block,
            Self::Dense(blocks) => blocks.get(index).copied().unwrap_or(AIR),
        }
    }
}

/// A 16x32x16 column of blocks.
///
/// A dense payload always holds exactly [`CHUNK_VOLUME`] blocks; the only way
/// to build one is [`Chunk::from_dense`] or densifying through `set_block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pos: ChunkPos,
    blocks: ChunkBlocks,
}

impl Chunk {
    pub fn empty(pos: ChunkPos) -> Self {
        Self {
            pos,
            blocks: ChunkBlocks::Empty,
        }
    }

    pub fn uniform(pos: ChunkPos, block: u16) -> Self {
        let blocks = if block == AIR {
            ChunkBlocks::Empty
        } else {
            ChunkBlocks::Uniform(block)
        };
        Self { pos, blocks }
    }

    /// Build a chunk from a full dense block array.
    pub fn from_dense(pos: ChunkPos, blocks: Vec<u16>) -> Result<Self, DomainError> {
        if blocks.len() != CHUNK_VOLUME {
            return Err(DomainError::validation(format!(
                "dense chunk needs {} blocks, got {}",
                CHUNK_VOLUME,
                blocks.len()
            )));
        }
        Ok(Self {
            pos,
            blocks: ChunkBlocks::Dense(blocks),
        })
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn blocks(&self) -> &ChunkBlocks {
        &self.blocks
    }

    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Result<u16, DomainError> {
        let index = local_index(x, y, z)?;
        Ok(self.blocks.get(index))
    }

    /// Set a block in chunk-local coordinates. Densifies the payload if needed.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: u16) -> Result<(), DomainError> {
        let index = local_index(x, y, z)?;
        if self.blocks.get(index) == block {
            return Ok(());
        }
        if !matches!(self.blocks, ChunkBlocks::Dense(_)) {
            let fill = self.blocks.get(0);
            self.blocks = ChunkBlocks::Dense(vec![fill; CHUNK_VOLUME]);
        }
        match &mut self.blocks {
            ChunkBlocks::Dense(blocks) => match blocks.get_mut(index) {
                Some(slot) => {
                    *slot = block;
                    Ok(())
                }
                None => Err(DomainError::out_of_bounds(format!(
                    "dense payload has {} blocks, index {index}",
                    blocks.len()
                ))),
            },
            _ => Ok(()),
        }
    }
}

fn local_index(x: usize, y: usize, z: usize) -> Result<usize, DomainError> {
    if x >= CHUNK_EDGE || z >= CHUNK_EDGE || y >= CHUNK_HEIGHT {
        return Err(DomainError::out_of_bounds(format!(
            "local block ({x}, {y}, {z}) outside {CHUNK_EDGE}x{CHUNK_HEIGHT}x{CHUNK_EDGE}"
        )));
    }
    Ok((y * CHUNK_EDGE + z) * CHUNK_EDGE + x)
}

/// The decoded world of one island.
///
/// Chunks are kept ordered by position so encoding is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldState {
    chunks: BTreeMap<ChunkPos, Chunk>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chunks(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let mut world = Self::new();
        for chunk in chunks {
            world.insert_chunk(chunk);
        }
        world
    }

    /// Insert a chunk, replacing any chunk at the same position.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.pos(), chunk)
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Keep only chunks within `radius` chunks of the origin.
    pub fn select_radius(mut self, radius: u32) -> Self {
        self.chunks.retain(|pos, _| pos.distance_from_origin() <= radius);
        self
    }

    /// Block at world coordinates. Missing chunks read as air.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Result<u16, DomainError> {
        let (pos, lx, ly, lz) = split_world_coords(x, y, z)?;
        match self.chunks.get(&pos) {
            Some(chunk) => chunk.block_at(lx, ly, lz),
            None => Ok(AIR),
        }
    }

    /// Set a block at world coordinates, creating the chunk if needed.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: u16) -> Result<(), DomainError> {
        let (pos, lx, ly, lz) = split_world_coords(x, y, z)?;
        self.chunks
            .entry(pos)
            .or_insert_with(|| Chunk::empty(pos))
            .set_block(lx, ly, lz, block)
    }
}

fn split_world_coords(x: i32, y: i32, z: i32) -> Result<(ChunkPos, usize, usize, usize), DomainError> {
    if y < 0 || y as usize >= CHUNK_HEIGHT {
        return Err(DomainError::out_of_bounds(format!("y={y}")));
    }
    let edge = CHUNK_EDGE as i32;
    let pos = ChunkPos::containing(x, z);
    Ok((
        pos,
        x.rem_euclid(edge) as usize,
        y as usize,
        z.rem_euclid(edge) as usize,
    ))
}
