//! Binary island world format.
//!
//! Layout (little-endian):
//! - magic `SKIS`, format version `u16`, chunk count `u32`
//! - per chunk: `x: i32`, `z: i32`, payload tag `u8`, then
//!   - `0` empty: nothing
//!   - `1` uniform: block `u16`
//!   - `2` run-length: run count `u32`, then `(len: u16, block: u16)` pairs
//!
//! Chunks are written in position order, so equal worlds encode to equal bytes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use skyisle_domain::{Chunk, ChunkBlocks, ChunkPos, WorldState, CHUNK_VOLUME};

use crate::infrastructure::ports::{CodecError, WorldCodecPort};

const MAGIC: &[u8; 4] = b"SKIS";
const FORMAT_VERSION: u16 = 1;

/// File extension of template worlds on disk.
pub const TEMPLATE_EXTENSION: &str = "skis";

const TAG_EMPTY: u8 = 0;
const TAG_UNIFORM: u8 = 1;
const TAG_RUNS: u8 = 2;

/// Codec for the `SKIS` world format, with templates read from a directory.
pub struct BinaryWorldCodec {
    template_dir: PathBuf,
}

impl BinaryWorldCodec {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
        }
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.template_dir
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION))
    }
}

#[async_trait]
impl WorldCodecPort for BinaryWorldCodec {
    fn encode(&self, world: &WorldState) -> Result<Vec<u8>, CodecError> {
        encode_world(world)
    }

    fn decode(&self, data: &[u8]) -> Result<WorldState, CodecError> {
        decode_world(data)
    }

    async fn load_template(&self, name: &str, radius: u32) -> Result<WorldState, CodecError> {
        let path = self.template_path(name);
        tokio::task::spawn_blocking(move || read_template(&path, radius))
            .await
            .map_err(|e| CodecError::io(format!("template loader task failed: {}", e)))?
    }
}

fn read_template(path: &Path, radius: u32) -> Result<WorldState, CodecError> {
    let data = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CodecError::TemplateMissing(path.display().to_string()),
        _ => CodecError::io(format!("{}: {}", path.display(), e)),
    })?;
    Ok(decode_world(&data)?.select_radius(radius))
}

pub fn encode_world(world: &WorldState) -> Result<Vec<u8>, CodecError> {
    let count = u32::try_from(world.chunk_count())
        .map_err(|_| CodecError::invalid("too many chunks to encode"))?;

    let mut out = Vec::with_capacity(10 + world.chunk_count() * 12);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    for chunk in world.chunks() {
        let pos = chunk.pos();
        out.extend_from_slice(&pos.x.to_le_bytes());
        out.extend_from_slice(&pos.z.to_le_bytes());
        match chunk.blocks() {
            ChunkBlocks::Empty => out.push(TAG_EMPTY),
            ChunkBlocks::Uniform(block) => {
                out.push(TAG_UNIFORM);
                out.extend_from_slice(&block.to_le_bytes());
            }
            ChunkBlocks::Dense(blocks) => {
                out.push(TAG_RUNS);
                let runs = run_length_encode(blocks);
                out.extend_from_slice(&(runs.len() as u32).to_le_bytes());
                for (len, block) in runs {
                    out.extend_from_slice(&len.to_le_bytes());
                    out.extend_from_slice(&block.to_le_bytes());
                }
            }
        }
    }

    Ok(out)
}

pub fn decode_world(data: &[u8]) -> Result<WorldState, CodecError> {
    let mut reader = Reader::new(data);

    if reader.take(MAGIC.len())? != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let version = reader.u16()?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let count = reader.u32()?;
    let mut world = WorldState::new();
    for _ in 0..count {
        let pos = ChunkPos::new(reader.i32()?, reader.i32()?);
        let chunk = match reader.u8()? {
            TAG_EMPTY => Chunk::empty(pos),
            TAG_UNIFORM => Chunk::uniform(pos, reader.u16()?),
            TAG_RUNS => {
                let blocks = read_runs(&mut reader)?;
                Chunk::from_dense(pos, blocks).map_err(CodecError::invalid)?
            }
            tag => {
                return Err(CodecError::invalid(format!(
                    "unknown payload tag {} for chunk ({}, {})",
                    tag, pos.x, pos.z
                )))
            }
        };
        if world.insert_chunk(chunk).is_some() {
            return Err(CodecError::invalid(format!(
                "duplicate chunk ({}, {})",
                pos.x, pos.z
            )));
        }
    }

    if !reader.is_exhausted() {
        return Err(CodecError::invalid(format!(
            "{} trailing bytes after last chunk",
            reader.remaining()
        )));
    }

    Ok(world)
}

fn run_length_encode(blocks: &[u16]) -> Vec<(u16, u16)> {
    let mut runs: Vec<(u16, u16)> = Vec::new();
    for &block in blocks {
        match runs.last_mut() {
            Some((len, current)) if *current == block && *len < u16::MAX => *len += 1,
            _ => runs.push((1, block)),
        }
    }
    runs
}

fn read_runs(reader: &mut Reader<'_>) -> Result<Vec<u16>, CodecError> {
    let run_count = reader.u32()?;
    let mut blocks = Vec::with_capacity(CHUNK_VOLUME);
    for _ in 0..run_count {
        let len = reader.u16()? as usize;
        let block = reader.u16()?;
        if len == 0 || blocks.len() + len > CHUNK_VOLUME {
            return Err(CodecError::invalid("block runs do not add up to a chunk"));
        }
        blocks.resize(blocks.len() + len, block);
    }
    Ok(blocks)
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .offset
            .checked_add(needed)
            .filter(|end| *end <= self.data.len())
            .ok_or(CodecError::Truncated {
                offset: self.offset,
                needed,
            })?;
        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
