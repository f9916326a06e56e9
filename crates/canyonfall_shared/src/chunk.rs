use crate::block::BlockType;
use crate::coords::{ChunkPos, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::grid::VoxelGrid;

/// One `CHUNK_SIZE x CHUNK_HEIGHT x CHUNK_SIZE` column of the world.
///
/// Writes mark the chunk dirty; the mesher clears the flag after a rebuild.
#[derive(Clone, Debug)]
pub struct ChunkData {
    pub pos: ChunkPos,
    blocks: VoxelGrid,
    dirty: bool,
}

impl ChunkData {
    pub fn new_empty(pos: ChunkPos) -> Self {
        Self::new_filled(pos, BlockType::Air)
    }

    pub fn new_filled(pos: ChunkPos, block: BlockType) -> Self {
        Self {
            pos,
            blocks: VoxelGrid::new_filled(CHUNK_SIZE, CHUNK_HEIGHT, CHUNK_SIZE, block),
            dirty: true,
        }
    }

    pub fn get(&self, local: LocalPos) -> BlockType {
        self.get_i32(i32::from(local.x), i32::from(local.y), i32::from(local.z))
    }

    pub fn set(&mut self, local: LocalPos, block: BlockType) {
        self.set_i32(i32::from(local.x), i32::from(local.y), i32::from(local.z), block);
    }

    /// `Air` for coordinates outside the chunk.
    pub fn get_i32(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.blocks.get(x, y, z)
    }

    pub fn set_i32(&mut self, x: i32, y: i32, z: i32, block: BlockType) {
        if self.blocks.contains(x, y, z) {
            self.blocks.set(x, y, z, block);
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn blocks(&self) -> &VoxelGrid {
        &self.blocks
    }

    pub fn count_non_air(&self) -> usize {
        self.blocks.count_non_air()
    }
}

#[cfg(test)]
mod tests {
    use super::ChunkData;
    use crate::block::BlockType;
    use crate::coords::{ChunkPos, LocalPos, CHUNK_HEIGHT, CHUNK_SIZE};

    #[test]
    fn chunk_creation_and_get_set_work() {
        let mut chunk = ChunkData::new_empty(ChunkPos::new(1, -2));
        let pos = LocalPos { x: 3, y: 7, z: 11 };
        assert_eq!(chunk.get(pos), BlockType::Air);

        chunk.set(pos, BlockType::Gravel);
        assert_eq!(chunk.get(pos), BlockType::Gravel);
        assert_eq!(chunk.get_i32(3, 7, 11), BlockType::Gravel);
        assert_eq!(chunk.count_non_air(), 1);
    }

    #[test]
    fn writes_mark_dirty_and_out_of_range_is_ignored() {
        let mut chunk = ChunkData::new_filled(ChunkPos::default(), BlockType::Stone);
        assert!(chunk.is_dirty());
        chunk.mark_clean();

        chunk.set_i32(CHUNK_SIZE as i32, 0, 0, BlockType::Sand);
        chunk.set_i32(0, CHUNK_HEIGHT as i32, 0, BlockType::Sand);
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.get_i32(-1, 0, 0), BlockType::Air);

        chunk.set_i32(0, 0, 0, BlockType::Sand);
        assert!(chunk.is_dirty());
        assert_eq!(
            chunk.count_non_air(),
            CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT
        );
    }
}
