use glam::IVec3;

use crate::block::BlockType;
use crate::face::Face;

/// Dense `width x height x depth` block storage.
///
/// Reads outside the box return `Air` and writes outside it are ignored, so
/// callers never bounds-check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    width: usize,
    height: usize,
    depth: usize,
    blocks: Vec<BlockType>,
}

impl VoxelGrid {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self::new_filled(width, height, depth, BlockType::Air)
    }

    pub fn new_filled(width: usize, height: usize, depth: usize, block: BlockType) -> Self {
        Self {
            width,
            height,
            depth,
            blocks: vec![block; width * height * depth],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        self.contains(x, y, z).then(|| {
            x as usize + z as usize * self.width + y as usize * self.width * self.depth
        })
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.index(x, y, z)
            .map_or(BlockType::Air, |index| self.blocks[index])
    }

    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockType) {
        if let Some(index) = self.index(x, y, z) {
            self.blocks[index] = block;
        }
    }

    pub fn get_at(&self, pos: IVec3) -> BlockType {
        self.get(pos.x, pos.y, pos.z)
    }

    pub fn set_at(&mut self, pos: IVec3, block: BlockType) {
        self.set(pos.x, pos.y, pos.z, block);
    }

    pub fn is_air(&self, x: i32, y: i32, z: i32) -> bool {
        self.get(x, y, z).is_air()
    }

    /// A face is drawn when the cell it looks into is air. Cells past the
    /// grid edge read as air, so the boundary is open unless generation
    /// placed a wall there.
    pub fn should_render_face(&self, x: i32, y: i32, z: i32, face: Face) -> bool {
        let neighbor = IVec3::new(x, y, z) + face.normal_ivec3();
        self.is_air(neighbor.x, neighbor.y, neighbor.z)
    }

    pub fn fill(&mut self, block: BlockType) {
        self.blocks.fill(block);
    }

    pub fn count_non_air(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_air()).count()
    }

    pub fn as_slice(&self) -> &[BlockType] {
        &self.blocks
    }
}
