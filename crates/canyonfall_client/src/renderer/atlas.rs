use canyonfall_shared::block::BlockType;
use canyonfall_shared::face::{Face, FaceCategory};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ATLAS_SIZE: u32 = 4;
/// Pulled in from every cell edge so linear sampling never reads the
/// neighboring cell.
pub const UV_INSET: f32 = 0.01;

/// `(column, row)` of an atlas cell, row 0 at the top of the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasCell {
    pub column: u32,
    pub row: u32,
}

impl AtlasCell {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCells {
    pub top: AtlasCell,
    pub bottom: AtlasCell,
    pub sides: AtlasCell,
}

impl BlockCells {
    const fn uniform(column: u32, row: u32) -> Self {
        let cell = AtlasCell::new(column, row);
        Self {
            top: cell,
            bottom: cell,
            sides: cell,
        }
    }
}

/// Replaces the cells used by one block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureOverride {
    pub block: BlockType,
    pub top: [u32; 2],
    pub bottom: [u32; 2],
    pub sides: [u32; 2],
}

fn default_cells(block: BlockType) -> BlockCells {
    match block {
        BlockType::Grass => BlockCells {
            top: AtlasCell::new(0, 0),
            bottom: AtlasCell::new(2, 0),
            sides: AtlasCell::new(3, 0),
        },
        BlockType::Dirt => BlockCells::uniform(2, 0),
        BlockType::Stone => BlockCells::uniform(1, 0),
        BlockType::Water => BlockCells::uniform(0, 1),
        BlockType::Wood => BlockCells {
            top: AtlasCell::new(1, 1),
            bottom: AtlasCell::new(1, 1),
            sides: AtlasCell::new(2, 1),
        },
        BlockType::Leaves => BlockCells::uniform(3, 1),
        BlockType::Sand => BlockCells::uniform(0, 2),
        BlockType::Gravel => BlockCells::uniform(1, 2),
        BlockType::Clay => BlockCells::uniform(2, 2),
        BlockType::Bedrock => BlockCells::uniform(3, 2),
        BlockType::Air => BlockCells::uniform(0, 0),
    }
}

/// Maps `(block, face category)` to an atlas cell in an `N x N` atlas.
/// Every stored cell is kept inside `[0, N)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasMapping {
    size: u32,
    cells: Vec<BlockCells>,
}

impl Default for AtlasMapping {
    fn default() -> Self {
        Self::with_size(DEFAULT_ATLAS_SIZE)
    }
}

impl AtlasMapping {
    pub fn with_size(size: u32) -> Self {
        let mut mapping = Self {
            size: size.max(1),
            cells: Vec::with_capacity(BlockType::ALL.len()),
        };
        for block in BlockType::ALL {
            let cells = default_cells(block);
            mapping.cells.push(cells);
            mapping.set_cells(block, cells);
        }
        mapping
    }

    pub fn with_overrides(size: u32, overrides: &[TextureOverride]) -> Self {
        let mut mapping = Self::with_size(size);
        for entry in overrides {
            mapping.set_cells(
                entry.block,
                BlockCells {
                    top: AtlasCell::new(entry.top[0], entry.top[1]),
                    bottom: AtlasCell::new(entry.bottom[0], entry.bottom[1]),
                    sides: AtlasCell::new(entry.sides[0], entry.sides[1]),
                },
            );
        }
        mapping
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn clamp_cell(&self, cell: AtlasCell) -> AtlasCell {
        AtlasCell::new(cell.column.min(self.size - 1), cell.row.min(self.size - 1))
    }

    pub fn set_cells(&mut self, block: BlockType, cells: BlockCells) {
        let clamped = BlockCells {
            top: self.clamp_cell(cells.top),
            bottom: self.clamp_cell(cells.bottom),
            sides: self.clamp_cell(cells.sides),
        };
        if let Some(slot) = self.cells.get_mut(usize::from(block.id())) {
            *slot = clamped;
        }
    }

    pub fn cell(&self, block: BlockType, category: FaceCategory) -> AtlasCell {
        let cells = self
            .cells
            .get(usize::from(block.id()))
            .copied()
            .unwrap_or(BlockCells::uniform(0, 0));
        match category {
            FaceCategory::Top => cells.top,
            FaceCategory::Bottom => cells.bottom,
            FaceCategory::Side => cells.sides,
        }
    }

    /// `[u_min, v_min, u_max, v_max]` of a cell after the inset, with V
    /// flipped so row 0 is the top of the texture.
    pub fn uv_rect(&self, cell: AtlasCell) -> [f32; 4] {
        let cell = self.clamp_cell(cell);
        let tile = 1.0 / self.size as f32;
        let u = cell.column as f32 * tile;
        let v = 1.0 - (cell.row + 1) as f32 * tile;
        [
            u + UV_INSET,
            v + UV_INSET,
            u + tile - UV_INSET,
            v + tile - UV_INSET,
        ]
    }

    /// Four UVs matching the face's vertex order. Right and left faces are
    /// rotated a quarter turn in opposite directions.
    pub fn face_uvs(&self, block: BlockType, face: Face) -> [[f32; 2]; 4] {
        let [u0, v0, u1, v1] = self.uv_rect(self.cell(block, face.category()));
        let uv00 = [u0, v0];
        let uv10 = [u1, v0];
        let uv11 = [u1, v1];
        let uv01 = [u0, v1];
        match face {
            Face::Right => [uv00, uv01, uv11, uv10],
            Face::Left => [uv10, uv11, uv01, uv00],
            Face::Top | Face::Bottom | Face::Front | Face::Back => [uv00, uv10, uv11, uv01],
        }
    }
}

#[cfg(test)]
mod tests {
    use canyonfall_shared::block::BlockType;
    use canyonfall_shared::face::{Face, FaceCategory};

    use super::{AtlasCell, AtlasMapping, TextureOverride, UV_INSET};

    #[test]
    fn grass_uses_distinct_cells_per_category() {
        let atlas = AtlasMapping::default();
        assert_eq!(atlas.cell(BlockType::Grass, FaceCategory::Top), AtlasCell::new(0, 0));
        assert_eq!(atlas.cell(BlockType::Grass, FaceCategory::Bottom), AtlasCell::new(2, 0));
        assert_eq!(atlas.cell(BlockType::Grass, FaceCategory::Side), AtlasCell::new(3, 0));
        assert_eq!(atlas.cell(BlockType::Bedrock, FaceCategory::Side), AtlasCell::new(3, 2));
    }

    #[test]
    fn uv_rect_is_inset_and_flipped() {
        let atlas = AtlasMapping::default();
        let [u0, v0, u1, v1] = atlas.uv_rect(AtlasCell::new(1, 0));
        assert!((u0 - (0.25 + UV_INSET)).abs() < 1e-6);
        assert!((u1 - (0.5 - UV_INSET)).abs() < 1e-6);
        assert!((v0 - (0.75 + UV_INSET)).abs() < 1e-6);
        assert!((v1 - (1.0 - UV_INSET)).abs() < 1e-6);
    }

    #[test]
    fn overrides_are_clamped_into_the_atlas() {
        let atlas = AtlasMapping::with_overrides(
            4,
            &[TextureOverride {
                block: BlockType::Stone,
                top: [9, 1],
                bottom: [0, 17],
                sides: [2, 3],
            }],
        );
        assert_eq!(atlas.cell(BlockType::Stone, FaceCategory::Top), AtlasCell::new(3, 1));
        assert_eq!(atlas.cell(BlockType::Stone, FaceCategory::Bottom), AtlasCell::new(0, 3));
        assert_eq!(atlas.cell(BlockType::Stone, FaceCategory::Side), AtlasCell::new(2, 3));
    }

    #[test]
    fn smaller_atlas_clamps_the_default_table() {
        let atlas = AtlasMapping::with_size(2);
        assert_eq!(atlas.cell(BlockType::Bedrock, FaceCategory::Top), AtlasCell::new(1, 1));
        let atlas = AtlasMapping::with_size(0);
        assert_eq!(atlas.size(), 1);
        assert_eq!(atlas.cell(BlockType::Clay, FaceCategory::Side), AtlasCell::new(0, 0));
    }

    #[test]
    fn lateral_faces_rotate_in_opposite_directions() {
        let atlas = AtlasMapping::default();
        let front = atlas.face_uvs(BlockType::Stone, Face::Front);
        let right = atlas.face_uvs(BlockType::Stone, Face::Right);
        let left = atlas.face_uvs(BlockType::Stone, Face::Left);

        assert_eq!(right, [front[0], front[3], front[2], front[1]]);
        assert_eq!(left, [front[1], front[2], front[3], front[0]]);
    }
}
