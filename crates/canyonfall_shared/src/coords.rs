use std::ops::{Add, AddAssign, Sub, SubAssign};

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Chunk footprint along X and Z.
pub const CHUNK_SIZE: usize = 16;
/// The world is a single chunk tall.
pub const CHUNK_HEIGHT: usize = 32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_HEIGHT * CHUNK_SIZE;

const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;
const CHUNK_HEIGHT_I32: i32 = CHUNK_HEIGHT as i32;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl Add for ChunkPos {
    type Output = ChunkPos;

    fn add(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x + rhs.x,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign for ChunkPos {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.z += rhs.z;
    }
}

impl Sub for ChunkPos {
    type Output = ChunkPos;

    fn sub(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x - rhs.x,
            z: self.z - rhs.z,
        }
    }
}

impl SubAssign for ChunkPos {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.z -= rhs.z;
    }
}

fn div_rem_floor(value: i64, divisor: i64) -> (i64, i64) {
    (value.div_euclid(divisor), value.rem_euclid(divisor))
}

pub fn local_to_index(local: LocalPos) -> usize {
    usize::from(local.x)
        + usize::from(local.z) * CHUNK_SIZE
        + usize::from(local.y) * CHUNK_SIZE * CHUNK_SIZE
}

pub fn index_to_local(index: usize) -> LocalPos {
    assert!(index < CHUNK_VOLUME, "chunk index out of bounds: {index}");

    let y = index / (CHUNK_SIZE * CHUNK_SIZE);
    let rem = index % (CHUNK_SIZE * CHUNK_SIZE);
    let z = rem / CHUNK_SIZE;
    let x = rem % CHUNK_SIZE;

    LocalPos {
        x: x as u8,
        y: y as u8,
        z: z as u8,
    }
}

/// Placement of a `width x length` chunk grid in world space.
///
/// Chunk `(0, 0)` starts at `origin`; the origin is chosen so the world is
/// centered on X and Z, which is what the column-noise canyon measures its
/// distance-from-axis against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorldLayout {
    pub width_in_chunks: i32,
    pub length_in_chunks: i32,
    pub origin: IVec3,
}

impl WorldLayout {
    pub fn centered(width_in_chunks: i32, length_in_chunks: i32) -> Self {
        let width_in_chunks = width_in_chunks.max(1);
        let length_in_chunks = length_in_chunks.max(1);
        let origin = IVec3::new(
            -(width_in_chunks * CHUNK_SIZE_I32 / 2),
            0,
            -(length_in_chunks * CHUNK_SIZE_I32 / 2),
        );
        Self {
            width_in_chunks,
            length_in_chunks,
            origin,
        }
    }

    pub fn width_in_blocks(&self) -> i32 {
        self.width_in_chunks * CHUNK_SIZE_I32
    }

    pub fn length_in_blocks(&self) -> i32 {
        self.length_in_chunks * CHUNK_SIZE_I32
    }

    pub fn chunk_count(&self) -> usize {
        (self.width_in_chunks * self.length_in_chunks) as usize
    }

    pub fn contains_chunk(&self, pos: ChunkPos) -> bool {
        (0..self.width_in_chunks).contains(&pos.x) && (0..self.length_in_chunks).contains(&pos.z)
    }

    /// Chunk coordinates in generation order: X outer, Z inner.
    pub fn chunk_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        (0..self.width_in_chunks)
            .flat_map(move |x| (0..self.length_in_chunks).map(move |z| ChunkPos { x, z }))
    }

    /// World-space position of a chunk's local `(0, 0, 0)` corner.
    pub fn chunk_origin(&self, pos: ChunkPos) -> IVec3 {
        self.origin + IVec3::new(pos.x * CHUNK_SIZE_I32, 0, pos.z * CHUNK_SIZE_I32)
    }

    pub fn chunk_to_world(&self, pos: ChunkPos, local: LocalPos) -> IVec3 {
        self.chunk_origin(pos)
            + IVec3::new(
                i32::from(local.x),
                i32::from(local.y),
                i32::from(local.z),
            )
    }

    /// Column offset from the origin, widened so any `i32` input is exact.
    fn column_offset(&self, world_x: i32, world_z: i32) -> (i64, i64) {
        (
            i64::from(world_x) - i64::from(self.origin.x),
            i64::from(world_z) - i64::from(self.origin.z),
        )
    }

    /// Resolves the owning chunk with floor division, so negative world
    /// coordinates land in the right chunk. `None` above or below the world.
    pub fn world_to_chunk(&self, world_pos: IVec3) -> Option<(ChunkPos, LocalPos)> {
        if !(0..CHUNK_HEIGHT_I32).contains(&world_pos.y) {
            return None;
        }
        let (rel_x, rel_z) = self.column_offset(world_pos.x, world_pos.z);
        let (chunk_x, local_x) = div_rem_floor(rel_x, i64::from(CHUNK_SIZE_I32));
        let (chunk_z, local_z) = div_rem_floor(rel_z, i64::from(CHUNK_SIZE_I32));

        Some((
            ChunkPos {
                x: i32::try_from(chunk_x).ok()?,
                z: i32::try_from(chunk_z).ok()?,
            },
            LocalPos {
                x: local_x as u8,
                y: world_pos.y as u8,
                z: local_z as u8,
            },
        ))
    }

    /// Converts world space to the dense grid space used by `VoxelGrid`
    /// snapshots. Only meaningful for positions inside the layout; far-away
    /// inputs wrap instead of overflowing.
    pub fn world_to_grid(&self, world_pos: IVec3) -> IVec3 {
        world_pos.wrapping_sub(self.origin)
    }

    /// True for the outermost block columns on X or Z.
    pub fn is_edge_column(&self, world_x: i32, world_z: i32) -> bool {
        let (grid_x, grid_z) = self.column_offset(world_x, world_z);
        grid_x == 0
            || grid_z == 0
            || grid_x == i64::from(self.width_in_blocks()) - 1
            || grid_z == i64::from(self.length_in_blocks()) - 1
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::{
        index_to_local, local_to_index, ChunkPos, LocalPos, WorldLayout, CHUNK_HEIGHT, CHUNK_SIZE,
    };

    #[test]
    fn local_to_index_round_trips_back_to_local_coords() {
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let local = LocalPos {
                        x: x as u8,
                        y: y as u8,
                        z: z as u8,
                    };
                    let index = local_to_index(local);
                    assert_eq!(index_to_local(index), local);
                }
            }
        }
    }

    #[test]
    fn chunk_pos_arithmetic_is_component_wise() {
        let a = ChunkPos { x: 10, z: 4 };
        let b = ChunkPos { x: -3, z: 1 };

        assert_eq!(a + b, ChunkPos { x: 7, z: 5 });
        assert_eq!(a - b, ChunkPos { x: 13, z: 3 });

        let mut c = a;
        c += b;
        assert_eq!(c, ChunkPos { x: 7, z: 5 });
        c -= b;
        assert_eq!(c, a);
    }

    #[test]
    fn centered_layout_puts_origin_at_negative_half_extent() {
        let layout = WorldLayout::centered(4, 2);
        assert_eq!(layout.origin, IVec3::new(-32, 0, -16));
        assert_eq!(layout.width_in_blocks(), 64);
        assert_eq!(layout.length_in_blocks(), 32);
        assert_eq!(layout.chunk_count(), 8);
        assert_eq!(layout.chunk_positions().count(), 8);

        let degenerate = WorldLayout::centered(0, -5);
        assert_eq!(degenerate.chunk_count(), 1);
    }

    #[test]
    fn world_to_chunk_handles_negative_coordinates() {
        let layout = WorldLayout::centered(2, 2);

        let (chunk, local) = layout.world_to_chunk(IVec3::new(-16, 5, -16)).expect("inside");
        assert_eq!(chunk, ChunkPos { x: 0, z: 0 });
        assert_eq!(local, LocalPos { x: 0, y: 5, z: 0 });

        let (chunk, local) = layout.world_to_chunk(IVec3::new(-1, 0, 15)).expect("inside");
        assert_eq!(chunk, ChunkPos { x: 0, z: 1 });
        assert_eq!(
            local,
            LocalPos {
                x: (CHUNK_SIZE - 1) as u8,
                y: 0,
                z: (CHUNK_SIZE - 1) as u8
            }
        );

        let (outside, _) = layout.world_to_chunk(IVec3::new(-17, 0, 0)).expect("y in range");
        assert_eq!(outside, ChunkPos { x: -1, z: 1 });
        assert!(!layout.contains_chunk(outside));

        assert!(layout.world_to_chunk(IVec3::new(0, -1, 0)).is_none());
        assert!(layout.world_to_chunk(IVec3::new(0, CHUNK_HEIGHT as i32, 0)).is_none());

        let world = IVec3::new(7, 31, -9);
        let (chunk, local) = layout.world_to_chunk(world).expect("inside");
        assert_eq!(layout.chunk_to_world(chunk, local), world);
    }

    #[test]
    fn edge_columns_are_the_outer_ring() {
        let layout = WorldLayout::centered(2, 2);
        assert!(layout.is_edge_column(-16, 0));
        assert!(layout.is_edge_column(15, 0));
        assert!(layout.is_edge_column(0, -16));
        assert!(layout.is_edge_column(0, 15));
        assert!(!layout.is_edge_column(0, 0));
        assert!(!layout.is_edge_column(-15, 14));
    }

    #[test]
    fn extreme_coordinates_resolve_without_overflow() {
        let layout = WorldLayout::centered(2, 2);

        let (chunk, local) = layout
            .world_to_chunk(IVec3::new(i32::MAX, 5, 0))
            .expect("y in range");
        assert!(!layout.contains_chunk(chunk));
        assert_eq!(local.y, 5);

        let (chunk, _) = layout
            .world_to_chunk(IVec3::new(0, 5, i32::MAX))
            .expect("y in range");
        assert!(!layout.contains_chunk(chunk));

        let (chunk, _) = layout
            .world_to_chunk(IVec3::new(i32::MIN, 5, i32::MIN))
            .expect("y in range");
        assert!(!layout.contains_chunk(chunk));

        assert!(!layout.is_edge_column(i32::MAX, 0));
        assert!(!layout.is_edge_column(0, i32::MIN));
    }
}
