use bytemuck::{Pod, Zeroable};
use canyonfall_shared::{
    block::BlockType, chunk::ChunkData, coords::WorldLayout, face::Face, grid::VoxelGrid,
};
use glam::{IVec3, Vec3};

use crate::renderer::atlas::AtlasMapping;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}
const _: [(); 32] = [(); std::mem::size_of::<ChunkVertex>()];

/// Geometry of one chunk. Positions are chunk-local; `origin` is the
/// world-space offset of local `(0, 0, 0)`. The same triangles serve as the
/// collision mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub origin: IVec3,
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.positions.len() / 4
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the parallel buffers for upload.
    pub fn interleaved(&self) -> Vec<ChunkVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((position, normal), tex_coord)| ChunkVertex {
                position: *position,
                normal: *normal,
                tex_coord: *tex_coord,
            })
            .collect()
    }
}

pub fn vertex_bytes(vertices: &[ChunkVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Resolves blocks outside the meshed region, in world coordinates.
pub type NeighborLookup<'a> = &'a dyn Fn(IVec3) -> BlockType;

#[derive(Copy, Clone)]
struct FaceSpec {
    face: Face,
    corners: [[f32; 3]; 4],
}

// Corner order per face gives an outward normal for (c1 - c0) x (c2 - c0).
const FACE_SPECS: [FaceSpec; 6] = [
    FaceSpec {
        face: Face::Top,
        corners: [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
    },
    FaceSpec {
        face: Face::Bottom,
        corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    },
    FaceSpec {
        face: Face::Right,
        corners: [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
    },
    FaceSpec {
        face: Face::Left,
        corners: [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
    },
    FaceSpec {
        face: Face::Front,
        corners: [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    },
    FaceSpec {
        face: Face::Back,
        corners: [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
    },
];

pub fn build_chunk_mesh(
    chunk: &ChunkData,
    layout: &WorldLayout,
    atlas: &AtlasMapping,
    neighbors: Option<NeighborLookup<'_>>,
) -> ChunkMesh {
    build_grid_mesh(chunk.blocks(), layout.chunk_origin(chunk.pos), atlas, neighbors)
}

/// Emits one quad per visible face of every solid block in `grid`.
///
/// Faces looking past the grid ask `neighbors`; with no lookup they are
/// always emitted.
pub fn build_grid_mesh(
    grid: &VoxelGrid,
    origin: IVec3,
    atlas: &AtlasMapping,
    neighbors: Option<NeighborLookup<'_>>,
) -> ChunkMesh {
    let mut mesh = ChunkMesh {
        origin,
        ..ChunkMesh::default()
    };

    for x in 0..grid.width() as i32 {
        for y in 0..grid.height() as i32 {
            for z in 0..grid.depth() as i32 {
                let block = grid.get(x, y, z);
                if block.is_air() {
                    continue;
                }
                let pos = IVec3::new(x, y, z);
                for spec in FACE_SPECS {
                    if face_visible(grid, origin, pos, spec.face, neighbors) {
                        push_quad(&mut mesh, pos, spec, atlas.face_uvs(block, spec.face));
                    }
                }
            }
        }
    }

    mesh
}

fn face_visible(
    grid: &VoxelGrid,
    origin: IVec3,
    pos: IVec3,
    face: Face,
    neighbors: Option<NeighborLookup<'_>>,
) -> bool {
    let adjacent = pos + face.normal_ivec3();
    if grid.contains(adjacent.x, adjacent.y, adjacent.z) {
        return grid.get_at(adjacent).is_air();
    }
    match neighbors {
        Some(lookup) => lookup(origin + adjacent).is_air(),
        None => true,
    }
}

fn push_quad(mesh: &mut ChunkMesh, pos: IVec3, spec: FaceSpec, uvs: [[f32; 2]; 4]) {
    let base = mesh.positions.len() as u32;
    let offset = pos.as_vec3();
    let normal = spec.face.normal_ivec3().as_vec3().to_array();

    for (corner, uv) in spec.corners.iter().zip(uvs) {
        mesh.positions.push((offset + Vec3::from_array(*corner)).to_array());
        mesh.normals.push(normal);
        mesh.uvs.push(uv);
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}
