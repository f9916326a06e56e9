use glam::IVec3;

/// One of the six axis-aligned sides of a block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Face {
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// +X
    Right,
    /// -X
    Left,
    /// +Z
    Front,
    /// -Z
    Back,
}

/// Which atlas cell group a face samples from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceCategory {
    Top,
    Bottom,
    Side,
}

impl Face {
    /// Mesh emission order.
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::Right,
        Face::Left,
        Face::Front,
        Face::Back,
    ];

    pub fn normal_ivec3(self) -> IVec3 {
        match self {
            Face::Top => IVec3::Y,
            Face::Bottom => IVec3::NEG_Y,
            Face::Right => IVec3::X,
            Face::Left => IVec3::NEG_X,
            Face::Front => IVec3::Z,
            Face::Back => IVec3::NEG_Z,
        }
    }

    pub fn category(self) -> FaceCategory {
        match self {
            Face::Top => FaceCategory::Top,
            Face::Bottom => FaceCategory::Bottom,
            Face::Right | Face::Left | Face::Front | Face::Back => FaceCategory::Side,
        }
    }
}
