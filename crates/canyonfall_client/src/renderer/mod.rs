pub mod atlas;
pub mod mesh;
