pub mod landing_marker;
pub mod renderer;
pub mod settings;
pub mod world;
