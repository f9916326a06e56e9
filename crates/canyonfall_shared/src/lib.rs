pub mod block;
pub mod canyon_path;
pub mod chunk;
pub mod coords;
pub mod face;
pub mod grid;
pub mod projectile;
pub mod stalagmite;
pub mod trajectory;
pub mod worldgen;
