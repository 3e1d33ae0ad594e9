//! Geometry of the cube puzzle whose disassembly the rendered frames show.

pub mod coords;
pub mod piece;

pub use coords::Coords3D;
pub use piece::{Beam, Block, Piece, catalog};
