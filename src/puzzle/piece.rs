use std::fmt;

use serde::{Deserialize, Serialize};

use super::coords::Coords3D;

/// Inclusive extent of the 3x3x3 cube that blocks occupy.
pub const BLOCK_BOX_END: Coords3D = Coords3D::new(2, 2, 2);
/// Inclusive extent beams may span; one unit larger than the block cube.
pub const BEAM_BOX_END: Coords3D = Coords3D::new(3, 3, 3);

/// A single unit cube of a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub pos: Coords3D,
}

impl Block {
    pub fn new(pos: Coords3D) -> Self {
        let block = Self { pos };
        if !block.is_valid() {
            tracing::warn!(%block, "invalid block position");
        }
        block
    }

    pub fn is_valid(&self) -> bool {
        self.pos.is_within(Coords3D::ORIGIN, BLOCK_BOX_END)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block at {}", self.pos)
    }
}

/// Bar holding the blocks of a piece together, spanning `start..=start + vect`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beam {
    pub start: Coords3D,
    pub vect: Coords3D,
    pub end: Coords3D,
}

impl Beam {
    pub fn new(start: Coords3D, vect: Coords3D) -> Self {
        let beam = Self {
            start,
            vect,
            end: start + vect,
        };
        if !beam.is_valid() {
            tracing::warn!(%beam, "invalid beam");
        }
        beam
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_within(Coords3D::ORIGIN, BEAM_BOX_END)
            && self.end.is_within(Coords3D::ORIGIN, BEAM_BOX_END)
    }
}

impl fmt::Display for Beam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start: {} vect:{}", self.start, self.vect)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub name: String,
    pub blocks: Vec<Block>,
    pub beams: Vec<Beam>,
}

impl Piece {
    pub fn new(name: impl Into<String>, blocks: Vec<Block>, beams: Vec<Beam>) -> Self {
        Self {
            name: name.into(),
            blocks,
            beams,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.blocks.iter().all(Block::is_valid) && self.beams.iter().all(Beam::is_valid)
    }

    /// Moves every block and both ends of every beam by `vect`.
    pub fn translate(&mut self, vect: Coords3D) {
        for block in &mut self.blocks {
            block.pos.translate(vect);
        }
        for beam in &mut self.beams {
            beam.start.translate(vect);
            beam.end.translate(vect);
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "Blocks:")?;
        for block in &self.blocks {
            writeln!(f, " - {block}")?;
        }
        writeln!(f, "Beams:")?;
        for beam in &self.beams {
            writeln!(f, " - {beam}")?;
        }
        Ok(())
    }
}

fn blocks(positions: &[(i32, i32, i32)]) -> Vec<Block> {
    positions
        .iter()
        .map(|&(x, y, z)| Block::new(Coords3D::new(x, y, z)))
        .collect()
}

fn beams(spans: &[((i32, i32, i32), (i32, i32, i32))]) -> Vec<Beam> {
    spans
        .iter()
        .map(|&((sx, sy, sz), (vx, vy, vz))| {
            Beam::new(Coords3D::new(sx, sy, sz), Coords3D::new(vx, vy, vz))
        })
        .collect()
}

/// The eight pieces of the cube puzzle, `P1` through `P8`, in their reference pose.
pub fn catalog() -> Vec<Piece> {
    vec![
        Piece::new(
            "P1",
            blocks(&[(1, 0, 0), (1, 0, 1), (2, 0, 1)]),
            beams(&[((0, 0, 1), (3, 1, 0)), ((1, 1, 0), (1, 0, 3))]),
        ),
        Piece::new(
            "P2",
            blocks(&[(0, 0, 0), (0, 0, 1), (2, 0, 0), (2, 0, 1)]),
            beams(&[
                ((0, 0, 1), (3, 1, 0)),
                ((1, 0, 1), (0, 1, 1)),
                ((0, 1, 0), (1, 0, 3)),
            ]),
        ),
        Piece::new(
            "P3",
            blocks(&[(1, 0, 0), (2, 1, 0), (0, 0, 2), (1, 0, 2)]),
            beams(&[((1, 0, 0), (0, 1, 3)), ((0, 1, 0), (3, 0, 1))]),
        ),
        Piece::new(
            "P4",
            blocks(&[(1, 0, 0), (0, 0, 2)]),
            beams(&[((1, 0, 0), (0, 1, 3)), ((0, 1, 2), (3, 0, 1))]),
        ),
        Piece::new(
            "P5",
            blocks(&[(0, 0, 0), (1, 0, 0), (2, 1, 0), (1, 0, 2)]),
            beams(&[((1, 0, 0), (0, 1, 3)), ((0, 1, 1), (3, 0, 1))]),
        ),
        Piece::new(
            "P6",
            blocks(&[(0, 1, 0), (2, 1, 0), (0, 0, 1)]),
            beams(&[((0, 1, 0), (3, 0, 1)), ((0, 0, 1), (1, 3, 0))]),
        ),
        Piece::new(
            "P7",
            blocks(&[(0, 0, 0), (2, 0, 0), (2, 0, 1), (2, 1, 2)]),
            beams(&[
                ((0, 0, 1), (3, 1, 0)),
                ((2, 0, 1), (0, 1, 1)),
                ((2, 1, 0), (1, 0, 3)),
            ]),
        ),
        Piece::new(
            "P8",
            blocks(&[(0, 0, 0), (0, 1, 0)]),
            beams(&[
                ((1, 0, 0), (0, 3, 1)),
                ((0, 1, 0), (1, 0, 3)),
                ((0, 1, 1), (3, 1, 0)),
            ]),
        ),
    ]
}
