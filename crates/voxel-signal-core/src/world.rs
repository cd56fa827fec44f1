//! Read-only world queries and a dense in-memory voxel world

use ndarray::Array3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::BlockObservation;

/// Integer coordinate of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellPos {
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
    /// Z coordinate
    pub z: i64,
}

impl CellPos {
    /// Create a new cell coordinate
    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Cell displaced by the given deltas
    #[must_use]
    pub const fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Continuous position of the cell centre
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centre(self) -> Position {
        Position::new(
            self.x as f64 + 0.5,
            self.y as f64 + 0.5,
            self.z as f64 + 0.5,
        )
    }
}

/// Continuous position in the world
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position
    #[must_use]
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Cell containing this position
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(&self) -> CellPos {
        CellPos::new(
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.z.floor() as i64,
        )
    }
}

/// Read-only view of the host world
pub trait WorldQuery {
    /// Block at a cell, or `None` when the host has no data for it
    fn block_at(&self, cell: CellPos) -> Option<BlockObservation>;

    /// Continuous position of the agent
    fn agent_position(&self) -> Position;

    /// Cell the agent stands in
    fn agent_cell(&self) -> CellPos {
        self.agent_position().cell()
    }
}

/// Bounded voxel world stored as a dense grid
#[derive(Debug, Clone)]
pub struct VoxelWorld {
    origin: CellPos,
    blocks: Array3<Option<BlockObservation>>,
    agent: Position,
}

impl VoxelWorld {
    /// Create an empty world covering `extent` cells starting at `origin`
    #[must_use]
    pub fn new(origin: CellPos, extent: (usize, usize, usize)) -> Self {
        Self {
            origin,
            blocks: Array3::from_elem(extent, None),
            agent: origin.centre(),
        }
    }

    /// Create an empty cube of side `2 * half + 1` centred on the origin
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn centred(half: usize) -> Self {
        let side = 2 * half + 1;
        let h = half as i64;
        let mut world = Self::new(CellPos::new(-h, -h, -h), (side, side, side));
        world.agent = Position::default();
        world
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn index(&self, cell: CellPos) -> Option<(usize, usize, usize)> {
        let (nx, ny, nz) = self.blocks.dim();
        let dx = cell.x - self.origin.x;
        let dy = cell.y - self.origin.y;
        let dz = cell.z - self.origin.z;
        if dx < 0 || dy < 0 || dz < 0 {
            return None;
        }
        let idx = (dx as usize, dy as usize, dz as usize);
        (idx.0 < nx && idx.1 < ny && idx.2 < nz).then_some(idx)
    }

    /// Place a block. Returns false when the cell lies outside the world.
    pub fn set_block(&mut self, cell: CellPos, block: BlockObservation) -> bool {
        match self.index(cell) {
            Some(idx) => {
                self.blocks[idx] = Some(block);
                true
            }
            None => false,
        }
    }

    /// Remove whatever block occupies a cell
    pub fn clear_block(&mut self, cell: CellPos) {
        if let Some(idx) = self.index(cell) {
            self.blocks[idx] = None;
        }
    }

    /// Move the agent
    pub fn set_agent_position(&mut self, position: Position) {
        self.agent = position;
    }

    /// Fill `fill` everywhere, then sprinkle `count` copies of `block` at
    /// random cells.
    #[allow(clippy::cast_possible_wrap)]
    pub fn scatter<R: Rng>(
        &mut self,
        rng: &mut R,
        fill: BlockObservation,
        block: BlockObservation,
        count: usize,
    ) {
        for cell in &mut self.blocks {
            *cell = Some(fill);
        }
        let (nx, ny, nz) = self.blocks.dim();
        if nx == 0 || ny == 0 || nz == 0 {
            return;
        }
        for _ in 0..count {
            let idx = (rng.gen_range(0..nx), rng.gen_range(0..ny), rng.gen_range(0..nz));
            self.blocks[idx] = Some(block);
        }
    }

    /// Number of occupied cells
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }
}

impl WorldQuery for VoxelWorld {
    fn block_at(&self, cell: CellPos) -> Option<BlockObservation> {
        self.index(cell).and_then(|idx| self.blocks[idx])
    }

    fn agent_position(&self) -> Position {
        self.agent
    }
}
