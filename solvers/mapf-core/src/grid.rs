//! Grid and per-cell movement data.

/// A single cell in a grid map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    /// Agent can traverse this cell.
    Passable,
    /// Obstacle; agent cannot enter.
    Blocked,
}

/// One of the five unit-step operations a cell can perform in a single time
/// slice. Values match the `STAY=0, UP=1, DOWN=2, LEFT=3, RIGHT=4` wire
/// constants used by the output plan format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    Stay = 0,
    Up = 1,
    Down = 2,
    Left = 3,
    Right = 4,
}

impl Op {
    pub const ALL: [Op; 5] = [Op::Stay, Op::Up, Op::Down, Op::Left, Op::Right];

    /// `STAY↔STAY, UP↔DOWN, LEFT↔RIGHT`, defined exhaustively so adding a
    /// new `Op` variant is a compile error here until it's handled.
    pub fn opposite(self) -> Op {
        match self {
            Op::Stay => Op::Stay,
            Op::Up => Op::Down,
            Op::Down => Op::Up,
            Op::Left => Op::Right,
            Op::Right => Op::Left,
        }
    }

    /// `(dx, dy)` applied to a cell's `(x, y)` to reach the target of this op.
    fn delta(self) -> (i32, i32) {
        match self {
            Op::Stay => (0, 0),
            Op::Up => (-1, 0),
            Op::Down => (1, 0),
            Op::Left => (0, -1),
            Op::Right => (0, 1),
        }
    }
}

/// A rectangular `X × Y` grid of cells, plus the per-cell set of compatible
/// operations (the subset of `{STAY, UP, DOWN, LEFT, RIGHT}` whose target
/// cell is in-bounds and non-obstacle). `STAY` is always included for
/// non-obstacle cells.
#[derive(Debug, Clone)]
pub struct Grid {
    x: u32,
    y: u32,
    tiles: Vec<Tile>,
    compatible_ops: Vec<Vec<Op>>,
}

impl Grid {
    /// Build a grid from row-major obstacle data: `rows[x]` is a string of
    /// `y_dim` characters, `.` meaning passable and anything else obstacle.
    pub fn new(x_dim: u32, y_dim: u32, rows: &[Vec<bool>]) -> Self {
        debug_assert_eq!(rows.len(), x_dim as usize);
        let mut tiles = Vec::with_capacity((x_dim * y_dim) as usize);
        for row in rows {
            debug_assert_eq!(row.len(), y_dim as usize);
            for &passable in row {
                tiles.push(if passable { Tile::Passable } else { Tile::Blocked });
            }
        }
        let mut grid = Self {
            x: x_dim,
            y: y_dim,
            tiles,
            compatible_ops: Vec::new(),
        };
        grid.compatible_ops = grid.compute_compatible_ops();
        grid
    }

    fn compute_compatible_ops(&self) -> Vec<Vec<Op>> {
        let mut out = vec![Vec::new(); (self.x * self.y) as usize];
        for x in 0..self.x {
            for y in 0..self.y {
                if self.obstacle(x, y) {
                    continue;
                }
                let mut ops = vec![Op::Stay];
                for op in [Op::Up, Op::Down, Op::Left, Op::Right] {
                    if let Some((tx, ty)) = self.target(x, y, op) {
                        if !self.obstacle(tx, ty) {
                            ops.push(op);
                        }
                    }
                }
                out[self.index(x, y)] = ops;
            }
        }
        out
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (x * self.y + y) as usize
    }

    pub fn x_dim(&self) -> u32 {
        self.x
    }

    pub fn y_dim(&self) -> u32 {
        self.y
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.x && y < self.y
    }

    pub fn obstacle(&self, x: u32, y: u32) -> bool {
        match self.tiles.get(self.index(x, y)) {
            Some(Tile::Blocked) => true,
            Some(Tile::Passable) => false,
            None => true,
        }
    }

    /// The cell reached by applying `op` from `(x, y)`, or `None` if it
    /// would leave the grid. Does not check obstacle status of the target.
    pub fn target(&self, x: u32, y: u32, op: Op) -> Option<(u32, u32)> {
        let (dx, dy) = op.delta();
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let (nx, ny) = (nx as u32, ny as u32);
        if self.in_bounds(nx, ny) {
            Some((nx, ny))
        } else {
            None
        }
    }

    /// Compatible operations at `(x, y)`; empty for obstacle cells.
    pub fn compatible_ops(&self, x: u32, y: u32) -> &[Op] {
        self.compatible_ops.get(self.index(x, y)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate all non-obstacle cells.
    pub fn free_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.x).flat_map(move |x| (0..self.y).filter_map(move |y| (!self.obstacle(x, y)).then_some((x, y))))
    }
}
