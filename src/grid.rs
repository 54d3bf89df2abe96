//! 2D grid storage and the tile map
//!
//! `Grid<T>` is the flat row-major buffer shared by the generator's working
//! copies and the final map of tile ids. `TileMap` pairs a `Grid<i32>` with
//! the tile hierarchy that describes what the ids mean.

use std::fmt;

use crate::tile::TileNode;

/// A bounded 2D grid addressed by (row, col).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Grid<T> {
    pub rows: usize,
    pub cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new_with(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "coordinate ({}, {}) out of bounds for {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[self.index(row, col)]
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        let idx = self.index(row, col);
        &mut self.data[idx]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Iterate over all cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let row = idx / self.cols;
            let col = idx % self.cols;
            (row, col, val)
        })
    }
}

/// Validation failure when constructing a [`TileMap`].
#[derive(Clone, Debug, PartialEq)]
pub enum TileMapError {
    /// Maps must be at least 1x1.
    InvalidDimensions { rows: usize, cols: usize },
}

impl fmt::Display for TileMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileMapError::InvalidDimensions { rows, cols } => {
                write!(f, "can't create map of size {}x{}", rows, cols)
            }
        }
    }
}

impl std::error::Error for TileMapError {}

/// A map of tile ids plus the hierarchy that defines them.
///
/// Every cell starts as the root tile's id (the background); the generator
/// then carves the child categories out of it in place.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileMap {
    grid: Grid<i32>,
    tiles: TileNode,
}

impl TileMap {
    pub fn new(rows: usize, cols: usize, tiles: TileNode) -> Result<Self, TileMapError> {
        if rows < 1 || cols < 1 {
            return Err(TileMapError::InvalidDimensions { rows, cols });
        }
        let background = tiles.tile().id();
        Ok(Self {
            grid: Grid::new_with(rows, cols, background),
            tiles,
        })
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    pub fn cell_at(&self, row: usize, col: usize) -> i32 {
        *self.grid.get(row, col)
    }

    pub fn grid(&self) -> &Grid<i32> {
        &self.grid
    }

    pub fn tiles(&self) -> &TileNode {
        &self.tiles
    }

    pub fn background_id(&self) -> i32 {
        self.tiles.tile().id()
    }

    /// Replace the id grid without touching the hierarchy.
    pub fn update_map(&mut self, grid: Grid<i32>) {
        self.grid = grid;
    }

    /// Replace the hierarchy without touching the id grid.
    pub fn update_tiles(&mut self, tiles: TileNode) {
        self.tiles = tiles;
    }

    /// Split into the owned grid and hierarchy for generation.
    pub fn into_parts(self) -> (Grid<i32>, TileNode) {
        (self.grid, self.tiles)
    }

    /// Reassemble a map from parts produced by [`TileMap::into_parts`].
    pub fn from_parts(grid: Grid<i32>, tiles: TileNode) -> Self {
        Self { grid, tiles }
    }
}
