//! Tile categories and the tile hierarchy
//!
//! A `Tile` describes one category of terrain (id, display color, how much of
//! its parent it should cover and in how many islands). `TileNode` arranges
//! tiles into the ordered tree that drives generation: child tiles are only
//! ever grown inside the footprint of their parent tile.

use std::collections::HashMap;
use std::fmt;

/// Validation failure when constructing a [`Tile`].
#[derive(Clone, Debug, PartialEq)]
pub enum TileError {
    /// Tile ids must be zero or positive (negative values are reserved for
    /// the generator's internal sentinel).
    InvalidId(i32),
    /// Fill must be a fraction in the range 0.0..=1.0.
    InvalidFill(f64),
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileError::InvalidId(id) => write!(f, "tile id cannot be negative: {}", id),
            TileError::InvalidFill(fill) => {
                write!(f, "fill value must be in range 0 to 1: {}", fill)
            }
        }
    }
}

impl std::error::Error for TileError {}

/// One tile category.
///
/// `color` is an opaque display token (a name like `"red"` or a hex string);
/// only the image exporter interprets it. `islands` is deliberately not
/// validated: zero or negative counts are accepted and simply generate
/// nothing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tile {
    id: i32,
    name: String,
    color: String,
    fill: f64,
    islands: i32,
}

impl Tile {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        color: impl Into<String>,
        fill: f64,
        islands: i32,
    ) -> Result<Self, TileError> {
        if id < 0 {
            return Err(TileError::InvalidId(id));
        }
        if !(0.0..=1.0).contains(&fill) {
            return Err(TileError::InvalidFill(fill));
        }
        Ok(Self {
            id,
            name: name.into(),
            color: color.into(),
            fill,
            islands,
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn fill(&self) -> f64 {
        self.fill
    }

    pub fn islands(&self) -> i32 {
        self.islands
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} - color: {}, fill: {}, islands: {}",
            self.id, self.name, self.color, self.fill, self.islands
        )
    }
}

/// A node of the tile hierarchy: one tile plus its ordered children.
///
/// The tree is acyclic by construction since children are only ever appended,
/// never re-parented. The root's tile is the map's background category.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileNode {
    tile: Tile,
    children: Vec<TileNode>,
}

impl TileNode {
    pub fn new(tile: Tile) -> Self {
        Self {
            tile,
            children: Vec::new(),
        }
    }

    pub fn with_children(tile: Tile, children: Vec<TileNode>) -> Self {
        Self { tile, children }
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    pub fn children(&self) -> &[TileNode] {
        &self.children
    }

    pub fn add_child(&mut self, child: TileNode) {
        self.children.push(child);
    }

    /// Depth-first list of tile names, this node first.
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![self.tile.name().to_string()];
        for child in &self.children {
            names.extend(child.names());
        }
        names
    }

    /// Depth-first list of `(id, color)` pairs, this node first.
    pub fn color_pairs(&self) -> Vec<(i32, String)> {
        let mut pairs = vec![(self.tile.id(), self.tile.color().to_string())];
        for child in &self.children {
            pairs.extend(child.color_pairs());
        }
        pairs
    }

    /// Map of tile id to display color for rendering.
    ///
    /// If two tiles share an id, the first one found depth-first wins.
    pub fn color_map(&self) -> HashMap<i32, String> {
        let mut colors = HashMap::new();
        for (id, color) in self.color_pairs() {
            colors.entry(id).or_insert(color);
        }
        colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TileNode {
        TileNode::with_children(
            Tile::new(0, "0", "red", 0.2, 1).unwrap(),
            vec![
                TileNode::new(Tile::new(1, "1", "green", 0.3, 2).unwrap()),
                TileNode::with_children(
                    Tile::new(2, "2", "blue", 0.2, 1).unwrap(),
                    vec![TileNode::new(Tile::new(3, "3", "red", 0.2, 1).unwrap())],
                ),
            ],
        )
    }

    #[test]
    fn test_tree_structure() {
        let tree = sample_tree();
        let first_child = tree.children()[0].tile();
        assert_eq!(first_child.id(), 1);
        assert_eq!(first_child.name(), "1");
        assert_eq!(first_child.color(), "green");
        assert_eq!(first_child.fill(), 0.3);
        assert_eq!(first_child.islands(), 2);
    }

    #[test]
    fn test_malformed_tile() {
        assert_eq!(
            Tile::new(-1, "", "red", 0.2, 1),
            Err(TileError::InvalidId(-1))
        );
        assert_eq!(
            Tile::new(0, "", "red", 1.2, 1),
            Err(TileError::InvalidFill(1.2))
        );
        assert_eq!(
            Tile::new(0, "", "red", -0.1, 1),
            Err(TileError::InvalidFill(-0.1))
        );
    }

    #[test]
    fn test_tile_display() {
        let tile = Tile::new(0, "n", "red", 0.2, 1).unwrap();
        assert_eq!(tile.to_string(), "0, n - color: red, fill: 0.2, islands: 1");
    }

    #[test]
    fn test_names_list() {
        assert_eq!(sample_tree().names(), vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn test_color_pairs() {
        let pairs = sample_tree().color_pairs();
        assert_eq!(
            pairs,
            vec![
                (0, "red".to_string()),
                (1, "green".to_string()),
                (2, "blue".to_string()),
                (3, "red".to_string()),
            ]
        );
    }

    #[test]
    fn test_first_color_wins_on_collision() {
        let tree = TileNode::with_children(
            Tile::new(0, "bg", "red", 0.2, 1).unwrap(),
            vec![TileNode::new(Tile::new(0, "dup", "blue", 0.2, 1).unwrap())],
        );
        assert_eq!(tree.color_map().get(&0), Some(&"red".to_string()));
    }

    #[test]
    fn test_islands_not_validated() {
        assert!(Tile::new(0, "x", "red", 0.2, 0).is_ok());
        assert!(Tile::new(0, "x", "red", 0.2, -3).is_ok());
    }
}
