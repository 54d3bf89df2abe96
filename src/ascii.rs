//! Text rendering and export for tile maps
//!
//! Renders the tile hierarchy and the id grid as plain text for terminal
//! display, and exports the same view to a file with a small header.

use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::grid::{Grid, TileMap};
use crate::tile::TileNode;

/// The hierarchy listing, one tile per line, children indented under parents.
pub fn tiles_tree_string(node: &TileNode) -> String {
    fn walk(node: &TileNode, depth: usize, out: &mut String) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&"\t".repeat(depth));
        out.push_str(&node.tile().to_string());
        for child in node.children() {
            walk(child, depth + 1, out);
        }
    }
    let mut out = String::new();
    walk(node, 0, &mut out);
    out
}

/// The id grid as rows of space-separated, width-padded ids.
pub fn id_grid_string(grid: &Grid<i32>) -> String {
    let mut out = String::new();
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            out.push_str(&format!("{:<2} ", grid.get(row, col)));
        }
        out.push('\n');
    }
    out
}

/// Full text representation: the hierarchy followed by the id grid.
pub fn map_to_string(map: &TileMap) -> String {
    let mut out = tiles_tree_string(map.tiles());
    out.push('\n');
    out.push_str(&id_grid_string(map.grid()));
    out
}

/// Export the text representation to a file with a generation header.
pub fn save_text(map: &TileMap, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "=== TILE MAP ===")?;
    writeln!(file, "Size: {}x{}", map.rows(), map.cols())?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;
    write!(file, "{}", map_to_string(map))?;
    Ok(())
}
