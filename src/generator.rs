//! Map generation engine
//!
//! Walks the tile hierarchy depth-first and grows each child category as a
//! set of non-touching islands inside its parent's footprint. Growth happens
//! on a padded working copy of the grid where everything that is not the
//! current parent id is masked out; only the newly grown child cells are
//! merged back, so previously finalized categories are never disturbed.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Grid, TileMap};
use crate::tile::TileNode;

/// Sentinel marking cells a working grid may not grow into.
pub const MASKED: i32 = -1;

/// Upper bound (exclusive) on the random weights used to split a fill
/// fraction across islands. The largest island can be up to this many times
/// bigger than the smallest.
const SIZE_SPREAD: i32 = 5;

/// Neighborhood selection for [`adjacent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjacency {
    /// Up, right, left, down.
    Sides,
    /// Up-right, up-left, down-right, down-left.
    Corners,
    /// Sides followed by corners.
    All,
}

const SIDES: [(i32, i32); 4] = [(-1, 0), (0, 1), (0, -1), (1, 0)];
const CORNERS: [(i32, i32); 4] = [(-1, 1), (-1, -1), (1, 1), (1, -1)];
const ALL: [(i32, i32); 8] = [
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 1),
    (-1, -1),
    (1, 1),
    (1, -1),
];

/// Coordinates adjacent to `coord`, in a fixed enumeration order.
///
/// The caller must not be on the outer edge of its grid; the working grids
/// used during growth guarantee this through their sentinel padding.
pub fn adjacent(coord: (usize, usize), mode: Adjacency) -> Vec<(usize, usize)> {
    let offsets: &[(i32, i32)] = match mode {
        Adjacency::Sides => &SIDES,
        Adjacency::Corners => &CORNERS,
        Adjacency::All => &ALL,
    };
    offsets
        .iter()
        .map(|&(dr, dc)| {
            (
                (coord.0 as i64 + dr as i64) as usize,
                (coord.1 as i64 + dc as i64) as usize,
            )
        })
        .collect()
}

/// Generate every category of the map's hierarchy onto its grid.
///
/// Children are processed in list order and each child's own subtree is fully
/// generated before its next sibling, so earlier siblings shrink the
/// footprint available to later ones. Cells are never reassigned once
/// claimed.
pub fn generate_map<R: Rng>(map: TileMap, rng: &mut R) -> TileMap {
    let (grid, tiles) = map.into_parts();
    let grid = expand(grid, &tiles, rng);
    TileMap::from_parts(grid, tiles)
}

/// Grow each child of `node` inside `node`'s footprint, recursing depth-first.
fn expand<R: Rng>(mut grid: Grid<i32>, node: &TileNode, rng: &mut R) -> Grid<i32> {
    let parent_id = node.tile().id();
    for child in node.children() {
        let tile = child.tile();
        let growth = BorderGrowth::new(&grid, parent_id);
        grid = growth.generate_tile(grid, tile.id(), tile.fill(), tile.islands(), rng);
        grid = expand(grid, child, rng);
    }
    grid
}

/// Grows islands of one child id on one parent id.
///
/// Owns a working copy of the grid padded with a one-cell [`MASKED`] border
/// and with every non-parent cell masked, so growth can index neighbors
/// without bounds checks and can never escape the parent's footprint.
pub struct BorderGrowth {
    map: Grid<i32>,
    parent_id: i32,
}

impl BorderGrowth {
    pub fn new(grid: &Grid<i32>, parent_id: i32) -> Self {
        let mut map = Grid::new_with(grid.rows + 2, grid.cols + 2, MASKED);
        for (row, col, &id) in grid.iter() {
            if id == parent_id {
                map.set(row + 1, col + 1, id);
            }
        }
        Self { map, parent_id }
    }

    /// Grow up to `islands` islands of `child_id` totalling roughly
    /// `fill` of the parent's current footprint, then merge them onto `grid`.
    ///
    /// Island count takes priority over fill: when the frontier runs dry an
    /// island simply ends up smaller than requested. Degenerate inputs
    /// (non-positive island count, zero fill, no parent cells) place nothing.
    pub fn generate_tile<R: Rng>(
        mut self,
        mut grid: Grid<i32>,
        child_id: i32,
        fill: f64,
        islands: i32,
        rng: &mut R,
    ) -> Grid<i32> {
        // Fixed before any island is grown; later islands compete for the
        // shrinking remainder but their budgets do not.
        let parent_cells = self.coordinates_of(self.parent_id).len();

        for island_fill in fill_per_island(fill, islands, rng) {
            self.apply_mask(child_id);
            let tiles_to_place = (parent_cells as f64 * island_fill).floor() as usize;
            self.generate_island(tiles_to_place, child_id, rng);
        }

        for row in 0..grid.rows {
            for col in 0..grid.cols {
                if *self.map.get(row + 1, col + 1) == child_id {
                    grid.set(row, col, child_id);
                }
            }
        }
        grid
    }

    /// Mask every cell around existing `child_id` islands so the next island
    /// cannot grow adjacent (even diagonally) to them.
    fn apply_mask(&mut self, child_id: i32) {
        for coord in self.coordinates_of(child_id) {
            for (row, col) in adjacent(coord, Adjacency::All) {
                if *self.map.get(row, col) != child_id {
                    self.map.set(row, col, MASKED);
                }
            }
        }
    }

    /// Grow one island of `tiles_to_place` cells from a random seed.
    ///
    /// The frontier holds island cells that still border at least one parent
    /// cell; growth claims a random parent neighbor of a random frontier
    /// cell. An empty frontier ends the island early with fewer cells.
    fn generate_island<R: Rng>(&mut self, tiles_to_place: usize, child_id: i32, rng: &mut R) {
        if tiles_to_place == 0 {
            return;
        }
        let candidates = self.coordinates_of(self.parent_id);
        let seed = match candidates.choose(rng) {
            Some(&coord) => coord,
            None => return,
        };
        self.map.set(seed.0, seed.1, child_id);
        let mut frontier = vec![seed];

        for _ in 0..tiles_to_place - 1 {
            let claimed = loop {
                if frontier.is_empty() {
                    return;
                }
                let idx = rng.gen_range(0..frontier.len());
                let options: Vec<(usize, usize)> = adjacent(frontier[idx], Adjacency::Sides)
                    .into_iter()
                    .filter(|&(row, col)| *self.map.get(row, col) == self.parent_id)
                    .collect();
                match options.choose(rng) {
                    Some(&coord) => break coord,
                    // Stale frontier entry with nothing left to claim.
                    None => {
                        frontier.swap_remove(idx);
                    }
                }
            };
            self.map.set(claimed.0, claimed.1, child_id);

            let neighbors = adjacent(claimed, Adjacency::Sides);
            frontier
                .retain(|&coord| !neighbors.contains(&coord) || self.is_border_cell(coord));
            if self.is_border_cell(claimed) {
                frontier.push(claimed);
            }
        }
    }

    /// Whether the cell still has at least one parent neighbor to grow into.
    fn is_border_cell(&self, coord: (usize, usize)) -> bool {
        adjacent(coord, Adjacency::Sides)
            .into_iter()
            .any(|(row, col)| *self.map.get(row, col) == self.parent_id)
    }

    /// Coordinates of every working cell equal to `id`, in row-major order.
    fn coordinates_of(&self, id: i32) -> Vec<(usize, usize)> {
        self.map
            .iter()
            .filter(|&(_, _, &value)| value == id)
            .map(|(row, col, _)| (row, col))
            .collect()
    }
}

/// Split `fill` across `islands` islands with randomized proportions.
///
/// Draws one weight per island from `[1, SIZE_SPREAD)` and normalizes, so
/// island sizes vary but always sum to the requested fill. A non-positive
/// island count yields no islands.
fn fill_per_island<R: Rng>(fill: f64, islands: i32, rng: &mut R) -> Vec<f64> {
    if islands <= 0 {
        return Vec::new();
    }
    let sizes: Vec<i32> = (0..islands).map(|_| rng.gen_range(1..SIZE_SPREAD)).collect();
    let total: i32 = sizes.iter().sum();
    sizes
        .iter()
        .map(|&size| size as f64 / total as f64 * fill)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::tile::{Tile, TileNode};

    fn tile(id: i32, fill: f64, islands: i32) -> Tile {
        Tile::new(id, format!("t{}", id), "red", fill, islands).unwrap()
    }

    fn node(id: i32, fill: f64, islands: i32) -> TileNode {
        TileNode::new(tile(id, fill, islands))
    }

    fn grid_from(rows: &[[i32; 4]]) -> Grid<i32> {
        let mut grid = Grid::new_with(rows.len(), 4, 0);
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                grid.set(r, c, v);
            }
        }
        grid
    }

    fn count_cells(grid: &Grid<i32>, id: i32) -> usize {
        grid.iter().filter(|&(_, _, &v)| v == id).count()
    }

    /// Number of maximal connected components of `id`, 4- or 8-connected.
    fn count_components(grid: &Grid<i32>, id: i32, diagonals: bool) -> usize {
        let mut visited = Grid::new_with(grid.rows, grid.cols, false);
        let mut components = 0;
        for (row, col, &v) in grid.iter() {
            if v != id || *visited.get(row, col) {
                continue;
            }
            components += 1;
            let mut queue = VecDeque::new();
            queue.push_back((row, col));
            visited.set(row, col, true);
            while let Some((r, c)) = queue.pop_front() {
                let offsets: &[(i32, i32)] = if diagonals { &ALL } else { &SIDES };
                for &(dr, dc) in offsets {
                    let nr = r as i32 + dr;
                    let nc = c as i32 + dc;
                    if nr < 0 || nc < 0 || nr as usize >= grid.rows || nc as usize >= grid.cols {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if *grid.get(nr, nc) == id && !*visited.get(nr, nc) {
                        visited.set(nr, nc, true);
                        queue.push_back((nr, nc));
                    }
                }
            }
        }
        components
    }

    #[test]
    fn test_adjacent_sides() {
        assert_eq!(
            adjacent((1, 2), Adjacency::Sides),
            vec![(0, 2), (1, 3), (1, 1), (2, 2)]
        );
    }

    #[test]
    fn test_adjacent_corners() {
        assert_eq!(
            adjacent((1, 2), Adjacency::Corners),
            vec![(0, 3), (0, 1), (2, 3), (2, 1)]
        );
    }

    #[test]
    fn test_adjacent_all() {
        let all = adjacent((3, 3), Adjacency::All);
        assert_eq!(all.len(), 8);
        assert_eq!(&all[..4], &adjacent((3, 3), Adjacency::Sides)[..]);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_fill_per_island() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let fills = fill_per_island(0.2, 3, &mut rng);
        assert_eq!(fills.len(), 3);
        assert!((fills.iter().sum::<f64>() - 0.2).abs() < 1e-9);
        assert!(fills.iter().all(|&f| f > 0.0));
    }

    #[test]
    fn test_fill_per_island_degenerate_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(fill_per_island(0.5, 0, &mut rng).is_empty());
        assert!(fill_per_island(0.5, -2, &mut rng).is_empty());
    }

    #[test]
    fn test_working_grid_masks_non_parent() {
        let grid = grid_from(&[[0, 0, 1, 2], [3, 4, 1, 3], [8, 3, 4, 1]]);
        let growth = BorderGrowth::new(&grid, 1);
        assert_eq!(
            growth.coordinates_of(1),
            vec![(1, 3), (2, 3), (3, 4)]
        );
        // Everything else, border included, is the sentinel.
        assert_eq!(count_cells(&growth.map, MASKED), 5 * 6 - 3);
    }

    #[test]
    fn test_border_cell_check() {
        let grid = grid_from(&[[0, 0, 1, 2], [3, 4, 1, 3], [8, 3, 4, 1]]);
        let growth = BorderGrowth::new(&grid, 0);
        assert!(growth.is_border_cell((2, 2)));
        assert!(!growth.is_border_cell((3, 3)));
    }

    #[test]
    fn test_mask_builds_moat() {
        let grid = grid_from(&[[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let mut growth = BorderGrowth::new(&grid, 0);
        growth.map.set(2, 2, 5);
        growth.apply_mask(5);
        assert_eq!(*growth.map.get(2, 2), 5);
        for (row, col) in adjacent((2, 2), Adjacency::All) {
            assert_eq!(*growth.map.get(row, col), MASKED);
        }
        // Cells outside the moat stay eligible.
        assert_eq!(*growth.map.get(2, 4), 0);
        assert_eq!(*growth.map.get(3, 4), 0);
    }

    #[test]
    fn test_merge_keeps_other_categories() {
        let grid = grid_from(&[[0, 0, 9, 9], [0, 0, 9, 9], [0, 0, 0, 0]]);
        let before = grid.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let growth = BorderGrowth::new(&grid, 0);
        let result = growth.generate_tile(grid, 1, 0.5, 1, &mut rng);
        for (row, col, &v) in result.iter() {
            if v == 1 {
                assert_eq!(*before.get(row, col), 0);
            } else {
                assert_eq!(v, *before.get(row, col));
            }
        }
    }

    #[test]
    fn test_island_count_and_separation() {
        let root = TileNode::with_children(tile(0, 0.0, 1), vec![node(1, 0.4, 3)]);
        let map = TileMap::new(12, 12, root).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let map = generate_map(map, &mut rng);

        let grid = map.grid();
        assert!(count_cells(grid, 1) <= (144.0_f64 * 0.4).floor() as usize);
        let islands = count_components(grid, 1, false);
        assert!(islands >= 1 && islands <= 3);
        // Diagonal adjacency between islands would merge components under
        // 8-connectivity.
        assert_eq!(count_components(grid, 1, true), islands);
    }

    #[test]
    fn test_determinism_under_fixed_seed() {
        let root = TileNode::with_children(
            tile(0, 0.0, 1),
            vec![TileNode::with_children(tile(1, 0.6, 2), vec![node(2, 0.3, 2)])],
        );
        let run = |seed: u64| {
            let map = TileMap::new(10, 14, root.clone()).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            generate_map(map, &mut rng)
        };
        assert_eq!(run(99).grid(), run(99).grid());
    }

    #[test]
    fn test_full_fill_covers_grid() {
        let root = TileNode::with_children(tile(0, 0.0, 1), vec![node(1, 1.0, 1)]);
        let map = TileMap::new(3, 4, root).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let map = generate_map(map, &mut rng);
        assert_eq!(count_cells(map.grid(), 1), 12);
    }

    #[test]
    fn test_siblings_claim_disjoint_footprints() {
        let root =
            TileNode::with_children(tile(0, 0.0, 1), vec![node(1, 0.5, 1), node(2, 0.5, 1)]);
        let map = TileMap::new(4, 4, root).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let map = generate_map(map, &mut rng);

        let grid = map.grid();
        // First child always reaches its full budget on an open grid.
        assert_eq!(count_cells(grid, 1), 8);
        // Second child's budget is half of the 8 cells left to it.
        let second = count_cells(grid, 2);
        assert!(second >= 1 && second <= 4);
        assert!(grid.iter().all(|(_, _, &v)| v == 0 || v == 1 || v == 2));
    }

    #[test]
    fn test_zero_islands_changes_nothing() {
        let root = TileNode::with_children(tile(0, 0.0, 1), vec![node(1, 0.5, 0)]);
        let map = TileMap::new(5, 5, root).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let map = generate_map(map, &mut rng);
        assert_eq!(count_cells(map.grid(), 1), 0);
    }

    #[test]
    fn test_zero_fill_changes_nothing() {
        let root = TileNode::with_children(tile(0, 0.0, 1), vec![node(1, 0.0, 2)]);
        let map = TileMap::new(5, 5, root).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let map = generate_map(map, &mut rng);
        assert_eq!(count_cells(map.grid(), 1), 0);
    }

    #[test]
    fn test_empty_parent_footprint_changes_nothing() {
        let root = TileNode::with_children(tile(0, 0.0, 1), vec![node(1, 0.5, 1)]);
        let mut map = TileMap::new(3, 3, root).unwrap();
        map.update_map(Grid::new_with(3, 3, 9));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let map = generate_map(map, &mut rng);
        assert_eq!(count_cells(map.grid(), 9), 9);
    }

    #[test]
    fn test_nested_child_stays_inside_parent() {
        let root = TileNode::with_children(
            tile(0, 0.0, 1),
            vec![TileNode::with_children(tile(1, 0.5, 1), vec![node(2, 0.5, 1)])],
        );
        let map = TileMap::new(8, 8, root).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let map = generate_map(map, &mut rng);

        let grid = map.grid();
        let ones = count_cells(grid, 1);
        let twos = count_cells(grid, 2);
        assert!(twos >= 1);
        // Grandchild cells were carved out of the child's footprint.
        assert!(ones + twos <= (64.0_f64 * 0.5).floor() as usize);
        // The grandchild forms one island inside or at the edge of id 1.
        assert_eq!(count_components(grid, 2, false), 1);
    }
}
