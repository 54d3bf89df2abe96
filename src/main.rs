use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod ascii;
mod export;
mod generator;
mod grid;
mod io;
mod tile;

use grid::TileMap;
use tile::{Tile, TileError, TileNode};

#[derive(Parser, Debug)]
#[command(name = "tilemap_generator")]
#[command(about = "Generate hierarchical tile maps with non-touching islands")]
struct Args {
    /// Map width in tiles
    #[arg(short = 'W', long, default_value = "48")]
    width: usize,

    /// Map height in tiles
    #[arg(short = 'H', long, default_value = "32")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Export the map to a PNG at this path
    #[arg(short, long)]
    out: Option<String>,

    /// Pixels per tile in the PNG export
    #[arg(long, default_value = "10")]
    tile_size: u32,

    /// Print the map as text to stdout
    #[arg(long)]
    text: bool,

    /// Save the map (grid and hierarchy) to a JSON file
    #[arg(long)]
    save: Option<String>,

    /// Load a previously saved map instead of generating one
    #[arg(long)]
    load: Option<String>,
}

/// The built-in hierarchy used when no map is loaded:
/// ocean -> land -> { forest, lake }.
fn demo_hierarchy() -> Result<TileNode, TileError> {
    let ocean = Tile::new(0, "ocean", "navy", 0.0, 1)?;
    let land = Tile::new(1, "land", "green", 0.4, 3)?;
    let forest = Tile::new(2, "forest", "darkgreen", 0.3, 2)?;
    let lake = Tile::new(3, "lake", "cyan", 0.1, 1)?;

    Ok(TileNode::with_children(
        ocean,
        vec![TileNode::with_children(
            land,
            vec![TileNode::new(forest), TileNode::new(lake)],
        )],
    ))
}

/// Cell counts per tile category, in hierarchy order.
fn tile_counts(map: &TileMap) -> Vec<(String, usize)> {
    fn ids(node: &TileNode, out: &mut Vec<(i32, String)>) {
        out.push((node.tile().id(), node.tile().name().to_string()));
        for child in node.children() {
            ids(child, out);
        }
    }
    let mut pairs = Vec::new();
    ids(map.tiles(), &mut pairs);
    pairs
        .into_iter()
        .map(|(id, name)| {
            let count = map.grid().iter().filter(|&(_, _, &v)| v == id).count();
            (name, count)
        })
        .collect()
}

fn main() {
    let args = Args::parse();

    let map = if let Some(ref path) = args.load {
        match io::load_map(path) {
            Ok(map) => {
                println!("Loaded {}x{} map from {}", map.rows(), map.cols(), path);
                map
            }
            Err(e) => {
                eprintln!("Failed to load map: {}", e);
                return;
            }
        }
    } else {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        println!("Generating tile map with seed: {}", seed);
        println!("Map size: {}x{}", args.width, args.height);

        let tiles = match demo_hierarchy() {
            Ok(tiles) => tiles,
            Err(e) => {
                eprintln!("Invalid tile definition: {}", e);
                return;
            }
        };
        let map = match TileMap::new(args.height, args.width, tiles) {
            Ok(map) => map,
            Err(e) => {
                eprintln!("Failed to create map: {}", e);
                return;
            }
        };

        let map = generator::generate_map(map, &mut rng);
        let total = (args.width * args.height) as f64;
        for (name, count) in tile_counts(&map) {
            println!("  {:10} {:>6} tiles ({:.1}%)", name, count, 100.0 * count as f64 / total);
        }
        map
    };

    if args.text {
        println!("{}", ascii::map_to_string(&map));
    }

    if let Some(ref path) = args.save {
        match io::save_map(&map, path) {
            Ok(()) => println!("Saved map to: {}", path),
            Err(e) => eprintln!("Failed to save map: {}", e),
        }
    }

    if let Some(ref path) = args.out {
        match export::export_map_image(&map, path, args.tile_size) {
            Ok(()) => println!("Exported map image to: {}", path),
            Err(e) => eprintln!("Failed to export map image: {}", e),
        }
    }
}
