//! PNG export for tile maps
//!
//! Draws each grid cell as a colored square with a thin black outline. Cell
//! colors come from the hierarchy's display tokens; tokens the exporter does
//! not understand, and ids with no tile definition, render white.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::grid::TileMap;

const OUTLINE: [u8; 3] = [0, 0, 0];
const FALLBACK: [u8; 3] = [255, 255, 255];

/// Export the map as a PNG with `tile_size` x `tile_size` pixels per cell.
pub fn export_map_image(
    map: &TileMap,
    path: &str,
    tile_size: u32,
) -> Result<(), image::ImageError> {
    let tile_size = tile_size.max(1);
    let colors = map.tiles().color_map();
    let width = map.cols() as u32 * tile_size;
    let height = map.rows() as u32 * tile_size;
    let mut img: RgbImage = ImageBuffer::new(width, height);

    for row in 0..map.rows() {
        for col in 0..map.cols() {
            let id = map.cell_at(row, col);
            let fill = colors
                .get(&id)
                .and_then(|token| parse_color(token))
                .unwrap_or(FALLBACK);

            for dy in 0..tile_size {
                for dx in 0..tile_size {
                    let edge =
                        dy == 0 || dx == 0 || dy == tile_size - 1 || dx == tile_size - 1;
                    let color = if edge { OUTLINE } else { fill };
                    img.put_pixel(
                        col as u32 * tile_size + dx,
                        row as u32 * tile_size + dy,
                        Rgb(color),
                    );
                }
            }
        }
    }

    img.save(path)
}

/// Parse a display color token: `#rgb`, `#rrggbb` or a known color name.
pub fn parse_color(token: &str) -> Option<[u8; 3]> {
    let token = token.trim();
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex);
    }
    let named = match token.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" => [0, 255, 255],
        "magenta" => [255, 0, 255],
        "orange" => [255, 165, 0],
        "brown" => [165, 42, 42],
        "gray" | "grey" => [128, 128, 128],
        "darkgreen" => [0, 100, 0],
        "navy" => [0, 0, 128],
        "sand" => [194, 178, 128],
        _ => return None,
    };
    Some(named)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(rgb)
        }
        6 => {
            let mut rgb = [0u8; 3];
            for i in 0..3 {
                rgb[i] = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
            }
            Some(rgb)
        }
        _ => None,
    }
}
