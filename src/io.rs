//! Save and load of tile maps
//!
//! Serializes the whole map (grid plus hierarchy) to a versioned JSON file.
//! The version field exists so the format can evolve without silently
//! misreading old saves.

use std::fs;
use std::io;

use crate::grid::TileMap;

/// Wrapper for the on-disk format.
#[derive(serde::Serialize, serde::Deserialize)]
struct MapSaveFile {
    /// Format version for forward compatibility
    version: u32,
    map: TileMap,
}

const SAVE_VERSION: u32 = 1;
const EXTENSION: &str = ".json";

/// Save a map to a JSON file.
///
/// An empty path is a silent no-op (the editor passes one when a dialog is
/// cancelled). The `.json` extension is appended when missing.
pub fn save_map(map: &TileMap, path: &str) -> io::Result<()> {
    if path.is_empty() {
        return Ok(());
    }
    let save = MapSaveFile {
        version: SAVE_VERSION,
        map: map.clone(),
    };
    let text = serde_json::to_string_pretty(&save)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("serialization failed: {}", e)))?;
    fs::write(with_extension(path), text)
}

/// Load a map saved by [`save_map`].
pub fn load_map(path: &str) -> io::Result<TileMap> {
    let text = fs::read_to_string(path)?;
    let save: MapSaveFile = serde_json::from_str(&text).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("deserialization failed: {}", e),
        )
    })?;
    if save.version > SAVE_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "save file version {} is newer than supported version {}",
                save.version, SAVE_VERSION
            ),
        ));
    }
    Ok(save.map)
}

fn with_extension(path: &str) -> String {
    if path.ends_with(EXTENSION) {
        path.to_string()
    } else {
        format!("{}{}", path, EXTENSION)
    }
}
