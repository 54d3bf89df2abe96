//! Hierarchical tile map generation library
//!
//! Fills a rectangular grid with nested categorical regions (ocean -> land ->
//! forest -> lake). Each child category claims a fraction of its parent's
//! footprint as a set of non-touching islands. Re-exports modules for use by
//! the binary and tools.

pub mod ascii;
pub mod export;
pub mod generator;
pub mod grid;
pub mod io;
pub mod tile;
