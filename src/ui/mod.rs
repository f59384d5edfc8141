/// Views
///
/// - `source.rs` - tray of draggable source images
/// - `grid.rs` - the grid of drop frames

pub mod grid;
pub mod source;
