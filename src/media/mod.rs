/// Image source module
///
/// - `loader.rs` - fetch (HTTP or disk) and decode image references
/// - `import.rs` - collect source images from a folder

pub mod import;
pub mod loader;
