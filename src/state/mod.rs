/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The grid assignment (grid.rs)
/// - The drag gesture in progress (drag.rs)
/// - Image load tracking (images.rs)

pub mod data;
pub mod drag;
pub mod grid;
pub mod images;
