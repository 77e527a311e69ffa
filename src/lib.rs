//! gridcanvas - a virtualized data-grid renderer
//!
//! Paints only the visible window of a large row set into a CPU pixel
//! buffer, keeps the geometry of every painted cell, and resolves pointer
//! input back to logical cells.
//!
//! ```text
//! raw rows ─► RowPipeline ─► VirtualScrollController ─► FrameRenderer
//!                                                          │
//!                      TableEvent ◄─ InteractionDispatcher ◄─ GeometryCache
//! ```

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod dataset;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod model;
pub mod pipeline;
pub mod scroll;
pub mod theme;
pub mod tracing;
pub mod view;

// Re-export commonly used types
pub use config::GridConfig;
pub use dispatch::PointerInput;
pub use error::{GridError, Result};
pub use events::{EventKind, TableEvent};
pub use grid::{GridUpdate, GridView, Viewport};
pub use theme::Theme;
