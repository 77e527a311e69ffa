//! View layer: pixel surface, text, layout, painting and hit-testing

pub mod cache;
pub mod frame;
pub mod hit_test;
pub mod layout;
pub mod renderer;
pub mod surface;
pub mod text;

pub use cache::{Cell, CellRef, GeometryCache, HeaderCell};
pub use frame::{blend_colors, Frame};
pub use hit_test::{hit_test, hit_test_grid, hit_test_header, HitTarget};
pub use layout::{ColumnLayout, ColumnSlot};
pub use renderer::{FrameRenderer, GridMetrics, RenderParams};
pub use surface::PixelSurface;
pub use text::{fit_text, FontdueText, GlyphCache, MonospaceText, TextRenderer, ELLIPSIS};
