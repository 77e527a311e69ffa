//! Runtime module - winit/platform integration
//!
//! - `app` - ApplicationHandler, window and softbuffer presentation
//! - `input` - Keyboard event to viewer action mapping

pub mod app;
pub mod input;

pub use app::App;
