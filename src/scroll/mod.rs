//! Virtual scrolling: range strategies and the per-axis scroll controller

mod controller;
mod strategy;

pub use controller::VirtualScrollController;
pub use strategy::{
    AdaptiveBuffer, AutoStrategy, FixedBuffer, ScrollRange, ScrollStrategy, StrategyKind,
    DEFAULT_AUTO_THRESHOLD, DEFAULT_BUFFER, SPEED_SAMPLES,
};
