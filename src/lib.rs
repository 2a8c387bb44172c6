#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod drag;
pub mod engine;
pub mod layout;
pub mod offsets;
pub mod outline;
pub mod render;
pub mod text_metrics;
pub mod theme;

pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use drag::Pointer;
pub use engine::{EngineError, LayoutEngine};
pub use layout::{Edge, Node, NodeId, Scene, Viewport};
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
