#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod controller;
pub mod ir;
pub mod layout;
pub mod parser;
pub mod playback;
pub mod render;
pub mod theme;
pub mod traversal;

pub use command::{HighlightRole, RenderCommand};
pub use config::{Config, LayoutConfig, PlaybackConfig, RenderConfig, load_config};
pub use controller::{TraversalController, TraversalState};
pub use ir::{HighlightState, Node, NodeId, NodeKind, NodeStatus, Tree};
pub use layout::{Layout, compute_layout};
pub use parser::{TreeError, parse_tree};
pub use playback::Playback;
pub use render::{render_svg, write_output_svg};
pub use theme::Theme;
pub use traversal::{Phase, TraversalMode};

#[cfg(feature = "cli")]
pub use cli::run;
