pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod mutate;
pub mod parser;
pub mod remove;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use error::EditorError;
pub use ir::{Alternative, ContentNode, DEFAULT_END_SCENARIO, NodeKind};
pub use layout::{LayoutNode, TreeLayout, layout};
pub use mutate::{NodeDefaults, PlaceRequest, SpecificDefaults, place, replace};
pub use parser::{emit_content, parse_content, validate_graph};
pub use remove::{delete, remove};
pub use render::render_svg;
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
