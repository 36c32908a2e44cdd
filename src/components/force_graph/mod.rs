//! Force-directed view of a dominating-set instance.
//!
//! The layout engine ([`ForceLayoutEngine`]) owns the physics and reports to a
//! [`LayoutObserver`]; the canvas component keeps a scene fed by it and draws
//! nodes and links coloured by their [`Classification`].
//!
//! # Example
//!
//! ```ignore
//! view! {
//!     <ForceGraphCanvas graph=graph_view coverage=coverage strength=strength />
//! }
//! ```

mod component;
pub mod layout;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod types;

pub use component::ForceGraphCanvas;
pub use layout::{
	ForceLayoutEngine, LayoutFrame, LayoutObserver, LayoutParams, LayoutPhase, StrengthSlider,
	update_classification,
};
pub use state::{HoverState, Scene};
pub use theme::Theme;
pub use types::{Classification, GraphView, LinkClass, NodeClass, classify};
