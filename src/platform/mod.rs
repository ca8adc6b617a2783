//! Browser platform layer
//!
//! Everything that touches the page lives here: the DOM view that mirrors
//! the simulation state, and helpers shared by the entry point.

pub mod dom;

pub use dom::DomView;
