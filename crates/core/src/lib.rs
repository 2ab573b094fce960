//! Pure data model for the outboard execution bridge.
//!
//! Everything in this crate is plain data with no I/O: the host's item
//! type ([`item::Item`]), the context bundle serialized across the
//! process boundary ([`bundle::ContextBundle`]), and the execution mode
//! selector ([`mode::ExecutionMode`]). The bridge crate owns all process
//! and filesystem concerns.

pub mod bundle;
pub mod item;
pub mod mode;

pub use bundle::ContextBundle;
pub use item::{Item, NodeOutputs, PairedItem};
pub use mode::ExecutionMode;
