//! Value types shared across the engine.
//!
//! This module defines the **contract** between:
//! 1) folding rules into a segment map, and
//! 2) rendering a segment map into nested markup.
//!
//! Design goals:
//! - Plain immutable value types; no behavior beyond cheap queries.
//! - Stable JSON representation for on-disk inspection.
//! - Precise span offsets into the **raw input bytes** (no pre-normalization).
//! - Clear separation between *map construction* and *markup rendering*.

mod diagnostic;
mod envelope;
mod origin;
mod segment;
mod span;

pub use diagnostic::*;
pub use envelope::*;
pub use origin::*;
pub use segment::*;
pub use span::*;

/// JSON schema version for the map envelope.
///
/// Bump this when making non-backwards-compatible changes to the JSON structure.
pub const SCHEMA_VERSION: u32 = 1;

/// The tool name stored in the JSON envelope.
pub const TOOL_NAME: &str = "layermark";

/// The tool version stored in the JSON envelope.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
