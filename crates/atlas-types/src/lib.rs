//! Shared type definitions for the Sukabumi souvenir atlas.
//!
//! This crate is the single source of truth for the types exchanged between
//! the geometry layer, the submission core, and the map front-end. Types
//! flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- Categories, geometry kinds, and gate decisions
//! - [`structs`] -- Coordinates, points of interest, reviews, submission
//!   attempts

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Category, GateDecision, GeometryKind, RejectionReason, RouteKind};
pub use ids::PoiId;
pub use structs::{Coordinate, PointOfInterest, Review, SubmissionAttempt};
