//! Configuration, feature store, and the boundary-gated submission flow for
//! the Sukabumi souvenir atlas.
//!
//! This crate turns loaded map layers into a working atlas: boundaries in a
//! registry, points of interest in a store, and a gate that decides whether
//! a clicked location may become a new point.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `atlas-config.yaml` into
//!   strongly-typed structs.
//! - [`gate`] -- [`SubmissionGate`], the accept/reject decision for a
//!   clicked coordinate.
//! - [`loader`] -- Async layer loading and [`Atlas`] assembly.
//! - [`notify`] -- [`NotificationSink`] trait and its log and collecting
//!   implementations.
//! - [`review`] -- [`ReviewBook`], visitor ratings and comments per place.
//! - [`store`] -- [`FeatureStore`], the in-memory point collection with
//!   case-insensitive unique names.
//! - [`submission`] -- [`SubmissionFlow`] and the validated
//!   [`SubmissionForm`].
//!
//! [`SubmissionGate`]: gate::SubmissionGate
//! [`Atlas`]: loader::Atlas
//! [`NotificationSink`]: notify::NotificationSink
//! [`ReviewBook`]: review::ReviewBook
//! [`FeatureStore`]: store::FeatureStore
//! [`SubmissionFlow`]: submission::SubmissionFlow
//! [`SubmissionForm`]: submission::SubmissionForm

pub mod config;
pub mod gate;
pub mod loader;
pub mod notify;
pub mod review;
pub mod store;
pub mod submission;
