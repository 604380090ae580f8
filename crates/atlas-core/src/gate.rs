//! The submission gate: coordinate in, accept/reject decision out.
//!
//! The gate is a pure decision. It never opens forms, shows alerts, or
//! touches the feature store; callers act on the returned
//! [`GateDecision`]. Missing validation data always fails closed.

use atlas_geo::{BoundaryRegistry, ContainmentOracle, GeoContainment};
use atlas_types::{Coordinate, GateDecision, RejectionReason, SubmissionAttempt};
use tracing::{debug, warn};

/// Decides whether a clicked coordinate may become a new point.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionGate<'a, O = GeoContainment> {
    registry: &'a BoundaryRegistry,
    oracle: O,
}

impl<'a> SubmissionGate<'a> {
    /// Create a gate over `registry` using the `geo`-backed oracle.
    pub const fn new(registry: &'a BoundaryRegistry) -> Self {
        Self {
            registry,
            oracle: GeoContainment,
        }
    }
}

impl<'a, O: ContainmentOracle> SubmissionGate<'a, O> {
    /// Create a gate with a custom containment oracle.
    pub const fn with_oracle(registry: &'a BoundaryRegistry, oracle: O) -> Self {
        Self { registry, oracle }
    }

    /// Evaluate `candidate` against the boundary registered as
    /// `boundary_name`.
    ///
    /// - Boundary not registered: `Rejected(BoundaryUnavailable)` for any
    ///   candidate, never accepted by default.
    /// - Invalid coordinate: `Rejected(InvalidCoordinate)`.
    /// - Inside: `Accepted`; otherwise `Rejected(OutsideBoundary)`.
    pub fn evaluate(&self, candidate: Coordinate, boundary_name: &str) -> GateDecision {
        let boundary = match self.registry.get(boundary_name) {
            Ok(boundary) => boundary,
            Err(e) => {
                warn!(
                    boundary = boundary_name,
                    error = %e,
                    "cannot validate submission, failing closed"
                );
                return GateDecision::Rejected(RejectionReason::BoundaryUnavailable);
            }
        };

        if !candidate.is_valid() {
            debug!(%candidate, "candidate rejected: invalid coordinate");
            return GateDecision::Rejected(RejectionReason::InvalidCoordinate);
        }

        let decision = if self.oracle.contains(candidate, boundary) {
            GateDecision::Accepted
        } else {
            GateDecision::Rejected(RejectionReason::OutsideBoundary)
        };
        debug!(
            boundary = boundary_name,
            %candidate,
            accepted = decision.is_accepted(),
            "gate evaluated"
        );
        decision
    }

    /// Evaluate and wrap the result as a [`SubmissionAttempt`].
    pub fn attempt(&self, candidate: Coordinate, boundary_name: &str) -> SubmissionAttempt {
        SubmissionAttempt {
            candidate,
            outcome: self.evaluate(candidate, boundary_name),
        }
    }
}
