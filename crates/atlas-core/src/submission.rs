//! The click-to-submit flow.
//!
//! A click is evaluated by the [`SubmissionGate`]. An accepted click becomes
//! the pending candidate and replaces any earlier one. A rejected click is
//! announced through the [`NotificationSink`] and leaves the pending
//! candidate alone. [`SubmissionFlow::finalize`] turns the pending
//! candidate and a validated [`SubmissionForm`] into a stored point.

use atlas_geo::ContainmentOracle;
use atlas_types::{Category, Coordinate, PointOfInterest, RejectionReason, SubmissionAttempt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::gate::SubmissionGate;
use crate::notify::NotificationSink;
use crate::store::{FeatureStore, StoreError};

/// Longest accepted image reference.
const MAX_IMAGE_LEN: usize = 2048;

/// Notice shown when the boundary has not been loaded.
const BOUNDARY_UNAVAILABLE_MESSAGE: &str =
    "⚠️ Batas wilayah belum tersedia, lokasi tidak dapat divalidasi.";

/// Notice shown for a coordinate outside the valid range.
const INVALID_COORDINATE_MESSAGE: &str = "⚠️ Koordinat tidak valid.";

/// Errors from finalizing a submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// `finalize` was called with no accepted candidate pending.
    #[error("no accepted location is pending")]
    NoPendingSubmission,

    /// The form failed validation.
    #[error("invalid submission form: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// The store refused the new point.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Fields the user fills in for a new location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SubmissionForm {
    /// Location name. Required.
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    /// Free-text description.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    /// Image URL or path.
    #[serde(default)]
    #[validate(custom(function = "validate_image"))]
    pub image: Option<String>,

    /// Category; souvenir shop when absent.
    #[serde(default)]
    pub category: Option<Category>,
}

impl SubmissionForm {
    /// Create a form with a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: None,
            category: None,
        }
    }

    /// Trim every text field and drop a blank image.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            image: self
                .image
                .map(|i| i.trim().to_owned())
                .filter(|i| !i.is_empty()),
            category: self.category,
        }
    }
}

/// An image reference is an `http(s)` URL or a relative path of
/// path-safe characters.
fn validate_image(image: &str) -> Result<(), ValidationError> {
    if image.len() > MAX_IMAGE_LEN {
        return Err(ValidationError::new("image_reference"));
    }
    let is_web = image.starts_with("http://") || image.starts_with("https://");
    if is_web && image.validate_url() {
        return Ok(());
    }
    let is_path = !is_web
        && !image.starts_with('/')
        && image.chars().any(|c| c.is_ascii_alphanumeric())
        && image
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'));
    if is_path {
        Ok(())
    } else {
        Err(ValidationError::new("image_reference"))
    }
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

/// State of one user's submission session.
#[derive(Debug, Clone)]
pub struct SubmissionFlow {
    boundary: String,
    outside_message: String,
    pending: Option<Coordinate>,
}

impl SubmissionFlow {
    /// Create a flow that validates against the boundary named `boundary`.
    pub fn new(boundary: impl Into<String>, outside_message: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            outside_message: outside_message.into(),
            pending: None,
        }
    }

    /// Name of the gating boundary.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The accepted candidate awaiting a form, if any.
    pub const fn pending(&self) -> Option<Coordinate> {
        self.pending
    }

    /// Handle a map click.
    pub fn click<O: ContainmentOracle>(
        &mut self,
        gate: &SubmissionGate<'_, O>,
        sink: &mut impl NotificationSink,
        candidate: Coordinate,
    ) -> SubmissionAttempt {
        let attempt = gate.attempt(candidate, &self.boundary);
        match attempt.outcome.rejection() {
            None => {
                if let Some(previous) = self.pending.replace(candidate) {
                    debug!(%previous, %candidate, "pending candidate superseded");
                }
            }
            Some(reason) => sink.notify_rejected(self.message_for(reason)),
        }
        attempt
    }

    /// Discard the pending candidate, returning it.
    pub const fn cancel(&mut self) -> Option<Coordinate> {
        self.pending.take()
    }

    /// Validate `form`, store the new point at the pending candidate, and
    /// clear the candidate.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::NoPendingSubmission`] with nothing pending.
    /// - [`SubmissionError::Invalid`] if the form fails validation.
    /// - [`SubmissionError::Store`] if the name is taken. The candidate
    ///   stays pending so another name can be tried.
    pub fn finalize(
        &mut self,
        form: SubmissionForm,
        store: &mut FeatureStore,
    ) -> Result<PointOfInterest, SubmissionError> {
        let location = self.pending.ok_or(SubmissionError::NoPendingSubmission)?;
        let form = form.normalized();
        form.validate()?;

        let poi = PointOfInterest::new(
            form.name,
            form.category.unwrap_or(Category::SouvenirShop),
            form.description,
            location,
        )
        .with_image(form.image);
        store.insert(poi.clone())?;
        self.pending = None;

        info!(name = %poi.name, category = %poi.category, %location, "location added");
        Ok(poi)
    }

    fn message_for(&self, reason: RejectionReason) -> &str {
        match reason {
            RejectionReason::OutsideBoundary => &self.outside_message,
            RejectionReason::BoundaryUnavailable => BOUNDARY_UNAVAILABLE_MESSAGE,
            RejectionReason::InvalidCoordinate => INVALID_COORDINATE_MESSAGE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atlas_geo::BoundaryRegistry;
    use atlas_types::GateDecision;

    use super::*;
    use crate::notify::CollectingNotificationSink;

    const CITY: &str = "Kota Sukabumi";
    const OUTSIDE: &str = "di luar";

    fn registry() -> BoundaryRegistry {
        let mut registry = BoundaryRegistry::new();
        registry
            .load(
                CITY,
                r#"{ "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]] }"#,
            )
            .unwrap();
        registry
    }

    #[test]
    fn form_validation() {
        assert!(SubmissionForm::new("Toko A", "").validate().is_ok());
        assert!(SubmissionForm::new("", "x").validate().is_err());
        assert!(SubmissionForm::new("a".repeat(121), "").validate().is_err());
        assert!(SubmissionForm::new("a", "d".repeat(1001)).validate().is_err());
    }

    #[test]
    fn image_must_be_web_url_or_relative_path() {
        let accepted = [
            "images/mocikas.jpg",
            "../JS/images/sari.jpg",
            "https://example.com/toko.jpg",
            "http://cdn.example.com/a/b.png",
        ];
        let rejected = [
            "???",
            "...",
            "images/toko a.jpg",
            "/etc/passwd",
            "ftp://example.com/a.jpg",
            "https://",
            "javascript:alert(1)",
        ];
        for image in accepted {
            let mut form = SubmissionForm::new("Toko A", "");
            form.image = Some(image.to_owned());
            assert!(form.validate().is_ok(), "{image}");
        }
        for image in rejected {
            let mut form = SubmissionForm::new("Toko A", "");
            form.image = Some(image.to_owned());
            assert!(form.validate().is_err(), "{image}");
        }
    }

    #[test]
    fn normalized_trims_and_drops_blank_image() {
        let mut form = SubmissionForm::new("  Toko A ", " enak ");
        form.image = Some(String::from("   "));
        let form = form.normalized();
        assert_eq!(form.name, "Toko A");
        assert_eq!(form.description, "enak");
        assert_eq!(form.image, None);
    }

    #[test]
    fn accepted_click_becomes_pending() {
        let registry = registry();
        let gate = SubmissionGate::new(&registry);
        let mut sink = CollectingNotificationSink::new();
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);

        let attempt = flow.click(&gate, &mut sink, Coordinate::new(5.0, 5.0));
        assert_eq!(attempt.outcome, GateDecision::Accepted);
        assert_eq!(flow.pending(), Some(Coordinate::new(5.0, 5.0)));
        assert!(sink.messages().is_empty());

        flow.click(&gate, &mut sink, Coordinate::new(6.0, 6.0));
        assert_eq!(flow.pending(), Some(Coordinate::new(6.0, 6.0)));
    }

    #[test]
    fn rejected_click_notifies_and_keeps_pending() {
        let registry = registry();
        let gate = SubmissionGate::new(&registry);
        let mut sink = CollectingNotificationSink::new();
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);

        flow.click(&gate, &mut sink, Coordinate::new(5.0, 5.0));
        let attempt = flow.click(&gate, &mut sink, Coordinate::new(50.0, 50.0));
        assert_eq!(
            attempt.outcome,
            GateDecision::Rejected(RejectionReason::OutsideBoundary)
        );
        assert_eq!(flow.pending(), Some(Coordinate::new(5.0, 5.0)));
        assert_eq!(sink.drain(), vec![OUTSIDE.to_owned()]);
    }

    #[test]
    fn missing_boundary_notifies_unavailable() {
        let registry = BoundaryRegistry::new();
        let gate = SubmissionGate::new(&registry);
        let mut sink = CollectingNotificationSink::new();
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);

        flow.click(&gate, &mut sink, Coordinate::new(5.0, 5.0));
        assert_eq!(flow.pending(), None);
        assert_eq!(sink.drain(), vec![BOUNDARY_UNAVAILABLE_MESSAGE.to_owned()]);
    }

    #[test]
    fn finalize_stores_and_clears() {
        let registry = registry();
        let gate = SubmissionGate::new(&registry);
        let mut sink = CollectingNotificationSink::new();
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);
        let mut store = FeatureStore::new();

        flow.click(&gate, &mut sink, Coordinate::new(5.0, 5.0));
        let poi = flow
            .finalize(SubmissionForm::new(" Toko A ", "oleh-oleh"), &mut store)
            .unwrap();
        assert_eq!(poi.name, "Toko A");
        assert_eq!(poi.category, Category::SouvenirShop);
        assert_eq!(poi.location, Coordinate::new(5.0, 5.0));
        assert_eq!(flow.pending(), None);
        assert_eq!(store.get("toko a").unwrap().id, poi.id);
    }

    #[test]
    fn finalize_without_pending_fails() {
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);
        let mut store = FeatureStore::new();
        let err = flow
            .finalize(SubmissionForm::new("Toko A", ""), &mut store)
            .unwrap_err();
        assert!(matches!(err, SubmissionError::NoPendingSubmission));
    }

    #[test]
    fn invalid_form_keeps_pending() {
        let registry = registry();
        let gate = SubmissionGate::new(&registry);
        let mut sink = CollectingNotificationSink::new();
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);
        let mut store = FeatureStore::new();

        flow.click(&gate, &mut sink, Coordinate::new(5.0, 5.0));
        let err = flow
            .finalize(SubmissionForm::new("   ", ""), &mut store)
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Invalid(_)));
        assert!(flow.pending().is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_name_keeps_pending() {
        let registry = registry();
        let gate = SubmissionGate::new(&registry);
        let mut sink = CollectingNotificationSink::new();
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);
        let mut store = FeatureStore::new();

        flow.click(&gate, &mut sink, Coordinate::new(5.0, 5.0));
        flow.finalize(SubmissionForm::new("Toko A", ""), &mut store)
            .unwrap();
        flow.click(&gate, &mut sink, Coordinate::new(6.0, 6.0));
        let err = flow
            .finalize(SubmissionForm::new("toko a", ""), &mut store)
            .unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Store(StoreError::DuplicateName { .. })
        ));
        assert_eq!(flow.pending(), Some(Coordinate::new(6.0, 6.0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cancel_discards_pending() {
        let registry = registry();
        let gate = SubmissionGate::new(&registry);
        let mut sink = CollectingNotificationSink::new();
        let mut flow = SubmissionFlow::new(CITY, OUTSIDE);

        flow.click(&gate, &mut sink, Coordinate::new(5.0, 5.0));
        assert_eq!(flow.cancel(), Some(Coordinate::new(5.0, 5.0)));
        assert_eq!(flow.pending(), None);
    }
}
