//! Visitor reviews for stored places.
//!
//! A review is a star rating and a comment attached to a place that exists
//! in the [`FeatureStore`]. Reviews are kept per place, keyed by the
//! case-folded place name, in the order they were written.

use std::collections::BTreeMap;

use atlas_types::Review;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::store::{FeatureStore, StoreError};

/// Errors from adding a review.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The form failed validation.
    #[error("invalid review: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// No stored place has the given name.
    #[error(transparent)]
    UnknownPlace(#[from] StoreError),
}

/// Fields a visitor fills in to review a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ReviewForm {
    /// Stars, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,

    /// Comment. Required.
    #[validate(length(min = 1, max = 1000, message = "Ulasan tidak boleh kosong!"))]
    pub comment: String,
}

impl ReviewForm {
    /// Create a form.
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
        }
    }

    /// Trim the comment.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            rating: self.rating,
            comment: self.comment.trim().to_owned(),
        }
    }
}

/// All reviews, grouped by place.
#[derive(Debug, Clone, Default)]
pub struct ReviewBook {
    reviews: BTreeMap<String, Vec<Review>>,
}

impl ReviewBook {
    /// Create an empty book.
    pub const fn new() -> Self {
        Self {
            reviews: BTreeMap::new(),
        }
    }

    /// Validate `form` and append a review for the stored place `place`.
    ///
    /// # Errors
    ///
    /// - [`ReviewError::Invalid`] for a rating outside 1..=5 or a blank
    ///   comment.
    /// - [`ReviewError::UnknownPlace`] if `store` has no such place.
    pub fn add(
        &mut self,
        store: &FeatureStore,
        place: &str,
        form: ReviewForm,
    ) -> Result<Review, ReviewError> {
        let form = form.normalized();
        form.validate()?;
        let poi = store.get(place)?;

        let review = Review::new(poi.name.clone(), form.rating, form.comment);
        info!(place = %poi.name, rating = review.rating, "review added");
        self.reviews
            .entry(poi.key())
            .or_default()
            .push(review.clone());
        Ok(review)
    }

    /// Reviews for `place`, oldest first. Empty if none were written.
    pub fn for_place(&self, place: &str) -> &[Review] {
        self.reviews
            .get(&place.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mean star rating for `place`, or `None` without reviews.
    pub fn average(&self, place: &str) -> Option<f64> {
        let reviews = self.for_place(place);
        let count = u32::try_from(reviews.len()).ok().filter(|&n| n > 0)?;
        let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(total) / f64::from(count))
    }

    /// Total number of reviews.
    pub fn len(&self) -> usize {
        self.reviews.values().map(Vec::len).sum()
    }

    /// Whether no review has been written.
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}
