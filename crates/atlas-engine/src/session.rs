//! JSON-lines session driver.
//!
//! Each input line is one [`Command`]; each command produces exactly one
//! [`Response`] line. Commands are handled one at a time, so the store has
//! a single writer and every click sees the result of the one before it.
//!
//! ```text
//! {"command":"click","latitude":-6.92,"longitude":106.93}
//! {"command":"submit","name":"Mochi Lampion","description":"Mochi khas"}
//! {"command":"cancel"}
//! {"command":"search","query":"mochi"}
//! {"command":"get","name":"Mochi Lampion"}
//! {"command":"review","place":"Mochi Lampion","rating":5,"comment":"Enak"}
//! {"command":"reviews","place":"Mochi Lampion"}
//! ```

use atlas_core::config::NotificationConfig;
use atlas_core::loader::Atlas;
use atlas_core::notify::{CollectingNotificationSink, LogNotificationSink};
use atlas_core::review::{ReviewBook, ReviewForm};
use atlas_core::submission::{SubmissionFlow, SubmissionForm};
use atlas_types::{Coordinate, PointOfInterest, Review, SubmissionAttempt};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::EngineError;

/// A request read from one input line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// The user clicked the map.
    Click(Coordinate),
    /// The user filled in the form for the pending location.
    Submit(SubmissionForm),
    /// The user closed the form.
    Cancel,
    /// Search stored places by name.
    Search {
        /// Text to look for in place names.
        query: String,
    },
    /// Look up one place by name.
    Get {
        /// Place name, compared case-insensitively.
        name: String,
    },
    /// Rate and comment on a stored place.
    Review {
        /// Place name, compared case-insensitively.
        place: String,
        /// Stars, 1 to 5.
        rating: u8,
        /// The visitor's comment.
        comment: String,
    },
    /// List the reviews of a place.
    Reviews {
        /// Place name, compared case-insensitively.
        place: String,
    },
}

/// The answer written for one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Gate verdict for a click, with any rejection notices.
    Click {
        /// The evaluated attempt.
        attempt: SubmissionAttempt,
        /// Notices raised for a rejected click.
        notifications: Vec<String>,
    },
    /// A new place was stored.
    Submitted {
        /// The stored place.
        place: PointOfInterest,
    },
    /// The pending location was discarded.
    Cancelled {
        /// The discarded location, if one was pending.
        discarded: Option<Coordinate>,
    },
    /// Search hits in insertion order.
    Results {
        /// Matching places.
        places: Vec<PointOfInterest>,
    },
    /// A single place.
    Place {
        /// The place found.
        place: PointOfInterest,
    },
    /// A review was stored.
    Reviewed {
        /// The stored review.
        review: Review,
        /// Mean rating of the place including this review.
        average: Option<f64>,
    },
    /// Reviews of one place, oldest first.
    Reviews {
        /// The place asked about.
        place: String,
        /// Its reviews.
        reviews: Vec<Review>,
        /// Mean rating, if any review exists.
        average: Option<f64>,
    },
    /// The command could not be carried out.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl Response {
    fn error(e: impl std::fmt::Display) -> Self {
        Self::Error {
            message: e.to_string(),
        }
    }
}

/// One user's session against a loaded atlas.
#[derive(Debug)]
pub struct Session {
    atlas: Atlas,
    flow: SubmissionFlow,
    reviews: ReviewBook,
    sink: (CollectingNotificationSink, LogNotificationSink),
}

impl Session {
    /// Open a session over a fully loaded atlas.
    pub fn new(atlas: Atlas, notification: &NotificationConfig) -> Self {
        let flow = SubmissionFlow::new(atlas.boundary_name(), notification.outside_message.clone());
        Self {
            atlas,
            flow,
            reviews: ReviewBook::new(),
            sink: (
                CollectingNotificationSink::new(),
                LogNotificationSink::new(notification),
            ),
        }
    }

    /// Parse and handle one input line.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => self.handle(command),
            Err(e) => {
                debug!(error = %e, "unparseable command");
                Response::error(format!("invalid command: {e}"))
            }
        }
    }

    /// Handle one command.
    pub fn handle(&mut self, command: Command) -> Response {
        match command {
            Command::Click(candidate) => {
                let attempt = self
                    .flow
                    .click(&self.atlas.gate(), &mut self.sink, candidate);
                Response::Click {
                    attempt,
                    notifications: self.sink.0.drain(),
                }
            }
            Command::Submit(form) => match self.flow.finalize(form, &mut self.atlas.store) {
                Ok(place) => Response::Submitted { place },
                Err(e) => Response::error(e),
            },
            Command::Cancel => Response::Cancelled {
                discarded: self.flow.cancel(),
            },
            Command::Search { query } => Response::Results {
                places: self
                    .atlas
                    .store
                    .find_by_prefix(&query)
                    .into_iter()
                    .cloned()
                    .collect(),
            },
            Command::Get { name } => match self.atlas.store.get(&name) {
                Ok(place) => Response::Place {
                    place: place.clone(),
                },
                Err(e) => Response::error(e),
            },
            Command::Review {
                place,
                rating,
                comment,
            } => match self
                .reviews
                .add(&self.atlas.store, &place, ReviewForm::new(rating, comment))
            {
                Ok(review) => Response::Reviewed {
                    average: self.reviews.average(&review.place),
                    review,
                },
                Err(e) => Response::error(e),
            },
            Command::Reviews { place } => Response::Reviews {
                reviews: self.reviews.for_place(&place).to_vec(),
                average: self.reviews.average(&place),
                place,
            },
        }
    }

    /// Read commands until end of input, writing one response per line.
    /// Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if reading or writing fails, or
    /// [`EngineError::Encode`] if a response cannot be serialized.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), EngineError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut handled: u64 = 0;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line);
            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
            handled = handled.saturating_add(1);
        }
        info!(commands = handled, places = self.atlas.store.len(), "session closed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atlas_types::{Category, GateDecision, RejectionReason};

    use super::*;

    const CITY: &str = "Kota Sukabumi";

    fn session() -> Session {
        let mut atlas = Atlas::new(CITY, 8);
        atlas
            .registry
            .load(
                CITY,
                r#"{ "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]] }"#,
            )
            .unwrap();
        Session::new(atlas, &NotificationConfig::default())
    }

    #[test]
    fn click_outside_reports_notice() {
        let mut session = session();
        let response = session.handle_line(r#"{"command":"click","latitude":50,"longitude":50}"#);
        assert_eq!(
            response,
            Response::Click {
                attempt: SubmissionAttempt {
                    candidate: Coordinate::new(50.0, 50.0),
                    outcome: GateDecision::Rejected(RejectionReason::OutsideBoundary),
                },
                notifications: vec![NotificationConfig::default().outside_message],
            }
        );
    }

    #[test]
    fn click_submit_search_get() {
        let mut session = session();
        let click = session.handle_line(r#"{"command":"click","latitude":5,"longitude":5}"#);
        assert!(matches!(
            click,
            Response::Click { attempt, .. } if attempt.outcome.is_accepted()
        ));

        let submitted = session.handle_line(
            r#"{"command":"submit","name":"Mochi Lampion","description":"Mochi khas","category":"specialty"}"#,
        );
        assert!(matches!(
            &submitted,
            Response::Submitted { place } if place.category == Category::Specialty
        ));

        let results = session.handle_line(r#"{"command":"search","query":"mochi"}"#);
        assert!(matches!(&results, Response::Results { places } if places.len() == 1));

        let place = session.handle(Command::Get {
            name: String::from("MOCHI LAMPION"),
        });
        assert!(matches!(place, Response::Place { .. }));
    }

    #[test]
    fn review_commands_round_trip() {
        let mut session = session();
        session.handle_line(r#"{"command":"click","latitude":5,"longitude":5}"#);
        session.handle_line(r#"{"command":"submit","name":"Sunda Rasa"}"#);

        let reviewed = session.handle_line(
            r#"{"command":"review","place":"sunda rasa","rating":4,"comment":"Enak"}"#,
        );
        assert!(matches!(
            &reviewed,
            Response::Reviewed { review, average: Some(_) }
                if review.place == "Sunda Rasa" && review.rating == 4
        ));

        let blank = session.handle_line(
            r#"{"command":"review","place":"Sunda Rasa","rating":5,"comment":"  "}"#,
        );
        assert!(matches!(&blank, Response::Error { message } if message.contains("Ulasan tidak boleh kosong!")));

        let unknown = session.handle_line(
            r#"{"command":"review","place":"Toko Hantu","rating":5,"comment":"?"}"#,
        );
        assert!(matches!(unknown, Response::Error { .. }));

        let listed = session.handle_line(r#"{"command":"reviews","place":"SUNDA RASA"}"#);
        assert!(matches!(&listed, Response::Reviews { reviews, .. } if reviews.len() == 1));
    }

    #[test]
    fn submit_without_click_is_an_error() {
        let mut session = session();
        let response = session.handle_line(r#"{"command":"submit","name":"Toko"}"#);
        assert!(matches!(response, Response::Error { .. }));
    }

    #[test]
    fn cancel_returns_discarded_location() {
        let mut session = session();
        session.handle_line(r#"{"command":"click","latitude":5,"longitude":5}"#);
        assert_eq!(
            session.handle(Command::Cancel),
            Response::Cancelled {
                discarded: Some(Coordinate::new(5.0, 5.0))
            }
        );
        assert_eq!(
            session.handle(Command::Cancel),
            Response::Cancelled { discarded: None }
        );
    }

    #[test]
    fn garbage_is_an_error_response() {
        let mut session = session();
        assert!(matches!(
            session.handle_line("not json"),
            Response::Error { .. }
        ));
        assert!(matches!(
            session.handle_line(r#"{"command":"fly"}"#),
            Response::Error { .. }
        ));
    }

    #[tokio::test]
    async fn run_writes_one_line_per_command() {
        let mut session = session();
        let input = concat!(
            r#"{"command":"click","latitude":5,"longitude":5}"#,
            "\n\n",
            r#"{"command":"submit","name":"Toko A"}"#,
            "\n",
            r#"{"command":"get","name":"nope"}"#,
            "\n",
        );
        let mut output = Vec::new();
        session.run(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let types: Vec<String> = text
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v.get("type").and_then(|t| t.as_str()).unwrap().to_owned()
            })
            .collect();
        assert_eq!(types, vec!["click", "submitted", "error"]);
    }
}
