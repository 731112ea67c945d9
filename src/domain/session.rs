//! Session state machine.
//!
//! A session owns the holdings being edited, the current analysis state and
//! the last successfully validated metrics. Every submission is stamped
//! with a generation number; completions carrying an older generation are
//! discarded so the displayed state always belongs to the latest request.
//!
//! ```text
//!   Idle ──submit──> Submitting ──ok──> Success
//!                        │  ^                │
//!                       err └────submit──────┤
//!                        v                   │
//!                     Failure ──submit───────┘
//!                        │
//!                      clear ──> Idle
//! ```

use serde::Serialize;

use super::error::{HoldingRejection, PortlensError};
use super::holding::{Holding, Portfolio};
use super::metrics::Metrics;

/// Message shown when the service gives no explanation.
pub const GENERIC_FAILURE: &str = "Analysis failed";
/// Message shown when the response does not have the expected shape.
pub const INVALID_DATA: &str = "Invalid data structure received from server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    InvalidData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&PortlensError> for Failure {
    fn from(err: &PortlensError) -> Self {
        match err {
            PortlensError::InvalidResponse { .. } => Failure {
                kind: FailureKind::InvalidData,
                message: INVALID_DATA.to_string(),
            },
            PortlensError::Service { detail, .. } if !detail.trim().is_empty() => Failure {
                kind: FailureKind::Transport,
                message: detail.clone(),
            },
            PortlensError::Service { .. } => Failure {
                kind: FailureKind::Transport,
                message: GENERIC_FAILURE.to_string(),
            },
            other => Failure {
                kind: FailureKind::Transport,
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting { generation: u64 },
    Success,
    Failure(Failure),
}

/// JSON body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub holdings: Vec<RequestHolding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestHolding {
    pub ticker: String,
    pub value: f64,
    pub weight: f64,
}

impl AnalyzeRequest {
    /// Build the wire request from normalized holdings.
    pub fn from_weighted(holdings: &[Holding]) -> Self {
        AnalyzeRequest {
            holdings: holdings
                .iter()
                .map(|h| RequestHolding {
                    ticker: h.ticker.clone(),
                    value: h.value,
                    weight: h.weight.unwrap_or(0.0),
                })
                .collect(),
        }
    }

    pub fn from_portfolio(portfolio: &Portfolio) -> Result<Self, PortlensError> {
        Ok(Self::from_weighted(&portfolio.weighted()?))
    }
}

/// A request handed out by [`Session::begin_submission`].
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub generation: u64,
    pub request: AnalyzeRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer submission was started after this one; nothing changed.
    Stale { latest: u64 },
}

#[derive(Debug, Default)]
pub struct Session {
    portfolio: Portfolio,
    state: SessionState,
    generation: u64,
    metrics: Option<Metrics>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_portfolio(portfolio: Portfolio) -> Self {
        Session {
            portfolio,
            ..Self::default()
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn add_holding(&mut self, ticker: &str, value: &str) -> Result<&Holding, HoldingRejection> {
        self.portfolio.add(ticker, value)
    }

    pub fn remove_holding(&mut self, index: usize) -> Option<Holding> {
        self.portfolio.remove(index)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Submitting { .. })
    }

    /// Last validated metrics; kept across later failures.
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            SessionState::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Start a new attempt.
    ///
    /// Refused for an empty or zero-valued portfolio; the state is left
    /// untouched in that case.
    pub fn begin_submission(&mut self) -> Result<Submission, PortlensError> {
        let request = AnalyzeRequest::from_portfolio(&self.portfolio)?;
        self.generation += 1;
        self.state = SessionState::Submitting {
            generation: self.generation,
        };
        tracing::debug!(
            generation = self.generation,
            holdings = request.holdings.len(),
            "submission started"
        );
        Ok(Submission {
            generation: self.generation,
            request,
        })
    }

    /// Apply the outcome of the attempt stamped `generation`.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<Metrics, PortlensError>,
    ) -> Completion {
        if generation != self.generation || !self.is_loading() {
            tracing::warn!(generation, latest = self.generation, "discarding stale completion");
            return Completion::Stale {
                latest: self.generation,
            };
        }

        match outcome {
            Ok(metrics) => {
                self.metrics = Some(metrics);
                self.state = SessionState::Success;
            }
            Err(err) => {
                tracing::error!(generation, error = %err, "analysis attempt failed");
                self.state = SessionState::Failure(Failure::from(&err));
            }
        }
        Completion::Applied
    }

    /// Dismiss a failure. Other states are left as they are.
    pub fn clear_error(&mut self) {
        if matches!(self.state, SessionState::Failure(_)) {
            self.state = if self.metrics.is_some() {
                SessionState::Success
            } else {
                SessionState::Idle
            };
        }
    }

    /// Drop holdings and results, keeping the generation counter.
    pub fn reset(&mut self) {
        self.portfolio.clear();
        self.metrics = None;
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{FieldError, Problem};
    use crate::domain::metrics::fixtures::sample_metrics;

    fn session_with_holdings() -> Session {
        let mut session = Session::new();
        session.add_holding("aapl", "100").unwrap();
        session.add_holding("msft", "300").unwrap();
        session
    }

    #[test]
    fn starts_idle() {
        let session = Session::new();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.metrics().is_none());
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn empty_portfolio_cannot_submit() {
        let mut session = Session::new();
        let err = session.begin_submission().unwrap_err();
        assert!(matches!(err, PortlensError::EmptyPortfolio));
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn submission_carries_weights() {
        let mut session = session_with_holdings();
        let submission = session.begin_submission().unwrap();
        assert_eq!(submission.generation, 1);
        assert!(session.is_loading());

        let holdings = &submission.request.holdings;
        assert_eq!(holdings[0].ticker, "AAPL");
        assert!((holdings[0].weight - 25.0).abs() < 1e-9);
        assert_eq!(holdings[1].ticker, "MSFT");
        assert!((holdings[1].weight - 75.0).abs() < 1e-9);
    }

    #[test]
    fn request_serializes_to_wire_shape() {
        let mut session = session_with_holdings();
        let submission = session.begin_submission().unwrap();
        let json = serde_json::to_value(&submission.request).unwrap();
        assert_eq!(json["holdings"][0]["ticker"], "AAPL");
        assert_eq!(json["holdings"][1]["value"], 300.0);
        assert_eq!(json["holdings"][1]["weight"], 75.0);
    }

    #[test]
    fn success_stores_metrics() {
        let mut session = session_with_holdings();
        let submission = session.begin_submission().unwrap();
        let completion = session.complete(submission.generation, Ok(sample_metrics()));
        assert_eq!(completion, Completion::Applied);
        assert_eq!(session.state(), &SessionState::Success);
        assert!(session.metrics().is_some());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut session = session_with_holdings();
        let first = session.begin_submission().unwrap();
        let second = session.begin_submission().unwrap();

        // Newer request finishes first; the older one must not overwrite it.
        assert_eq!(
            session.complete(second.generation, Ok(sample_metrics())),
            Completion::Applied
        );
        assert_eq!(
            session.complete(
                first.generation,
                Err(PortlensError::Transport {
                    reason: "connection reset".into()
                })
            ),
            Completion::Stale { latest: 2 }
        );
        assert_eq!(session.state(), &SessionState::Success);
    }

    #[test]
    fn older_success_does_not_replace_pending_newer_request() {
        let mut session = session_with_holdings();
        let first = session.begin_submission().unwrap();
        let second = session.begin_submission().unwrap();

        let completion = session.complete(first.generation, Ok(sample_metrics()));
        assert_eq!(completion, Completion::Stale { latest: 2 });
        assert_eq!(
            session.state(),
            &SessionState::Submitting {
                generation: second.generation
            }
        );
        assert!(session.metrics().is_none());
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut session = session_with_holdings();
        let submission = session.begin_submission().unwrap();
        session.complete(submission.generation, Ok(sample_metrics()));
        let again = session.complete(
            submission.generation,
            Err(PortlensError::Transport {
                reason: "late".into(),
            }),
        );
        assert_eq!(again, Completion::Stale { latest: 1 });
        assert_eq!(session.state(), &SessionState::Success);
    }

    #[test]
    fn failure_keeps_previous_metrics() {
        let mut session = session_with_holdings();
        let ok = session.begin_submission().unwrap();
        session.complete(ok.generation, Ok(sample_metrics()));

        let failed = session.begin_submission().unwrap();
        session.complete(
            failed.generation,
            Err(PortlensError::Service {
                status: 500,
                detail: "Analysis failed: unknown ticker".into(),
            }),
        );

        let failure = session.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.message, "Analysis failed: unknown ticker");
        assert!(session.metrics().is_some());

        session.clear_error();
        assert_eq!(session.state(), &SessionState::Success);
    }

    #[test]
    fn clear_error_without_metrics_returns_to_idle() {
        let mut session = session_with_holdings();
        let submission = session.begin_submission().unwrap();
        session.complete(
            submission.generation,
            Err(PortlensError::InvalidResponse {
                reasons: vec![FieldError::new("risk", Problem::Missing)],
            }),
        );
        let failure = session.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidData);
        assert_eq!(failure.message, INVALID_DATA);

        session.clear_error();
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn empty_service_detail_uses_generic_message() {
        let failure = Failure::from(&PortlensError::Service {
            status: 502,
            detail: String::new(),
        });
        assert_eq!(failure.message, GENERIC_FAILURE);
    }

    #[test]
    fn reset_clears_everything_but_generation() {
        let mut session = session_with_holdings();
        let submission = session.begin_submission().unwrap();
        session.complete(submission.generation, Ok(sample_metrics()));
        session.reset();
        assert!(session.portfolio().is_empty());
        assert!(session.metrics().is_none());
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.generation(), 1);
    }
}
