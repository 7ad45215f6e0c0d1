use crate::domain::config::PollingConfig;
use crate::domain::translation::TranslationResult;
use serde::Deserialize;

/// Fallback error text when the gateway reports FAILED without a message.
pub const GENERIC_FAILURE: &str = "Processing failed";

/// Job status as reported by the gateway.
///
/// The gateway emits intermediate statuses (e.g. TRANSCRIBING) while a job
/// moves through its pipeline; anything unrecognized maps to `Other` and
/// keeps the poll loop running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

/// Response body shared by the upload POST and the status GET.
/// Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub job_id: Option<String>,
    pub status: Option<JobStatus>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
    pub audio_url: Option<String>,
}

/// How an upload response routes the session.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The gateway queued an asynchronous job to poll for.
    Accepted { job_id: String },
    /// The gateway answered with a finished result inline.
    Immediate(TranslationResult),
}

impl StatusResponse {
    /// Extract the result payload, dropping job bookkeeping fields.
    pub fn into_result(self) -> TranslationResult {
        TranslationResult {
            original_text: self.original_text,
            translated_text: self.translated_text,
            audio_url: self.audio_url,
        }
    }

    /// Route an upload response: a non-empty job id together with
    /// PROCESSING status means an async job was queued. The job indicator
    /// is authoritative; inline result fields are ignored in that case.
    pub fn classify(self) -> UploadOutcome {
        let pending = self.status == Some(JobStatus::Processing)
            && self.job_id.as_deref().is_some_and(|id| !id.is_empty());
        if pending {
            UploadOutcome::Accepted {
                job_id: self.job_id.unwrap_or_default(),
            }
        } else {
            UploadOutcome::Immediate(self.into_result())
        }
    }
}

/// Poll loop state machine.
///
/// State transitions:
/// - Idle -> Polling (start)
/// - Polling -> Completed (COMPLETED response)
/// - Polling -> Failed (FAILED response)
/// - Polling -> TimedOut (check budget or consecutive-error budget spent)
///
/// Completed, Failed and TimedOut are terminal; a new translation attempt
/// builds a fresh tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

impl PollerState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollerState::Completed | PollerState::Failed | PollerState::TimedOut
        )
    }
}

/// What the driver should do at the start of a poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Issue a status request.
    Check,
    /// Check budget exhausted, stop without issuing a request.
    GiveUp,
}

/// What the driver should do after a transport or parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Transient failure, try again on the next tick.
    Tolerate,
    /// Too many consecutive errors, stop polling.
    Abort { errors: u32 },
}

/// What the driver should do after a successfully parsed response.
#[derive(Debug, Clone, PartialEq)]
pub enum PollVerdict {
    /// Job still running; optional progress message from the gateway.
    Continue { message: Option<String> },
    /// Job finished, render the result.
    Complete(TranslationResult),
    /// Gateway reported failure with this message.
    Fail { error: String },
}

/// Pure bookkeeping for one job's poll loop. The async driver owns the
/// timer and the HTTP calls; every decision lives here so the budgets and
/// transitions can be tested without time or network.
#[derive(Debug)]
pub struct JobTracker {
    job_id: String,
    state: PollerState,
    checks: u32,
    consecutive_errors: u32,
    max_checks: u32,
    max_consecutive_errors: u32,
}

impl JobTracker {
    pub fn new(job_id: impl Into<String>, config: &PollingConfig) -> Self {
        Self {
            job_id: job_id.into(),
            state: PollerState::Idle,
            checks: 0,
            consecutive_errors: 0,
            max_checks: config.max_checks,
            max_consecutive_errors: config.max_transport_errors,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn checks(&self) -> u32 {
        self.checks
    }

    /// Enter the Polling state.
    pub fn start(&mut self) {
        if self.state == PollerState::Idle {
            self.state = PollerState::Polling;
        }
    }

    /// Account for one timer tick. The check counter moves before any
    /// request goes out, so at most `max_checks` requests are ever issued
    /// and the budget is spent by ticks, not by responses.
    pub fn on_tick(&mut self) -> TickAction {
        if self.state != PollerState::Polling {
            return TickAction::GiveUp;
        }
        self.checks += 1;
        if self.checks > self.max_checks {
            self.state = PollerState::TimedOut;
            TickAction::GiveUp
        } else {
            TickAction::Check
        }
    }

    /// Account for a parsed status response. Any successful response
    /// clears the consecutive-error streak.
    pub fn on_response(&mut self, response: StatusResponse) -> PollVerdict {
        self.consecutive_errors = 0;
        match response.status {
            Some(JobStatus::Completed) => {
                self.state = PollerState::Completed;
                PollVerdict::Complete(response.into_result())
            }
            Some(JobStatus::Failed) => {
                self.state = PollerState::Failed;
                let error = response
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                PollVerdict::Fail { error }
            }
            _ => PollVerdict::Continue {
                message: response.message.filter(|m| !m.is_empty()),
            },
        }
    }

    /// Account for a transport or parse error on one check. More than
    /// `max_consecutive_errors` in a row abandons the job.
    pub fn on_transport_error(&mut self) -> ErrorAction {
        self.consecutive_errors += 1;
        if self.consecutive_errors > self.max_consecutive_errors {
            self.state = PollerState::TimedOut;
            ErrorAction::Abort {
                errors: self.consecutive_errors,
            }
        } else {
            ErrorAction::Tolerate
        }
    }
}
