//! Device-flow polling loop.
//!
//! The loop is an explicit state machine: every `interval` it polls once and
//! applies [`transition`] to the result. It stops on success, on a terminal
//! provider error, when the deadline passes, or when the cancellation token
//! fires. Timers are scoped to the loop and dropped on every exit path.

use std::time::Duration;

use strum::Display;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::client::TokenPoller;
use super::device_code::{DeviceAuthorizationSession, DeviceCodePoll, TokenResult};
use super::error::AuthError;
use super::token::Token;

/// Stand-in deadline when the session lifetime overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Observable state of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    Pending,
    SlowDown,
    Succeeded,
    Failed,
    Cancelled,
}

/// How a polling loop ended. `polls` counts token-endpoint attempts.
#[derive(Debug)]
pub enum DeviceFlowOutcome {
    Succeeded { token: Token, polls: u32 },
    Failed { error: AuthError, polls: u32 },
    Cancelled { polls: u32 },
}

impl DeviceFlowOutcome {
    pub fn state(&self) -> FlowState {
        match self {
            Self::Succeeded { .. } => FlowState::Succeeded,
            Self::Failed { .. } => FlowState::Failed,
            Self::Cancelled { .. } => FlowState::Cancelled,
        }
    }

    pub fn polls(&self) -> u32 {
        match self {
            Self::Succeeded { polls, .. } | Self::Failed { polls, .. } | Self::Cancelled { polls } => {
                *polls
            }
        }
    }

    pub fn into_result(self) -> Result<Token, AuthError> {
        match self {
            Self::Succeeded { token, .. } => Ok(token),
            Self::Failed { error, .. } => Err(error),
            Self::Cancelled { .. } => Err(AuthError::Cancelled),
        }
    }
}

/// Next step after one poll.
#[derive(Debug)]
pub enum Transition {
    Wait { state: FlowState, interval: Duration },
    Succeeded(Token),
    Failed(AuthError),
}

/// Apply one poll result to the current interval.
pub fn transition(interval: Duration, result: Result<TokenResult, AuthError>) -> Transition {
    let result = match result {
        Ok(result) => result,
        Err(error) if error.is_transient() => {
            tracing::warn!(error = %error, "token endpoint unreachable, will retry");
            return Transition::Wait {
                state: FlowState::Pending,
                interval,
            };
        }
        Err(error) => return Transition::Failed(error),
    };
    match result.classify(interval) {
        DeviceCodePoll::Pending => Transition::Wait {
            state: FlowState::Pending,
            interval,
        },
        DeviceCodePoll::SlowDown { interval } => Transition::Wait {
            state: FlowState::SlowDown,
            interval,
        },
        DeviceCodePoll::Authorized { token } => Transition::Succeeded(token),
        DeviceCodePoll::AccessDenied(error) => Transition::Failed(AuthError::AccessDenied(error)),
        DeviceCodePoll::Expired(error) => Transition::Failed(AuthError::Expired(error)),
        DeviceCodePoll::Failed(error) => Transition::Failed(AuthError::Flow(error)),
    }
}

/// Polling loop settings.
#[derive(Debug, Clone, Default)]
pub struct DeviceFlow {
    max_wait: Option<Duration>,
}

impl DeviceFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operator cap on total wall-clock time.
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Total time the loop may run: the session lifetime, or the operator
    /// cap when that is longer.
    pub fn wait_limit(&self, session: &DeviceAuthorizationSession) -> Duration {
        let lifetime = session.lifetime();
        self.max_wait.map_or(lifetime, |cap| cap.max(lifetime))
    }

    /// Poll until a terminal state. The first poll happens one interval
    /// after the start.
    pub async fn run<P>(
        &self,
        poller: &P,
        session: &DeviceAuthorizationSession,
        cancel: &CancellationToken,
    ) -> DeviceFlowOutcome
    where
        P: TokenPoller + ?Sized,
    {
        let started = Instant::now();
        let limit = self.wait_limit(session);
        let deadline = started.checked_add(limit).unwrap_or_else(|| started + FAR_FUTURE);
        let mut interval = session.interval();
        let mut state = FlowState::Pending;
        let mut polls = 0u32;
        let timed_out = || AuthError::TimedOut {
            waited_secs: limit.as_secs(),
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(polls, "device flow cancelled");
                    return DeviceFlowOutcome::Cancelled { polls };
                }
                _ = sleep_until(deadline) => {
                    return DeviceFlowOutcome::Failed { error: timed_out(), polls };
                }
                _ = sleep(interval) => {}
            }

            polls += 1;
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(polls, "device flow cancelled");
                    return DeviceFlowOutcome::Cancelled { polls };
                }
                _ = sleep_until(deadline) => {
                    return DeviceFlowOutcome::Failed { error: timed_out(), polls };
                }
                result = poller.poll(session) => result,
            };

            match transition(interval, result) {
                Transition::Wait {
                    state: next,
                    interval: next_interval,
                } => {
                    if next != state || next_interval != interval {
                        tracing::debug!(
                            poll = polls,
                            from = %state,
                            to = %next,
                            interval_secs = next_interval.as_secs(),
                            "device flow state changed"
                        );
                    }
                    state = next;
                    interval = next_interval;
                }
                Transition::Succeeded(token) => {
                    tracing::info!(polls, "device flow authorized");
                    return DeviceFlowOutcome::Succeeded { token, polls };
                }
                Transition::Failed(error) => {
                    tracing::warn!(polls, error = %error, "device flow failed");
                    return DeviceFlowOutcome::Failed { error, polls };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    fn rejected(kind: &str) -> Result<TokenResult, AuthError> {
        Ok(TokenResult::Rejected {
            error: ProviderError::new(Some(400), kind, kind),
            interval: None,
        })
    }

    #[test]
    fn pending_keeps_interval() {
        let next = transition(Duration::from_secs(5), rejected("authorization_pending"));
        assert!(matches!(
            next,
            Transition::Wait { state: FlowState::Pending, interval } if interval == Duration::from_secs(5)
        ));
    }

    #[test]
    fn slow_down_grows_interval() {
        let next = transition(Duration::from_secs(5), rejected("slow_down"));
        assert!(matches!(
            next,
            Transition::Wait { state: FlowState::SlowDown, interval } if interval > Duration::from_secs(5)
        ));
    }

    #[test]
    fn transport_failure_is_not_terminal() {
        let next = transition(
            Duration::from_secs(5),
            Err(AuthError::Network("connection refused".to_string())),
        );
        assert!(matches!(next, Transition::Wait { .. }));
    }

    #[test]
    fn unreadable_body_is_terminal() {
        let next = transition(
            Duration::from_secs(5),
            Err(AuthError::InvalidResponse("bad".to_string())),
        );
        assert!(matches!(next, Transition::Failed(AuthError::InvalidResponse(_))));
    }

    #[test]
    fn terminal_errors_fail() {
        assert!(matches!(
            transition(Duration::from_secs(5), rejected("expired_token")),
            Transition::Failed(AuthError::Expired(_))
        ));
        assert!(matches!(
            transition(Duration::from_secs(5), rejected("access_denied")),
            Transition::Failed(AuthError::AccessDenied(_))
        ));
        assert!(matches!(
            transition(Duration::from_secs(5), rejected("invalid_grant")),
            Transition::Failed(AuthError::Flow(_))
        ));
    }

    #[test]
    fn state_names_match_protocol_vocabulary() {
        assert_eq!(FlowState::SlowDown.to_string(), "SLOW_DOWN");
        assert_eq!(FlowState::Succeeded.to_string(), "SUCCEEDED");
    }
}
