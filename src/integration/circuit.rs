use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use tracing::{info, warn};

/// The lifecycle states of a [`CircuitBreaker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls flow through; outcomes are recorded in the sliding window.
    Closed,
    /// Calls are rejected until the cooldown elapses.
    Open,
    /// A single probe call is allowed through to test the upstream.
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    outcomes: VecDeque<bool>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// A count-based circuit breaker.
///
/// Outcomes are tracked in a sliding window of the last `window_size` calls.
/// The failure rate is evaluated once the window is full; reaching
/// `failure_rate` opens the circuit, which rejects calls for `cooldown`.
/// The first call after the cooldown runs as a lone probe: success closes
/// the circuit, failure opens it for another cooldown.
#[derive(Clone)]
pub struct CircuitBreaker {
    window_size: usize,
    failure_rate: f64,
    cooldown: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl CircuitBreaker {
    /// Creates a closed breaker with an empty window.
    pub fn new(window_size: usize, failure_rate: f64, cooldown: Duration) -> Self {
        Self {
            window_size,
            failure_rate,
            cooldown,
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                outcomes: VecDeque::with_capacity(window_size),
                opened_at: None,
                probe_in_flight: false,
            })),
        }
    }

    /// Asks the breaker for permission to place a call.
    ///
    /// Returns `false` while the circuit is open or a probe is already in
    /// flight. A `true` return must be followed by exactly one call to
    /// [`record_success`](Self::record_success) or
    /// [`record_failure`](Self::record_failure).
    pub async fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.cooldown)
                    .unwrap_or(true);
                if cooled_down {
                    info!("Circuit half-open, letting a probe call through");
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    false
                } else {
                    inner.probe_in_flight = true;
                    true
                }
            }
        }
    }

    /// Records a successful call.
    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                self.push_outcome(&mut inner, true);
                self.evaluate(&mut inner);
            }
            CircuitState::HalfOpen => {
                info!("✅ Circuit closed after a successful probe");
                inner.state = CircuitState::Closed;
                inner.outcomes.clear();
                inner.opened_at = None;
                inner.probe_in_flight = false;
            }
            // A call that was already in flight when the circuit opened.
            CircuitState::Open => {}
        }
    }

    /// Records a failed call.
    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                self.push_outcome(&mut inner, false);
                self.evaluate(&mut inner);
            }
            CircuitState::HalfOpen => {
                warn!("⚡ Circuit reopened after a failed probe");
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.probe_in_flight = false;
            }
            CircuitState::Open => {}
        }
    }

    /// Returns the current state.
    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    fn push_outcome(&self, inner: &mut Inner, success: bool) {
        inner.outcomes.push_back(success);
        while inner.outcomes.len() > self.window_size {
            inner.outcomes.pop_front();
        }
    }

    /// Opens the circuit when the full window's failure rate reaches the
    /// threshold. A partially filled window is never evaluated.
    fn evaluate(&self, inner: &mut Inner) {
        if inner.outcomes.len() < self.window_size {
            return;
        }
        let failures = inner.outcomes.iter().filter(|ok| !**ok).count();
        let rate = failures as f64 / inner.outcomes.len() as f64;
        if rate >= self.failure_rate {
            warn!(
                "⚡ Circuit opened after {} of the last {} calls failed",
                failures,
                inner.outcomes.len()
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.outcomes.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_breaker_admits_calls() {
        let breaker = CircuitBreaker::new(10, 0.5, Duration::from_secs(30));
        assert!(breaker.try_acquire().await);
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn opens_once_failure_rate_reached() {
        let breaker = CircuitBreaker::new(4, 0.5, Duration::from_secs(30));
        for _ in 0..2 {
            assert!(breaker.try_acquire().await);
            breaker.record_success().await;
        }
        for _ in 0..2 {
            assert!(breaker.try_acquire().await);
            breaker.record_failure().await;
        }
        assert_eq!(breaker.state().await, CircuitState::Open);
        assert!(!breaker.try_acquire().await);
    }

    #[tokio::test]
    async fn partial_window_never_opens() {
        let breaker = CircuitBreaker::new(4, 0.5, Duration::from_secs(30));
        for _ in 0..3 {
            assert!(breaker.try_acquire().await);
            breaker.record_failure().await;
        }
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn window_evaluates_on_every_outcome() {
        // The window fills on a success, and the rate check still runs.
        let breaker = CircuitBreaker::new(2, 0.5, Duration::from_secs(30));
        breaker.record_failure().await;
        breaker.record_success().await;
        assert_eq!(breaker.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn cooldown_admits_a_single_probe() {
        let breaker = CircuitBreaker::new(2, 0.5, Duration::ZERO);
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Open);

        assert!(breaker.try_acquire().await);
        assert_eq!(breaker.state().await, CircuitState::HalfOpen);
        assert!(!breaker.try_acquire().await, "only one probe may fly");
    }

    #[tokio::test]
    async fn successful_probe_closes_the_circuit() {
        let breaker = CircuitBreaker::new(2, 0.5, Duration::ZERO);
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert!(breaker.try_acquire().await);

        breaker.record_success().await;
        assert_eq!(breaker.state().await, CircuitState::Closed);

        // The window restarts empty: one failure alone must not re-trip.
        assert!(breaker.try_acquire().await);
        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn failed_probe_reopens_the_circuit() {
        let breaker = CircuitBreaker::new(2, 0.5, Duration::ZERO);
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert!(breaker.try_acquire().await);

        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Open);
    }
}
