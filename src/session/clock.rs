use std::time::Duration;

/// Active-time clock driven by externally delivered ticks. The controller
/// only advances it while the session is active, so paused intervals never
/// reach it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionClock {
    elapsed: Duration,
    limit: Option<Duration>,
}

impl SessionClock {
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            elapsed: Duration::ZERO,
            limit,
        }
    }

    /// Advance by `delta`, clamping at the limit when there is one.
    pub fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
        if let Some(limit) = self.limit {
            self.elapsed = self.elapsed.min(limit);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.limit.map(|limit| limit.saturating_sub(self.elapsed))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining() == Some(Duration::ZERO)
    }
}
