//! Fixed-delay rate limiting for service calls.

use std::thread;
use std::time::Duration;

use log::debug;

/// Sleeps for a fixed delay before every call it guards.
///
/// Each call pays the full delay; there is no burst allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    /// Default delay between calls to the public service.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    /// Create a throttle with the given delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A throttle that never sleeps.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Block the current thread for the configured delay.
    pub fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!("sleeping {:?} to respect the service rate limit", self.delay);
        thread::sleep(self.delay);
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Instant;

    #[rstest]
    fn default_is_one_second() {
        assert_eq!(Throttle::default().delay(), Duration::from_secs(1));
    }

    #[rstest]
    fn wait_blocks_for_at_least_the_delay() {
        let throttle = Throttle::new(Duration::from_millis(20));
        let started = Instant::now();
        throttle.wait();
        throttle.wait();
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[rstest]
    fn disabled_returns_immediately() {
        let started = Instant::now();
        Throttle::disabled().wait();
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
