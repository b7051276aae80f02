// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Fixed-interval accumulator timer

use std::time::Duration;

/// Accumulates elapsed time and reports when a delay has been crossed
///
/// The excess past the delay is carried into the next period, so a timer
/// fed uneven deltas still fires at the configured average rate.
#[derive(Debug, Clone)]
pub struct Timer {
    delay: Duration,
    accumulated: Duration,
}

impl Timer {
    /// Create a timer that fires every `delay`
    pub fn new(delay: Duration) -> Self {
        Timer {
            delay,
            accumulated: Duration::ZERO,
        }
    }

    /// Add `delta` to the accumulator and report whether the delay was reached
    pub fn is_reached(&mut self, delta: Duration) -> bool {
        self.accumulated += delta;
        if self.accumulated >= self.delay {
            self.accumulated -= self.delay;
            true
        } else {
            false
        }
    }

    /// Drop any accumulated time
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }

    /// Time accumulated toward the next firing
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_when_crossed() {
        let mut timer = Timer::new(Duration::from_millis(100));
        assert!(!timer.is_reached(Duration::from_millis(60)));
        assert!(timer.is_reached(Duration::from_millis(60)));
    }

    #[test]
    fn test_carries_remainder() {
        let mut timer = Timer::new(Duration::from_millis(100));
        assert!(timer.is_reached(Duration::from_millis(130)));
        assert_eq!(timer.accumulated(), Duration::from_millis(30));
        assert!(timer.is_reached(Duration::from_millis(70)));
        assert_eq!(timer.accumulated(), Duration::ZERO);
    }

    #[test]
    fn test_reset() {
        let mut timer = Timer::new(Duration::from_secs(1));
        timer.is_reached(Duration::from_millis(900));
        timer.reset();
        assert!(!timer.is_reached(Duration::from_millis(900)));
    }
}
