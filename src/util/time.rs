use std::sync::Arc;

use parking_lot::Mutex;

/// Get the current time in seconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Get the current time in seconds since page load
#[cfg(target_arch = "wasm32")]
pub fn current_time_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now() / 1000.0)
        .unwrap_or(0.0)
}

/// Millisecond time source for velocity-sensitive brushes
pub trait Clock: Send {
    fn now_millis(&self) -> f64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        current_time_secs() * 1000.0
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new(start_millis: f64) -> Self {
        Self {
            millis: Arc::new(Mutex::new(start_millis)),
        }
    }

    pub fn advance(&self, millis: f64) {
        *self.millis.lock() += millis;
    }

    pub fn set(&self, millis: f64) {
        *self.millis.lock() = millis;
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> f64 {
        *self.millis.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(100.0);
        let handle = clock.clone();
        handle.advance(16.0);
        assert_eq!(clock.now_millis(), 116.0);
        handle.set(5.0);
        assert_eq!(clock.now_millis(), 5.0);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }
}
