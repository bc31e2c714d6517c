use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Monotonic time plus sleeping, for inter-trial intervals and reaction times
pub trait Clock: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);
}

/// Source of absolute wall-clock time, stamped onto each trial record.
pub trait TimestampSource {
    /// Seconds since the Unix epoch
    fn now_secs(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimestampSource for SystemClock {
    fn now_secs(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HighPrecisionClock;

impl Clock for HighPrecisionClock {
    type Timestamp = Instant;
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn elapsed(&self, ts: Instant) -> Duration {
        Instant::now().saturating_duration_since(ts)
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionClock {
    pub fn new() -> Self {
        Self
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // clock_nanosleep returns the error number directly; resume on signal
        loop {
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) };
            if rc != EINTR {
                if rc != 0 {
                    tracing::warn!(rc, "clock_nanosleep failed, falling back to thread::sleep");
                    std::thread::sleep(duration);
                }
                break;
            }
            req = rem;
        }
    }
}

/// Measures elapsed time from the moment it was armed.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    armed_at: Instant,
}

impl Stopwatch {
    pub fn arm() -> Self {
        Self {
            armed_at: Instant::now(),
        }
    }

    pub fn armed_at(&self) -> Instant {
        self.armed_at
    }

    pub fn elapsed(&self) -> Duration {
        self.armed_at.elapsed()
    }

    /// Time between arming and `at`, zero if `at` precedes arming.
    pub fn elapsed_until(&self, at: Instant) -> Duration {
        at.saturating_duration_since(self.armed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_waits_at_least_requested() {
        let clock = HighPrecisionClock::new();
        let t = clock.now();
        clock.sleep(Duration::from_millis(5));
        assert!(clock.elapsed(t) >= Duration::from_millis(5));
    }

    #[test]
    fn stopwatch_saturates_before_arming() {
        let before = Instant::now();
        let watch = Stopwatch::arm();
        assert_eq!(watch.elapsed_until(before), Duration::ZERO);
        let later = watch.armed_at() + Duration::from_millis(250);
        assert_eq!(watch.elapsed_until(later), Duration::from_millis(250));
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_secs() > 1_577_836_800.0);
    }
}
