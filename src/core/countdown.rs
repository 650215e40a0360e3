use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::NaiveDateTime;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A signed breakdown of the time between "now" and a target instant.
///
/// All components carry the sign of `total_ms`: for a target in the past every
/// field is negative (or zero). Derived view data only; never persisted.
/// Components are floor-truncated toward zero magnitude, never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTime {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_ms: i64,
}

/// Compute `target - now` as a countdown breakdown.
///
/// Callers driving a live display re-invoke this every second; there is no
/// cached state to refresh.
pub fn signed_delta(target: NaiveDateTime, now: NaiveDateTime) -> CountdownTime {
    let total_ms = (target - now).num_milliseconds();
    let abs = total_ms.abs();

    let days = abs / DAY_MS;
    let hours = abs / (60 * 60 * 1000) % 24;
    let minutes = abs / (60 * 1000) % 60;
    let seconds = abs / 1000 % 60;

    if total_ms < 0 {
        CountdownTime {
            days: -days,
            hours: -hours,
            minutes: -minutes,
            seconds: -seconds,
            total_ms,
        }
    } else {
        CountdownTime {
            days,
            hours,
            minutes,
            seconds,
            total_ms,
        }
    }
}

pub fn signed_delta_now(target: NaiveDateTime) -> CountdownTime {
    signed_delta(target, super::now())
}

pub fn is_overdue(time: &CountdownTime) -> bool {
    time.total_ms < 0
}

/// Less than 24 hours remain and the target has not passed. Overdue targets
/// are never urgent.
pub fn is_urgent(time: &CountdownTime) -> bool {
    !is_overdue(time) && time.total_ms < DAY_MS
}

pub fn format_countdown(time: &CountdownTime) -> String {
    if time.days > 0 {
        format!(
            "{} • {:02}:{:02}:{:02}",
            time.days, time.hours, time.minutes, time.seconds
        )
    } else {
        format!("{:02}:{:02}:{:02}", time.hours, time.minutes, time.seconds)
    }
}

pub fn format_time_left(time: &CountdownTime) -> String {
    if is_overdue(time) {
        let days = time.days.abs();
        if days > 0 {
            format!("+{} days", days)
        } else {
            "Overdue".to_string()
        }
    } else {
        format_countdown(time)
    }
}

/// A repeating one-second timer bound to a cancellation flag.
///
/// Each live countdown view owns one ticker and cancels it on teardown;
/// dropping the handle cancels too, so cleanup happens on every exit path.
pub struct Ticker {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn every_second<F>(mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                tick();
                thread::sleep(Duration::from_secs(1));
            }
        });
        Self {
            cancelled,
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicUsize;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn future_target_is_positive() {
        let now = at(2026, 8, 26, 12, 0, 0);
        let target = at(2026, 8, 31, 22, 30, 45);
        let time = signed_delta(target, now);
        assert_eq!(time.days, 5);
        assert_eq!(time.hours, 10);
        assert_eq!(time.minutes, 30);
        assert_eq!(time.seconds, 45);
        assert!(time.total_ms > 0);
        assert!(!is_overdue(&time));
    }

    #[test]
    fn past_target_negates_every_component() {
        let now = at(2026, 8, 26, 12, 0, 0);
        let target = at(2026, 8, 24, 9, 15, 30);
        let time = signed_delta(target, now);
        assert_eq!(time.days, -2);
        assert_eq!(time.hours, -2);
        assert_eq!(time.minutes, -44);
        assert_eq!(time.seconds, -30);
        assert!(time.total_ms < 0);
        assert!(is_overdue(&time));
    }

    #[test]
    fn overdue_is_never_urgent() {
        let now = at(2026, 8, 26, 12, 0, 0);
        let time = signed_delta(at(2026, 8, 26, 11, 59, 59), now);
        assert!(is_overdue(&time));
        assert!(!is_urgent(&time));
    }

    #[test]
    fn under_a_day_is_urgent() {
        let now = at(2026, 8, 26, 12, 0, 0);
        let time = signed_delta(at(2026, 8, 27, 11, 0, 0), now);
        assert!(is_urgent(&time));
        // exactly 24h out is not urgent
        let time = signed_delta(at(2026, 8, 27, 12, 0, 0), now);
        assert!(!is_urgent(&time));
    }

    #[test]
    fn format_with_and_without_days() {
        let time = CountdownTime {
            days: 5,
            hours: 10,
            minutes: 30,
            seconds: 45,
            total_ms: 1,
        };
        assert_eq!(format_countdown(&time), "5 • 10:30:45");

        let time = CountdownTime {
            days: 0,
            hours: 2,
            minutes: 5,
            seconds: 8,
            total_ms: 1,
        };
        assert_eq!(format_countdown(&time), "02:05:08");
    }

    #[test]
    fn time_left_for_overdue_targets() {
        let mut time = CountdownTime {
            days: -3,
            hours: -1,
            minutes: 0,
            seconds: 0,
            total_ms: -1,
        };
        assert_eq!(format_time_left(&time), "+3 days");
        time.days = 0;
        assert_eq!(format_time_left(&time), "Overdue");
        time.total_ms = 1;
        time.hours = 1;
        assert_eq!(format_time_left(&time), "01:00:00");
    }

    #[test]
    fn ticker_fires_and_cancels() {
        static TICKS: AtomicUsize = AtomicUsize::new(0);
        let mut ticker = Ticker::every_second(|| {
            TICKS.fetch_add(1, Ordering::Relaxed);
        });
        // first tick fires immediately
        thread::sleep(Duration::from_millis(100));
        ticker.cancel();
        let seen = TICKS.load(Ordering::Relaxed);
        assert!(seen >= 1);
        thread::sleep(Duration::from_millis(1100));
        assert_eq!(TICKS.load(Ordering::Relaxed), seen);
    }
}
