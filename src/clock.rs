use chrono::{DateTime, FixedOffset, Local};

/// Source of the current time, swapped out in tests so expiry and month
/// rollover are deterministic.
pub(crate) trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Budget month key, `YYYY-MM`.
    fn month_key(&self) -> String {
        self.now().format("%Y-%m").to_string()
    }
}

/// Wall-clock local time.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        DateTime::<FixedOffset>::from(Local::now())
    }
}

#[cfg(test)]
pub(crate) use fixed::FixedClock;
