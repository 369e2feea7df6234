use rand::Rng;

/// Lowest suffix a report name can carry.
pub const SUFFIX_MIN: u16 = 1000;
/// Highest suffix a report name can carry.
pub const SUFFIX_MAX: u16 = 9999;

/// Source of the unix timestamp embedded in report names.
pub trait Clock: Send + Sync {
    fn unix_seconds(&self) -> i64;
}

/// Source of the random suffix embedded in report names.
pub trait SuffixSource: Send + Sync {
    /// Must return a value in `SUFFIX_MIN..=SUFFIX_MAX`.
    fn next_suffix(&self) -> u16;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> u16 {
        rand::rng().random_range(SUFFIX_MIN..=SUFFIX_MAX)
    }
}
