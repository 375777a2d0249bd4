//! Presentation timestamps for caption data ordering.

/// A presentation timestamp in 100 ns ticks (Windows `FILETIME`-compatible
/// units, the convention of the surrounding media pipeline).
///
/// The decoder core never interprets timestamps beyond ordering; they key
/// the [`CaptionDataQueue`](crate::process::queue::CaptionDataQueue).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const TICKS_PER_MILLISECOND: u64 = 10_000;

    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn from_millis(milliseconds: u64) -> Self {
        Self(milliseconds * Self::TICKS_PER_MILLISECOND)
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }

    pub const fn as_millis(self) -> u64 {
        self.0 / Self::TICKS_PER_MILLISECOND
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}
