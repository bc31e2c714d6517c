pub mod timer;

pub use timer::{Clock, HighPrecisionClock, Stopwatch, SystemClock, TimestampSource};
