pub mod time;

pub use time::IntervalTimer;
