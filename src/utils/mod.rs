pub mod clock;
pub mod time_parser;

pub use clock::{Clock, FixedClock, SystemClock};
pub use time_parser::parse_schedule_time;
