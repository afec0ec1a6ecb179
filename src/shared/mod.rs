pub mod logging;

pub use logging::{append_event_line, now_secs, EventLog};
