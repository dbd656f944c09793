pub mod time;

pub use time::{
    format_minutes, intervals_overlap, local_today, minutes_of, time_from_minutes, to_minutes, weekday_of,
    TimeError, MINUTES_PER_DAY,
};
