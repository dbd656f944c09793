// libs/schedule-cell/src/services/closure.rs
use chrono::NaiveDate;

use shared_models::Closure;

pub const DEFAULT_CLOSURE_REASON: &str = "Closed";

/// First active closure whose inclusive range contains `date`.
pub fn first_closure(date: NaiveDate, closures: &[Closure]) -> Option<&Closure> {
    closures.iter().find(|closure| closure.covers(date))
}

pub fn is_closed(date: NaiveDate, closures: &[Closure]) -> bool {
    first_closure(date, closures).is_some()
}

/// Explanation surfaced to callers for a closed date.
pub fn closure_reason(closure: &Closure) -> String {
    closure
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(DEFAULT_CLOSURE_REASON)
        .to_string()
}
