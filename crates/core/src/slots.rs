//! Discrete time grid derived from the school configuration.

use types::{DayOfWeek, SchoolConfig, TimeOfDay};

/// Start times of every session that fits between day_start and day_end.
pub fn slot_starts(cfg: &SchoolConfig) -> Vec<TimeOfDay> {
    let mut starts = Vec::new();
    if cfg.session_minutes == 0 {
        return starts;
    }
    let mut t = cfg.day_start;
    loop {
        match t.plus_minutes(cfg.session_minutes) {
            Some(end) if end <= cfg.day_end => {
                starts.push(t);
                t = end;
            }
            _ => break,
        }
    }
    starts
}

/// Configured school days in canonical Monday-first order, deduplicated.
pub fn school_days(cfg: &SchoolConfig) -> Vec<DayOfWeek> {
    let mut days = cfg.school_days.clone();
    days.sort_by_key(|d| d.index());
    days.dedup();
    days
}

/// Neighbors of `day` within the configured sequence. Days the school
/// skips do not bridge their neighbors, and the week does not wrap.
pub fn adjacent_days(days: &[DayOfWeek], day: DayOfWeek) -> (Option<DayOfWeek>, Option<DayOfWeek>) {
    let Some(pos) = days.iter().position(|&d| d == day) else {
        return (None, None);
    };
    let prev = (pos > 0).then(|| days[pos - 1]);
    let next = days.get(pos + 1).copied();
    (prev, next)
}
