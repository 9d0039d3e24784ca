use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Weekday};

/// Computes how long to wait until the next occurrence of `target` wall-clock
/// time in the zone `now` is expressed in, optionally constrained to a single
/// day of the week.
///
/// A candidate landing exactly on `now` counts as already passed, so the
/// result is always strictly positive and a job armed right at its fire time
/// waits a full day instead of double-firing at startup.
///
/// The zone is a fixed numeric offset, so the math runs in naive local time;
/// DST transitions are out of scope.
pub fn initial_delay(
    now: DateTime<FixedOffset>,
    target: NaiveTime,
    day_filter: Option<Weekday>,
) -> Duration {
    let local_now = now.naive_local();
    let mut candidate = local_now.date().and_time(target);

    if candidate <= local_now {
        candidate = candidate + Duration::days(1);
    }

    if let Some(day) = day_filter {
        // candidate is at most a day ahead here, so 7 steps always reach `day`
        for _ in 0..7 {
            if candidate.weekday() == day {
                break;
            }
            candidate = candidate + Duration::days(1);
        }
    }

    candidate - local_now
}
