//! Daily sweep: a background task anchored at a fixed local wall-clock hour.
//!
//! Each tick closes expired polls and reports on the open ones. This is the
//! only path that closes a poll purely by elapsed time; without it a poll in
//! a silent topic would never close.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::engine::MatchPollService;

pub struct DailySweep {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl DailySweep {
    /// Spawn the sweep loop. The first tick fires at the next occurrence of
    /// `report_hour` local time, then once every day.
    pub fn start(service: Arc<MatchPollService>, report_hour: u32) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                let now = Local::now();
                let next = next_run_after(now, report_hour);
                let wait = (next - now).to_std().unwrap_or_default();
                println!("[SWEEP] Next sweep at {}", next.format("%Y-%m-%d %H:%M"));

                tokio::select! {
                  _ = token.cancelled() => break,
                  _ = sleep(wait) => {
                    if let Err(e) = service.sweep_tick(Local::now()).await {
                      eprintln!("[SWEEP] Sweep failed: {e}");
                    }
                  }
                }
            }
        });

        Self { cancel, handle }
    }

    pub fn stop(self) {
        self.cancel.cancel();
        self.handle.abort(); // best-effort
    }
}

/// Next occurrence of `hour:00` local time strictly after `now`.
///
/// On DST transitions where that wall-clock time is ambiguous or missing,
/// falls back to the earliest valid interpretation, or `now + 24h`.
fn next_run_after(now: DateTime<Local>, hour: u32) -> DateTime<Local> {
    for days in 0..=2 {
        let date = now.date_naive() + Duration::days(days);
        let Some(naive) = date.and_hms_opt(hour, 0, 0) else {
            continue;
        };
        let candidate = match Local.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) => Some(dt),
            chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest),
            chrono::LocalResult::None => None,
        };
        if let Some(dt) = candidate {
            if dt > now {
                return dt;
            }
        }
    }
    now + Duration::hours(24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn next_run_is_later_today_when_hour_not_passed() {
        let now = Local.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let next = next_run_after(now, 21);
        assert_eq!(next.hour(), 21);
        assert_eq!(next.date_naive(), now.date_naive());
    }

    #[test]
    fn next_run_rolls_to_tomorrow_when_hour_passed() {
        let now = Local.with_ymd_and_hms(2026, 3, 2, 21, 0, 0).unwrap();
        let next = next_run_after(now, 21);
        assert!(next > now);
        assert_eq!(next.date_naive(), now.date_naive() + Duration::days(1));
    }

    #[test]
    fn next_run_is_strictly_in_the_future() {
        let now = Local.with_ymd_and_hms(2026, 3, 2, 20, 59, 59).unwrap();
        let next = next_run_after(now, 21);
        assert!(next > now);
        assert!((next - now) <= Duration::hours(25));
    }
}
