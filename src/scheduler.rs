//! Background tasks that decide their own next run.
//!
//! A [`ScheduledTask`] sleeps for an initial delay, runs its unit of work, and
//! sleeps again for whatever delay the work returned. Returning `None` ends
//! the task. Dropping or cancelling the handle aborts the task.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use tokio::task::JoinHandle;

/// Lower bound for any delay, so a zero-length lifetime cannot spin.
pub const MIN_DELAY: Duration = Duration::from_secs(1);

pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawns the task on the current tokio runtime.
    ///
    /// `work` receives the delay it was scheduled with, which lets a failing
    /// run retry on the same cadence.
    pub fn spawn<F, Fut>(first_delay: Duration, mut work: F) -> Self
    where
        F: FnMut(Duration) -> Fut + Send + 'static,
        Fut: Future<Output = Option<Duration>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut delay = first_delay.max(MIN_DELAY);
            loop {
                tokio::time::sleep(delay).await;
                match work(delay).await {
                    Some(next) => delay = next.max(MIN_DELAY),
                    None => break,
                }
            }
        });

        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Time left until the next local midnight after `now`.
pub fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let tomorrow = now.date_naive().checked_add_days(Days::new(1));
    let next = tomorrow
        .zip(NaiveTime::from_hms_opt(0, 0, 0))
        .map(|(day, midnight)| day.and_time(midnight))
        .and_then(|naive| now.timezone().from_local_datetime(&naive).earliest());

    match next {
        Some(next) => (next.fixed_offset() - now.fixed_offset())
            .to_std()
            .unwrap_or(MIN_DELAY),
        None => Duration::from_secs(24 * 60 * 60),
    }
}

/// Runs `work` every day at local midnight.
pub fn daily<F, Fut>(mut work: F) -> ScheduledTask
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    ScheduledTask::spawn(until_next_midnight(&Local::now()), move |_| {
        let run = work();
        async move {
            run.await;
            Some(until_next_midnight(&Local::now()))
        }
    })
}
