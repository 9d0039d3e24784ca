//! The recurring jobs this bot actually runs, built from startup config.

use crate::config::Config;
use crate::notify::{Messenger, NotificationGate};
use crate::schedule::RecurringJob;
use chrono::{NaiveTime, Weekday};
use std::sync::Arc;
use tracing::warn;

/// Daily birthday announcement at 8 AM and the Friday music-night reminder
/// at 19:45, both in the configured zone. A job whose flag is off, or whose
/// channel id is missing, is simply not built.
pub fn configured_jobs<M: Messenger + 'static>(
    config: &Config,
    gate: Arc<NotificationGate<M>>,
) -> Vec<RecurringJob> {
    let mut jobs = Vec::new();

    if config.birthdays_enabled {
        match config.birthday_channel_id {
            Some(channel) => {
                let gate = Arc::clone(&gate);
                jobs.push(RecurringJob::new(
                    "birthdays",
                    NaiveTime::from_hms(8, 0, 0),
                    config.zone,
                    None,
                    move || {
                        let gate = Arc::clone(&gate);
                        async move {
                            gate.notify(channel, "\u{1F382} Today's birthdays are up!").await;
                            Ok(())
                        }
                    },
                ));
            }
            None => warn!("Birthdays enabled but no channel configured, job not scheduled"),
        }
    }

    if config.music_night_enabled {
        match config.music_night_channel_id {
            Some(channel) => {
                let text = match config.music_night_mention_id {
                    Some(user) => format!("\u{23F0} <@{}> **Music night in 15 minutes!**", user),
                    None => String::from("\u{23F0} **Music night in 15 minutes!**"),
                };
                let gate = Arc::clone(&gate);
                jobs.push(RecurringJob::new(
                    "music-night",
                    NaiveTime::from_hms(19, 45, 0),
                    config.zone,
                    Some(Weekday::Fri),
                    move || {
                        let gate = Arc::clone(&gate);
                        let text = text.clone();
                        async move {
                            gate.notify(channel, &text).await;
                            Ok(())
                        }
                    },
                ));
            }
            None => warn!("Music night enabled but no channel configured, job not scheduled"),
        }
    }

    jobs
}
