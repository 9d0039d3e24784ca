use chrono::FixedOffset;
use std::env;

/// Startup configuration, read once from the environment.
///
/// Anything malformed is an error here so a bad zone or channel id is fatal
/// before any job is registered, not at its first firing.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub application_id: u64,
    pub database_url: String,
    /// Fixed UTC offset all wall-clock schedules are expressed in. The host
    /// and the operators may sit in different zones, so this is never the
    /// system-local zone.
    pub zone: FixedOffset,
    pub birthdays_enabled: bool,
    pub birthday_channel_id: Option<u64>,
    pub music_night_enabled: bool,
    pub music_night_channel_id: Option<u64>,
    pub music_night_mention_id: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let discord_token =
            env::var("DISCORD_TOKEN").map_err(|_| "DISCORD_TOKEN env var required")?;
        let application_id = env::var("APPLICATION_ID")
            .map_err(|_| "APPLICATION_ID env var required")?
            .parse()
            .map_err(|_| "APPLICATION_ID is not a valid id")?;
        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL env var required")?;

        let offset_hours: i32 = env::var("UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| String::from("-6"))
            .parse()
            .map_err(|_| "UTC_OFFSET_HOURS is not a number")?;
        let zone = FixedOffset::east_opt(offset_hours * 3600)
            .ok_or("UTC_OFFSET_HOURS must be between -23 and 23")?;

        let birthdays_enabled = flag("BIRTHDAYS_ENABLED");
        let birthday_channel_id =
            channel_id("BIRTHDAY_CHANNEL_ID", birthdays_enabled, "BIRTHDAYS_ENABLED")?;

        let music_night_enabled = flag("MUSIC_NIGHT_ENABLED");
        let music_night_channel_id = channel_id(
            "MUSIC_NIGHT_CHANNEL_ID",
            music_night_enabled,
            "MUSIC_NIGHT_ENABLED",
        )?;
        let music_night_mention_id = match env::var("MUSIC_NIGHT_MENTION_ID") {
            Ok(raw) => Some(
                raw.parse()
                    .map_err(|_| "MUSIC_NIGHT_MENTION_ID is not a valid id")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            discord_token,
            application_id,
            database_url,
            zone,
            birthdays_enabled,
            birthday_channel_id,
            music_night_enabled,
            music_night_channel_id,
            music_night_mention_id,
        })
    }
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|raw| raw == "true" || raw == "1")
        .unwrap_or(false)
}

fn channel_id(
    name: &str,
    required: bool,
    enabled_by: &str,
) -> Result<Option<u64>, Box<dyn std::error::Error + Send + Sync>> {
    match env::var(name) {
        Ok(raw) => Ok(Some(
            raw.parse()
                .map_err(|_| format!("{} is not a valid channel id", name))?,
        )),
        Err(_) if required => Err(format!("{} required when {} is set", name, enabled_by).into()),
        Err(_) => Ok(None),
    }
}
