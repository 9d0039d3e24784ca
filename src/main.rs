#[macro_use]
extern crate diesel;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::MysqlConnection;
use dotenv::dotenv;
use serenity::{
    async_trait,
    framework::standard::{
        macros::{group, hook},
        StandardFramework,
    },
    model::{
        channel::Message,
        event::ResumedEvent,
        gateway::Ready,
        id::GuildId,
        interactions::{application_command::ApplicationCommandOptionType, Interaction},
    },
    prelude::{Client, Context, EventHandler},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{error, info, instrument};

mod clients;
mod commands;
mod config;
mod jobs;
mod notify;
mod schedule;
mod store;

use clients::discord::DiscordMessenger;
use commands::ping::*;
use config::Config;
use notify::NotificationGate;
use schedule::JobScheduler;
use store::log_store::LogStore;
use store::mysql_store::MysqlKvStore;

struct Handler {
    is_loop_running: AtomicBool,
    config: Config,
    store: LogStore<MysqlKvStore>,
}

#[async_trait]
impl EventHandler for Handler {
    // For instrument to work, all parameters must implement Debug.
    // Handler doesn't implement Debug here, so we specify to skip that argument.
    // Context doesn't implement Debug either, so it is also skipped.
    #[instrument(skip(self, _ctx))]
    async fn resume(&self, _ctx: Context, resume: ResumedEvent) {
        info!("Resumed; trace: {:?}", resume.trace);
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} ready and connected", ready.user.name);

        for guild in ready.guilds {
            if let Err(why) = guild
                .id()
                .create_application_command(&ctx.http, |cmd| {
                    cmd.name("logs")
                        .description("Configure the mod and server log channels")
                        .create_option(|opt| {
                            opt.name("action")
                                .description("What to do with the log")
                                .kind(ApplicationCommandOptionType::String)
                                .required(true)
                                .add_string_choice("set", "set")
                                .add_string_choice("disable", "disable")
                                .add_string_choice("view", "view")
                        })
                        .create_option(|opt| {
                            opt.name("type")
                                .description("Which log to configure")
                                .kind(ApplicationCommandOptionType::String)
                                .required(true)
                                .add_string_choice("mod", "mod")
                                .add_string_choice("server", "server")
                        })
                        .create_option(|opt| {
                            opt.name("channel")
                                .description("Channel the log should go to (for set)")
                                .kind(ApplicationCommandOptionType::Channel)
                                .required(false)
                        })
                })
                .await
            {
                error!("Cannot create guild command {}", why);
            }

            info!("Slash commands ready in guild {}", guild.id());
        }
    }

    async fn cache_ready(&self, ctx: Context, _guilds: Vec<GuildId>) {
        info!("Cache ready, starting recurring jobs");

        // cache_ready can fire again on reconnect; the jobs only start once
        if self.is_loop_running.swap(true, Ordering::Relaxed) {
            return;
        }

        let messenger = DiscordMessenger::new(Arc::new(ctx));
        let gate = Arc::new(NotificationGate::new(messenger));

        let mut scheduler = JobScheduler::new();
        for job in jobs::configured_jobs(&self.config, gate) {
            scheduler.register(job);
        }
        scheduler.start();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested, stopping recurring jobs");
                scheduler.stop();
            }
        });
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            info!(
                "Got slash command '{}' by user '{}'",
                command.data.name, command.user.name
            );

            let ctx = Arc::new(ctx);
            if let Err(why) = commands::handler(Arc::clone(&ctx), &self.store, &command).await {
                error!("Failed to handle slash command: {}", why);
            }
        }
    }
}

#[hook]
#[instrument]
async fn before(_: &Context, msg: &Message, cmd: &str) -> bool {
    info!("Got command '{}' by user '{}'", cmd, msg.author.name);
    true
}

#[group]
#[commands(ping)]
struct General;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(why) => {
            error!("Invalid configuration: {}", why);
            std::process::exit(1);
        }
    };

    let manager = ConnectionManager::<MysqlConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .build(manager)
        .expect("Failed to build database pool");
    let store = LogStore::new(MysqlKvStore::new(pool));

    let framework = StandardFramework::new()
        .configure(|c| c.prefix("~"))
        .before(before)
        .group(&GENERAL_GROUP);

    let token = config.discord_token.clone();
    let application_id = config.application_id;

    let mut client = Client::builder(&token)
        .event_handler(Handler {
            is_loop_running: AtomicBool::new(false),
            config,
            store,
        })
        .application_id(application_id)
        .framework(framework)
        .await
        .expect("Err creating client");

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    };
}
