use constants::STARTUP_TIME;
use planetside::PlanetsideClient;
use poise::serenity_prelude as serenity;
use world::World;

#[derive(Clone)]
struct Data {
    prefix: String,
    default_world: World,
    planetside: PlanetsideClient,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

mod commands;
mod constants;
mod init;
mod models;
mod planetside;
mod telemetry;
mod world;

#[tracing::instrument(skip_all)]
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot } = event {
        tracing::info!(
            "successfully connected to the discord api. connected as user: {}",
            data_about_bot.user.name
        );
    }

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(err = ?error, command = %ctx.command().qualified_name, "an error occurred when running command");

            let _ = ctx
                .reply("something went wrong while running that command...")
                .await
                .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"));
        }
        error => {
            let _ = poise::builtins::on_error(error).await.inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when handling framework error"),
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = &*STARTUP_TIME;

    let _telemetry = telemetry::init_telemetry().map_err(|e| anyhow::anyhow!(e))?;

    let mut client = init::init().await?;

    client
        .start()
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "discord client stopped with an error"))?;

    Ok(())
}
