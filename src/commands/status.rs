use std::time::UNIX_EPOCH;

use crate::{
    commands::get_bot_avatar,
    constants::{planetside::EMBED_COLOUR, version::get_version, POISE_VERSION, STARTUP_TIME},
    Context, Error,
};
use poise::serenity_prelude as serenity;

/// get the bot's status.
#[poise::command(prefix_command, slash_command)]
#[tracing::instrument(skip_all)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let uptime_since = STARTUP_TIME
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_secs())
        .unwrap_or_default();

    ctx.send(poise::CreateReply::default().embed(
        serenity::CreateEmbed::new()
        .colour(EMBED_COLOUR)
        .field(
            "about the bot",
            "Nanite relays Planetside 2 server population, player and outfit statistics, using the [poise](https://github.com/serenity-rs/poise) framework.".to_string(),
            false
        )
        .field("version", get_version(), false)
        .field("rust", format!("[{0}](https://releases.rs/docs/{0})", rustc_version_runtime::version()), true)
        .field("poise", format!("[{0}](https://docs.rs/crate/poise/{0})", POISE_VERSION), true)
        .field("default world", ctx.data().default_world.to_string(), true)
        .field("uptime", format!("<t:{}:R>", uptime_since), true)
        .thumbnail(get_bot_avatar(ctx))
    ))
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}
