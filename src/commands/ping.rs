use poise::serenity_prelude::{Colour, CreateEmbed};
use time::OffsetDateTime;

use crate::{Context, Error};

/// discord's epoch, 2015-01-01T00:00:00Z, in unix milliseconds.
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// unix milliseconds at which a snowflake id was minted.
fn snowflake_timestamp_ms(id: u64) -> i64 {
    (id >> 22) as i64 + DISCORD_EPOCH_MS
}

fn latency_ms(id: u64, now: OffsetDateTime) -> i64 {
    let now_ms = (now.unix_timestamp_nanos() / 1_000_000) as i64;

    now_ms - snowflake_timestamp_ms(id)
}

/// pongs back to check the bot is running, with the response time in milliseconds.
#[poise::command(prefix_command, slash_command)]
#[tracing::instrument(skip_all)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = latency_ms(ctx.id(), OffsetDateTime::now_utc());
    let gateway = ctx.ping().await;

    tracing::info!(latency_ms = latency, gateway = ?gateway, "running ping command");

    let mut content = format!("Pong!\n**Latency**: {latency}ms");
    if !gateway.is_zero() {
        content += &format!("\n**Gateway**: {}ms", gateway.as_millis());
    }

    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .embed(CreateEmbed::new().title(":ping_pong:").colour(Colour::RED)),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}
