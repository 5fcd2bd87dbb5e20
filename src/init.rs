use anyhow::Context as _;
use poise::serenity_prelude::{self as serenity, *};
use tracing::Instrument;

use crate::{
    commands, constants::planetside::DEFAULT_CENSUS_SERVICE_ID, event_handler, on_error,
    planetside::PlanetsideClient, world::World, Data,
};

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_WORLD: World = World::Miller;

fn parse_prefix(value: Option<String>) -> String {
    value
        .map(|prefix| prefix.trim().to_owned())
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_owned())
}

fn parse_default_world(value: Option<String>) -> World {
    match value {
        Some(name) => World::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(world = %name, "unknown DEFAULT_PS2_WORLD, falling back to {}.", DEFAULT_WORLD);
            DEFAULT_WORLD
        }),
        None => DEFAULT_WORLD,
    }
}

fn init_prefix() -> String {
    let prefix = parse_prefix(std::env::var("BOT_PREFIX").ok());
    tracing::info!("using command prefix {}", prefix);

    prefix
}

fn init_default_world() -> World {
    let world = parse_default_world(std::env::var("DEFAULT_PS2_WORLD").ok());
    tracing::info!("using {} as the default world.", world);

    world
}

fn init_planetside_client() -> anyhow::Result<PlanetsideClient> {
    let service_id = match std::env::var("CENSUS_SERVICE_ID") {
        Ok(service_id) => service_id,
        Err(_) => {
            tracing::warn!(
                "no census service id found. falling back to {}, which is heavily rate limited.",
                DEFAULT_CENSUS_SERVICE_ID
            );
            DEFAULT_CENSUS_SERVICE_ID.to_owned()
        }
    };

    let client = PlanetsideClient::new(&service_id)
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when building http client"))?;

    Ok(client)
}

async fn init_discord_client(token: &str, data: Data) -> anyhow::Result<Client> {
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::help::help(),
                commands::status::status(),
                commands::ping::ping(),
                commands::planetside::population(),
                commands::planetside::playerinfo(),
                commands::planetside::outfitinfo(),
                commands::planetside::worlds(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(data.prefix.clone()),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when registering commands"))?;

                Ok(data)
            }.in_current_span())
        })
        .build();

    let client = ClientBuilder::new(token, intents)
        .framework(framework)
        .activity(serenity::ActivityData {
            name: "Planetside 2".into(),
            kind: serenity::ActivityType::Playing,
            state: None,
            url: None,
        })
        .await?;

    Ok(client)
}

pub async fn init() -> anyhow::Result<Client> {
    tracing::info!("initializing... please wait warmly.");

    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;

    let prefix = init_prefix();
    let default_world = init_default_world();
    let planetside = init_planetside_client()?;

    let data = Data {
        prefix,
        default_world,
        planetside,
    };

    let client = init_discord_client(&token, data).await?;

    tracing::info!("finished initializing!");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_defaults_when_unset_or_blank() {
        assert_eq!(parse_prefix(None), "!");
        assert_eq!(parse_prefix(Some(String::from("   "))), "!");
        assert_eq!(parse_prefix(Some(String::from("n>"))), "n>");
    }

    #[test]
    fn default_world_accepts_any_case() {
        assert_eq!(parse_default_world(Some(String::from("cobalt"))), World::Cobalt);
        assert_eq!(parse_default_world(Some(String::from("SOLTECH"))), World::SolTech);
    }

    #[test]
    fn default_world_falls_back_to_miller() {
        assert_eq!(parse_default_world(None), World::Miller);
        assert_eq!(parse_default_world(Some(String::from("briggs"))), World::Miller);
    }
}
