use poise::serenity_prelude::CreateEmbed;
use thousands::Separable;

use crate::{
    constants::planetside::{CENSUS_API_URL, EMBED_COLOUR},
    models::{
        census::{Character, Faction},
        fisu::WorldPopulation,
    },
    planetside::{OutfitProfile, PlayerProfile},
    world::{UnknownWorld, World},
    Context, Error,
};

fn population_description(population: &WorldPopulation) -> String {
    format!(
        "**TR**: {}\n**NC**: {}\n**VS**: {}\n**NSO**: {}\n**Total**: {}",
        population.tr,
        population.nc,
        population.vs,
        population.ns,
        population.total(),
    )
}

fn outfit_label(character: &Character) -> String {
    match &character.outfit {
        Some(outfit) => match outfit.alias.as_deref().filter(|alias| !alias.is_empty()) {
            Some(alias) => format!("[{}] {}", alias, outfit.name),
            None => outfit.name.clone(),
        },
        None => String::from("None"),
    }
}

fn discord_timestamp(unix: i64, style: char) -> String {
    format!("<t:{unix}:{style}>")
}

fn faction_image_url(faction: &Faction) -> Option<String> {
    faction
        .image_path
        .as_deref()
        .map(|path| format!("{CENSUS_API_URL}{path}"))
}

fn player_description(profile: &PlayerProfile) -> String {
    let character = &profile.character;
    let unknown = || String::from("Unknown");

    let battle_rank = character
        .battle_rank
        .as_ref()
        .map_or_else(unknown, |rank| rank.value.to_string());
    let (created, last_login, minutes_played) = match &character.times {
        Some(times) => (
            discord_timestamp(times.creation, 'D'),
            discord_timestamp(times.last_login, 'R'),
            times.minutes_played.separate_with_commas(),
        ),
        None => (unknown(), unknown(), unknown()),
    };
    let certs = character
        .certs
        .as_ref()
        .map_or_else(unknown, |certs| certs.earned_points.separate_with_commas());

    format!(
        "**General Information**
---------------------
**World**: {world}
**Faction**: {faction}
**Outfit**: {outfit}
**Battle Rank**: {battle_rank}
**Prestige**: {prestige}

**Performance Information**
-------------------------
**Total Kills**: {kills}
**Total Deaths**: {deaths}
**KDR**: {kdr:.2}

**Misc Information**
------------------
**Currently Playing**: {online}
**Created**: {created}
**Last Login**: {last_login}
**Minutes Played**: {minutes_played}
**Total Certs Earned**: {certs}",
        world = profile.world_name,
        faction = profile.faction.name.en,
        outfit = outfit_label(character),
        prestige = character.prestige_level.unwrap_or_default(),
        kills = profile.total_kills.separate_with_commas(),
        deaths = profile.total_deaths.separate_with_commas(),
        kdr = profile.kdr(),
        online = if character.is_online() { "Yes" } else { "No" },
    )
}

fn outfit_description(profile: &OutfitProfile) -> String {
    format!(
        "**Outfit name**: {}\n**Creation Date**: {}\n**Member Count**: {}\n**Outfit Leader**: {}",
        profile.outfit.name,
        discord_timestamp(profile.outfit.time_created, 'D'),
        profile.outfit.member_count.separate_with_commas(),
        profile.leader.name.first,
    )
}

/// the outfit's own tag when census has one, otherwise what the user typed.
fn outfit_title(profile: &OutfitProfile, outfit_tag: &str) -> String {
    let tag = profile
        .outfit
        .alias
        .as_deref()
        .filter(|alias| !alias.is_empty())
        .unwrap_or(outfit_tag);

    format!("Outfit Information for {tag}:")
}

fn unknown_world_reply(err: &UnknownWorld) -> String {
    format!("World: {} unknown.", err.0)
}

fn worlds_description() -> String {
    World::ALL
        .iter()
        .map(|world| format!("**{}**: {}", world.name(), world.id()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// get current population data for a planetside 2 world.
#[poise::command(prefix_command, slash_command, broadcast_typing)]
#[tracing::instrument(skip_all)]
pub async fn population(
    ctx: Context<'_>,
    #[description = "world to get population for, defaults to the bot's home world"]
    world: Option<String>,
) -> Result<(), Error> {
    let world_name = world.unwrap_or_else(|| ctx.data().default_world.name().to_owned());

    let world = match world_name.parse::<World>() {
        Ok(world) => world,
        Err(e) => {
            tracing::warn!(err = %e, "unknown world");

            ctx.reply(unknown_world_reply(&e))
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when sending reply"),
                )?;

            return Ok(());
        }
    };

    match ctx.data().planetside.population(world).await {
        Ok(population) => {
            let embed = CreateEmbed::new()
                .title(format!("Current population data for: {world}"))
                .description(population_description(&population))
                .colour(EMBED_COLOUR);

            ctx.send(poise::CreateReply::default().embed(embed))
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when sending reply"),
                )?;
        }
        Err(e) => {
            tracing::error!(err = ?e, world = %world, world_id = world.id(), "failed to get current population data");

            ctx.reply(format!(
                "Failed to get current population data for world: {world_name}, ID: {}",
                world.id()
            ))
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;
        }
    }

    Ok(())
}

/// get information for a planetside 2 player.
#[poise::command(prefix_command, slash_command, broadcast_typing)]
#[tracing::instrument(skip_all)]
pub async fn playerinfo(
    ctx: Context<'_>,
    #[description = "name of the character to look up"] player_name: String,
) -> Result<(), Error> {
    let profile = match ctx.data().planetside.player_profile(&player_name).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(err = ?e, player_name = %player_name, "failed to get player information");

            ctx.reply(format!("Failed to get player information for: {player_name}"))
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when sending reply"),
                )?;

            return Ok(());
        }
    };

    let mut embed = CreateEmbed::new()
        .title(format!("{}'s Information", profile.character.name.first))
        .description(player_description(&profile))
        .colour(EMBED_COLOUR);

    if let Some(url) = faction_image_url(&profile.faction) {
        embed = embed.thumbnail(url);
    }

    ctx.send(poise::CreateReply::default().embed(embed))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// get information for a planetside 2 outfit.
#[poise::command(prefix_command, slash_command, broadcast_typing)]
#[tracing::instrument(skip_all)]
pub async fn outfitinfo(
    ctx: Context<'_>,
    #[description = "tag of the outfit to look up"] outfit_tag: String,
) -> Result<(), Error> {
    let profile = match ctx.data().planetside.outfit_profile(&outfit_tag).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(err = ?e, outfit_tag = %outfit_tag, "failed to get outfit information");

            ctx.reply(format!(
                "Failed to get outfit information for outfit tag: {outfit_tag}."
            ))
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

            return Ok(());
        }
    };

    let embed = CreateEmbed::new()
        .title(outfit_title(&profile, &outfit_tag))
        .description(outfit_description(&profile))
        .colour(EMBED_COLOUR);

    ctx.send(poise::CreateReply::default().embed(embed))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// list the worlds the bot knows about.
#[poise::command(prefix_command, slash_command)]
#[tracing::instrument(skip_all)]
pub async fn worlds(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default().embed(
            CreateEmbed::new()
                .title("Planetside 2 worlds")
                .description(worlds_description())
                .colour(EMBED_COLOUR),
        ),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::census::Outfit;

    fn character(json: &str) -> Character {
        serde_json::from_str(json).unwrap()
    }

    fn higby() -> Character {
        character(
            r#"{
                "character_id": "5428010618015189713",
                "name": {"first": "Higby", "first_lower": "higby"},
                "faction_id": "1",
                "times": {
                    "creation": "1353369661",
                    "creation_date": "2012-11-20 00:01:01.0",
                    "last_login": "1717990000",
                    "last_login_date": "2024-06-10 03:26:40.0",
                    "minutes_played": "151234"
                },
                "certs": {"earned_points": "873415"},
                "battle_rank": {"value": "120"},
                "prestige_level": "2",
                "outfit": {"outfit_id": "37509488620604883", "name": "Dark Nemesis", "alias": "DA"},
                "online_status": "17",
                "world_id": "17"
            }"#,
        )
    }

    fn vanu() -> Faction {
        serde_json::from_str(
            r#"{
                "faction_id": "1",
                "name": {"en": "Vanu Sovereignty"},
                "image_path": "/files/ps2/images/static/94.png",
                "code_tag": "VS"
            }"#,
        )
        .unwrap()
    }

    fn outfit(alias: &str) -> Outfit {
        serde_json::from_str(&format!(
            r#"{{
                "outfit_id": "37509488620604883",
                "name": "Dark Nemesis",
                "alias": "{alias}",
                "time_created": "1356069661",
                "time_created_date": "2012-12-21 06:01:01.0",
                "leader_character_id": "5428010618015189713",
                "member_count": "1024"
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn describes_population() {
        let population = WorldPopulation {
            vs: 312,
            nc: 287,
            tr: 401,
            ns: 12,
        };

        assert_eq!(
            population_description(&population),
            "**TR**: 401\n**NC**: 287\n**VS**: 312\n**NSO**: 12\n**Total**: 1012"
        );
    }

    #[test]
    fn describes_player() {
        let profile = PlayerProfile {
            character: higby(),
            world_name: String::from("Emerald"),
            faction: vanu(),
            total_kills: 32232,
            total_deaths: 10234,
        };

        let description = player_description(&profile);

        assert!(description.starts_with("**General Information**\n"));
        assert!(description.contains("**World**: Emerald\n"));
        assert!(description.contains("**Faction**: Vanu Sovereignty\n"));
        assert!(description.contains("**Outfit**: [DA] Dark Nemesis\n"));
        assert!(description.contains("**Battle Rank**: 120\n"));
        assert!(description.contains("**Prestige**: 2\n"));
        assert!(description.contains("**Total Kills**: 32,232\n"));
        assert!(description.contains("**Total Deaths**: 10,234\n"));
        assert!(description.contains("**KDR**: 3.15\n"));
        assert!(description.contains("**Currently Playing**: Yes\n"));
        assert!(description.contains("**Created**: <t:1353369661:D>\n"));
        assert!(description.contains("**Last Login**: <t:1717990000:R>\n"));
        assert!(description.contains("**Minutes Played**: 151,234\n"));
        assert!(description.ends_with("**Total Certs Earned**: 873,415"));
    }

    #[test]
    fn describes_sparse_player() {
        let profile = PlayerProfile {
            character: character(r#"{"character_id": "7", "name": {"first": "Fresh"}}"#),
            world_name: String::from("Unknown"),
            faction: vanu(),
            total_kills: 3,
            total_deaths: 0,
        };

        let description = player_description(&profile);

        assert!(description.contains("**Outfit**: None\n"));
        assert!(description.contains("**Battle Rank**: Unknown\n"));
        assert!(description.contains("**Prestige**: 0\n"));
        assert!(description.contains("**KDR**: 3.00\n"));
        assert!(description.contains("**Currently Playing**: No\n"));
        assert!(description.contains("**Created**: Unknown\n"));
    }

    #[test]
    fn outfit_without_alias_shows_name_only() {
        let mut character = higby();
        character.outfit.as_mut().unwrap().alias = Some(String::new());

        assert_eq!(outfit_label(&character), "Dark Nemesis");
    }

    #[test]
    fn faction_thumbnail_points_at_census() {
        assert_eq!(
            faction_image_url(&vanu()).as_deref(),
            Some("https://census.daybreakgames.com/files/ps2/images/static/94.png")
        );
    }

    #[test]
    fn describes_outfit() {
        let profile = OutfitProfile {
            outfit: outfit("DA"),
            leader: higby(),
        };

        assert_eq!(
            outfit_description(&profile),
            "**Outfit name**: Dark Nemesis\n**Creation Date**: <t:1356069661:D>\n**Member Count**: 1,024\n**Outfit Leader**: Higby"
        );
        assert_eq!(
            outfit_title(&profile, "da"),
            "Outfit Information for DA:"
        );
    }

    #[test]
    fn outfit_title_falls_back_to_typed_tag() {
        let profile = OutfitProfile {
            outfit: outfit(""),
            leader: higby(),
        };

        assert_eq!(
            outfit_title(&profile, "Dasa"),
            "Outfit Information for Dasa:"
        );
    }

    #[test]
    fn unknown_world_reply_echoes_input() {
        let err = "Briggs".parse::<World>().unwrap_err();

        assert_eq!(unknown_world_reply(&err), "World: Briggs unknown.");
    }

    #[test]
    fn lists_every_world() {
        let description = worlds_description();

        assert_eq!(description.lines().count(), World::ALL.len());
        assert!(description.starts_with("**Connery**: 1\n"));
        assert!(description.ends_with("**SolTech**: 40"));
    }
}
