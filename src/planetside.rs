use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;

use crate::constants::planetside::{
    CENSUS_API_URL, CENSUS_NAMESPACE, DEFAULT_CENSUS_SERVICE_ID, FISU_API_URL, GLOBAL_PROFILE_ID,
};
use crate::models::census::{
    Character, CharacterStat, CharacterStatByFaction, Collection, Faction, Outfit, WorldInfo,
};
use crate::models::fisu::{PopulationResponse, WorldPopulation};
use crate::world::World;

#[derive(Debug, thiserror::Error)]
pub enum PlanetsideError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("census returned an error: {0}")]
    Census(String),

    #[error("census response is missing `{0}_list`")]
    MissingList(&'static str),

    #[error("no {collection} found for {query}")]
    NotFound {
        collection: &'static str,
        query: String,
    },

    #[error("no population data for world {0}")]
    NoPopulation(u32),
}

/// everything `playerinfo` shows about a character.
#[derive(Clone, Debug)]
pub struct PlayerProfile {
    pub character: Character,
    pub world_name: String,
    pub faction: Faction,
    pub total_kills: u64,
    pub total_deaths: u64,
}

impl PlayerProfile {
    /// kills per death, rounded to two decimals. a deathless character's kdr is their kill count.
    pub fn kdr(&self) -> f64 {
        let kills = self.total_kills as f64;

        if self.total_deaths == 0 {
            return kills;
        }

        (kills / self.total_deaths as f64 * 100.0).round() / 100.0
    }
}

#[derive(Clone, Debug)]
pub struct OutfitProfile {
    pub outfit: Outfit,
    pub leader: Character,
}

/// adds the `s:` prefix census expects, falling back to the public example id.
pub fn normalize_service_id(service_id: &str) -> String {
    let service_id = service_id.trim();

    if service_id.is_empty() {
        DEFAULT_CENSUS_SERVICE_ID.to_owned()
    } else if service_id.starts_with("s:") {
        service_id.to_owned()
    } else {
        format!("s:{service_id}")
    }
}

/// pulls `<collection>_list` out of a census response body.
pub fn parse_census_list<T: Collection>(body: &str) -> Result<Vec<T>, PlanetsideError> {
    let mut value: Value = serde_json::from_str(body)?;

    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());

        return Err(PlanetsideError::Census(message));
    }

    if let Some(code) = value.get("errorCode") {
        let code = code.as_str().unwrap_or_default();
        let message = value
            .get("errorMessage")
            .and_then(Value::as_str)
            .unwrap_or_default();

        return Err(PlanetsideError::Census(format!("{code}: {message}")));
    }

    let list = value
        .get_mut(format!("{}_list", T::NAME))
        .map(Value::take)
        .ok_or(PlanetsideError::MissingList(T::NAME))?;

    Ok(serde_json::from_value(list)?)
}

/// first row of a census list, or `NotFound` naming the query that matched nothing.
pub fn first_or_not_found<T: Collection>(
    rows: Vec<T>,
    query: &[(&str, &str)],
) -> Result<T, PlanetsideError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| PlanetsideError::NotFound {
            collection: T::NAME,
            query: query
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join("&"),
        })
}

pub fn first_population(
    resp: PopulationResponse,
    world: World,
) -> Result<WorldPopulation, PlanetsideError> {
    resp.result
        .into_iter()
        .next()
        .ok_or(PlanetsideError::NoPopulation(world.id()))
}

/// characters census has no stats row for count as zero.
pub fn total_deaths_of(stats: &[CharacterStat]) -> u64 {
    stats.first().map_or(0, |stat| stat.value_forever)
}

pub fn total_kills_of(stats: &[CharacterStatByFaction]) -> u64 {
    stats
        .first()
        .map_or(0, CharacterStatByFaction::value_forever)
}

/// census treats a leading `^`, `*`, `!`, `<`, `>` or `[` in a filter value as a
/// search modifier, so only plain ascii alphanumerics are ever sent.
fn filter_value(
    value: &str,
    collection: &'static str,
    max_len: usize,
) -> Result<String, PlanetsideError> {
    let value = value.trim();

    if value.is_empty()
        || value.len() > max_len
        || !value.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(PlanetsideError::NotFound {
            collection,
            query: value.to_owned(),
        });
    }

    Ok(value.to_ascii_lowercase())
}

/// lowercased character name, 1 to 32 ascii alphanumerics.
pub fn character_name_filter(name: &str) -> Result<String, PlanetsideError> {
    filter_value(name, Character::NAME, 32)
}

/// lowercased outfit tag, 1 to 4 ascii alphanumerics.
pub fn outfit_tag_filter(tag: &str) -> Result<String, PlanetsideError> {
    filter_value(tag, Outfit::NAME, 4)
}

#[derive(Clone)]
pub struct PlanetsideClient {
    client: reqwest::Client,
    service_id: String,
}

impl PlanetsideClient {
    pub fn new(service_id: &str) -> Result<Self, PlanetsideError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("nanite/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(PlanetsideClient {
            client,
            service_id: normalize_service_id(service_id),
        })
    }

    pub fn census_url(&self, collection: &str) -> String {
        format!(
            "{CENSUS_API_URL}/{}/get/{CENSUS_NAMESPACE}/{collection}",
            self.service_id
        )
    }

    async fn get_text(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<String, PlanetsideError> {
        tracing::debug!(endpoint = %endpoint, ?query, "getting json response from endpoint");

        let resp = self
            .client
            .get(endpoint)
            .query(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .inspect_err(
                |e| tracing::error!(err = ?e, endpoint = %endpoint, "an error occurred when sending request"),
            )?;

        let text = resp.text().await.inspect_err(
            |e| tracing::error!(err = ?e, "an error occurred when receiving response text"),
        )?;

        Ok(text)
    }

    async fn census<T: Collection>(
        &self,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, PlanetsideError> {
        let text = self.get_text(&self.census_url(T::NAME), query).await?;

        parse_census_list(&text).inspect_err(
            |e| tracing::error!(err = ?e, text = %text, collection = T::NAME, "an error occurred when parsing census response"),
        )
    }

    async fn census_one<T: Collection>(
        &self,
        query: &[(&str, &str)],
    ) -> Result<T, PlanetsideError> {
        first_or_not_found(self.census(query).await?, query)
    }

    #[tracing::instrument(skip(self))]
    pub async fn population(&self, world: World) -> Result<WorldPopulation, PlanetsideError> {
        let world_id = world.id().to_string();
        let text = self
            .get_text(
                &format!("{FISU_API_URL}/population/"),
                &[("world", world_id.as_str())],
            )
            .await?;

        let resp: PopulationResponse = serde_json::from_str(&text).inspect_err(
            |e| tracing::error!(err = ?e, text = %text, "an error occurred when parsing population response"),
        )?;

        first_population(resp, world)
    }

    #[tracing::instrument(skip(self))]
    pub async fn character_by_name(&self, name: &str) -> Result<Character, PlanetsideError> {
        let name_lower = character_name_filter(name)?;

        self.census_one(&[
            ("name.first_lower", name_lower.as_str()),
            ("c:resolve", "outfit,online_status,world"),
        ])
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn character_by_id(&self, character_id: u64) -> Result<Character, PlanetsideError> {
        let character_id = character_id.to_string();

        self.census_one(&[("character_id", character_id.as_str())]).await
    }

    /// known worlds are named from the local table, anything else asks census.
    #[tracing::instrument(skip(self))]
    pub async fn world_name(&self, world_id: u32) -> Result<String, PlanetsideError> {
        if let Some(world) = World::from_id(world_id) {
            return Ok(world.name().to_owned());
        }

        let world_id = world_id.to_string();
        let world: WorldInfo = self.census_one(&[("world_id", world_id.as_str())]).await?;

        Ok(world.name.en)
    }

    #[tracing::instrument(skip(self))]
    pub async fn faction(&self, faction_id: u32) -> Result<Faction, PlanetsideError> {
        let faction_id = faction_id.to_string();

        self.census_one(&[("faction_id", faction_id.as_str())]).await
    }

    /// lifetime weapon deaths. characters census has no stats for count as zero.
    #[tracing::instrument(skip(self))]
    pub async fn total_deaths(&self, character_id: u64) -> Result<u64, PlanetsideError> {
        let character_id = character_id.to_string();

        let stats: Vec<CharacterStat> = self
            .census(&[
                ("character_id", character_id.as_str()),
                ("stat_name", "weapon_deaths"),
                ("profile_id", GLOBAL_PROFILE_ID),
            ])
            .await?;

        Ok(total_deaths_of(&stats))
    }

    /// lifetime weapon kills against every faction.
    #[tracing::instrument(skip(self))]
    pub async fn total_kills(&self, character_id: u64) -> Result<u64, PlanetsideError> {
        let character_id = character_id.to_string();

        let stats: Vec<CharacterStatByFaction> = self
            .census(&[
                ("character_id", character_id.as_str()),
                ("stat_name", "weapon_kills"),
                ("profile_id", GLOBAL_PROFILE_ID),
            ])
            .await?;

        Ok(total_kills_of(&stats))
    }

    #[tracing::instrument(skip(self))]
    pub async fn outfit_by_tag(&self, tag: &str) -> Result<Outfit, PlanetsideError> {
        let tag_lower = outfit_tag_filter(tag)?;

        self.census_one(&[("alias_lower", tag_lower.as_str())]).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn player_profile(&self, name: &str) -> Result<PlayerProfile, PlanetsideError> {
        let character = self.character_by_name(name).await?;
        let character_id = character.character_id;

        let world_name = async {
            match character.world_id {
                Some(world_id) => self.world_name(world_id).await,
                None => Ok(String::from("Unknown")),
            }
        };

        let faction = async {
            match character.faction_id {
                Some(faction_id) => self.faction(faction_id).await,
                None => Err(PlanetsideError::NotFound {
                    collection: Faction::NAME,
                    query: format!("character_id={character_id}"),
                }),
            }
        };

        let (world_name, faction, total_kills, total_deaths) = futures::try_join!(
            world_name,
            faction,
            self.total_kills(character_id),
            self.total_deaths(character_id),
        )?;

        Ok(PlayerProfile {
            character,
            world_name,
            faction,
            total_kills,
            total_deaths,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn outfit_profile(&self, tag: &str) -> Result<OutfitProfile, PlanetsideError> {
        let outfit = self.outfit_by_tag(tag).await?;
        let leader = self.character_by_id(outfit.leader_character_id).await?;

        Ok(OutfitProfile { outfit, leader })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(total_kills: u64, total_deaths: u64) -> PlayerProfile {
        PlayerProfile {
            character: serde_json::from_str(r#"{"character_id": "1", "name": {"first": "A"}}"#)
                .unwrap(),
            world_name: String::from("Miller"),
            faction: serde_json::from_str(
                r#"{"faction_id": "2", "name": {"en": "New Conglomerate"}}"#,
            )
            .unwrap(),
            total_kills,
            total_deaths,
        }
    }

    #[test]
    fn service_ids_get_prefixed() {
        assert_eq!(normalize_service_id("nanite"), "s:nanite");
        assert_eq!(normalize_service_id("s:nanite"), "s:nanite");
        assert_eq!(normalize_service_id("  "), "s:example");
    }

    #[test]
    fn census_urls_include_service_id_and_namespace() {
        let client = PlanetsideClient::new("nanite").unwrap();

        assert_eq!(
            client.census_url("character"),
            "https://census.daybreakgames.com/s:nanite/get/ps2:v2/character"
        );
    }

    #[test]
    fn parses_census_list() {
        let body = r#"{
            "faction_list": [
                {
                    "faction_id": "3",
                    "name": {"de": "Terranische Republik", "en": "Terran Republic"},
                    "image_set_id": "90",
                    "image_id": "18",
                    "image_path": "/files/ps2/images/static/18.png",
                    "code_tag": "TR",
                    "user_selectable": "1"
                }
            ],
            "returned": 1
        }"#;

        let factions: Vec<Faction> = parse_census_list(body).unwrap();

        assert_eq!(factions.len(), 1);
        assert_eq!(factions[0].name.en, "Terran Republic");
        assert_eq!(
            factions[0].image_path.as_deref(),
            Some("/files/ps2/images/static/18.png")
        );
    }

    #[test]
    fn empty_census_list_is_not_an_error() {
        let outfits: Vec<Outfit> =
            parse_census_list(r#"{"outfit_list": [], "returned": 0}"#).unwrap();

        assert!(outfits.is_empty());
    }

    #[test]
    fn census_errors_are_surfaced() {
        let err = parse_census_list::<Character>(r#"{"error": "No data found."}"#).unwrap_err();
        assert!(matches!(err, PlanetsideError::Census(message) if message == "No data found."));

        let err = parse_census_list::<Character>(
            r#"{"errorCode": "SERVER_ERROR", "errorMessage": "INVALID_SEARCH_TERM"}"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, PlanetsideError::Census(message) if message == "SERVER_ERROR: INVALID_SEARCH_TERM")
        );
    }

    #[test]
    fn wrong_collection_is_reported() {
        let err = parse_census_list::<Outfit>(r#"{"character_list": [], "returned": 0}"#)
            .unwrap_err();

        assert!(matches!(err, PlanetsideError::MissingList("outfit")));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = parse_census_list::<Outfit>("<html>503</html>").unwrap_err();

        assert!(matches!(err, PlanetsideError::Decode(_)));
    }

    #[test]
    fn empty_census_list_is_not_found() {
        let outfits: Vec<Outfit> =
            parse_census_list(r#"{"outfit_list": [], "returned": 0}"#).unwrap();

        let err = first_or_not_found(outfits, &[("alias_lower", "zzzz")]).unwrap_err();

        assert!(matches!(
            err,
            PlanetsideError::NotFound { collection: "outfit", query } if query == "alias_lower=zzzz"
        ));
    }

    #[test]
    fn first_row_is_returned() {
        let factions: Vec<Faction> = parse_census_list(
            r#"{"faction_list": [
                {"faction_id": "1", "name": {"en": "Vanu Sovereignty"}},
                {"faction_id": "2", "name": {"en": "New Conglomerate"}}
            ], "returned": 2}"#,
        )
        .unwrap();

        let faction = first_or_not_found(factions, &[("faction_id", "1")]).unwrap();

        assert_eq!(faction.name.en, "Vanu Sovereignty");
    }

    #[test]
    fn empty_population_result_is_an_error() {
        let resp: PopulationResponse = serde_json::from_str(r#"{"result": []}"#).unwrap();

        let err = first_population(resp, World::Cobalt).unwrap_err();

        assert!(matches!(err, PlanetsideError::NoPopulation(13)));
    }

    #[test]
    fn population_takes_first_result() {
        let resp: PopulationResponse = serde_json::from_str(
            r#"{"result": [{"worldId": 1, "vs": 10, "nc": 20, "tr": 30, "ns": 4}]}"#,
        )
        .unwrap();

        assert_eq!(first_population(resp, World::Connery).unwrap().total(), 64);
    }

    #[test]
    fn missing_stats_rows_count_as_zero() {
        let deaths: Vec<CharacterStat> =
            parse_census_list(r#"{"characters_stat_list": [], "returned": 0}"#).unwrap();
        let kills: Vec<CharacterStatByFaction> =
            parse_census_list(r#"{"characters_stat_by_faction_list": [], "returned": 0}"#)
                .unwrap();

        assert_eq!(total_deaths_of(&deaths), 0);
        assert_eq!(total_kills_of(&kills), 0);
    }

    #[test]
    fn stats_rows_are_totalled() {
        let deaths: Vec<CharacterStat> = parse_census_list(
            r#"{"characters_stat_list": [{"value_forever": "10234"}], "returned": 1}"#,
        )
        .unwrap();
        let kills: Vec<CharacterStatByFaction> = parse_census_list(
            r#"{"characters_stat_by_faction_list": [
                {"value_forever_vs": "1", "value_forever_nc": "2", "value_forever_tr": "3"}
            ], "returned": 1}"#,
        )
        .unwrap();

        assert_eq!(total_deaths_of(&deaths), 10234);
        assert_eq!(total_kills_of(&kills), 6);
    }

    #[test]
    fn character_names_are_lowercased() {
        assert_eq!(character_name_filter("  Higby ").unwrap(), "higby");
        assert_eq!(
            character_name_filter("ThisNameIsExactlyThirtyTwoCharsX").unwrap(),
            "thisnameisexactlythirtytwocharsx"
        );
    }

    #[test]
    fn census_search_modifiers_are_rejected() {
        for name in ["^hig", "!x", "*", "<a", ">a", "[a", "hig by", "", "   "] {
            assert!(
                matches!(
                    character_name_filter(name),
                    Err(PlanetsideError::NotFound { collection: "character", .. })
                ),
                "{name:?} should be rejected"
            );
        }

        assert!(character_name_filter("ThisNameIsExactlyThirtyTwoCharsXY").is_err());
    }

    #[test]
    fn outfit_tags_are_validated() {
        assert_eq!(outfit_tag_filter("DA").unwrap(), "da");
        assert_eq!(outfit_tag_filter("1TR2").unwrap(), "1tr2");

        for tag in ["*", "!x", "^d", "", "  ", "TOOLONG"] {
            assert!(
                matches!(
                    outfit_tag_filter(tag),
                    Err(PlanetsideError::NotFound { collection: "outfit", .. })
                ),
                "{tag:?} should be rejected"
            );
        }
    }

    #[test]
    fn kdr_is_rounded_to_two_places() {
        assert_eq!(profile(32232, 10234).kdr(), 3.15);
        assert_eq!(profile(1, 3).kdr(), 0.33);
        assert_eq!(profile(0, 12).kdr(), 0.0);
    }

    #[test]
    fn kdr_without_deaths_is_kill_count() {
        assert_eq!(profile(17, 0).kdr(), 17.0);
    }
}
