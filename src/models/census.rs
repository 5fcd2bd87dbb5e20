use serde::{de::DeserializeOwned, Deserialize};

/// a census collection, returned under `<NAME>_list` in every response.
pub trait Collection: DeserializeOwned {
    const NAME: &'static str;
}

/// census sends almost every number as a string.
mod stringly {
    use std::{fmt::Display, str::FromStr};

    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        String(String),
    }

    impl Raw {
        fn parse<T, E>(self) -> Result<T, E>
        where
            T: FromStr,
            T::Err: Display,
            E: de::Error,
        {
            let text = match self {
                Raw::Unsigned(n) => n.to_string(),
                Raw::Signed(n) => n.to_string(),
                Raw::Float(n) => n.to_string(),
                Raw::String(s) => s,
            };

            text.trim().parse().map_err(E::custom)
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        Raw::deserialize(deserializer)?.parse()
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            D: Deserializer<'de>,
            T: FromStr,
            T::Err: Display,
        {
            match Option::<Raw>::deserialize(deserializer)? {
                Some(Raw::String(s)) if s.trim().is_empty() => Ok(None),
                Some(raw) => raw.parse().map(Some),
                None => Ok(None),
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CharacterName {
    pub first: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LocalizedName {
    pub en: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CharacterTimes {
    #[serde(deserialize_with = "stringly::deserialize")]
    pub creation: i64,
    #[serde(deserialize_with = "stringly::deserialize")]
    pub last_login: i64,
    #[serde(deserialize_with = "stringly::deserialize")]
    pub minutes_played: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CharacterCerts {
    #[serde(deserialize_with = "stringly::deserialize")]
    pub earned_points: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BattleRank {
    #[serde(deserialize_with = "stringly::deserialize")]
    pub value: u32,
}

/// the outfit summary census attaches to a character with `c:resolve=outfit`.
#[derive(Clone, Debug, Deserialize)]
pub struct CharacterOutfit {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Character {
    #[serde(deserialize_with = "stringly::deserialize")]
    pub character_id: u64,
    pub name: CharacterName,
    #[serde(default, deserialize_with = "stringly::option::deserialize")]
    pub faction_id: Option<u32>,
    #[serde(default)]
    pub times: Option<CharacterTimes>,
    #[serde(default)]
    pub certs: Option<CharacterCerts>,
    #[serde(default)]
    pub battle_rank: Option<BattleRank>,
    #[serde(default, deserialize_with = "stringly::option::deserialize")]
    pub prestige_level: Option<u32>,
    #[serde(default)]
    pub outfit: Option<CharacterOutfit>,
    #[serde(default)]
    pub online_status: Option<String>,
    #[serde(default, deserialize_with = "stringly::option::deserialize")]
    pub world_id: Option<u32>,
}

impl Character {
    /// census reports `0` for offline characters and the world id otherwise.
    pub fn is_online(&self) -> bool {
        self.online_status
            .as_deref()
            .and_then(|status| status.parse::<u32>().ok())
            .is_some_and(|status| status != 0)
    }
}

impl Collection for Character {
    const NAME: &'static str = "character";
}

#[derive(Clone, Debug, Deserialize)]
pub struct Outfit {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(deserialize_with = "stringly::deserialize")]
    pub time_created: i64,
    #[serde(deserialize_with = "stringly::deserialize")]
    pub leader_character_id: u64,
    #[serde(deserialize_with = "stringly::deserialize")]
    pub member_count: u32,
}

impl Collection for Outfit {
    const NAME: &'static str = "outfit";
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldInfo {
    pub name: LocalizedName,
}

impl Collection for WorldInfo {
    const NAME: &'static str = "world";
}

#[derive(Clone, Debug, Deserialize)]
pub struct Faction {
    pub name: LocalizedName,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl Collection for Faction {
    const NAME: &'static str = "faction";
}

#[derive(Clone, Debug, Deserialize)]
pub struct CharacterStat {
    #[serde(deserialize_with = "stringly::deserialize")]
    pub value_forever: u64,
}

impl Collection for CharacterStat {
    const NAME: &'static str = "characters_stat";
}

#[derive(Clone, Debug, Deserialize)]
pub struct CharacterStatByFaction {
    #[serde(deserialize_with = "stringly::deserialize")]
    pub value_forever_vs: u64,
    #[serde(deserialize_with = "stringly::deserialize")]
    pub value_forever_nc: u64,
    #[serde(deserialize_with = "stringly::deserialize")]
    pub value_forever_tr: u64,
}

impl CharacterStatByFaction {
    pub fn value_forever(&self) -> u64 {
        self.value_forever_vs + self.value_forever_nc + self.value_forever_tr
    }
}

impl Collection for CharacterStatByFaction {
    const NAME: &'static str = "characters_stat_by_faction";
}
