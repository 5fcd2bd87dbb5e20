use poise::serenity_prelude::Colour;

pub static FISU_API_URL: &str = "https://ps2.fisu.pw/api";
pub static CENSUS_API_URL: &str = "https://census.daybreakgames.com";
pub static CENSUS_NAMESPACE: &str = "ps2:v2";
pub static DEFAULT_CENSUS_SERVICE_ID: &str = "s:example";

/// census profile id covering every class.
pub static GLOBAL_PROFILE_ID: &str = "0";

pub const EMBED_COLOUR: Colour = Colour::TEAL;
