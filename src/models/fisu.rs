use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct PopulationResponse {
    pub result: Vec<WorldPopulation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WorldPopulation {
    pub vs: u32,
    pub nc: u32,
    pub tr: u32,
    #[serde(default)]
    pub ns: u32,
}

impl WorldPopulation {
    pub fn total(&self) -> u32 {
        self.vs + self.nc + self.tr + self.ns
    }
}
