use std::{fmt, str::FromStr};

/// a planetside 2 server, as the population and census apis know it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum World {
    Connery,
    Miller,
    Cobalt,
    Emerald,
    Jaeger,
    Apex,
    SolTech,
}

impl World {
    pub const ALL: [World; 7] = [
        World::Connery,
        World::Miller,
        World::Cobalt,
        World::Emerald,
        World::Jaeger,
        World::Apex,
        World::SolTech,
    ];

    pub fn id(self) -> u32 {
        match self {
            World::Connery => 1,
            World::Miller => 10,
            World::Cobalt => 13,
            World::Emerald => 17,
            World::Jaeger => 19,
            World::Apex => 24,
            World::SolTech => 40,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            World::Connery => "Connery",
            World::Miller => "Miller",
            World::Cobalt => "Cobalt",
            World::Emerald => "Emerald",
            World::Jaeger => "Jaeger",
            World::Apex => "Apex",
            World::SolTech => "SolTech",
        }
    }

    pub fn from_id(id: u32) -> Option<World> {
        World::ALL.into_iter().find(|world| world.id() == id)
    }

    /// case-insensitive lookup by world name. surrounding whitespace is ignored.
    pub fn from_name(name: &str) -> Option<World> {
        let name = name.trim();

        let world = World::ALL
            .into_iter()
            .find(|world| world.name().eq_ignore_ascii_case(name));

        tracing::debug!(world_name = %name, world_id = ?world.map(World::id), "looked up world");

        world
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown world: {0}")]
pub struct UnknownWorld(pub String);

impl FromStr for World {
    type Err = UnknownWorld;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        World::from_name(s).ok_or_else(|| UnknownWorld(s.to_owned()))
    }
}
