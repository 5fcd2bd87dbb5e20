use semver::Version;

const CONTINENTS: [&str; 6] = ["Indar", "Esamir", "Amerish", "Hossin", "Oshur", "Koltyr"];

fn version_name(semver: &Version) -> &'static str {
    CONTINENTS[((semver.major + semver.minor) as usize) % CONTINENTS.len()]
}

pub fn get_version() -> String {
    let semver = env!("CARGO_PKG_VERSION").parse::<Version>();

    if let Ok(semver) = semver {
        // vergen writes this placeholder when the build has no git checkout
        if env!("VERGEN_GIT_SHA") == "VERGEN_IDEMPOTENT_OUTPUT" {
            format!("{} - {}", semver, version_name(&semver))
        } else {
            format!(
                "{} - {} [`{}`]",
                semver,
                version_name(&semver),
                env!("VERGEN_GIT_SHA"),
            )
        }
    } else {
        tracing::warn!("couldn't parse a semver out of Cargo.toml? defaulting to 0.0.0-unknown.");
        String::from("0.0.0-unknown - No Version Name")
    }
}
