use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use oasis_core::SeedSet;

const BUNDLED_CABINS_JSON: &str = include_str!("../../seed/cabins.json");
const BUNDLED_GUESTS_JSON: &str = include_str!("../../seed/guests.json");
const BUNDLED_BOOKINGS_JSON: &str = include_str!("../../seed/bookings.json");

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Could not read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse seed file {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The seed files compiled into the binary
pub fn bundled() -> Result<SeedSet, SeedError> {
    Ok(SeedSet {
        cabins: parse("cabins.json", BUNDLED_CABINS_JSON)?,
        guests: parse("guests.json", BUNDLED_GUESTS_JSON)?,
        bookings: parse("bookings.json", BUNDLED_BOOKINGS_JSON)?,
    })
}

/// Read `cabins.json`, `guests.json` and `bookings.json` from `dir`
pub fn load_dir(dir: impl AsRef<Path>) -> Result<SeedSet, SeedError> {
    let dir = dir.as_ref();
    info!("Loading seed data from {}", dir.display());

    Ok(SeedSet {
        cabins: read(dir, "cabins.json")?,
        guests: read(dir, "guests.json")?,
        bookings: read(dir, "bookings.json")?,
    })
}

/// Seeds from `dir` when given, otherwise the bundled set
pub fn load(dir: Option<&str>) -> Result<SeedSet, SeedError> {
    match dir {
        Some(dir) => load_dir(dir),
        None => bundled(),
    }
}

fn read<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>, SeedError> {
    let path = dir.join(name);
    let raw = fs::read_to_string(&path).map_err(|source| SeedError::Io { path, source })?;
    parse(name, &raw)
}

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> Result<Vec<T>, SeedError> {
    serde_json::from_str(raw).map_err(|source| SeedError::Parse {
        name: name.to_string(),
        source,
    })
}
