#![allow(dead_code)]

use std::path::PathBuf;

use dockroute_lib::{ModelLibrary, StationDefinition, StationType};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn models_dir() -> PathBuf {
    fixtures_dir().join("models")
}

pub fn stations_dir() -> PathBuf {
    fixtures_dir().join("stations")
}

pub fn models() -> ModelLibrary {
    ModelLibrary::load_dir(&models_dir()).expect("fixture models load")
}

/// Build the fixture station type `<id>.json`.
pub fn station(id: &str) -> StationType {
    let path = stations_dir().join(format!("{id}.json"));
    let definition = StationDefinition::from_path(&path).expect("fixture definition parses");
    StationType::build(id, &definition, &models()).expect("fixture station builds")
}
