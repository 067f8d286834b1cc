//! Collection of loaded station types.
//!
//! The catalog is built once at startup and then only read. Surface and
//! orbital types are kept apart because callers pick station types by where
//! the station sits.

use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::definition::{DockMethod, StationDefinition};
use crate::error::{Error, Result};
use crate::model::{is_json, ModelSource};
use crate::station::StationType;

const SUGGESTION_LIMIT: usize = 3;
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// A definition file that could not be turned into a station type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedStation {
    pub id: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Surface and orbital station types, keyed by definition id.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    surface: Vec<StationType>,
    orbital: Vec<StationType>,
    rejected: Vec<RejectedStation>,
}

impl StationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` definition in `dir`, in file name order.
    ///
    /// A definition that fails to parse or build is logged, recorded in
    /// [`StationCatalog::rejected`] and skipped; the others still load.
    pub fn load_dir<S: ModelSource>(dir: &Path, models: &S) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if is_json(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let built = StationDefinition::from_path(&path)
                .and_then(|definition| StationType::build(&id, &definition, models));
            match built {
                Ok(station) => catalog.insert(station),
                Err(err) => {
                    warn!(station = %id, path = %path.display(), error = %err, "skipping station type");
                    catalog.rejected.push(RejectedStation {
                        id,
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            surface = catalog.surface.len(),
            orbital = catalog.orbital.len(),
            rejected = catalog.rejected.len(),
            "loaded station types"
        );
        Ok(catalog)
    }

    pub fn insert(&mut self, station: StationType) {
        match station.dock_method() {
            DockMethod::Surface => self.surface.push(station),
            DockMethod::Orbital => self.orbital.push(station),
        }
    }

    pub fn surface_types(&self) -> &[StationType] {
        &self.surface
    }

    pub fn orbital_types(&self) -> &[StationType] {
        &self.orbital
    }

    pub fn rejected(&self) -> &[RejectedStation] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.surface.len() + self.orbital.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All station types, surface first.
    pub fn iter(&self) -> impl Iterator<Item = &StationType> {
        self.surface.iter().chain(self.orbital.iter())
    }

    pub fn find_by_name(&self, id: &str) -> Option<&StationType> {
        self.iter().find(|station| station.id() == id)
    }

    /// Like [`StationCatalog::find_by_name`], but fails with suggestions of
    /// similarly named station types.
    pub fn find_by_name_or_suggest(&self, id: &str) -> Result<&StationType> {
        self.find_by_name(id)
            .ok_or_else(|| Error::UnknownStationType {
                name: id.to_string(),
                suggestions: self.fuzzy_matches(id, SUGGESTION_LIMIT),
            })
    }

    /// Station ids most similar to `id`, best match first.
    pub fn fuzzy_matches(&self, id: &str, limit: usize) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .iter()
            .map(|station| (strsim::jaro_winkler(id, station.id()), station.id()))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Pick a random surface (`ground`) or orbital station type.
    pub fn random_type<R: Rng + ?Sized>(&self, rng: &mut R, ground: bool) -> Option<&StationType> {
        if ground {
            self.surface.choose(rng)
        } else {
            self.orbital.choose(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Matrix4;
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::model::{SceneTag, TagDump};

    fn station(id: &str, kind: &str) -> StationType {
        let definition =
            StationDefinition::from_json(&format!(r#"{{"model": "m", "type": "{kind}"}}"#))
                .unwrap();
        let model = TagDump::new("m", vec![SceneTag::new("pad_A_s0_100", Matrix4::identity())]);
        StationType::from_model(id, &definition, &model).unwrap()
    }

    fn catalog() -> StationCatalog {
        let mut catalog = StationCatalog::new();
        catalog.insert(station("ground_outpost", "surface"));
        catalog.insert(station("orbital_ring", "orbital"));
        catalog.insert(station("orbital_spire", "orbital"));
        catalog
    }

    #[test]
    fn splits_by_dock_method() {
        let catalog = catalog();
        assert_eq!(catalog.surface_types().len(), 1);
        assert_eq!(catalog.orbital_types().len(), 2);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn unknown_id_suggests_close_names() {
        let catalog = catalog();
        assert!(catalog.find_by_name_or_suggest("orbital_ring").is_ok());

        let err = catalog.find_by_name_or_suggest("orbital_rng").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown station type"));
        assert!(message.contains("orbital_ring"));
    }

    #[test]
    fn random_type_respects_ground_flag() {
        let catalog = catalog();
        let mut rng = StepRng::new(0, 1);
        let ground = catalog.random_type(&mut rng, true).unwrap();
        assert!(ground.is_surface_station());
        let orbital = catalog.random_type(&mut rng, false).unwrap();
        assert!(orbital.is_orbital_station());
        assert!(StationCatalog::new().random_type(&mut rng, true).is_none());
    }
}
