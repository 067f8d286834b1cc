//! Access to the marker tags of station models.
//!
//! Model loading belongs to the renderer; this crate only needs named tags with
//! their global transforms. [`StationModel`] and [`ModelSource`] describe that
//! seam, and [`TagDump`]/[`ModelLibrary`] implement it over JSON exports of a
//! model's tags so stations can be assembled without a scene graph.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use nalgebra::Matrix4;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;

/// Named marker with its global transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTag {
    pub name: String,
    pub transform: Matrix4<f32>,
}

impl SceneTag {
    pub fn new(name: impl Into<String>, transform: Matrix4<f32>) -> Self {
        Self {
            name: name.into(),
            transform,
        }
    }
}

/// A loaded model exposing its marker tags.
pub trait StationModel {
    fn name(&self) -> &str;

    fn tags(&self) -> &[SceneTag];

    /// Tags whose name starts with `prefix`, in model order.
    fn find_tags_by_start_of_name(&self, prefix: &str) -> Vec<&SceneTag> {
        self.tags()
            .iter()
            .filter(|tag| tag.name.starts_with(prefix))
            .collect()
    }
}

/// Lookup of models by name.
pub trait ModelSource {
    type Model: StationModel;

    fn find_model(&self, name: &str) -> Option<&Self::Model>;
}

#[derive(Debug, Deserialize)]
struct RawTagDump {
    name: String,
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
    /// Column-major 4x4 matrix.
    transform: [f32; 16],
}

/// Tags exported from one model.
#[derive(Debug, Clone, PartialEq)]
pub struct TagDump {
    name: String,
    tags: Vec<SceneTag>,
}

impl TagDump {
    pub fn new(name: impl Into<String>, tags: Vec<SceneTag>) -> Self {
        Self {
            name: name.into(),
            tags,
        }
    }

    /// Parse a JSON tag dump: `{"name": "...", "tags": [{"name": "...", "transform": [16 floats]}]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTagDump = serde_json::from_str(json)?;
        let tags = raw
            .tags
            .into_iter()
            .map(|tag| SceneTag::new(tag.name, Matrix4::from_column_slice(&tag.transform)))
            .collect();
        Ok(Self::new(raw.name, tags))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

impl StationModel for TagDump {
    fn name(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> &[SceneTag] {
        &self.tags
    }
}

/// In-memory set of tag dumps keyed by model name.
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    models: HashMap<String, TagDump>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: TagDump) {
        self.models.insert(model.name.clone(), model);
    }

    /// Load every `*.json` tag dump in `dir`.
    ///
    /// Dumps that fail to parse are logged and skipped; stations referring to
    /// them fail later with [`crate::Error::ModelNotFound`].
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut library = Self::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !is_json(&path) {
                continue;
            }
            let model = match TagDump::from_path(&path) {
                Ok(model) => model,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable model tags");
                    continue;
                }
            };
            debug!(model = %model.name, tags = model.tags.len(), "loaded model tags");
            library.insert(model);
        }
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelSource for ModelLibrary {
    type Model = TagDump;

    fn find_model(&self, name: &str) -> Option<&TagDump> {
        self.models.get(name)
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
