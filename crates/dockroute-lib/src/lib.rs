//! Docking route library entry points.
//!
//! This crate turns the marker tags of a station model into docking bays with
//! precomputed approach and departure routes: tag names are parsed, waypoint
//! links resolved into ordered chains, speed limits assigned per zone, and the
//! result exposed as an immutable [`StationType`]. Consumers (the CLI, flight
//! control) should only depend on the functions exported here.

#![deny(warnings)]

pub mod catalog;
pub mod chain;
pub mod definition;
pub mod error;
pub mod legacy;
pub mod model;
pub mod registry;
pub mod speed;
pub mod stage;
pub mod station;
pub mod tag;
pub mod waypoint;

pub use catalog::{RejectedStation, StationCatalog};
pub use chain::{resolve_approach, resolve_departure, walk_links, LinkDirection};
pub use definition::{DockMethod, StationDefinition};
pub use error::{ChainError, Error, Result};
pub use model::{ModelLibrary, ModelSource, SceneTag, StationModel, TagDump};
pub use registry::WaypointRegistry;
pub use speed::{zone_approach, zone_departure, EXTERNAL_SPEED_LIMIT, INTERNAL_SPEED_LIMIT};
pub use stage::{DockStage, StageTable};
pub use station::{Bay, PositionOrient, StationType};
pub use tag::{TagRole, WaypointName, MAX_NAME_LEN};
pub use waypoint::{Transform, WayPoint, WaypointFlags};
