//! Docking and undocking stages.
//!
//! Stages are ordered; the `*_BEGIN`/`*_END` variants are sentinels bounding
//! the docking and undocking ranges and are never stages themselves. `NONE`
//! and `MANUAL` mark who controls the ship's position (see
//! [`DockStage::pivot_stage`]).

use std::collections::BTreeMap;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

use crate::waypoint::Transform;

/// Ordered docking stage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
    IntoStaticStr,
)]
#[repr(u8)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DockStage {
    None,
    Manual,

    DockStagesBegin,
    ClearanceGranted,
    Approach,
    DockAnimationNone,
    #[strum(serialize = "DOCK_ANIMATION_1")]
    #[serde(rename = "DOCK_ANIMATION_1")]
    DockAnimation1,
    #[strum(serialize = "DOCK_ANIMATION_2")]
    #[serde(rename = "DOCK_ANIMATION_2")]
    DockAnimation2,
    #[strum(serialize = "DOCK_ANIMATION_3")]
    #[serde(rename = "DOCK_ANIMATION_3")]
    DockAnimation3,
    DockAnimationMax,
    Touchdown,
    Leveling,
    Reposition,
    JustDock,
    DockStagesEnd,

    Docked,

    UndockStagesBegin,
    UndockBegin,
    UndockAnimationNone,
    #[strum(serialize = "UNDOCK_ANIMATION_1")]
    #[serde(rename = "UNDOCK_ANIMATION_1")]
    UndockAnimation1,
    #[strum(serialize = "UNDOCK_ANIMATION_2")]
    #[serde(rename = "UNDOCK_ANIMATION_2")]
    UndockAnimation2,
    #[strum(serialize = "UNDOCK_ANIMATION_3")]
    #[serde(rename = "UNDOCK_ANIMATION_3")]
    UndockAnimation3,
    UndockAnimationMax,
    UndockEnd,
    Departure,
    Leave,
    UndockStagesEnd,
}

impl DockStage {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::from_repr(ordinal)
    }

    /// Whether `self` lies strictly between the docking sentinels.
    pub fn is_dock_stage(self) -> bool {
        self > DockStage::DockStagesBegin && self < DockStage::DockStagesEnd
    }

    /// Whether `self` lies strictly between the undocking sentinels.
    pub fn is_undock_stage(self) -> bool {
        self > DockStage::UndockStagesBegin && self < DockStage::UndockStagesEnd
    }

    /// The stage with the next ordinal, `None` after the last sentinel.
    pub fn next_anim_stage(self) -> Option<Self> {
        Self::from_ordinal(self.ordinal().checked_add(1)?)
    }

    /// Map a stage to the marker describing who controls the ship.
    pub fn pivot_stage(self) -> Self {
        match self {
            // position relative to the station is already fixed
            DockStage::Touchdown
            | DockStage::JustDock
            | DockStage::Leveling
            | DockStage::Reposition => DockStage::Manual,
            // the station does not control the position
            DockStage::ClearanceGranted
            | DockStage::Approach
            | DockStage::Leave
            | DockStage::Departure => DockStage::None,
            other => other,
        }
    }

    /// Enumerator name, e.g. `CLEARANCE_GRANTED`.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Transform snapshot per stage of one bay.
///
/// Only [`DockStage::Docked`] is filled in by station assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTable {
    stages: BTreeMap<DockStage, Transform>,
}

impl StageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stage: DockStage, transform: Transform) {
        self.stages.insert(stage, transform);
    }

    pub fn get(&self, stage: DockStage) -> Option<&Transform> {
        self.stages.get(&stage)
    }

    pub fn docked(&self) -> Option<&Transform> {
        self.get(DockStage::Docked)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DockStage, &Transform)> {
        self.stages.iter().map(|(stage, transform)| (*stage, transform))
    }
}
