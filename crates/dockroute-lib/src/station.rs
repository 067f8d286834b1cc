//! Station types: the docking bays of a station model with their precomputed
//! approach and departure routes.

use std::collections::BTreeMap;

use nalgebra::Vector3;
use serde::Serialize;
use tracing::{debug, info};

use crate::chain::{resolve_approach, resolve_departure};
use crate::definition::{DockMethod, StationDefinition};
use crate::error::{Error, Result};
use crate::legacy;
use crate::model::{ModelSource, SceneTag, StationModel};
use crate::registry::WaypointRegistry;
use crate::speed::{zone_approach, zone_departure};
use crate::stage::{DockStage, StageTable};
use crate::tag::{parse_pad_tag, TagRole};
use crate::waypoint::{Transform, WayPoint, WaypointFlags};

/// One docking position and its routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Bay {
    pub min_ship_size: i32,
    pub max_ship_size: i32,
    /// The docked position, always flagged [`WaypointFlags::BAY`].
    pub point: WayPoint,
    /// Outermost waypoint first, ending at the bay.
    pub approach: Vec<WayPoint>,
    /// From the bay outwards, not including the bay itself.
    pub departure: Vec<WayPoint>,
    pub stages: StageTable,
}

impl Bay {
    /// Build a bay from a `pad_` marker, resolving and zoning its routes
    /// against the station's waypoints.
    pub fn from_pad_tag(tag: &SceneTag, registry: &WaypointRegistry) -> Result<Self> {
        let pad = parse_pad_tag(&tag.name)?;
        let mut point = WayPoint::from_marker(&tag.name, pad.name, pad.links, &tag.transform)?;
        point.flags |= WaypointFlags::BAY;

        let mut approach = resolve_approach(&point, registry).map_err(|source| Error::Chain {
            bay: point.name.to_string(),
            source,
        })?;
        zone_approach(&mut approach);

        let mut departure =
            resolve_departure(&point, registry).map_err(|source| Error::Chain {
                bay: point.name.to_string(),
                source,
            })?;
        zone_departure(&mut departure, &point);

        point.speed = approach.last().and_then(|wp| wp.speed);

        let mut stages = StageTable::new();
        stages.insert(DockStage::Docked, point.loc);

        Ok(Self {
            min_ship_size: pad.min_ship_size,
            max_ship_size: pad.max_ship_size,
            point,
            approach,
            departure,
            stages,
        })
    }

    /// Whether a ship of `size` fits this bay.
    pub fn accepts(&self, size: i32) -> bool {
        (self.min_ship_size..=self.max_ship_size).contains(&size)
    }
}

/// Position and normalised basis of an approach waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionOrient {
    pub pos: [f64; 3],
    pub xaxis: [f64; 3],
    pub yaxis: [f64; 3],
    pub zaxis: [f64; 3],
}

impl PositionOrient {
    fn from_transform(loc: &Transform) -> Self {
        let axis = |unit: Vector3<f32>| -> [f64; 3] {
            let v = (loc.rotation * unit).cast::<f64>().normalize();
            [v.x, v.y, v.z]
        };
        let pos = loc.translation.vector.cast::<f64>();
        Self {
            pos: [pos.x, pos.y, pos.z],
            xaxis: axis(Vector3::x()),
            yaxis: axis(Vector3::y()),
            zaxis: axis(Vector3::z()),
        }
    }
}

/// Shared, immutable definition of a kind of station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationType {
    id: String,
    model_name: String,
    dock_method: DockMethod,
    angular_velocity: f32,
    parking_distance: f32,
    parking_gap_size: f32,
    pad_offset: f32,
    bays: BTreeMap<u32, Bay>,
    last_dock_stage: DockStage,
    last_undock_stage: DockStage,
}

impl StationType {
    /// Build a station type from its definition, looking the model up in
    /// `models`.
    pub fn build<S: ModelSource>(
        id: &str,
        definition: &StationDefinition,
        models: &S,
    ) -> Result<Self> {
        let model = models
            .find_model(&definition.model)
            .ok_or_else(|| Error::ModelNotFound {
                model: definition.model.clone(),
            })?;
        Self::from_model(id, definition, model)
    }

    /// Extract docking bays from the marker tags of `model`.
    ///
    /// Models with `pad_` markers get routes from their `wp_` waypoint links.
    /// Legacy `entrance_`/`loc_`/`exit_` markers are converted as well. A
    /// model yielding no bay at all is rejected.
    pub fn from_model<M: StationModel + ?Sized>(
        id: &str,
        definition: &StationDefinition,
        model: &M,
    ) -> Result<Self> {
        let dock_method = definition.dock_method()?;

        let entrances = model.find_tags_by_start_of_name(TagRole::Entrance.prefix());
        let locators = model.find_tags_by_start_of_name(TagRole::Locator.prefix());
        let exits = model.find_tags_by_start_of_name(TagRole::Exit.prefix());
        let mut pads = model.find_tags_by_start_of_name(TagRole::Pad.prefix());
        let waypoints = model.find_tags_by_start_of_name(TagRole::Waypoint.prefix());

        debug!(
            station = id,
            model = model.name(),
            entrances = entrances.len(),
            locators = locators.len(),
            exits = exits.len(),
            pads = pads.len(),
            waypoints = waypoints.len(),
            "collected docking tags"
        );

        pads.sort_by(|a, b| a.name.cmp(&b.name));

        let mut bays = BTreeMap::new();
        if !pads.is_empty() {
            let registry = WaypointRegistry::from_tags(waypoints)?;
            for (bay_id, tag) in (1u32..).zip(pads) {
                let bay = Bay::from_pad_tag(tag, &registry)?;
                debug!(
                    station = id,
                    bay = bay_id,
                    name = %bay.point.name,
                    approach = bay.approach.len(),
                    departure = bay.departure.len(),
                    "resolved bay routes"
                );
                bays.insert(bay_id, bay);
            }
        }

        let ports = legacy::port_anchors(&entrances, dock_method)?;
        legacy::add_locator_bays(&mut bays, &ports, &locators, &exits, dock_method)?;

        if bays.is_empty() {
            return Err(Error::NoBays {
                model: model.name().to_string(),
            });
        }

        info!(
            station = id,
            method = %dock_method,
            bays = bays.len(),
            "station type ready"
        );

        Ok(Self {
            id: id.to_string(),
            model_name: definition.model.clone(),
            dock_method,
            angular_velocity: definition.angular_velocity,
            parking_distance: definition.parking_distance,
            parking_gap_size: definition.parking_gap_size,
            pad_offset: definition.pad_offset,
            bays,
            last_dock_stage: DockStage::DockAnimationNone,
            last_undock_stage: DockStage::UndockAnimationNone,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dock_method(&self) -> DockMethod {
        self.dock_method
    }

    pub fn is_surface_station(&self) -> bool {
        self.dock_method == DockMethod::Surface
    }

    pub fn is_orbital_station(&self) -> bool {
        self.dock_method == DockMethod::Orbital
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn parking_distance(&self) -> f32 {
        self.parking_distance
    }

    pub fn parking_gap_size(&self) -> f32 {
        self.parking_gap_size
    }

    pub fn pad_offset(&self) -> f32 {
        self.pad_offset
    }

    pub fn num_docking_ports(&self) -> usize {
        self.bays.len()
    }

    pub fn last_dock_stage(&self) -> DockStage {
        self.last_dock_stage
    }

    pub fn last_undock_stage(&self) -> DockStage {
        self.last_undock_stage
    }

    pub fn num_docking_stages(&self) -> i32 {
        i32::from(self.last_dock_stage.ordinal())
            - i32::from(DockStage::DockAnimationNone.ordinal())
    }

    pub fn num_undock_stages(&self) -> i32 {
        i32::from(self.last_undock_stage.ordinal())
            - i32::from(DockStage::UndockAnimationNone.ordinal())
    }

    /// Bay for the zero-based external `port` index. Bays are stored under
    /// 1-based ids, so port 0 is bay 1.
    pub fn bay(&self, port: u32) -> Option<&Bay> {
        self.bay_by_id(port.checked_add(1)?)
    }

    /// Bay by its 1-based id.
    pub fn bay_by_id(&self, id: u32) -> Option<&Bay> {
        self.bays.get(&id)
    }

    /// Bays with their 1-based ids, in id order.
    pub fn bays(&self) -> impl Iterator<Item = (u32, &Bay)> {
        self.bays.iter().map(|(id, bay)| (*id, bay))
    }

    /// Position and orientation of approach waypoint `stage` for `port`, or
    /// `None` when the bay does not exist or has fewer waypoints.
    pub fn ship_approach_waypoints(&self, port: u32, stage: usize) -> Option<PositionOrient> {
        let bay = self.bay(port)?;
        let wp = bay.approach.get(stage)?;
        Some(PositionOrient::from_transform(&wp.loc))
    }

    /// Transform recorded for `stage` of `port`. Only [`DockStage::Docked`]
    /// is populated.
    pub fn stage_transform(&self, port: u32, stage: DockStage) -> Option<Transform> {
        self.bay(port)?.stages.get(stage).copied()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Matrix4;

    use super::*;
    use crate::model::TagDump;
    use crate::speed::{EXTERNAL_SPEED_LIMIT, INTERNAL_SPEED_LIMIT};

    fn orbital() -> StationDefinition {
        StationDefinition::from_json(r#"{"model": "m", "type": "orbital"}"#).unwrap()
    }

    fn at(name: &str, x: f32, y: f32, z: f32) -> SceneTag {
        SceneTag::new(name, Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    #[test]
    fn pad_bay_routes_are_zoned() {
        let model = TagDump::new(
            "m",
            vec![
                at("wp_A", 0.0, 0.0, 2000.0),
                at("wp_B:gate:A", 0.0, 0.0, 1000.0),
                at("pad_X_s0_500:B", 0.0, 0.0, 0.0),
            ],
        );
        let station = StationType::from_model("ring", &orbital(), &model).unwrap();
        let bay = station.bay(0).expect("bay 1 present");

        let names: Vec<_> = bay.approach.iter().map(|wp| wp.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "X"]);
        let speeds: Vec<_> = bay.approach.iter().map(|wp| wp.speed.unwrap()).collect();
        assert_eq!(
            speeds,
            vec![EXTERNAL_SPEED_LIMIT, EXTERNAL_SPEED_LIMIT, INTERNAL_SPEED_LIMIT]
        );

        let names: Vec<_> = bay.departure.iter().map(|wp| wp.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        let speeds: Vec<_> = bay.departure.iter().map(|wp| wp.speed.unwrap()).collect();
        assert_eq!(speeds, vec![INTERNAL_SPEED_LIMIT, EXTERNAL_SPEED_LIMIT]);

        assert_eq!(bay.min_ship_size, 0);
        assert_eq!(bay.max_ship_size, 500);
        assert!(bay.accepts(250));
        assert!(!bay.accepts(501));
    }

    #[test]
    fn pads_are_numbered_by_sorted_name() {
        let model = TagDump::new(
            "m",
            vec![
                at("pad_B_s0_100", 100.0, 0.0, 0.0),
                at("pad_A_s0_100", 0.0, 0.0, 0.0),
            ],
        );
        let station = StationType::from_model("ring", &orbital(), &model).unwrap();

        assert_eq!(station.num_docking_ports(), 2);
        assert_eq!(station.bay_by_id(1).unwrap().point.name.as_str(), "A");
        assert_eq!(station.bay_by_id(2).unwrap().point.name.as_str(), "B");
        assert!(station.bay_by_id(0).is_none());
    }

    #[test]
    fn approach_lookup_is_bounds_checked() {
        let model = TagDump::new(
            "m",
            vec![
                at("wp_A", 0.0, 0.0, 2000.0),
                at("wp_B:A", 0.0, 0.0, 1000.0),
                at("pad_X_s0_500:B", 0.0, 0.0, 0.0),
            ],
        );
        let station = StationType::from_model("ring", &orbital(), &model).unwrap();

        let first = station.ship_approach_waypoints(0, 0).unwrap();
        assert_eq!(first.pos, [0.0, 0.0, 2000.0]);
        assert_eq!(first.xaxis, [1.0, 0.0, 0.0]);
        assert!(station.ship_approach_waypoints(0, 2).is_some());
        assert!(station.ship_approach_waypoints(0, 3).is_none());
        assert!(station.ship_approach_waypoints(5, 0).is_none());
    }

    #[test]
    fn only_docked_stage_is_populated() {
        let model = TagDump::new("m", vec![at("pad_X_s0_500", 1.0, 2.0, 3.0)]);
        let station = StationType::from_model("ring", &orbital(), &model).unwrap();

        let docked = station.stage_transform(0, DockStage::Docked).unwrap();
        assert_eq!(docked.translation.vector, Vector3::new(1.0, 2.0, 3.0));
        assert!(station.stage_transform(0, DockStage::Approach).is_none());
        assert_eq!(station.num_docking_stages(), 0);
        assert_eq!(station.num_undock_stages(), 0);
    }

    #[test]
    fn dangling_link_rejects_station() {
        let model = TagDump::new("m", vec![at("pad_X_s0_500:nowhere", 0.0, 0.0, 0.0)]);
        let err = StationType::from_model("ring", &orbital(), &model).unwrap_err();
        assert!(matches!(err, Error::Chain { bay, .. } if bay == "X"));
    }

    #[test]
    fn model_without_bays_is_rejected() {
        let model = TagDump::new("m", vec![at("wp_A", 0.0, 0.0, 0.0)]);
        let err = StationType::from_model("ring", &orbital(), &model).unwrap_err();
        assert!(matches!(err, Error::NoBays { .. }));
    }
}
