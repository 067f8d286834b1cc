//! Bays from the legacy marker set.
//!
//! Older station models have no `wp_`/`pad_` markers. Instead each docking
//! port has an `entrance_port<N>` marker, each bay a `loc_..._p<N>_..._b<M>`
//! locator, and orbital stations may carry `exit_port<N>` markers. Approach
//! and departure routes are derived geometrically from these.

use std::collections::BTreeMap;
use std::f32::consts::PI;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use tracing::warn;

use crate::definition::DockMethod;
use crate::error::{Error, Result};
use crate::model::SceneTag;
use crate::speed::{EXTERNAL_SPEED_LIMIT, INTERNAL_SPEED_LIMIT};
use crate::stage::{DockStage, StageTable};
use crate::station::Bay;
use crate::tag::{parse_entrance_tag, parse_exit_tag, parse_locator_tag, LocatorTag, WaypointName};
use crate::waypoint::{renormalize, Transform, WayPoint, WaypointFlags};

const SURFACE_ENTRANCE_OFFSET: f32 = 500.0;
const ORBITAL_ENTRANCE_OFFSET: f32 = 1500.0;
/// Length of the segment, starting at the outer anchor, that locators are
/// projected onto.
const APPROACH_LINE_LENGTH: f32 = 10_000.0;
const ANCHOR_RADIUS_SQR: f32 = 3.0;
const LOCATOR_RADIUS_SQR: f32 = 0.1;

/// Outer and inner approach anchors of one docking port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortAnchors {
    pub port: u32,
    pub outer: Transform,
    pub inner: Transform,
}

/// Derive the approach anchors of every `entrance_port<N>` marker.
///
/// The inner anchor is the entrance itself. The outer anchor sits above it
/// for surface stations and behind it (local +Z) for orbital ones.
pub fn port_anchors(entrances: &[&SceneTag], method: DockMethod) -> Result<Vec<PortAnchors>> {
    entrances
        .iter()
        .map(|tag| -> Result<PortAnchors> {
            let port = parse_entrance_tag(&tag.name)?;
            let inner = marker_transform(tag)?;
            let (axis, offset) = match method {
                DockMethod::Surface => (Vector3::y(), SURFACE_ENTRANCE_OFFSET),
                DockMethod::Orbital => (Vector3::z(), ORBITAL_ENTRANCE_OFFSET),
            };
            let outer_pos = inner.translation.vector + (inner.rotation * axis) * offset;
            Ok(PortAnchors {
                port,
                outer: Isometry3::from_parts(Translation3::from(outer_pos), inner.rotation),
                inner,
            })
        })
        .collect()
}

/// Add a bay for every locator marker.
///
/// Locators referencing a port without entrance marker, or reusing a bay id,
/// reject the station.
pub fn add_locator_bays(
    bays: &mut BTreeMap<u32, Bay>,
    ports: &[PortAnchors],
    locators: &[&SceneTag],
    exits: &[&SceneTag],
    method: DockMethod,
) -> Result<()> {
    let exits = exits
        .iter()
        .map(|tag| parse_exit_tag(&tag.name).map(|port| (port, *tag)))
        .collect::<Result<Vec<_>>>()?;

    for tag in locators {
        let locator = parse_locator_tag(&tag.name)?;
        let docked = marker_transform(tag)?;
        let anchors = ports
            .iter()
            .find(|anchors| anchors.port == locator.port)
            .ok_or_else(|| Error::PortNotFound {
                tag: tag.name.clone(),
                port: locator.port,
            })?;

        let bay = match method {
            DockMethod::Surface => surface_bay(&locator, anchors, docked)?,
            DockMethod::Orbital => orbital_bay(tag, &locator, anchors, docked, &exits)?,
        };

        if bays.contains_key(&locator.bay) {
            return Err(Error::malformed(
                &tag.name,
                format!("bay {} is already defined", locator.bay),
            ));
        }
        bays.insert(locator.bay, bay);
    }

    Ok(())
}

/// Closest point to `point` on the segment from `start` to `end`, or `None`
/// when the projection falls outside the segment.
pub fn closest_point_on_segment(
    point: &Vector3<f32>,
    start: &Vector3<f32>,
    end: &Vector3<f32>,
) -> Option<Vector3<f32>> {
    let line = end - start;
    let length_sqr = line.norm_squared();
    if length_sqr <= f32::EPSILON {
        return None;
    }

    let u = (point - start).dot(&line) / length_sqr;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(start + line * u)
}

fn surface_bay(locator: &LocatorTag, anchors: &PortAnchors, docked: Transform) -> Result<Bay> {
    // ground stations land on the entrance itself and have no departure route
    let point = WayPoint::new(
        legacy_name(locator, "")?,
        anchors.inner,
        ANCHOR_RADIUS_SQR,
        WaypointFlags::BAY,
    )
    .with_speed(EXTERNAL_SPEED_LIMIT);
    let approach = vec![outer_waypoint(locator, anchors)?, point.clone()];

    Ok(legacy_bay(locator, point, approach, Vec::new(), docked))
}

fn orbital_bay(
    tag: &SceneTag,
    locator: &LocatorTag,
    anchors: &PortAnchors,
    docked: Transform,
    exits: &[(u32, &SceneTag)],
) -> Result<Bay> {
    let docked_pos = docked.translation.vector;
    let outer_pos = anchors.outer.translation.vector;
    let inner_pos = anchors.inner.translation.vector;

    let projected = (inner_pos - outer_pos)
        .try_normalize(f32::EPSILON)
        .and_then(|dir| {
            let end = outer_pos + dir * APPROACH_LINE_LENGTH;
            closest_point_on_segment(&docked_pos, &outer_pos, &end)
        })
        .unwrap_or_else(|| {
            warn!(
                tag = %tag.name,
                "locator does not project onto its approach line, hovering at the locator"
            );
            docked_pos
        });
    let above = Isometry3::from_parts(Translation3::from(projected), docked.rotation);

    let point = WayPoint::new(
        legacy_name(locator, "")?,
        docked,
        LOCATOR_RADIUS_SQR,
        WaypointFlags::BAY,
    )
    .with_speed(INTERNAL_SPEED_LIMIT);

    let approach = vec![
        outer_waypoint(locator, anchors)?,
        WayPoint::new(
            legacy_name(locator, "-gate")?,
            anchors.inner,
            ANCHOR_RADIUS_SQR,
            WaypointFlags::GATE,
        )
        .with_speed(EXTERNAL_SPEED_LIMIT),
        WayPoint::new(
            legacy_name(locator, "-above")?,
            above,
            LOCATOR_RADIUS_SQR,
            WaypointFlags::BEFORE_BAY,
        )
        .with_speed(INTERNAL_SPEED_LIMIT),
        point.clone(),
    ];

    let exit = exit_transform(tag, locator, anchors, &docked, exits)?;
    let departure = vec![
        WayPoint::new(
            legacy_name(locator, "-depart")?,
            above,
            LOCATOR_RADIUS_SQR,
            WaypointFlags::empty(),
        )
        .with_speed(INTERNAL_SPEED_LIMIT),
        WayPoint::new(
            legacy_name(locator, "-exit")?,
            exit,
            LOCATOR_RADIUS_SQR,
            WaypointFlags::ONLY_POS,
        )
        .with_speed(INTERNAL_SPEED_LIMIT),
    ];

    Ok(legacy_bay(locator, point, approach, departure, docked))
}

/// Where a ship leaves the station: the matching `exit_port<N>` marker if the
/// model has exit markers, otherwise the inner anchor facing opposite the
/// docked orientation.
fn exit_transform(
    tag: &SceneTag,
    locator: &LocatorTag,
    anchors: &PortAnchors,
    docked: &Transform,
    exits: &[(u32, &SceneTag)],
) -> Result<Transform> {
    let reversed = Isometry3::from_parts(
        anchors.inner.translation,
        docked.rotation * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI),
    );
    if exits.is_empty() {
        return Ok(reversed);
    }

    match exits.iter().find(|(port, _)| *port == locator.port) {
        Some((_, exit)) => marker_transform(exit),
        None => {
            warn!(
                tag = %tag.name,
                port = locator.port,
                "no exit marker for port, leaving opposite the docked orientation"
            );
            Ok(reversed)
        }
    }
}

fn outer_waypoint(locator: &LocatorTag, anchors: &PortAnchors) -> Result<WayPoint> {
    Ok(WayPoint::new(
        legacy_name(locator, "-outer")?,
        anchors.outer,
        ANCHOR_RADIUS_SQR,
        WaypointFlags::ONLY_POS | WaypointFlags::APPROACH_START,
    )
    .with_speed(EXTERNAL_SPEED_LIMIT))
}

fn legacy_bay(
    locator: &LocatorTag,
    point: WayPoint,
    approach: Vec<WayPoint>,
    departure: Vec<WayPoint>,
    docked: Transform,
) -> Bay {
    let mut stages = StageTable::new();
    stages.insert(DockStage::Docked, docked);

    Bay {
        min_ship_size: locator.min_ship_size,
        max_ship_size: locator.max_ship_size,
        point,
        approach,
        departure,
        stages,
    }
}

fn legacy_name(locator: &LocatorTag, suffix: &str) -> Result<WaypointName> {
    WaypointName::new(&format!("{}{}", locator.pad, suffix))
}

fn marker_transform(tag: &SceneTag) -> Result<Transform> {
    renormalize(&tag.transform)
        .ok_or_else(|| Error::malformed(&tag.name, "marker transform is degenerate"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_onto_segment() {
        let point = closest_point_on_segment(
            &Vector3::new(5.0, 3.0, 0.0),
            &Vector3::zeros(),
            &Vector3::new(10.0, 0.0, 0.0),
        )
        .unwrap();
        assert_eq!(point, Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn rejects_projection_outside_segment() {
        let start = Vector3::zeros();
        let end = Vector3::new(10.0, 0.0, 0.0);
        assert!(closest_point_on_segment(&Vector3::new(-1.0, 1.0, 0.0), &start, &end).is_none());
        assert!(closest_point_on_segment(&Vector3::new(11.0, 1.0, 0.0), &start, &end).is_none());
        assert!(closest_point_on_segment(&start, &start, &start).is_none());
    }

    #[test]
    fn orbital_anchors_sit_behind_entrance() {
        let tag = SceneTag::new("entrance_port1", nalgebra::Matrix4::identity());
        let anchors = port_anchors(&[&tag], DockMethod::Orbital).unwrap();
        assert_eq!(anchors[0].port, 1);
        assert_eq!(
            anchors[0].outer.translation.vector,
            Vector3::new(0.0, 0.0, ORBITAL_ENTRANCE_OFFSET)
        );
        assert_eq!(anchors[0].inner.translation.vector, Vector3::zeros());
    }

    #[test]
    fn surface_anchors_sit_above_entrance() {
        let tag = SceneTag::new("entrance_port2", nalgebra::Matrix4::identity());
        let anchors = port_anchors(&[&tag], DockMethod::Surface).unwrap();
        assert_eq!(
            anchors[0].outer.translation.vector,
            Vector3::new(0.0, SURFACE_ENTRANCE_OFFSET, 0.0)
        );
    }
}
