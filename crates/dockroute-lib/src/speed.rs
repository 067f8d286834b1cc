//! Speed limits along resolved routes.
//!
//! A route is split into an internal zone (between the bay and the gate) and
//! an external zone (beyond the gate). Approach and departure differ in when
//! the gate flag is checked relative to the assignment: on approach the gate
//! waypoint is already external, on departure it is the last internal one.

use crate::waypoint::{WayPoint, WaypointFlags};

/// Speed limit inside the station, in m/s.
pub const INTERNAL_SPEED_LIMIT: f32 = 30.0;

/// Speed limit outside the gate, in m/s.
pub const EXTERNAL_SPEED_LIMIT: f32 = 300.0;

/// Assign speeds to an approach route ordered outermost first, bay last.
///
/// The zone is tracked from the bay outwards: starting internal, a gate flag
/// switches to external before that waypoint is assigned.
pub fn zone_approach(approach: &mut [WayPoint]) {
    let mut limit = INTERNAL_SPEED_LIMIT;
    for wp in approach.iter_mut().rev() {
        if wp.has(WaypointFlags::GATE) {
            limit = EXTERNAL_SPEED_LIMIT;
        }
        wp.speed = Some(limit);
    }
}

/// Assign speeds to a departure route ordered from the bay outwards.
///
/// A gate-flagged bay starts external. Each waypoint is assigned first, then a
/// gate flag switches the following waypoints to external.
pub fn zone_departure(departure: &mut [WayPoint], bay: &WayPoint) {
    let mut limit = if bay.has(WaypointFlags::GATE) {
        EXTERNAL_SPEED_LIMIT
    } else {
        INTERNAL_SPEED_LIMIT
    };
    for wp in departure.iter_mut() {
        wp.speed = Some(limit);
        if wp.has(WaypointFlags::GATE) {
            limit = EXTERNAL_SPEED_LIMIT;
        }
    }
}
