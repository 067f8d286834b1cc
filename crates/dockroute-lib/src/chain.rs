//! Resolution of waypoint links into ordered approach and departure routes.

use std::collections::HashSet;

use nalgebra::Vector3;

use crate::error::ChainError;
use crate::registry::WaypointRegistry;
use crate::tag::WaypointName;
use crate::waypoint::{translate_local, WayPoint, WaypointFlags};

/// Distance above the bay of the stand-off point synthesized for bays
/// without an approach route.
pub const STANDOFF_DISTANCE: f32 = 500.0;
const STANDOFF_RADIUS_SQR: f32 = 1.0;
const STANDOFF_SUFFIX: &str = "-up";

/// Which link a walk follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    /// Follow `in` links, away from the bay along the approach.
    Inbound,
    /// Follow `out` links, away from the bay along the departure.
    Outbound,
}

impl LinkDirection {
    fn next(self, wp: &WayPoint) -> Option<&WaypointName> {
        match self {
            LinkDirection::Inbound => wp.link_in.as_ref(),
            LinkDirection::Outbound => wp.link_out.as_ref(),
        }
    }
}

/// Follow links from `start` until a waypoint without a link is reached.
///
/// `start` itself is not part of the result. Every waypoint may be visited
/// once, and a route longer than the registry fails with
/// [`ChainError::TooLong`].
pub fn walk_links(
    start: &WayPoint,
    registry: &WaypointRegistry,
    direction: LinkDirection,
) -> Result<Vec<WayPoint>, ChainError> {
    walk_links_within(start, registry, direction, registry.len())
}

fn walk_links_within(
    start: &WayPoint,
    registry: &WaypointRegistry,
    direction: LinkDirection,
    limit: usize,
) -> Result<Vec<WayPoint>, ChainError> {
    let mut chain = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = start;

    while let Some(name) = direction.next(current) {
        let Some(next) = registry.find(name) else {
            return Err(ChainError::DanglingReference {
                from: current.name.to_string(),
                name: name.to_string(),
            });
        };
        if !visited.insert(next.name.as_str()) {
            return Err(ChainError::CycleDetected {
                at: next.name.to_string(),
            });
        }
        if chain.len() == limit {
            return Err(ChainError::TooLong { limit });
        }
        chain.push(next.clone());
        current = next;
    }

    Ok(chain)
}

/// Build the approach route of a bay, outermost waypoint first and the bay
/// point last.
///
/// A bay without any inbound link gets a stand-off waypoint above it. The
/// outermost waypoint is flagged [`WaypointFlags::APPROACH_START`].
pub fn resolve_approach(
    point: &WayPoint,
    registry: &WaypointRegistry,
) -> Result<Vec<WayPoint>, ChainError> {
    let mut chain = vec![point.clone()];
    chain.extend(walk_links(point, registry, LinkDirection::Inbound)?);

    if chain.len() == 1 {
        chain.push(standoff_waypoint(point));
    }
    if let Some(outermost) = chain.last_mut() {
        outermost.flags |= WaypointFlags::APPROACH_START;
    }

    chain.reverse();
    Ok(chain)
}

/// Build the departure route of a bay, nearest waypoint first. The bay point
/// is not included and the final waypoint is flagged
/// [`WaypointFlags::ONLY_POS`].
pub fn resolve_departure(
    point: &WayPoint,
    registry: &WaypointRegistry,
) -> Result<Vec<WayPoint>, ChainError> {
    let mut chain = walk_links(point, registry, LinkDirection::Outbound)?;
    if let Some(last) = chain.last_mut() {
        last.flags |= WaypointFlags::ONLY_POS;
    }
    Ok(chain)
}

fn standoff_waypoint(point: &WayPoint) -> WayPoint {
    WayPoint::new(
        WaypointName::derived(&point.name, STANDOFF_SUFFIX),
        translate_local(&point.loc, Vector3::new(0.0, STANDOFF_DISTANCE, 0.0)),
        STANDOFF_RADIUS_SQR,
        WaypointFlags::empty(),
    )
}

#[cfg(test)]
mod tests {
    use nalgebra::{Isometry3, Matrix4};

    use super::*;
    use crate::model::SceneTag;

    fn registry(names: &[&str]) -> WaypointRegistry {
        let tags: Vec<SceneTag> = names
            .iter()
            .map(|name| SceneTag::new(*name, Matrix4::identity()))
            .collect();
        WaypointRegistry::from_tags(&tags).unwrap()
    }

    fn bay(link_in: Option<&str>, link_out: Option<&str>) -> WayPoint {
        let mut wp = WayPoint::new(
            WaypointName::new("X").unwrap(),
            Isometry3::identity(),
            1.0,
            WaypointFlags::BAY,
        );
        wp.link_in = link_in.map(|n| WaypointName::new(n).unwrap());
        wp.link_out = link_out.map(|n| WaypointName::new(n).unwrap());
        wp
    }

    fn names(chain: &[WayPoint]) -> Vec<&str> {
        chain.iter().map(|wp| wp.name.as_str()).collect()
    }

    #[test]
    fn approach_is_reversed_and_ends_at_bay() {
        let reg = registry(&["wp_A", "wp_B:gate:A"]);
        let chain = resolve_approach(&bay(Some("B"), None), &reg).unwrap();

        assert_eq!(names(&chain), vec!["A", "B", "X"]);
        assert!(chain[0].has(WaypointFlags::APPROACH_START));
        assert!(chain[2].has(WaypointFlags::BAY));
        assert!(!chain[2].has(WaypointFlags::APPROACH_START));
    }

    #[test]
    fn departure_follows_out_links() {
        let reg = registry(&["wp_A", "wp_B:gate:A"]);
        let chain = resolve_departure(&bay(None, Some("B")), &reg).unwrap();

        assert_eq!(names(&chain), vec!["B", "A"]);
        assert!(chain[1].has(WaypointFlags::ONLY_POS));
        assert!(!chain[0].has(WaypointFlags::ONLY_POS));
    }

    #[test]
    fn bay_without_links_gets_standoff_point() {
        let chain = resolve_approach(&bay(None, None), &registry(&[])).unwrap();

        assert_eq!(names(&chain), vec!["X-up", "X"]);
        let standoff = &chain[0];
        assert!(standoff.has(WaypointFlags::APPROACH_START));
        assert_eq!(standoff.radius_sqr, 1.0);
        assert_eq!(standoff.position(), Vector3::new(0.0, 500.0, 0.0));
    }

    #[test]
    fn empty_departure_is_allowed() {
        let chain = resolve_departure(&bay(None, None), &registry(&["wp_A"])).unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn dangling_reference_is_reported() {
        let reg = registry(&["wp_B:missing"]);
        let err = resolve_approach(&bay(Some("B"), None), &reg).unwrap_err();
        assert_eq!(
            err,
            ChainError::DanglingReference {
                from: "B".to_string(),
                name: "missing".to_string(),
            }
        );
    }

    #[test]
    fn cycles_fail_instead_of_looping() {
        let reg = registry(&["wp_A:B", "wp_B:A"]);
        let err = resolve_approach(&bay(Some("A"), None), &reg).unwrap_err();
        assert_eq!(
            err,
            ChainError::CycleDetected {
                at: "A".to_string()
            }
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let reg = registry(&["wp_A:A"]);
        let err = resolve_departure(&bay(None, Some("A")), &reg).unwrap_err();
        assert!(matches!(err, ChainError::CycleDetected { .. }));
    }

    #[test]
    fn chain_never_exceeds_registry() {
        let reg = registry(&["wp_A", "wp_B:A", "wp_C:B", "wp_D:C"]);
        let chain = walk_links(&bay(Some("D"), None), &reg, LinkDirection::Inbound).unwrap();
        assert_eq!(chain.len(), reg.len());
    }

    #[test]
    fn walk_stops_at_length_limit() {
        let reg = registry(&["wp_A", "wp_B:A", "wp_C:B"]);
        let start = bay(Some("C"), None);

        let err = walk_links_within(&start, &reg, LinkDirection::Inbound, 2).unwrap_err();
        assert_eq!(err, ChainError::TooLong { limit: 2 });
        let chain = walk_links_within(&start, &reg, LinkDirection::Inbound, 3).unwrap();
        assert_eq!(names(&chain), vec!["C", "B", "A"]);
    }
}
