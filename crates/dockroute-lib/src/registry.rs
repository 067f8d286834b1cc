use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::SceneTag;
use crate::tag::parse_waypoint_tag;
use crate::waypoint::WayPoint;

/// All `wp_` waypoints of one station, addressable by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointRegistry {
    waypoints: Vec<WayPoint>,
    index: HashMap<String, usize>,
}

impl WaypointRegistry {
    /// Parse every waypoint marker. Any malformed or duplicated name fails
    /// the whole registry.
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a SceneTag>) -> Result<Self> {
        let mut registry = Self::default();
        for tag in tags {
            let parsed = parse_waypoint_tag(&tag.name)?;
            let waypoint =
                WayPoint::from_marker(&tag.name, parsed.name, parsed.links, &tag.transform)?;
            registry.insert(waypoint)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, waypoint: WayPoint) -> Result<()> {
        if self.index.contains_key(waypoint.name.as_str()) {
            return Err(Error::DuplicateWaypoint {
                name: waypoint.name.to_string(),
            });
        }
        self.index
            .insert(waypoint.name.to_string(), self.waypoints.len());
        self.waypoints.push(waypoint);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&WayPoint> {
        self.index.get(name).map(|&i| &self.waypoints[i])
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoints in marker order.
    pub fn iter(&self) -> impl Iterator<Item = &WayPoint> {
        self.waypoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Matrix4;

    use super::*;

    #[test]
    fn finds_waypoints_by_name() {
        let tags = [
            SceneTag::new("wp_A", Matrix4::identity()),
            SceneTag::new("wp_B:gate:A", Matrix4::identity()),
        ];
        let registry = WaypointRegistry::from_tags(&tags).unwrap();

        assert_eq!(registry.len(), 2);
        let b = registry.find("B").expect("B registered");
        assert_eq!(b.link_in.as_deref(), Some("A"));
        assert!(registry.find("C").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let tags = [
            SceneTag::new("wp_A", Matrix4::identity()),
            SceneTag::new("wp_A:pos", Matrix4::identity()),
        ];
        let err = WaypointRegistry::from_tags(&tags).unwrap_err();
        assert!(matches!(err, Error::DuplicateWaypoint { name } if name == "A"));
    }

    #[test]
    fn malformed_waypoint_fails_the_registry() {
        let tags = [SceneTag::new("wp_", Matrix4::identity())];
        assert!(WaypointRegistry::from_tags(&tags).is_err());
    }
}
