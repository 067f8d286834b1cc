//! Output formatting for station routes, dock stages and catalog reports.
//!
//! Every command has a serializable view used for `--json` output and a plain
//! text rendering built from the same view.

use std::fmt::Write as _;

use dockroute_lib::{Bay, DockStage, StationCatalog, StationType, WayPoint, WaypointFlags};
use serde::Serialize;

/// One waypoint of an approach or departure route.
#[derive(Debug, Clone, Serialize)]
pub struct WaypointView {
    pub name: String,
    pub position: [f32; 3],
    pub speed: Option<f32>,
    pub radius_sqr: f32,
    pub flags: Vec<&'static str>,
}

impl WaypointView {
    pub fn from_waypoint(wp: &WayPoint) -> Self {
        let pos = wp.position();
        Self {
            name: wp.name.to_string(),
            position: [pos.x, pos.y, pos.z],
            speed: wp.speed,
            radius_sqr: wp.radius_sqr,
            flags: flag_names(wp.flags),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BayView {
    pub id: u32,
    pub name: String,
    pub min_ship_size: i32,
    pub max_ship_size: i32,
    pub approach: Vec<WaypointView>,
    pub departure: Vec<WaypointView>,
}

impl BayView {
    pub fn from_bay(id: u32, bay: &Bay) -> Self {
        Self {
            id,
            name: bay.point.name.to_string(),
            min_ship_size: bay.min_ship_size,
            max_ship_size: bay.max_ship_size,
            approach: bay.approach.iter().map(WaypointView::from_waypoint).collect(),
            departure: bay.departure.iter().map(WaypointView::from_waypoint).collect(),
        }
    }
}

/// Routes of every bay of a station type.
#[derive(Debug, Clone, Serialize)]
pub struct StationView {
    pub id: String,
    pub model: String,
    pub dock_method: String,
    pub angular_velocity: f32,
    pub parking_distance: f32,
    pub parking_gap_size: f32,
    pub pad_offset: f32,
    pub bays: Vec<BayView>,
}

impl StationView {
    pub fn from_station(station: &StationType) -> Self {
        Self {
            id: station.id().to_string(),
            model: station.model_name().to_string(),
            dock_method: station.dock_method().to_string(),
            angular_velocity: station.angular_velocity(),
            parking_distance: station.parking_distance(),
            parking_gap_size: station.parking_gap_size(),
            pad_offset: station.pad_offset(),
            bays: station
                .bays()
                .map(|(id, bay)| BayView::from_bay(id, bay))
                .collect(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Station {} (model {}, {}, {} bays)",
            self.id,
            self.model,
            self.dock_method,
            self.bays.len()
        );
        for bay in &self.bays {
            let _ = writeln!(
                out,
                "\nBay {} [{}] ship size {}-{}",
                bay.id, bay.name, bay.min_ship_size, bay.max_ship_size
            );
            render_route(&mut out, "approach", &bay.approach);
            render_route(&mut out, "departure", &bay.departure);
        }
        out
    }
}

fn render_route(out: &mut String, label: &str, route: &[WaypointView]) {
    if route.is_empty() {
        let _ = writeln!(out, "  {label}: none");
        return;
    }
    let _ = writeln!(out, "  {label}:");
    for wp in route {
        let speed = wp
            .speed
            .map(|s| format!("{s:.0} m/s"))
            .unwrap_or_else(|| "-".to_string());
        let flags = if wp.flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", wp.flags.join(", "))
        };
        let _ = writeln!(
            out,
            "    - {:<15} ({:.1}, {:.1}, {:.1}) {speed}{flags}",
            wp.name, wp.position[0], wp.position[1], wp.position[2]
        );
    }
}

/// Classification of a single dock stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub name: &'static str,
    pub ordinal: u8,
    pub dock_stage: bool,
    pub undock_stage: bool,
    pub pivot: &'static str,
    pub next_animation: Option<&'static str>,
}

impl StageView {
    pub fn from_stage(stage: DockStage) -> Self {
        Self {
            name: stage.name(),
            ordinal: stage.ordinal(),
            dock_stage: stage.is_dock_stage(),
            undock_stage: stage.is_undock_stage(),
            pivot: stage.pivot_stage().name(),
            next_animation: stage.next_anim_stage().map(DockStage::name),
        }
    }

    pub fn render_text(&self) -> String {
        let phase = match (self.dock_stage, self.undock_stage) {
            (true, _) => "docking",
            (_, true) => "undocking",
            _ => "none",
        };
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.name, self.ordinal);
        let _ = writeln!(out, "  phase: {phase}");
        let _ = writeln!(out, "  pivot: {}", self.pivot);
        if let Some(next) = self.next_animation {
            let _ = writeln!(out, "  next animation: {next}");
        }
        out
    }
}

/// Accepted and rejected station types of a catalog directory.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub accepted: Vec<AcceptedStation>,
    pub rejected: Vec<RejectedEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedStation {
    pub id: String,
    pub dock_method: String,
    pub bays: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedEntry {
    pub id: String,
    pub reason: String,
}

impl ValidationReport {
    pub fn from_catalog(catalog: &StationCatalog) -> Self {
        Self {
            accepted: catalog
                .iter()
                .map(|station| AcceptedStation {
                    id: station.id().to_string(),
                    dock_method: station.dock_method().to_string(),
                    bays: station.num_docking_ports(),
                })
                .collect(),
            rejected: catalog
                .rejected()
                .iter()
                .map(|rejected| RejectedEntry {
                    id: rejected.id.clone(),
                    reason: rejected.reason.clone(),
                })
                .collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for station in &self.accepted {
            let _ = writeln!(
                out,
                "ok       {} ({}, {} bays)",
                station.id, station.dock_method, station.bays
            );
        }
        for rejected in &self.rejected {
            let _ = writeln!(out, "rejected {}: {}", rejected.id, rejected.reason);
        }
        let _ = writeln!(
            out,
            "{} accepted, {} rejected",
            self.accepted.len(),
            self.rejected.len()
        );
        out
    }
}

fn flag_names(flags: WaypointFlags) -> Vec<&'static str> {
    flags.iter_names().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_view_classifies_animation_stage() {
        let view = StageView::from_stage(DockStage::DockAnimation2);
        assert_eq!(view.name, "DOCK_ANIMATION_2");
        assert!(view.dock_stage);
        assert!(!view.undock_stage);
        assert_eq!(view.next_animation, Some("DOCK_ANIMATION_3"));
        assert!(view.render_text().contains("phase: docking"));
    }

    #[test]
    fn flags_render_by_name() {
        let names = flag_names(WaypointFlags::GATE | WaypointFlags::ONLY_POS);
        assert_eq!(names, vec!["ONLY_POS", "GATE"]);
        assert!(flag_names(WaypointFlags::empty()).is_empty());
    }
}
