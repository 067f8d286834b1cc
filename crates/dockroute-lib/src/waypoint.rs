use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::error::{Error, Result};
use crate::tag::{LinkSections, WaypointName};

/// Rigid transform (translation + orthonormal orientation) in station space.
pub type Transform = Isometry3<f32>;

bitflags::bitflags! {
    /// Role and routing flags of a waypoint.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WaypointFlags: u64 {
        /// The waypoint is the docked position of a bay.
        const BAY = 0x01;
        /// Hover point directly in front of a bay.
        const BEFORE_BAY = 0x02;
        /// Only the position matters, orientation is free.
        const ONLY_POS = 0x04;
        /// Boundary between the internal and external speed zones.
        const GATE = 0x08;
        const EXTERNAL = 0x10;
        /// First waypoint targeted when an approach begins.
        const APPROACH_START = 0x20;
    }
}

/// Node of a docking route.
#[derive(Debug, Clone, PartialEq)]
pub struct WayPoint {
    pub name: WaypointName,
    pub loc: Transform,
    /// Speed limit in m/s, assigned by the speed zoner.
    pub speed: Option<f32>,
    pub radius_sqr: f32,
    pub flags: WaypointFlags,
    pub link_in: Option<WaypointName>,
    pub link_out: Option<WaypointName>,
}

impl WayPoint {
    /// Unlinked waypoint at `loc`.
    pub fn new(name: WaypointName, loc: Transform, radius_sqr: f32, flags: WaypointFlags) -> Self {
        Self {
            name,
            loc,
            speed: None,
            radius_sqr,
            flags,
            link_in: None,
            link_out: None,
        }
    }

    /// Build a waypoint from a parsed marker name and the marker's transform.
    ///
    /// The orientation is re-orthonormalised and the capture radius comes from
    /// the scale of the marker's X axis.
    pub fn from_marker(
        tag: &str,
        name: WaypointName,
        links: LinkSections,
        matrix: &Matrix4<f32>,
    ) -> Result<Self> {
        let loc = renormalize(matrix)
            .ok_or_else(|| Error::malformed(tag, "marker transform is degenerate"))?;
        Ok(Self {
            name,
            loc,
            speed: None,
            radius_sqr: basis_x(matrix).norm_squared(),
            flags: links.flags,
            link_in: links.link_in,
            link_out: links.link_out,
        })
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn position(&self) -> Vector3<f32> {
        self.loc.translation.vector
    }

    pub fn has(&self, flag: WaypointFlags) -> bool {
        self.flags.contains(flag)
    }
}

/// Convert a scaled, possibly skewed marker matrix into a rigid transform.
///
/// Returns `None` when the X or Y basis vectors are degenerate.
pub fn renormalize(matrix: &Matrix4<f32>) -> Option<Transform> {
    let x = basis_x(matrix).try_normalize(f32::EPSILON)?;
    let y_hint: Vector3<f32> = matrix.fixed_view::<3, 1>(0, 1).into_owned();
    let z = x.cross(&y_hint).try_normalize(f32::EPSILON)?;
    let y = z.cross(&x);

    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
    let translation: Vector3<f32> = matrix.fixed_view::<3, 1>(0, 3).into_owned();

    Some(Isometry3::from_parts(
        Translation3::from(translation),
        UnitQuaternion::from_rotation_matrix(&rotation),
    ))
}

/// `loc` moved by `offset` expressed in its own local frame.
pub fn translate_local(loc: &Transform, offset: Vector3<f32>) -> Transform {
    let moved = loc.translation.vector + loc.rotation * offset;
    Isometry3::from_parts(Translation3::from(moved), loc.rotation)
}

fn basis_x(matrix: &Matrix4<f32>) -> Vector3<f32> {
    matrix.fixed_view::<3, 1>(0, 0).into_owned()
}
