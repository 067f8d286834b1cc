//! Parser for the docking marker names baked into station models.
//!
//! Marker names are colon-separated sections. The first section carries the
//! role and its fields, the remaining sections are link and flag directives:
//!
//! ```text
//! wp_<name>[:pos][:gate][:<in>[_<out>]][:_<out>]
//! pad_<name>_s<minSize>_<maxSize>[:pos][:gate][:<in>[_<out>]][:_<out>]
//! loc_<pad4>_p<port>_s<min>_<max>_b<bay>
//! entrance_port<N> / exit_port<N>
//! ```
//!
//! Any deviation from this grammar is reported as [`Error::MalformedTag`] and
//! rejects the whole station type.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::waypoint::WaypointFlags;

/// Longest name a waypoint or bay may carry.
pub const MAX_NAME_LEN: usize = 15;

pub const WAYPOINT_PREFIX: &str = "wp_";
pub const PAD_PREFIX: &str = "pad_";
pub const LOCATOR_PREFIX: &str = "loc_";
pub const ENTRANCE_PREFIX: &str = "entrance_";
pub const EXIT_PREFIX: &str = "exit_";

const PORT_PREFIX: &str = "port";
/// Legacy pad names are fixed-width.
const LEGACY_PAD_LEN: usize = 4;

/// Bounded, non-empty waypoint identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WaypointName(String);

impl WaypointName {
    /// Validate and wrap a name.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::malformed(name, "empty name"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong {
                name: name.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Name derived from `base` with `suffix` appended. The suffix is always
    /// kept; `base` is shortened when the result would exceed the limit.
    pub fn derived(base: &WaypointName, suffix: &str) -> Self {
        let keep = MAX_NAME_LEN.saturating_sub(suffix.len());
        let mut cut = keep.min(base.0.len());
        while !base.0.is_char_boundary(cut) {
            cut -= 1;
        }
        let mut name = base.0[..cut].to_string();
        name.push_str(suffix);
        name.truncate(MAX_NAME_LEN);
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for WaypointName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WaypointName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaypointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a marker, decided by the prefix of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRole {
    Waypoint,
    Pad,
    Locator,
    Entrance,
    Exit,
}

impl TagRole {
    /// Classify a marker name, returning `None` for markers unrelated to docking.
    pub fn classify(name: &str) -> Option<Self> {
        if name.starts_with(WAYPOINT_PREFIX) {
            Some(TagRole::Waypoint)
        } else if name.starts_with(PAD_PREFIX) {
            Some(TagRole::Pad)
        } else if name.starts_with(LOCATOR_PREFIX) {
            Some(TagRole::Locator)
        } else if name.starts_with(ENTRANCE_PREFIX) {
            Some(TagRole::Entrance)
        } else if name.starts_with(EXIT_PREFIX) {
            Some(TagRole::Exit)
        } else {
            None
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            TagRole::Waypoint => WAYPOINT_PREFIX,
            TagRole::Pad => PAD_PREFIX,
            TagRole::Locator => LOCATOR_PREFIX,
            TagRole::Entrance => ENTRANCE_PREFIX,
            TagRole::Exit => EXIT_PREFIX,
        }
    }
}

/// Flags and links collected from the trailing sections of a marker name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSections {
    pub flags: WaypointFlags,
    pub link_in: Option<WaypointName>,
    pub link_out: Option<WaypointName>,
}

/// Parsed `wp_` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaypointTag {
    pub name: WaypointName,
    pub links: LinkSections,
}

/// Parsed `pad_` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadTag {
    pub name: WaypointName,
    pub min_ship_size: i32,
    pub max_ship_size: i32,
    pub links: LinkSections,
}

/// Parsed legacy `loc_` marker, e.g. `loc_A001_p01_s0_500_b01`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorTag {
    pub pad: String,
    pub port: u32,
    pub min_ship_size: i32,
    pub max_ship_size: i32,
    pub bay: u32,
}

/// Parse a `wp_<name>` marker together with its link sections.
pub fn parse_waypoint_tag(tag: &str) -> Result<WaypointTag> {
    let (head, sections) = split_head(tag);
    let name = head
        .strip_prefix(WAYPOINT_PREFIX)
        .ok_or_else(|| Error::malformed(tag, "expected wp_ prefix"))?;
    let name = WaypointName::new(name)?;
    let links = parse_link_sections(tag, sections)?;
    Ok(WaypointTag { name, links })
}

/// Parse a `pad_<name>_s<min>_<max>` marker together with its link sections.
pub fn parse_pad_tag(tag: &str) -> Result<PadTag> {
    let (head, sections) = split_head(tag);
    let body = head
        .strip_prefix(PAD_PREFIX)
        .ok_or_else(|| Error::malformed(tag, "expected pad_ prefix"))?;
    let (name, sizes) = body
        .split_once('_')
        .ok_or_else(|| Error::malformed(tag, "missing ship size section"))?;
    let sizes = sizes
        .strip_prefix('s')
        .ok_or_else(|| Error::malformed(tag, "ship size section must start with 's'"))?;
    let (min, max) = sizes
        .split_once('_')
        .ok_or_else(|| Error::malformed(tag, "expected s<min>_<max>"))?;

    Ok(PadTag {
        name: WaypointName::new(name)?,
        min_ship_size: parse_int(tag, min, "minimum ship size")?,
        max_ship_size: parse_int(tag, max, "maximum ship size")?,
        links: parse_link_sections(tag, sections)?,
    })
}

/// Parse a legacy `loc_<pad>_p<port>_s<min>_<max>_b<bay>` marker.
pub fn parse_locator_tag(tag: &str) -> Result<LocatorTag> {
    let body = tag
        .strip_prefix(LOCATOR_PREFIX)
        .ok_or_else(|| Error::malformed(tag, "expected loc_ prefix"))?;
    let fields: Vec<&str> = body.split('_').collect();
    let [pad, port, min, max, bay] = fields.as_slice() else {
        return Err(Error::malformed(
            tag,
            format!("expected 5 fields after loc_, found {}", fields.len()),
        ));
    };

    if pad.len() != LEGACY_PAD_LEN {
        return Err(Error::malformed(
            tag,
            format!("pad name must be {LEGACY_PAD_LEN} characters"),
        ));
    }
    let port = prefixed_index(tag, port, "p", "port")?;
    let min = min
        .strip_prefix('s')
        .ok_or_else(|| Error::malformed(tag, "ship size section must start with 's'"))?;
    let bay = prefixed_index(tag, bay, "b", "bay")?;

    Ok(LocatorTag {
        pad: pad.to_string(),
        port,
        min_ship_size: parse_int(tag, min, "minimum ship size")?,
        max_ship_size: parse_int(tag, max, "maximum ship size")?,
        bay,
    })
}

/// Parse a legacy `entrance_port<N>` marker, returning the port number.
pub fn parse_entrance_tag(tag: &str) -> Result<u32> {
    let body = tag
        .strip_prefix(ENTRANCE_PREFIX)
        .ok_or_else(|| Error::malformed(tag, "expected entrance_ prefix"))?;
    prefixed_index(tag, body, PORT_PREFIX, "port")
}

/// Parse a legacy `exit_port<N>` marker, returning the port number.
pub fn parse_exit_tag(tag: &str) -> Result<u32> {
    let body = tag
        .strip_prefix(EXIT_PREFIX)
        .ok_or_else(|| Error::malformed(tag, "expected exit_ prefix"))?;
    prefixed_index(tag, body, PORT_PREFIX, "port")
}

/// Consume the link and flag sections that follow the role section.
///
/// `pos` and `gate` set flags. A section starting with `_` sets only the
/// outgoing link and ends parsing, later sections are ignored. Any other
/// section is `<in>[_<out>]`; without an `_` the name is used for both links
/// unless an outgoing link is already set.
pub fn parse_link_sections(tag: &str, sections: &str) -> Result<LinkSections> {
    let mut links = LinkSections::default();

    for section in sections.split(':') {
        match section {
            "" => continue,
            "pos" => links.flags |= WaypointFlags::ONLY_POS,
            "gate" => links.flags |= WaypointFlags::GATE,
            _ => {
                if let Some(out) = section.strip_prefix('_') {
                    links.link_out = optional_name(out)?;
                    return Ok(links);
                }

                match section.split_once('_') {
                    Some((link_in, rest)) => {
                        let link_out = rest.split_once('_').map_or(rest, |(out, _)| out);
                        links.link_in = Some(link_name(tag, link_in)?);
                        if let Some(out) = optional_name(link_out)? {
                            links.link_out = Some(out);
                        }
                    }
                    None => {
                        let name = link_name(tag, section)?;
                        if links.link_out.is_none() {
                            links.link_out = Some(name.clone());
                        }
                        links.link_in = Some(name);
                    }
                }
            }
        }
    }

    Ok(links)
}

fn split_head(tag: &str) -> (&str, &str) {
    tag.split_once(':').unwrap_or((tag, ""))
}

fn link_name(tag: &str, name: &str) -> Result<WaypointName> {
    if name.is_empty() {
        return Err(Error::malformed(tag, "empty link reference"));
    }
    WaypointName::new(name)
}

fn optional_name(name: &str) -> Result<Option<WaypointName>> {
    if name.is_empty() {
        Ok(None)
    } else {
        WaypointName::new(name).map(Some)
    }
}

fn parse_int(tag: &str, value: &str, field: &str) -> Result<i32> {
    value
        .parse::<i32>()
        .map_err(|_| Error::malformed(tag, format!("{field} '{value}' is not an integer")))
}

fn prefixed_index(tag: &str, value: &str, prefix: &str, field: &str) -> Result<u32> {
    let digits = value
        .strip_prefix(prefix)
        .ok_or_else(|| Error::malformed(tag, format!("{field} must start with '{prefix}'")))?;
    let index = parse_int(tag, digits, field)?;
    if index <= 0 {
        return Err(Error::malformed(tag, format!("{field} must be positive")));
    }
    Ok(index as u32)
}
