//! WGS84 polygon geometry.
//!
//! Regions arrive as well-known text (what the region store keeps) or as
//! GeoJSON (what the drawing UI submits). Both are parsed into a validated
//! [`Polygon`] that answers closed point-in-polygon queries: points on an
//! edge, exterior or hole, count as inside.
//!
//! Coordinates are plain lon/lat degrees. Rings crossing the antimeridian are
//! not unwrapped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AlertError;

/// The only spatial reference accepted in EWKT input.
pub const WGS84_SRID: i32 = 4326;

/// Distance (in degrees) within which a point is considered on an edge.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// A longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Axis-aligned bounding box, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Whether `coord` lies inside or on the box.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.lon >= self.min_lon - BOUNDARY_EPSILON
            && coord.lon <= self.max_lon + BOUNDARY_EPSILON
            && coord.lat >= self.min_lat - BOUNDARY_EPSILON
            && coord.lat <= self.max_lat + BOUNDARY_EPSILON
    }
}

/// A validated simple polygon with optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Vec<Coord>,
    interiors: Vec<Vec<Coord>>,
    bbox: BoundingBox,
}

impl Polygon {
    /// Build a polygon from closed rings, validating each one.
    ///
    /// Every ring must be closed, have at least four positions, enclose a
    /// non-zero area, stay within lon/lat range and not cross itself.
    pub fn new(exterior: Vec<Coord>, interiors: Vec<Vec<Coord>>) -> Result<Self, AlertError> {
        let exterior = validate_ring(exterior, "exterior ring")?;
        let interiors = interiors
            .into_iter()
            .enumerate()
            .map(|(i, ring)| validate_ring(ring, &format!("interior ring {}", i + 1)))
            .collect::<Result<Vec<_>, _>>()?;

        let bbox = ring_bbox(&exterior);
        Ok(Self {
            exterior,
            interiors,
            bbox,
        })
    }

    /// Parse a `POLYGON` from WKT, optionally prefixed with `SRID=4326;`.
    pub fn from_wkt(input: &str) -> Result<Self, AlertError> {
        let mut text = input.trim();

        if let Some(prefix) = text.get(..5) {
            if prefix.eq_ignore_ascii_case("SRID=") {
                let (srid, rest) = text[5..]
                    .split_once(';')
                    .ok_or_else(|| invalid("missing ';' after SRID"))?;
                let srid: i32 = srid
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("bad SRID '{}'", srid.trim())))?;
                if srid != WGS84_SRID {
                    return Err(invalid(format!(
                        "unsupported SRID {} (expected {})",
                        srid, WGS84_SRID
                    )));
                }
                text = rest.trim();
            }
        }

        let open = text
            .find('(')
            .ok_or_else(|| invalid(format!("not a polygon: '{}'", truncate(text))))?;
        let keyword = text[..open].trim();
        if !keyword.eq_ignore_ascii_case("POLYGON") {
            return Err(invalid(format!("unsupported geometry type '{}'", keyword)));
        }

        let inner = text[open..]
            .trim()
            .strip_prefix('(')
            .and_then(|body| body.strip_suffix(')'))
            .ok_or_else(|| invalid("unbalanced parentheses"))?;

        let mut rings = Vec::new();
        let mut rest = inner.trim();
        loop {
            let after_open = rest
                .strip_prefix('(')
                .ok_or_else(|| invalid("expected '(' at start of ring"))?;
            let close = after_open
                .find(')')
                .ok_or_else(|| invalid("unterminated ring"))?;
            rings.push(parse_wkt_ring(&after_open[..close])?);

            rest = after_open[close + 1..].trim_start();
            if rest.is_empty() {
                break;
            }
            rest = rest
                .strip_prefix(',')
                .ok_or_else(|| invalid("expected ',' between rings"))?
                .trim_start();
        }

        let mut rings = rings.into_iter();
        let exterior = rings.next().ok_or_else(|| invalid("polygon has no rings"))?;
        Self::new(exterior, rings.collect())
    }

    /// Parse a GeoJSON `Polygon` geometry, or a `Feature` wrapping one.
    pub fn from_geojson(value: &Value) -> Result<Self, AlertError> {
        let geometry = match value.get("type").and_then(Value::as_str) {
            Some("Feature") => value
                .get("geometry")
                .ok_or_else(|| invalid("feature has no geometry"))?,
            _ => value,
        };

        match geometry.get("type").and_then(Value::as_str) {
            Some("Polygon") => {}
            Some(other) => return Err(invalid(format!("unsupported geometry type '{}'", other))),
            None => return Err(invalid("missing geometry type")),
        }

        let rings = geometry
            .get("coordinates")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("polygon coordinates must be an array of rings"))?;

        let mut parsed = Vec::with_capacity(rings.len());
        for ring in rings {
            let positions = ring
                .as_array()
                .ok_or_else(|| invalid("ring must be an array of positions"))?;
            let coords = positions
                .iter()
                .map(|position| {
                    let pair = position.as_array().filter(|p| p.len() >= 2);
                    match pair.map(|p| (p[0].as_f64(), p[1].as_f64())) {
                        Some((Some(lon), Some(lat))) => Ok(Coord::new(lon, lat)),
                        _ => Err(invalid(format!("bad position {}", position))),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            parsed.push(coords);
        }

        let mut rings = parsed.into_iter();
        let exterior = rings.next().ok_or_else(|| invalid("polygon has no rings"))?;
        Self::new(exterior, rings.collect())
    }

    /// Render as WKT.
    pub fn to_wkt(&self) -> String {
        let rings: Vec<String> = self
            .rings()
            .map(|ring| {
                let coords: Vec<String> = ring
                    .iter()
                    .map(|c| format!("{} {}", c.lon, c.lat))
                    .collect();
                format!("({})", coords.join(", "))
            })
            .collect();
        format!("POLYGON({})", rings.join(", "))
    }

    /// Render as a GeoJSON `Polygon` geometry.
    pub fn to_geojson(&self) -> Value {
        let rings: Vec<Vec<[f64; 2]>> = self
            .rings()
            .map(|ring| ring.iter().map(|c| [c.lon, c.lat]).collect())
            .collect();
        json!({ "type": "Polygon", "coordinates": rings })
    }

    pub fn exterior(&self) -> &[Coord] {
        &self.exterior
    }

    pub fn interiors(&self) -> &[Vec<Coord>] {
        &self.interiors
    }

    /// Bounding box of the exterior ring.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Closed containment: true for interior points and for points on any
    /// ring boundary, false for points strictly inside a hole.
    pub fn contains(&self, point: Coord) -> bool {
        if !point.lon.is_finite() || !point.lat.is_finite() || !self.bbox.contains(point) {
            return false;
        }

        if self.rings().any(|ring| on_ring_boundary(ring, point)) {
            return true;
        }

        crosses_odd(&self.exterior, point)
            && !self.interiors.iter().any(|hole| crosses_odd(hole, point))
    }

    fn rings(&self) -> impl Iterator<Item = &Vec<Coord>> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }
}

impl FromStr for Polygon {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wkt(s)
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

fn invalid(msg: impl Into<String>) -> AlertError {
    AlertError::InvalidGeometry(msg.into())
}

fn truncate(text: &str) -> String {
    text.chars().take(32).collect()
}

fn parse_wkt_ring(body: &str) -> Result<Vec<Coord>, AlertError> {
    body.split(',')
        .map(|position| {
            let mut parts = position.split_whitespace();
            let (lon, lat) = match (parts.next(), parts.next(), parts.next()) {
                (Some(lon), Some(lat), None) => (lon, lat),
                _ => return Err(invalid(format!("bad position '{}'", position.trim()))),
            };
            let lon: f64 = lon
                .parse()
                .map_err(|_| invalid(format!("bad longitude '{}'", lon)))?;
            let lat: f64 = lat
                .parse()
                .map_err(|_| invalid(format!("bad latitude '{}'", lat)))?;
            Ok(Coord::new(lon, lat))
        })
        .collect()
}

fn validate_ring(ring: Vec<Coord>, label: &str) -> Result<Vec<Coord>, AlertError> {
    for c in &ring {
        if !c.lon.is_finite() || !c.lat.is_finite() {
            return Err(invalid(format!("{} has a non-finite coordinate", label)));
        }
        if !(-180.0..=180.0).contains(&c.lon) || !(-90.0..=90.0).contains(&c.lat) {
            return Err(invalid(format!(
                "{} coordinate ({}, {}) is out of WGS84 range",
                label, c.lon, c.lat
            )));
        }
    }

    if ring.first() != ring.last() {
        return Err(invalid(format!("{} is not closed", label)));
    }

    // Repeated consecutive positions are legal WKT but make zero-length edges.
    let mut ring = ring;
    ring.dedup();

    if ring.len() < 4 {
        return Err(invalid(format!(
            "{} needs at least 4 positions, got {}",
            label,
            ring.len()
        )));
    }

    if let Some((i, j)) = self_intersection(&ring) {
        return Err(invalid(format!(
            "{} is self-intersecting (edges {} and {})",
            label, i, j
        )));
    }

    if signed_area(&ring).abs() < f64::EPSILON {
        return Err(invalid(format!("{} has zero area", label)));
    }

    Ok(ring)
}

fn ring_bbox(ring: &[Coord]) -> BoundingBox {
    ring.iter().fold(
        BoundingBox {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        },
        |bbox, c| BoundingBox {
            min_lon: bbox.min_lon.min(c.lon),
            min_lat: bbox.min_lat.min(c.lat),
            max_lon: bbox.max_lon.max(c.lon),
            max_lat: bbox.max_lat.max(c.lat),
        },
    )
}

fn signed_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].lon * w[1].lat - w[1].lon * w[0].lat)
        .sum::<f64>()
        / 2.0
}

fn orientation(a: Coord, b: Coord, c: Coord) -> f64 {
    (b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)
}

fn within_span(p: Coord, a: Coord, b: Coord) -> bool {
    p.lon >= a.lon.min(b.lon)
        && p.lon <= a.lon.max(b.lon)
        && p.lat >= a.lat.min(b.lat)
        && p.lat <= a.lat.max(b.lat)
}

fn segments_intersect(p1: Coord, p2: Coord, q1: Coord, q2: Coord) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_span(p1, q1, q2))
        || (d2 == 0.0 && within_span(p2, q1, q2))
        || (d3 == 0.0 && within_span(q1, p1, p2))
        || (d4 == 0.0 && within_span(q2, p1, p2))
}

/// First pair of non-adjacent edges that touch, if any.
fn self_intersection(ring: &[Coord]) -> Option<(usize, usize)> {
    let edges = ring.len() - 1;
    for i in 0..edges {
        for j in (i + 1)..edges {
            let adjacent = j == i + 1 || (i == 0 && j == edges - 1);
            if adjacent {
                continue;
            }
            if segments_intersect(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                return Some((i, j));
            }
        }
    }
    None
}

fn distance_to_segment(p: Coord, a: Coord, b: Coord) -> f64 {
    let (dx, dy) = (b.lon - a.lon, b.lat - a.lat);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.lon - a.lon) * dx + (p.lat - a.lat) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.lon + t * dx, a.lat + t * dy);
    ((p.lon - cx).powi(2) + (p.lat - cy).powi(2)).sqrt()
}

fn on_ring_boundary(ring: &[Coord], p: Coord) -> bool {
    ring.windows(2)
        .any(|w| distance_to_segment(p, w[0], w[1]) <= BOUNDARY_EPSILON)
}

/// Even-odd crossing test for a point known not to lie on the ring.
fn crosses_odd(ring: &[Coord], p: Coord) -> bool {
    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if (a.lat > p.lat) != (b.lat > p.lat) {
            let x = a.lon + (p.lat - a.lat) * (b.lon - a.lon) / (b.lat - a.lat);
            if p.lon < x {
                inside = !inside;
            }
        }
    }
    inside
}
