//! Property tests for the matching predicate.
//!
//! Random star-shaped polygons, concave combs and rings with a hole are
//! checked against an independent winding-number implementation.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use risk_core::{Coord, Polygon, RiskEvent};

const NEAR_EDGE: f64 = 1e-9;

// ============================================================================
// Reference implementation
// ============================================================================

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    (p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

fn winding_number(ring: &[(f64, f64)], p: (f64, f64)) -> i32 {
    let mut wn = 0;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        let is_left = (b.0 - a.0) * (p.1 - a.1) - (p.0 - a.0) * (b.1 - a.1);
        if a.1 <= p.1 {
            if b.1 > p.1 && is_left > 0.0 {
                wn += 1;
            }
        } else if b.1 <= p.1 && is_left < 0.0 {
            wn -= 1;
        }
    }
    wn
}

fn reference_contains(ring: &[(f64, f64)], p: (f64, f64)) -> bool {
    let on_edge = ring
        .windows(2)
        .any(|w| segment_distance(p, w[0], w[1]) <= NEAR_EDGE);
    on_edge || winding_number(ring, p) != 0
}

// ============================================================================
// Generators
// ============================================================================

/// A closed star-shaped ring around `center`.
fn star_ring() -> impl Strategy<Value = Vec<(f64, f64)>> {
    (
        (-170.0f64..170.0, -80.0f64..80.0),
        prop::collection::vec((0.0f64..0.8, 0.05f64..5.0), 3..12),
    )
        .prop_map(|((cx, cy), spokes)| {
            let n = spokes.len() as f64;
            let mut ring: Vec<(f64, f64)> = spokes
                .iter()
                .enumerate()
                .map(|(i, (jitter, radius))| {
                    let angle = (i as f64 + jitter) * std::f64::consts::TAU / n;
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                })
                .collect();
            ring.push(ring[0]);
            ring
        })
}

/// A closed comb: a base strip with `teeth` upward teeth of random height.
/// Concave whenever there are two or more teeth.
fn comb_ring() -> impl Strategy<Value = Vec<(f64, f64)>> {
    (
        (-160.0f64..150.0, -80.0f64..70.0),
        0.2f64..1.0,
        prop::collection::vec(1.0f64..5.0, 2..6),
    )
        .prop_map(|((x0, y0), scale, heights)| {
            let base = 0.5;
            let k = heights.len();
            let mut ring = vec![(0.0, 0.0), ((2 * k - 1) as f64, 0.0)];
            for i in (0..k).rev() {
                let left = (2 * i) as f64;
                ring.push((left + 1.0, heights[i]));
                ring.push((left, heights[i]));
                if i > 0 {
                    ring.push((left, base));
                    ring.push((left - 1.0, base));
                }
            }
            ring.push((0.0, 0.0));
            ring.into_iter()
                .map(|(x, y)| (x0 + x * scale, y0 + y * scale))
                .collect()
        })
}

/// A closed ring of `spokes` vertices around `(cx, cy)` whose angular gaps
/// stay below a right angle, so every edge keeps its distance from the center.
fn ring_around(cx: f64, cy: f64, spokes: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let n = spokes.len() as f64;
    let mut ring: Vec<(f64, f64)> = spokes
        .iter()
        .enumerate()
        .map(|(i, (jitter, radius))| {
            let angle = (i as f64 + jitter) * std::f64::consts::TAU / n;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();
    ring.push(ring[0]);
    ring
}

/// An exterior ring (radii 2..5) with one hole (radii 0.2..1.2) around the
/// same center. Edges of the exterior stay more than 1.4 from the center,
/// so the hole lies strictly inside.
fn holed_rings() -> impl Strategy<Value = (Vec<(f64, f64)>, Vec<(f64, f64)>)> {
    (
        (-170.0f64..170.0, -80.0f64..80.0),
        prop::collection::vec((0.0f64..0.5, 2.0f64..5.0), 6..12),
        prop::collection::vec((0.0f64..0.5, 0.2f64..1.2), 6..10),
    )
        .prop_map(|((cx, cy), outer, inner)| {
            (ring_around(cx, cy, &outer), ring_around(cx, cy, &inner))
        })
}

fn reference_contains_with_hole(
    exterior: &[(f64, f64)],
    hole: &[(f64, f64)],
    p: (f64, f64),
) -> bool {
    let on_edge = exterior
        .windows(2)
        .chain(hole.windows(2))
        .any(|w| segment_distance(p, w[0], w[1]) <= NEAR_EDGE);
    on_edge || (winding_number(exterior, p) != 0 && winding_number(hole, p) == 0)
}

fn coords(ring: &[(f64, f64)]) -> Vec<Coord> {
    ring.iter().map(|&(lon, lat)| Coord::new(lon, lat)).collect()
}

fn to_polygon(ring: &[(f64, f64)]) -> Polygon {
    Polygon::new(coords(ring), Vec::new()).expect("generated rings are simple")
}

fn event_at(lon: f64, lat: f64, probability: f64) -> RiskEvent {
    RiskEvent {
        id: 1,
        observed_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        latitude: lat,
        longitude: lon,
        probability,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn containment_agrees_with_winding_number(
        ring in star_ring(),
        offsets in prop::collection::vec((-6.0f64..6.0, -6.0f64..6.0), 1..32),
    ) {
        let polygon = to_polygon(&ring);
        let (cx, cy) = ring[0];
        for (dx, dy) in offsets {
            let p = (cx + dx, cy + dy);
            prop_assert_eq!(
                polygon.contains(Coord::new(p.0, p.1)),
                reference_contains(&ring, p),
                "disagreement at {:?}", p
            );
        }
    }

    #[test]
    fn concave_containment_agrees_with_winding_number(
        ring in comb_ring(),
        fractions in prop::collection::vec((-0.1f64..1.1, -0.1f64..1.1), 1..48),
    ) {
        let polygon = to_polygon(&ring);
        let bbox = polygon.bounding_box();
        let (width, height) = (bbox.max_lon - bbox.min_lon, bbox.max_lat - bbox.min_lat);
        for (fx, fy) in fractions {
            let p = (bbox.min_lon + fx * width, bbox.min_lat + fy * height);
            prop_assert_eq!(
                polygon.contains(Coord::new(p.0, p.1)),
                reference_contains(&ring, p),
                "disagreement at {:?}", p
            );
        }
    }

    #[test]
    fn holed_containment_agrees_with_winding_number(
        (exterior, hole) in holed_rings(),
        offsets in prop::collection::vec((-6.0f64..6.0, -6.0f64..6.0), 1..48),
        hole_probes in prop::collection::vec((-0.2f64..0.2, -0.2f64..0.2), 1..8),
    ) {
        let polygon = Polygon::new(coords(&exterior), vec![coords(&hole)])
            .expect("hole lies inside the exterior");
        let (cx, cy) = {
            let (sx, sy) = hole[..hole.len() - 1]
                .iter()
                .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
            let n = (hole.len() - 1) as f64;
            (sx / n, sy / n)
        };
        // Points near the hole's centroid exercise the hole itself
        for (dx, dy) in offsets.into_iter().chain(hole_probes) {
            let p = (cx + dx, cy + dy);
            prop_assert_eq!(
                polygon.contains(Coord::new(p.0, p.1)),
                reference_contains_with_hole(&exterior, &hole, p),
                "disagreement at {:?}", p
            );
        }
    }

    #[test]
    fn hole_vertices_are_contained((exterior, hole) in holed_rings()) {
        let polygon = Polygon::new(coords(&exterior), vec![coords(&hole)])
            .expect("hole lies inside the exterior");
        for &(lon, lat) in &hole {
            prop_assert!(polygon.contains(Coord::new(lon, lat)));
        }
    }

    #[test]
    fn vertices_are_always_contained(ring in star_ring()) {
        let polygon = to_polygon(&ring);
        for &(lon, lat) in &ring {
            prop_assert!(polygon.contains(Coord::new(lon, lat)));
        }
    }

    #[test]
    fn threshold_is_monotonic(
        ring in star_ring(),
        events in prop::collection::vec((-6.0f64..6.0, -6.0f64..6.0, 0.0f64..=1.0), 0..40),
        t1 in 0.0f64..=1.0,
        t2 in 0.0f64..=1.0,
    ) {
        let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let polygon = to_polygon(&ring);
        let (cx, cy) = ring[0];
        let events: Vec<RiskEvent> = events
            .into_iter()
            .map(|(dx, dy, p)| event_at(cx + dx, cy + dy, p))
            .collect();

        for event in &events {
            if event.is_match(&polygon, high) {
                prop_assert!(event.is_match(&polygon, low));
            }
            let expected = event.probability >= high
                && reference_contains(&ring, (event.longitude, event.latitude));
            prop_assert_eq!(event.is_match(&polygon, high), expected);
        }
    }

    #[test]
    fn disjoint_regions_do_not_leak(
        lon in 0.0f64..1.0,
        lat in 0.0f64..1.0,
        probability in 0.21f64..=1.0,
    ) {
        let west = Polygon::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))").unwrap();
        let east = Polygon::from_wkt("POLYGON((2 0, 3 0, 3 1, 2 1, 2 0))").unwrap();
        let event = event_at(lon, lat, probability);

        prop_assert!(event.is_match(&west, 0.21));
        prop_assert!(!event.is_match(&east, 0.21));
    }
}
