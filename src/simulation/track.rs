//! Track geometry: wall segments and corridor containment.
//!
//! A track is a closed outer ring of wall segments with an optional closed
//! inner ring, forming a drivable corridor between them. Geometry is validated
//! once at construction and immutable afterwards; the simulation only ever
//! queries it.

use geo::algorithm::Distance;
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Contains, Coord, Euclidean, Line, LineString, Point, Polygon};
use thiserror::Error;

/// Rejected track geometry.
#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    /// A ring has too few vertices to enclose any area.
    #[error("{ring} ring needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Which ring failed ("outer" or "inner").
        ring: &'static str,
        /// Number of distinct vertices supplied.
        count: usize,
    },
    /// A ring contains a NaN or infinite coordinate.
    #[error("{ring} ring contains a non-finite coordinate")]
    NonFiniteVertex {
        /// Which ring failed.
        ring: &'static str,
    },
    /// Two non-adjacent segments of the same ring intersect.
    #[error("{ring} ring is self-intersecting")]
    SelfIntersecting {
        /// Which ring failed.
        ring: &'static str,
    },
    /// The rings touch or cross, pinching the corridor shut.
    #[error("corridor width is zero: inner and outer rings touch")]
    ZeroWidthCorridor,
    /// The inner ring is not strictly inside the outer ring.
    #[error("inner ring is not strictly inside the outer ring")]
    InnerOutsideOuter,
}

/// Immutable track boundary with collision and ray queries.
#[derive(Debug, Clone)]
pub struct Track {
    /// Drivable region: outer ring with the inner ring as a hole.
    corridor: Polygon<f32>,
    /// Every wall segment of both rings, the ray casting target set.
    walls: Vec<Line<f32>>,
}

impl Track {
    /// Builds a track from an outer ring and an optional inner ring.
    ///
    /// Rings are implicitly closed: the last vertex connects back to the
    /// first (an explicitly repeated first vertex is accepted and dropped).
    /// Construction fails fast on malformed geometry so that no generation
    /// ever runs against an invalid track.
    pub fn new(outer: Vec<[f32; 2]>, inner: Option<Vec<[f32; 2]>>) -> Result<Self, TrackError> {
        let outer = validated_ring(outer, "outer")?;
        let inner = inner.map(|ring| validated_ring(ring, "inner")).transpose()?;

        let outer_segments = ring_segments(&outer);
        let mut walls = outer_segments.clone();
        let mut holes = Vec::new();

        if let Some(inner) = &inner {
            let inner_segments = ring_segments(inner);

            if ring_gap(&outer, &outer_segments, inner, &inner_segments) <= 0.0 {
                return Err(TrackError::ZeroWidthCorridor);
            }
            let outer_polygon = Polygon::new(LineString::from(outer.clone()), Vec::new());
            for vertex in inner {
                if !outer_polygon.contains(&Point::from(*vertex)) {
                    return Err(TrackError::InnerOutsideOuter);
                }
            }
            // Vertices inside but an edge poking through a concave outer ring.
            for a in &outer_segments {
                for b in &inner_segments {
                    if line_intersection(*a, *b).is_some() {
                        return Err(TrackError::InnerOutsideOuter);
                    }
                }
            }

            walls.extend_from_slice(&inner_segments);
            holes.push(LineString::from(inner.clone()));
        }

        Ok(Self {
            corridor: Polygon::new(LineString::from(outer), holes),
            walls,
        })
    }

    /// Builds an oval ring track, the classic racing layout.
    ///
    /// `resolution` vertices approximate each ellipse; the inner ellipse is
    /// the outer one shrunk by `track_width` on both radii.
    pub fn oval(
        center: [f32; 2],
        outer_rx: f32,
        outer_ry: f32,
        track_width: f32,
        resolution: usize,
    ) -> Result<Self, TrackError> {
        let ellipse = |rx: f32, ry: f32| -> Vec<[f32; 2]> {
            (0..resolution)
                .map(|i| {
                    let angle = std::f32::consts::TAU * i as f32 / resolution as f32;
                    [center[0] + rx * angle.cos(), center[1] + ry * angle.sin()]
                })
                .collect()
        };
        Self::new(
            ellipse(outer_rx, outer_ry),
            Some(ellipse(outer_rx - track_width, outer_ry - track_width)),
        )
    }

    /// Builds a straight rectangular corridor from `(0, 0)` to
    /// `(length, width)` with no inner ring.
    pub fn straight(length: f32, width: f32) -> Result<Self, TrackError> {
        Self::new(
            vec![[0.0, 0.0], [length, 0.0], [length, width], [0.0, width]],
            None,
        )
    }

    /// Minimum positive distance from `(x, y)` along `angle` to any wall,
    /// clipped to `max_range`. `None` means no wall within range.
    ///
    /// Near-parallel and collinear ray/wall pairs yield no intersection
    /// rather than a division by a vanishing denominator.
    pub fn nearest_intersection(&self, x: f32, y: f32, angle: f32, max_range: f32) -> Option<f32> {
        let origin = Coord { x, y };
        let ray = Line::new(
            origin,
            Coord {
                x: x + angle.cos() * max_range,
                y: y + angle.sin() * max_range,
            },
        );

        let mut nearest: Option<f32> = None;
        for wall in &self.walls {
            if let Some(LineIntersection::SinglePoint { intersection, .. }) =
                line_intersection(ray, *wall)
            {
                let dx = intersection.x - origin.x;
                let dy = intersection.y - origin.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance.is_finite()
                    && distance > 0.0
                    && nearest.is_none_or(|best| distance < best)
                {
                    nearest = Some(distance.min(max_range));
                }
            }
        }
        nearest
    }

    /// Whether `(x, y)` lies strictly inside the drivable corridor.
    ///
    /// Points outside the outer ring, inside the inner ring or exactly on a
    /// wall all count as crashed.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.corridor.contains(&Point::new(x, y))
    }

    /// Every wall segment of both rings, for rendering.
    pub fn walls(&self) -> &[Line<f32>] {
        &self.walls
    }
}

/// Normalizes a ring to distinct vertices and checks it is well-formed.
fn validated_ring(mut points: Vec<[f32; 2]>, ring: &'static str) -> Result<Vec<[f32; 2]>, TrackError> {
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Err(TrackError::TooFewVertices {
            ring,
            count: points.len(),
        });
    }
    if points
        .iter()
        .any(|p| !p[0].is_finite() || !p[1].is_finite())
    {
        return Err(TrackError::NonFiniteVertex { ring });
    }

    let segments = ring_segments(&points);
    let count = segments.len();
    for i in 0..count {
        for j in (i + 1)..count {
            // Consecutive segments share an endpoint; that touch is fine.
            let adjacent = j == i + 1 || (i == 0 && j == count - 1);
            if !adjacent && line_intersection(segments[i], segments[j]).is_some() {
                return Err(TrackError::SelfIntersecting { ring });
            }
        }
    }
    Ok(points)
}

/// Closed-ring segments: each vertex to the next, last back to first.
fn ring_segments(points: &[[f32; 2]]) -> Vec<Line<f32>> {
    (0..points.len())
        .map(|i| {
            let next = (i + 1) % points.len();
            Line::new(Coord::from(points[i]), Coord::from(points[next]))
        })
        .collect()
}

/// Smallest vertex-to-wall distance between the two rings.
///
/// For non-intersecting polylines the minimum separation is attained at a
/// vertex of one of them, so checking vertices against the opposite ring's
/// segments in both directions is exact.
fn ring_gap(
    outer: &[[f32; 2]],
    outer_segments: &[Line<f32>],
    inner: &[[f32; 2]],
    inner_segments: &[Line<f32>],
) -> f32 {
    let vertex_to_ring = |vertices: &[[f32; 2]], segments: &[Line<f32>]| -> f32 {
        vertices
            .iter()
            .flat_map(|v| {
                let point = Point::from(*v);
                segments
                    .iter()
                    .map(move |segment| Euclidean.distance(&point, segment))
            })
            .fold(f32::INFINITY, f32::min)
    };
    vertex_to_ring(inner, outer_segments).min(vertex_to_ring(outer, inner_segments))
}
