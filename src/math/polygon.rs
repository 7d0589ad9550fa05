use derive_more::*;
use glam::{DVec2, Vec2};

/// A simple polygon whose points are stored in the canonical winding order.
///
/// Canonical order is a positive signed (shoelace) area: counter-clockwise with y pointing up,
/// which reads as clockwise on screen when y points down as it does in tile space.
#[derive(Clone, PartialEq, Debug)]
pub struct Polygon {
    points: Vec<Vec2>,
}

impl Polygon {

    /// Validates an outline and normalizes its winding.
    /// When the outline has to be reversed, the first point stays first.
    pub fn new(mut points: Vec<Vec2>) -> Result<Self, GeometryError> {
        validate(&points)?;
        if signed_area(&points) < 0.0 {
            points[1..].reverse();
        }
        Ok(Self { points })
    }

    /// Builds an axis-aligned rectangle with its top-left corner at the origin.
    pub fn rectangle(size: Vec2) -> Result<Self, GeometryError> {
        Self::new(vec![
            Vec2::ZERO,
            Vec2::new(size.x, 0.0),
            size,
            Vec2::new(0.0, size.y),
        ])
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn area(&self) -> f32 {
        signed_area(&self.points)
    }

    /// Minimum and maximum corners of the polygon's bounding box.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for point in &self.points {
            min = min.min(*point);
            max = max.max(*point);
        }
        (min, max)
    }

    /// Points shifted by an offset. The polygon itself is left untouched.
    pub fn translated(&self, offset: Vec2) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(move |point| *point + offset)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

/// Signed area of a closed outline using the shoelace formula.
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    let mut sum = 0.0_f64;
    for i in 0..n {
        let a = points[i].as_dvec2();
        let b = points[(i + 1) % n].as_dvec2();
        sum += a.perp_dot(b);
    }
    (sum * 0.5) as f32
}

pub fn winding(points: &[Vec2]) -> Winding {
    if signed_area(points) < 0.0 {
        Winding::Clockwise
    }
    else {
        Winding::CounterClockwise
    }
}

/// Checks that an outline describes a simple polygon.
pub fn validate(points: &[Vec2]) -> Result<(), GeometryError> {
    let n = points.len();
    if n == 0 {
        return Err(GeometryError::Empty);
    }
    if n < 3 {
        return Err(GeometryError::TooFewPoints { count: n });
    }
    if let Some(index) = points.iter().position(|point| !point.is_finite()) {
        return Err(GeometryError::NonFinite { index });
    }
    for i in 0..n {
        let next = (i + 1) % n;
        if points[i] == points[next] {
            return Err(GeometryError::DegenerateEdge { index: next });
        }
    }
    if let Some((first_edge, second_edge)) = find_self_intersection(points) {
        return Err(GeometryError::SelfIntersecting { first_edge, second_edge });
    }
    if signed_area(points).abs() <= zero_area_tolerance(points) {
        return Err(GeometryError::ZeroArea);
    }
    Ok(())
}

/// Areas at or below this are treated as zero. Scales with the outline's extent.
fn zero_area_tolerance(points: &[Vec2]) -> f32 {
    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for point in points {
        min = min.min(*point);
        max = max.max(*point);
    }
    let extent = (max - min).max_element();
    extent * extent * f32::EPSILON
}

/// Finds the first pair of conflicting edges, if any.
/// Edge `i` runs from point `i` to point `i + 1`, wrapping around.
///
/// Edges are swept left to right by their minimum x, and only pairs whose
/// x ranges overlap are tested against each other.
pub fn find_self_intersection(points: &[Vec2]) -> Option<(usize, usize)> {
    let n = points.len();
    let edge = |i: usize| (points[i].as_dvec2(), points[(i + 1) % n].as_dvec2());
    let min_x = |i: usize| {
        let (a, b) = edge(i);
        a.x.min(b.x)
    };

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| min_x(a).total_cmp(&min_x(b)));

    for (k, &i) in order.iter().enumerate() {
        let (a0, a1) = edge(i);
        let max_x = a0.x.max(a1.x);
        for &j in &order[k + 1..] {
            if min_x(j) > max_x {
                break;
            }
            let (first, second) = (i.min(j), i.max(j));
            let (b0, b1) = edge(j);
            let conflict = if second == first + 1 {
                folds_back(points[first].as_dvec2(), points[second].as_dvec2(), points[(second + 1) % n].as_dvec2())
            }
            else if first == 0 && second == n - 1 {
                folds_back(points[n - 1].as_dvec2(), points[0].as_dvec2(), points[1].as_dvec2())
            }
            else {
                segments_intersect(a0, a1, b0, b1)
            };
            if conflict {
                return Some((first, second));
            }
        }
    }
    None
}

/// Adjacent edges a->v and v->b overlap when b turns straight back along a->v.
fn folds_back(a: DVec2, v: DVec2, b: DVec2) -> bool {
    let incoming = v - a;
    let outgoing = b - v;
    incoming.perp_dot(outgoing) == 0.0 && incoming.dot(outgoing) < 0.0
}

fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Assumes p is collinear with a and b.
fn on_segment(a: DVec2, b: DVec2, p: DVec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) &&
    p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment test. Touching endpoints count as an intersection.
fn segments_intersect(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) &&
       ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }
    (d1 == 0.0 && on_segment(p3, p4, p1)) ||
    (d2 == 0.0 && on_segment(p3, p4, p2)) ||
    (d3 == 0.0 && on_segment(p1, p2, p3)) ||
    (d4 == 0.0 && on_segment(p1, p2, p4))
}

/// Reasons a collision shape is rejected while loading.
#[derive(Error, Display, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[display(fmt="Polygon has no points")]
    Empty,
    #[display(fmt="Polygon has {count} points, at least 3 are required")]
    TooFewPoints { count: usize },
    #[display(fmt="Polygon point {index} is not finite")]
    NonFinite { index: usize },
    #[display(fmt="Polygon point {index} repeats the previous point")]
    DegenerateEdge { index: usize },
    #[display(fmt="Polygon encloses no area")]
    ZeroArea,
    #[display(fmt="Polygon edges {first_edge} and {second_edge} intersect")]
    SelfIntersecting { first_edge: usize, second_edge: usize },
    #[display(fmt="Object group declares no shapes")]
    EmptyObjectGroup,
    #[display(fmt="Unsupported collision shape '{kind}'")]
    UnsupportedShape { kind: String },
}
