//! Segment intersection and ray casting.
//!
//! None of these functions fail: parallel, collinear or zero-length inputs
//! simply report no intersection.

use glam::DVec2;

/// Whether segment `p1 p2` crosses segment `p3 p4`.
///
/// Both segment parameters must lie in `[0, 1]`, so segments that only
/// touch at an endpoint count as crossing.
pub fn segments_intersect(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let den = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if den == 0.0 {
        return false;
    }

    let u_a = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / den;
    let u_b = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / den;

    (0.0..=1.0).contains(&u_a) && (0.0..=1.0).contains(&u_b)
}

/// Cast the half-line starting at `origin` along `direction` against the
/// segment `a b`.
///
/// Returns the crossing point if it lies strictly inside the segment and
/// strictly in front of the origin.
pub fn ray_cast(origin: DVec2, direction: DVec2, a: DVec2, b: DVec2) -> Option<DVec2> {
    let tip = origin + direction;

    let den = (a.x - b.x) * (origin.y - tip.y) - (a.y - b.y) * (origin.x - tip.x);
    if den == 0.0 {
        return None;
    }

    // `t` runs along the wall, `u` along the ray.
    let t = ((a.x - origin.x) * (origin.y - tip.y) - (a.y - origin.y) * (origin.x - tip.x)) / den;
    let u = -((a.x - b.x) * (a.y - origin.y) - (a.y - b.y) * (a.x - origin.x)) / den;

    if t > 0.0 && t < 1.0 && u > 0.0 {
        Some(a + t * (b - a))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(v(0.0, 0.0), v(10.0, 10.0), v(0.0, 10.0), v(10.0, 0.0)));
        assert!(segments_intersect(v(-5.0, 1.0), v(5.0, 1.0), v(0.0, -3.0), v(0.0, 3.0)));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 1.0), v(5.0, 0.0), v(6.0, -3.0)));
        // Lines cross, segments do not.
        assert!(!segments_intersect(v(0.0, 0.0), v(1.0, 0.0), v(2.0, -1.0), v(2.0, 1.0)));
    }

    #[test]
    fn parallel_and_collinear_segments_do_not_intersect() {
        assert!(!segments_intersect(v(0.0, 0.0), v(10.0, 0.0), v(0.0, 1.0), v(10.0, 1.0)));
        assert!(!segments_intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 0.0), v(15.0, 0.0)));
        assert!(!segments_intersect(v(3.0, 3.0), v(3.0, 3.0), v(0.0, 0.0), v(6.0, 6.0)));
    }

    #[test]
    fn touching_endpoints_count_as_intersection() {
        // Shared corner.
        assert!(segments_intersect(v(0.0, 0.0), v(10.0, 0.0), v(10.0, 0.0), v(10.0, 5.0)));
        // Wall end resting on the middle of the body edge.
        assert!(segments_intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 0.0), v(5.0, 5.0)));
        // Just short of the edge.
        assert!(!segments_intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 1e-9), v(5.0, 5.0)));
    }

    #[test]
    fn ray_hits_wall_in_front() {
        let hit = ray_cast(v(50.0, -10.0), v(0.0, 1.0), v(0.0, 0.0), v(100.0, 0.0));
        let hit = hit.expect("ray should hit the wall");
        assert!((hit - v(50.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn ray_ignores_wall_behind_origin() {
        let hit = ray_cast(v(50.0, -10.0), v(0.0, -1.0), v(0.0, 0.0), v(100.0, 0.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn ray_hit_excludes_wall_endpoints() {
        // Passes exactly through endpoint `a`.
        let hit = ray_cast(v(0.0, -10.0), v(0.0, 1.0), v(0.0, 0.0), v(100.0, 0.0));
        assert_eq!(hit, None);
        // Misses the segment entirely.
        let hit = ray_cast(v(150.0, -10.0), v(0.0, 1.0), v(0.0, 0.0), v(100.0, 0.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn ray_parallel_to_wall_or_without_direction_misses() {
        let hit = ray_cast(v(0.0, -10.0), v(1.0, 0.0), v(0.0, 0.0), v(100.0, 0.0));
        assert_eq!(hit, None);
        let hit = ray_cast(v(50.0, -10.0), DVec2::ZERO, v(0.0, 0.0), v(100.0, 0.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn ray_hit_point_lies_strictly_inside_wall() {
        let a = v(-20.0, 40.0);
        let b = v(60.0, -15.0);
        for i in 0..64 {
            let angle = i as f64 * std::f64::consts::TAU / 64.0;
            if let Some(hit) = ray_cast(v(1.0, 2.0), DVec2::from_angle(angle), a, b) {
                let along = (hit - a).dot(b - a) / (b - a).length_squared();
                assert!(along > 0.0 && along < 1.0);
            }
        }
    }
}
