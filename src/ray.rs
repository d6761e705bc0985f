use crate::geometry::ray_cast;
use crate::track::Wall;
use glam::DVec2;

/// Reading returned by [`Ray::distance_to_wall`] when nothing was hit.
pub const NO_HIT: f64 = -1.0;

/// Sensor line fired from an agent's position.
#[derive(Debug, Clone)]
pub struct Ray {
    origin: DVec2,
    dir: DVec2,
    hit_point: Option<DVec2>,
}

impl Ray {
    /// Create a ray at `origin` pointing along `angle` (radians).
    pub fn new(origin: DVec2, angle: f64) -> Self {
        Self {
            origin,
            dir: DVec2::from_angle(angle),
            hit_point: None,
        }
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn dir(&self) -> DVec2 {
        self.dir
    }

    pub fn hit_point(&self) -> Option<DVec2> {
        self.hit_point
    }

    /// Move the ray along with its owner.
    pub fn set_origin(&mut self, origin: DVec2) {
        self.origin = origin;
    }

    pub fn set_hit_point(&mut self, hit_point: Option<DVec2>) {
        self.hit_point = hit_point;
    }

    pub fn cast(&self, wall: &Wall) -> Option<DVec2> {
        ray_cast(self.origin, self.dir, wall.a(), wall.b())
    }

    /// Nearest hit over all `walls`; the first one wins a tie.
    pub fn closest_hit(&self, walls: &[Wall]) -> Option<DVec2> {
        let mut closest = None;
        let mut record = f64::INFINITY;
        for wall in walls {
            if let Some(pt) = self.cast(wall) {
                let d = self.origin.distance_squared(pt);
                if d < record {
                    record = d;
                    closest = Some(pt);
                }
            }
        }
        closest
    }

    /// Distance to the cached hit point, or [`NO_HIT`].
    pub fn distance_to_wall(&self) -> f64 {
        match self.hit_point {
            Some(pt) => self.origin.distance(pt),
            None => NO_HIT,
        }
    }

    pub fn squared_distance_to_wall(&self) -> f64 {
        match self.hit_point {
            Some(pt) => self.origin.distance_squared(pt),
            None => NO_HIT,
        }
    }
}
