use crate::config::TrackConfig;
use anyhow::{Result, bail};
use glam::DVec2;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Immutable piece of track boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    a: DVec2,
    b: DVec2,
}

impl Wall {
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self { a, b }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(DVec2::new(x1, y1), DVec2::new(x2, y2))
    }

    pub fn a(&self) -> DVec2 {
        self.a
    }

    pub fn b(&self) -> DVec2 {
        self.b
    }

    pub fn midpoint(&self) -> DVec2 {
        (self.a + self.b) * 0.5
    }
}

/// Walls plus the point every agent spawns at.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub walls: Vec<Wall>,
    pub start: DVec2,
}

impl Track {
    /// Build the configured layout. Only the random layout draws from `rng`.
    pub fn from_config<R>(cfg: &TrackConfig, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let track = match cfg {
            TrackConfig::Circular {
                width,
                height,
                n_segments,
            } => {
                let mut track = circular_road(*width, *height, *n_segments)?;
                track.walls.extend(border_walls(*width, *height));
                track
            }
            TrackConfig::Custom {
                walls,
                start,
                border,
            } => {
                let mut walls: Vec<_> = walls
                    .iter()
                    .map(|&[x1, y1, x2, y2]| Wall::from_coords(x1, y1, x2, y2))
                    .collect();
                if let Some([width, height]) = *border {
                    walls.extend(border_walls(width, height));
                }
                Track {
                    walls,
                    start: DVec2::from(*start),
                }
            }
            TrackConfig::Random {
                width,
                height,
                n_walls,
            } => {
                let mut track = random_walls(*width, *height, *n_walls, rng)?;
                track.walls.extend(border_walls(*width, *height));
                track
            }
        };
        log::debug!("built track with {} walls", track.walls.len());
        Ok(track)
    }
}

/// Polygonal ring road centered in a `width x height` area.
///
/// A barrier closes the ring right behind the start point so agents can only
/// leave in one direction.
pub fn circular_road(width: f64, height: f64, n_segments: usize) -> Result<Track> {
    if n_segments < 3 {
        bail!("a circular road needs at least 3 segments, but has {n_segments}");
    }

    let center = DVec2::new(width / 2.0, height / 2.0);
    let r_outer = (height / 2.0) * 0.95;
    let r_inner = (height / 2.0) * 0.6;
    let step = TAU / n_segments as f64;

    let mut walls = Vec::with_capacity(2 * n_segments + 1);
    let mut start = center;

    for i_seg in 0..n_segments {
        let angle = i_seg as f64 * step;
        let next_angle = (i_seg + 1) as f64 * step;

        let outer = Wall::new(
            center + r_outer * DVec2::from_angle(angle),
            center + r_outer * DVec2::from_angle(next_angle),
        );
        let inner = Wall::new(
            center + r_inner * DVec2::from_angle(angle),
            center + r_inner * DVec2::from_angle(next_angle),
        );

        if i_seg == 0 {
            start = (outer.midpoint() + inner.midpoint()) * 0.5;
            walls.push(Wall::new(outer.b(), inner.b()));
        }

        walls.push(outer);
        walls.push(inner);
    }

    Ok(Track { walls, start })
}

/// `n_walls` walls with endpoints scattered uniformly over a `width x height`
/// area. Agents start at its center, which a wall may well cover.
pub fn random_walls<R>(width: f64, height: f64, n_walls: usize, rng: &mut R) -> Result<Track>
where
    R: Rng + ?Sized,
{
    let x_dist = Uniform::new(0.0, width)?;
    let y_dist = Uniform::new(0.0, height)?;

    let walls = (0..n_walls)
        .map(|_| {
            Wall::new(
                DVec2::new(x_dist.sample(rng), y_dist.sample(rng)),
                DVec2::new(x_dist.sample(rng), y_dist.sample(rng)),
            )
        })
        .collect();

    Ok(Track {
        walls,
        start: DVec2::new(width / 2.0, height / 2.0),
    })
}

/// Four walls just outside a `width x height` screen.
pub fn border_walls(width: f64, height: f64) -> [Wall; 4] {
    [
        Wall::from_coords(-1.0, -1.0, width, -1.0),
        Wall::from_coords(width, -1.0, width, height),
        Wall::from_coords(width, height, -1.0, height),
        Wall::from_coords(-1.0, height, -1.0, -1.0),
    ]
}
