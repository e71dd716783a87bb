//! Geometry on the wrap-around grid.
//!
//! Angles are measured clockwise from "up" (decreasing `y`), so a facing of `0` walks
//! towards row 0 and a facing of `PI / 2` walks towards increasing `x`.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

/// A real-valued position. Whole numbers are cell centres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    /// Returns the coordinate `distance` away along `facing`. The result is not wrapped.
    pub fn advanced(self, facing: f64, distance: f64) -> Coord {
        Coord {
            x: self.x + facing.sin() * distance,
            y: self.y - facing.cos() * distance,
        }
    }
}

/// Maps any angle into `[0, 2PI)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative angles up to TAU
    if normalized >= TAU {
        0.0
    } else {
        normalized
    }
}

/// Checks whether `angle` lies within `width / 2` of `centre` in either direction.
///
/// The interval may straddle zero, e.g. a centre of `0.1` with a width of `1.0` accepts
/// both `0.5` and `2PI - 0.3`.
pub fn within_arc(angle: f64, centre: f64, width: f64) -> bool {
    if width >= TAU {
        return true;
    }

    let half = width / 2.0;
    let offset = normalize_angle(angle - centre);
    offset <= half || offset >= TAU - half
}

/// The dimensions of a toroidal grid and the distance/direction rules that come with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torus {
    width: usize,
    height: usize,
}

impl Torus {
    pub fn new(width: usize, height: usize) -> Torus {
        debug_assert!(width > 0 && height > 0, "a torus needs a non-zero size");
        Torus { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Brings a coordinate of any magnitude back into `[0, width) x [0, height)`.
    pub fn wrap(&self, coord: Coord) -> Coord {
        Coord {
            x: wrap_axis(coord.x, self.width),
            y: wrap_axis(coord.y, self.height),
        }
    }

    /// Wraps integer cell coordinates.
    pub fn wrap_cell(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.rem_euclid(self.width as i64) as usize,
            y.rem_euclid(self.height as i64) as usize,
        )
    }

    /// The cell a coordinate mostly lies in, i.e. the rounded and wrapped coordinate.
    pub fn cell_of(&self, coord: Coord) -> (usize, usize) {
        self.wrap_cell(coord.x.round() as i64, coord.y.round() as i64)
    }

    /// The smallest displacement that takes `from` to `to`, going across the edges when
    /// that is shorter. Each axis is solved independently.
    pub fn shortest_delta(&self, from: Coord, to: Coord) -> (f64, f64) {
        (
            shortest_axis(to.x - from.x, self.width),
            shortest_axis(to.y - from.y, self.height),
        )
    }

    pub fn distance(&self, from: Coord, to: Coord) -> f64 {
        let (dx, dy) = self.shortest_delta(from, to);
        dx.hypot(dy)
    }

    /// The facing that points from `from` towards `to` along the shortest path.
    pub fn direction_to(&self, from: Coord, to: Coord) -> f64 {
        let (dx, dy) = self.shortest_delta(from, to);
        normalize_angle(dy.atan2(dx) + FRAC_PI_2)
    }

    /// The largest distance any two points can be apart.
    pub fn max_distance(&self) -> f64 {
        (self.width as f64 / 2.0).hypot(self.height as f64 / 2.0)
    }
}

fn wrap_axis(value: f64, size: usize) -> f64 {
    let size = size as f64;
    let wrapped = value.rem_euclid(size);
    if wrapped >= size {
        0.0
    } else {
        wrapped
    }
}

fn shortest_axis(delta: f64, size: usize) -> f64 {
    let size = size as f64;
    let forward = delta.rem_euclid(size);
    if forward > size / 2.0 {
        forward - size
    } else {
        forward
    }
}
