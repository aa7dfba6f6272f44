use tessel_geom::{Aabb, Ray, Vec3, ray_triangle};
use tessel_tiles::{Side, Tile, TileMeshRegistry};

use crate::coord::TileCoord;

/// First collidable cell along a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileHit {
    pub coord: TileCoord,
    /// Face of the hit tile the ray crossed to reach it; `None` when the ray
    /// started inside the tile.
    pub entered_through: Option<Side>,
}

impl TileHit {
    /// Outward normal of the entered face; zero when the ray started inside.
    #[inline]
    pub fn normal(&self) -> (i32, i32, i32) {
        self.entered_through.map_or((0, 0, 0), Side::offset)
    }
}

/// A tile hit refined against the tile's collision triangles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHitPoint {
    pub tile: TileHit,
    pub point: Vec3,
    /// Ray parameter of `point`.
    pub t: f32,
}

/// Canonical per-axis crossing time: non-finite values (`0/0`, `-inf`, `inf`)
/// become `+inf`, and float slop below zero becomes zero.
#[inline]
pub(crate) fn axis_time(numerator: f32, direction: f32) -> f32 {
    if direction == 0.0 {
        return f32::INFINITY;
    }
    let t = numerator / direction;
    if t.is_finite() { t.max(0.0) } else { f32::INFINITY }
}

fn side_against(axis: usize, step: i32) -> Side {
    match (axis, step > 0) {
        (0, true) => Side::Left,
        (0, false) => Side::Right,
        (1, true) => Side::Bottom,
        (1, false) => Side::Top,
        (2, true) => Side::Back,
        _ => Side::Front,
    }
}

/// Incremental grid traversal over the cells `[min, min + extent)`.
///
/// The ray is clipped to the window first; the entry cell is clamped into
/// range to absorb float error on the boundary. Every step advances the axis
/// whose next boundary is nearest, so the loop runs at most
/// `extent.x + extent.y + extent.z` times.
pub(crate) fn traverse(
    ray: &Ray,
    min: TileCoord,
    extent: (usize, usize, usize),
    mut hits: impl FnMut(TileCoord) -> bool,
) -> Option<TileHit> {
    if extent.0 == 0 || extent.1 == 0 || extent.2 == 0 {
        return None;
    }
    let ext = [extent.0 as i32, extent.1 as i32, extent.2 as i32];
    let max = TileCoord::new(min.x + ext[0] - 1, min.y + ext[1] - 1, min.z + ext[2] - 1);
    let lo = min.to_vec3();
    let bounds = Aabb::new(lo, lo + Vec3::new(ext[0] as f32, ext[1] as f32, ext[2] as f32));
    let (t_enter, _) = bounds.ray_interval(ray)?;
    let entry = ray.at(t_enter);

    let mut cell = min;
    for axis in 0..3 {
        let c = (entry.axis(axis).floor() as i32).clamp(min.axis(axis), max.axis(axis));
        *cell.axis_mut(axis) = c;
    }

    let origin_inside = t_enter <= 0.0;
    if hits(cell) {
        let entered_through = if origin_inside { None } else { entry_side(ray, &bounds) };
        return Some(TileHit { coord: cell, entered_through });
    }

    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    for axis in 0..3 {
        let d = ray.direction.axis(axis);
        let c = cell.axis(axis) as f32;
        if d > 0.0 {
            step[axis] = 1;
            t_max[axis] = axis_time(c + 1.0 - entry.axis(axis), d);
        } else if d < 0.0 {
            step[axis] = -1;
            t_max[axis] = axis_time(c - entry.axis(axis), d);
        }
        t_delta[axis] = axis_time(1.0, d.abs());
    }

    let max_steps = (ext[0] + ext[1] + ext[2]) as usize;
    for _ in 0..max_steps {
        let axis = if t_max[0] < t_max[1] {
            if t_max[0] < t_max[2] { 0 } else { 2 }
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };
        if t_max[axis] == f32::INFINITY {
            return None;
        }
        let next = cell.axis(axis) + step[axis];
        if next < min.axis(axis) || next > max.axis(axis) {
            return None;
        }
        *cell.axis_mut(axis) = next;
        t_max[axis] += t_delta[axis];
        if hits(cell) {
            return Some(TileHit {
                coord: cell,
                entered_through: Some(side_against(axis, step[axis])),
            });
        }
    }
    None
}

// Axis whose slab the ray crossed last on the way into `bounds`.
fn entry_side(ray: &Ray, bounds: &Aabb) -> Option<Side> {
    let mut best: Option<(f32, usize, i32)> = None;
    for axis in 0..3 {
        let d = ray.direction.axis(axis);
        if d == 0.0 {
            continue;
        }
        let (plane, step) = if d > 0.0 {
            (bounds.min.axis(axis), 1)
        } else {
            (bounds.max.axis(axis), -1)
        };
        let t = (plane - ray.origin.axis(axis)) / d;
        if best.is_none_or(|(bt, _, _)| t > bt) {
            best = Some((t, axis, step));
        }
    }
    best.map(|(_, axis, step)| side_against(axis, step))
}

/// Closest intersection of the ray with the tile's collision triangles, placed
/// at `coord` with the tile's facing applied.
pub(crate) fn intersect_tile(
    ray: &Ray,
    coord: TileCoord,
    tile: &Tile,
    reg: &TileMeshRegistry,
) -> Option<(Vec3, f32)> {
    let def = tile.mesh_def(reg)?;
    let rot = tile.rotation();
    let base = coord.to_vec3();
    let place = |p: Vec3| rot.apply(p - Vec3::HALF) + Vec3::HALF + base;
    let mut best: Option<f32> = None;
    for tri in def.collision_triangles() {
        if let Some(t) = ray_triangle(ray, place(tri[0]), place(tri[1]), place(tri[2])) {
            if best.is_none_or(|b| t < b) {
                best = Some(t);
            }
        }
    }
    best.map(|t| (ray.at(t), t))
}
