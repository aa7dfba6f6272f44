use serde::Deserialize;
use tessel_geom::{Vec2, Vec3};

use crate::types::{LIGHT_MAX, Rgba, Side, SideMask};

/// Vertices per cube face (two triangles, unindexed).
pub const CUBE_FACE_VERTICES: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TileVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Normalized sub-rectangle of a texture atlas.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f32; 4]")]
pub struct AtlasRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl AtlasRect {
    pub const FULL: AtlasRect = AtlasRect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }

    /// Maps a native `[0,1]` coordinate into this rectangle.
    #[inline]
    pub fn remap(&self, uv: Vec2) -> Vec2 {
        Vec2::new(
            self.u0 + uv.u * (self.u1 - self.u0),
            self.v0 + uv.v * (self.v1 - self.v0),
        )
    }

    #[inline]
    pub fn is_normalized(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.u0)
            && unit.contains(&self.v0)
            && unit.contains(&self.u1)
            && unit.contains(&self.v1)
    }
}

impl Default for AtlasRect {
    fn default() -> Self {
        AtlasRect::FULL
    }
}

impl From<[f32; 4]> for AtlasRect {
    fn from(r: [f32; 4]) -> Self {
        AtlasRect::new(r[0], r[1], r[2], r[3])
    }
}

/// Which cube faces exist and where each one samples the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeStyle {
    pub faces: SideMask,
    pub atlas: [AtlasRect; 6],
}

impl CubeStyle {
    pub fn uniform(atlas: AtlasRect) -> Self {
        Self {
            faces: SideMask::ALL,
            atlas: [atlas; 6],
        }
    }

    pub fn with_faces(mut self, faces: SideMask) -> Self {
        self.faces = faces;
        self
    }

    pub fn with_side_atlas(mut self, side: Side, atlas: AtlasRect) -> Self {
        self.atlas[side.index()] = atlas;
        self
    }
}

impl Default for CubeStyle {
    fn default() -> Self {
        CubeStyle::uniform(AtlasRect::FULL)
    }
}

/// Precomputed vertex group for every face the cube defines.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeFaces {
    groups: [Option<[TileVertex; CUBE_FACE_VERTICES]>; 6],
}

impl CubeFaces {
    #[inline]
    pub fn face(&self, side: Side) -> Option<&[TileVertex; CUBE_FACE_VERTICES]> {
        self.groups[side.index()].as_ref()
    }

    #[inline]
    pub fn defines(&self, side: Side) -> bool {
        self.groups[side.index()].is_some()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &TileVertex> {
        self.groups.iter().flatten().flatten()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MeshShape {
    /// Unit cube with culled-per-face emission.
    Cube(CubeFaces),
    /// Arbitrary triangle list, emitted whole or not at all.
    Arbitrary(Vec<TileVertex>),
}

impl MeshShape {
    pub fn vertex_iter(&self) -> impl Iterator<Item = &TileVertex> {
        let (cube, arbitrary) = match self {
            MeshShape::Cube(faces) => (Some(faces.vertices()), None),
            MeshShape::Arbitrary(vs) => (None, Some(vs.iter())),
        };
        cube.into_iter().flatten().chain(arbitrary.into_iter().flatten())
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            MeshShape::Cube(faces) => faces.vertices().count(),
            MeshShape::Arbitrary(vs) => vs.len(),
        }
    }
}

/// Visual and light properties shared by every shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshProperties {
    /// `None` derives the mask from the shape: defined cube faces for
    /// non-alpha cubes, nothing otherwise.
    pub opaque_sides: Option<SideMask>,
    pub alpha: bool,
    pub translucency: f32,
    pub color: Rgba,
    pub emission: u8,
}

impl Default for MeshProperties {
    fn default() -> Self {
        Self {
            opaque_sides: None,
            alpha: false,
            translucency: 0.0,
            color: Rgba::WHITE,
            emission: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileMeshDefinition {
    opaque_sides: SideMask,
    alpha: bool,
    translucency: f32,
    color: Rgba,
    emission: u8,
    shape: MeshShape,
    collision: Vec<[Vec3; 3]>,
}

// Corners of each face, counter-clockwise seen from outside, with native UVs.
fn face_corners(side: Side) -> [(Vec3, Vec2); 4] {
    let h = 0.5;
    let p = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);
    let [a, b, c, d] = match side {
        Side::Top => [p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.), p(-1., 1., -1.)],
        Side::Bottom => [p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)],
        Side::Right => [p(1., -1., 1.), p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.)],
        Side::Left => [p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)],
        Side::Front => [p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)],
        Side::Back => [p(1., -1., -1.), p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.)],
    };
    [
        (a, Vec2::new(0.0, 1.0)),
        (b, Vec2::new(1.0, 1.0)),
        (c, Vec2::new(1.0, 0.0)),
        (d, Vec2::new(0.0, 0.0)),
    ]
}

fn build_face(side: Side, atlas: &AtlasRect) -> [TileVertex; CUBE_FACE_VERTICES] {
    let corners = face_corners(side);
    let normal = side.normal();
    let v = |i: usize| TileVertex {
        position: corners[i].0,
        normal,
        uv: atlas.remap(corners[i].1),
    };
    [v(0), v(1), v(2), v(0), v(2), v(3)]
}

fn collision_triangles<'a>(vertices: impl Iterator<Item = &'a TileVertex>) -> Vec<[Vec3; 3]> {
    let local: Vec<Vec3> = vertices.map(|v| v.position + Vec3::HALF).collect();
    local.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect()
}

fn sanitize(props: &MeshProperties) -> (f32, u8) {
    let translucency = if props.translucency.is_finite() {
        props.translucency.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (translucency, props.emission.min(LIGHT_MAX))
}

impl TileMeshDefinition {
    pub fn cube(style: CubeStyle, props: MeshProperties) -> Self {
        let mut groups = [None; 6];
        for side in Side::ALL {
            if style.faces.contains(side) {
                groups[side.index()] = Some(build_face(side, &style.atlas[side.index()]));
            }
        }
        let faces = CubeFaces { groups };
        let derived = if props.alpha { SideMask::NONE } else { style.faces };
        let collision = collision_triangles(faces.vertices());
        let (translucency, emission) = sanitize(&props);
        Self {
            opaque_sides: props.opaque_sides.unwrap_or(derived),
            alpha: props.alpha,
            translucency,
            color: props.color,
            emission,
            shape: MeshShape::Cube(faces),
            collision,
        }
    }

    /// Arbitrary triangle list authored centered on the origin.
    pub fn from_triangles(vertices: Vec<TileVertex>, props: MeshProperties) -> Self {
        debug_assert!(vertices.len() % 3 == 0, "triangle list length must be a multiple of 3");
        let collision = collision_triangles(vertices.iter());
        let (translucency, emission) = sanitize(&props);
        Self {
            opaque_sides: props.opaque_sides.unwrap_or(SideMask::NONE),
            alpha: props.alpha,
            translucency,
            color: props.color,
            emission,
            shape: MeshShape::Arbitrary(vertices),
            collision,
        }
    }

    #[inline]
    pub fn opaque_sides(&self) -> SideMask {
        self.opaque_sides
    }

    #[inline]
    pub fn is_alpha(&self) -> bool {
        self.alpha
    }

    #[inline]
    pub fn translucency(&self) -> f32 {
        self.translucency
    }

    #[inline]
    pub fn color(&self) -> Rgba {
        self.color
    }

    #[inline]
    pub fn emission(&self) -> u8 {
        self.emission
    }

    #[inline]
    pub fn is_light_source(&self) -> bool {
        self.emission > 0
    }

    #[inline]
    pub fn shape(&self) -> &MeshShape {
        &self.shape
    }

    /// Triangles in tile-local space (`[0,1]^3` for the unit cube), before any
    /// facing rotation.
    #[inline]
    pub fn collision_triangles(&self) -> &[[Vec3; 3]] {
        &self.collision
    }

    /// Opaque on both the top and bottom faces; stops the sky column scan.
    #[inline]
    pub fn blocks_sky(&self) -> bool {
        self.opaque_sides.contains(Side::Top) && self.opaque_sides.contains(Side::Bottom)
    }
}
