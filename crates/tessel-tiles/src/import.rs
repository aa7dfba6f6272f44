//! Tile meshes built from externally imported static geometry.

use hashbrown::HashMap;
use tessel_geom::{Vec2, Vec3};
use thiserror::Error;

use crate::mesh::{AtlasRect, MeshProperties, TileMeshDefinition, TileVertex};

/// A contiguous run of indices sharing one material.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSubset {
    pub material: String,
    pub first_index: usize,
    pub index_count: usize,
}

/// Static mesh data as delivered by the importer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Empty means one implicit subset spanning every index.
    pub subsets: Vec<MeshSubset>,
}

/// Atlas rectangle per material, with a fallback for unlisted materials.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtlasMap {
    pub default: AtlasRect,
    pub by_material: HashMap<String, AtlasRect>,
}

impl AtlasMap {
    pub fn uniform(rect: AtlasRect) -> Self {
        Self {
            default: rect,
            by_material: HashMap::new(),
        }
    }

    pub fn with_material(mut self, material: impl Into<String>, rect: AtlasRect) -> Self {
        self.by_material.insert(material.into(), rect);
        self
    }

    #[inline]
    pub fn rect_for(&self, material: &str) -> &AtlasRect {
        self.by_material.get(material).unwrap_or(&self.default)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TileMeshError {
    #[error("imported mesh has no {0}")]
    MissingAttribute(&'static str),
    #[error("attribute lengths disagree: {positions} positions, {normals} normals, {uvs} uvs")]
    AttributeMismatch {
        positions: usize,
        normals: usize,
        uvs: usize,
    },
    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
    #[error("subset `{material}` spans {first}..{end} but only {len} indices exist")]
    SubsetOutOfRange {
        material: String,
        first: usize,
        end: usize,
        len: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),
}

fn validate(mesh: &ImportedMesh) -> Result<(), TileMeshError> {
    if mesh.positions.is_empty() {
        return Err(TileMeshError::MissingAttribute("positions"));
    }
    if mesh.normals.is_empty() {
        return Err(TileMeshError::MissingAttribute("normals"));
    }
    if mesh.uvs.is_empty() {
        return Err(TileMeshError::MissingAttribute("uvs"));
    }
    if mesh.indices.is_empty() {
        return Err(TileMeshError::MissingAttribute("indices"));
    }
    let n = mesh.positions.len();
    if mesh.normals.len() != n || mesh.uvs.len() != n {
        return Err(TileMeshError::AttributeMismatch {
            positions: n,
            normals: mesh.normals.len(),
            uvs: mesh.uvs.len(),
        });
    }
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= n) {
        return Err(TileMeshError::IndexOutOfRange { index, vertices: n });
    }
    for s in &mesh.subsets {
        let end = s.first_index.checked_add(s.index_count);
        match end {
            Some(end) if end <= mesh.indices.len() => {}
            _ => {
                return Err(TileMeshError::SubsetOutOfRange {
                    material: s.material.clone(),
                    first: s.first_index,
                    end: end.unwrap_or(usize::MAX),
                    len: mesh.indices.len(),
                });
            }
        }
        if s.index_count % 3 != 0 {
            return Err(TileMeshError::NotTriangles(s.index_count));
        }
    }
    if mesh.subsets.is_empty() && mesh.indices.len() % 3 != 0 {
        return Err(TileMeshError::NotTriangles(mesh.indices.len()));
    }
    Ok(())
}

impl TileMeshDefinition {
    /// Expands the indexed import into a triangle list, remapping each subset's
    /// UVs into its atlas rectangle.
    pub fn imported(
        mesh: &ImportedMesh,
        atlas: &AtlasMap,
        props: MeshProperties,
    ) -> Result<Self, TileMeshError> {
        validate(mesh)?;
        let whole = [MeshSubset {
            material: String::new(),
            first_index: 0,
            index_count: mesh.indices.len(),
        }];
        let subsets: &[MeshSubset] = if mesh.subsets.is_empty() { &whole } else { &mesh.subsets };

        let mut vertices = Vec::with_capacity(subsets.iter().map(|s| s.index_count).sum());
        for subset in subsets {
            let rect = atlas.rect_for(&subset.material);
            let range = subset.first_index..subset.first_index + subset.index_count;
            for &i in &mesh.indices[range] {
                let i = i as usize;
                let [u, v] = mesh.uvs[i];
                vertices.push(TileVertex {
                    position: Vec3::from_array(mesh.positions[i]),
                    normal: Vec3::from_array(mesh.normals[i]),
                    uv: rect.remap(Vec2::new(u, v)),
                });
            }
        }
        Ok(TileMeshDefinition::from_triangles(vertices, props))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshShape;

    fn quad() -> ImportedMesh {
        ImportedMesh {
            positions: vec![[-0.5, 0.0, -0.5], [0.5, 0.0, -0.5], [0.5, 0.0, 0.5], [-0.5, 0.0, 0.5]],
            normals: vec![[0.0, 1.0, 0.0]; 4],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            indices: vec![0, 2, 1, 0, 3, 2],
            subsets: Vec::new(),
        }
    }

    #[test]
    fn imported_quad_expands_and_remaps() {
        let atlas = AtlasMap::uniform(AtlasRect::new(0.5, 0.5, 1.0, 1.0));
        let def = TileMeshDefinition::imported(&quad(), &atlas, MeshProperties::default()).unwrap();
        let MeshShape::Arbitrary(vs) = def.shape() else {
            panic!("expected arbitrary shape");
        };
        assert_eq!(vs.len(), 6);
        assert_eq!(vs[1].uv, Vec2::new(1.0, 1.0));
        assert_eq!(vs[0].uv, Vec2::new(0.5, 0.5));
        assert_eq!(def.collision_triangles().len(), 2);
        assert!(def.opaque_sides().is_empty());
    }

    #[test]
    fn subsets_pick_their_material_rect() {
        let mut mesh = quad();
        mesh.subsets = vec![
            MeshSubset { material: "a".into(), first_index: 0, index_count: 3 },
            MeshSubset { material: "b".into(), first_index: 3, index_count: 3 },
        ];
        let atlas = AtlasMap::uniform(AtlasRect::FULL)
            .with_material("b", AtlasRect::new(0.0, 0.0, 0.5, 0.5));
        let def = TileMeshDefinition::imported(&mesh, &atlas, MeshProperties::default()).unwrap();
        let MeshShape::Arbitrary(vs) = def.shape() else {
            panic!("expected arbitrary shape");
        };
        // vertex 2 has native uv (1,1)
        assert_eq!(vs[1].uv, Vec2::new(1.0, 1.0));
        assert_eq!(vs[5].uv, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn malformed_imports_are_rejected() {
        let mut no_normals = quad();
        no_normals.normals.clear();
        assert_eq!(
            TileMeshDefinition::imported(&no_normals, &AtlasMap::default(), MeshProperties::default()),
            Err(TileMeshError::MissingAttribute("normals"))
        );

        let mut bad_index = quad();
        bad_index.indices[4] = 9;
        assert_eq!(
            TileMeshDefinition::imported(&bad_index, &AtlasMap::default(), MeshProperties::default()),
            Err(TileMeshError::IndexOutOfRange { index: 9, vertices: 4 })
        );

        let mut bad_subset = quad();
        bad_subset.subsets = vec![MeshSubset { material: "x".into(), first_index: 3, index_count: 6 }];
        assert!(matches!(
            TileMeshDefinition::imported(&bad_subset, &AtlasMap::default(), MeshProperties::default()),
            Err(TileMeshError::SubsetOutOfRange { .. })
        ));

        let mut wrapping_subset = quad();
        wrapping_subset.subsets = vec![MeshSubset { material: "x".into(), first_index: usize::MAX, index_count: 3 }];
        assert_eq!(
            TileMeshDefinition::imported(&wrapping_subset, &AtlasMap::default(), MeshProperties::default()),
            Err(TileMeshError::SubsetOutOfRange {
                material: "x".into(),
                first: usize::MAX,
                end: usize::MAX,
                len: 6,
            })
        );
    }
}
