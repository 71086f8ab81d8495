use crate::theme::{FacadeStyle, Theme};
use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use skyline_common::FacadeTexture;
use skyline_kernel::{BuildingSpec, PlaneSpec, Scene};

/// Vertex shared by the ground, boundary and building geometry.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    /// 1.0 when the fragment should sample the bound facade texture.
    pub textured: f32,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2], color: Vec4, textured: bool) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
            color: color.to_array(),
            textured: if textured { 1.0 } else { 0.0 },
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a quad given as top-left, bottom-left, bottom-right, top-right
    /// seen from outside.
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, color: Vec4, textured: bool) {
        const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(UVS) {
            self.vertices
                .push(Vertex::new(corner, normal, uv, color, textured));
        }
        self.indices
            .extend([0, 1, 2, 0, 2, 3].map(|i| base + i));
    }

    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| base + i));
    }
}

/// Five faces of a building box. The bottom is never visible and is skipped.
pub fn building_mesh(spec: &BuildingSpec, style: &FacadeStyle) -> MeshData {
    let (min, max) = spec.footprint();
    let (x0, x1, z0, z1) = (min.x, max.x, min.y, max.y);
    let (y0, y1) = (0.0, spec.height);
    let p = Vec3::new;

    let (front, right, left, back, roof, textured) = match *style {
        FacadeStyle::Textured { wall, roof } => (wall, wall, wall, wall, roof, true),
        FacadeStyle::Flat {
            front,
            right,
            left,
            back,
            roof,
        } => (front, right, left, back, roof, false),
    };

    let mut mesh = MeshData::default();
    mesh.push_quad(
        [p(x0, y1, z1), p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1)],
        Vec3::Z,
        front,
        textured,
    );
    mesh.push_quad(
        [p(x1, y1, z1), p(x1, y0, z1), p(x1, y0, z0), p(x1, y1, z0)],
        Vec3::X,
        right,
        textured,
    );
    mesh.push_quad(
        [p(x0, y1, z0), p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1)],
        Vec3::NEG_X,
        left,
        textured,
    );
    mesh.push_quad(
        [p(x1, y1, z0), p(x1, y0, z0), p(x0, y0, z0), p(x0, y1, z0)],
        Vec3::NEG_Z,
        back,
        textured,
    );
    mesh.push_quad(
        [p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)],
        Vec3::Y,
        roof,
        false,
    );
    mesh
}

/// One flat quad per city block.
pub fn ground_mesh(plane: &PlaneSpec, color: Vec4) -> MeshData {
    let size = plane.block_size;
    let mut mesh = MeshData::default();
    for (i, j) in plane.block_origins() {
        let (x0, z1) = (i as f32, -(j as f32));
        let (x1, z0) = (x0 + size, z1 - size);
        mesh.push_quad(
            [
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0, 0.0, z1),
                Vec3::new(x1, 0.0, z1),
                Vec3::new(x1, 0.0, z0),
            ],
            Vec3::Y,
            color,
            false,
        );
    }
    mesh
}

/// Outer boundary as a line list: four segments, eight vertices.
pub fn boundary_lines(plane: &PlaneSpec, color: Vec4) -> Vec<Vertex> {
    plane
        .boundary_segments()
        .into_iter()
        .flat_map(|(a, b)| [a, b])
        .map(|p| Vertex::new(p, Vec3::Y, [0.0, 0.0], color, false))
        .collect()
}

/// Positions of a ±1 cube, 12 triangles facing inward.
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [[f32; 3]; 36] = [
    [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0],

    [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0],

    [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0],

    [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0],

    [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0],
];

/// All static geometry for a scene, with buildings grouped by facade so
/// each texture is bound once per frame.
#[derive(Debug, Clone, Default)]
pub struct CityMesh {
    pub ground: MeshData,
    pub boundary: Vec<Vertex>,
    pub buildings: [MeshData; 2],
}

impl CityMesh {
    pub fn build(scene: &Scene, theme: &Theme) -> Self {
        let mut buildings: [MeshData; 2] = Default::default();
        for spec in &scene.buildings {
            buildings[spec.texture.index()].append(&building_mesh(spec, &theme.facade));
        }
        let mesh = Self {
            ground: ground_mesh(&scene.plane, theme.ground_color),
            boundary: boundary_lines(&scene.plane, theme.boundary_color),
            buildings,
        };
        tracing::debug!(
            ground_vertices = mesh.ground.vertices.len(),
            building_vertices = mesh.building_vertex_count(),
            "built city mesh"
        );
        mesh
    }

    pub fn buildings_for(&self, texture: FacadeTexture) -> &MeshData {
        &self.buildings[texture.index()]
    }

    pub fn building_vertex_count(&self) -> usize {
        self.buildings.iter().map(|m| m.vertices.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BuildingSpec {
        BuildingSpec {
            grid_x: 4,
            grid_z: -8,
            half_size: 2.0,
            height: 7.0,
            texture: FacadeTexture::B,
        }
    }

    #[test]
    fn building_has_five_quads() {
        let mesh = building_mesh(&spec(), &Theme::textured().facade);
        assert_eq!(mesh.vertices.len(), 20);
        assert_eq!(mesh.indices.len(), 30);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn building_spans_footprint_and_height() {
        let mesh = building_mesh(&spec(), &Theme::flat().facade);
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = mesh.vertices.iter().map(|v| v.position[1]).collect();
        let zs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[2]).collect();
        let range = |v: &[f32]| {
            (
                v.iter().copied().fold(f32::MAX, f32::min),
                v.iter().copied().fold(f32::MIN, f32::max),
            )
        };
        assert_eq!(range(&xs), (2.0, 6.0));
        assert_eq!(range(&ys), (0.0, 7.0));
        assert_eq!(range(&zs), (-10.0, -6.0));
        assert!(ys.iter().filter(|&&y| y == 0.0).count() == 8, "no bottom face");
    }

    #[test]
    fn normals_point_outward() {
        let s = spec();
        let center = Vec3::new(s.grid_x as f32, s.height / 2.0, s.grid_z as f32);
        let mesh = building_mesh(&s, &Theme::textured().facade);
        for v in &mesh.vertices {
            let outward = Vec3::from(v.position) - center;
            assert!(outward.dot(Vec3::from(v.normal)) > 0.0);
        }
    }

    #[test]
    fn textured_roof_is_flat_colored() {
        let mesh = building_mesh(&spec(), &Theme::textured().facade);
        let (walls, roof) = mesh.vertices.split_at(16);
        assert!(walls.iter().all(|v| v.textured == 1.0));
        assert!(roof.iter().all(|v| v.textured == 0.0 && v.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn flat_faces_use_their_own_colors() {
        let mesh = building_mesh(&spec(), &Theme::flat().facade);
        assert!(mesh.vertices.iter().all(|v| v.textured == 0.0));
        assert_eq!(mesh.vertices[8].color, [0.4, 0.4, 0.4, 1.0], "left face");
        assert_eq!(mesh.vertices[12].color, [0.3, 0.3, 0.3, 1.0], "back face");
    }

    #[test]
    fn ground_has_one_quad_per_block() {
        let plane = PlaneSpec::new(25);
        let mesh = ground_mesh(&plane, Vec4::ONE);
        assert_eq!(mesh.vertices.len(), 9 * 4);
        assert_eq!(mesh.indices.len(), 9 * 6);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn boundary_is_a_closed_line_list() {
        let lines = boundary_lines(&PlaneSpec::new(12), Vec4::ONE);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[7].position, lines[0].position);
        assert_eq!(lines[0].position, [-2.0, 0.0, 2.0]);
    }

    #[test]
    fn skybox_is_a_unit_cube() {
        assert_eq!(SKYBOX_VERTICES.len(), 36);
        assert!(SKYBOX_VERTICES.iter().flatten().all(|c| c.abs() == 1.0));
    }

    #[test]
    fn city_mesh_groups_buildings_by_texture() {
        let scene = Scene::generate(24, 11);
        let mesh = CityMesh::build(&scene, &Theme::textured());
        let per_texture = |t: FacadeTexture| scene.buildings.iter().filter(|b| b.texture == t).count();
        assert_eq!(mesh.buildings_for(FacadeTexture::A).vertices.len(), per_texture(FacadeTexture::A) * 20);
        assert_eq!(mesh.buildings_for(FacadeTexture::B).indices.len(), per_texture(FacadeTexture::B) * 30);
        assert_eq!(mesh.building_vertex_count(), scene.building_count() * 20);
        assert_eq!(mesh.boundary.len(), 8);
    }
}
