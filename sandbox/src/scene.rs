// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Procedural meshes and textures for the demo scene.

use anyhow::Result;
use vireo_core::math::{Vec2, Vec3};
use vireo_core::renderer::{Primitive, Texture};
use vireo_lanes::render_lane::shaders::MeshView;

/// An indexed triangle mesh with owned attribute streams.
#[derive(Debug, Default)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tangents: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    primitives: Vec<Primitive>,
}

impl Mesh {
    /// A unit cube centered on the origin, four vertices per face.
    pub fn cube() -> Self {
        let faces = [
            (Vec3::X, -Vec3::Z),
            (-Vec3::X, Vec3::Z),
            (Vec3::Y, Vec3::X),
            (-Vec3::Y, Vec3::X),
            (Vec3::Z, Vec3::X),
            (-Vec3::Z, -Vec3::X),
        ];
        let mut mesh = Self::default();
        for (normal, tangent) in faces {
            mesh.push_quad(normal * 0.5, normal, tangent, 0.5, 1.0);
        }
        mesh
    }

    /// A square floor of side `size` at height `y`, facing up.
    pub fn floor(size: f32, y: f32, uv_repeat: f32) -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(Vec3::new(0.0, y, 0.0), Vec3::Y, Vec3::X, size * 0.5, uv_repeat);
        mesh
    }

    /// Appends a quad centered on `center`, wound counter-clockwise when seen
    /// from the side `normal` points to.
    fn push_quad(&mut self, center: Vec3, normal: Vec3, tangent: Vec3, half: f32, uv_repeat: f32) {
        let bitangent = normal.cross(tangent);
        let base = self.positions.len() as u32;
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for (u, v) in corners {
            self.positions
                .push(center + tangent * (u * half) + bitangent * (v * half));
            self.normals.push(normal);
            self.tangents.push(tangent);
            self.tex_coords.push(Vec2::new(
                (u + 1.0) * 0.5 * uv_repeat,
                (v + 1.0) * 0.5 * uv_repeat,
            ));
        }
        self.primitives.push([base, base + 1, base + 2]);
        self.primitives.push([base, base + 2, base + 3]);
    }

    pub fn view(&self) -> MeshView<'_> {
        MeshView::new(&self.positions)
            .with_normals(&self.normals)
            .with_tangents(&self.tangents)
            .with_tex_coords(&self.tex_coords)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// A two-tone checkerboard with `cells` squares per side.
pub fn checker_texture(size: u32, cells: u32, light: [u8; 3], dark: [u8; 3]) -> Result<Texture> {
    let cell = (size / cells.max(1)).max(1);
    let mut bytes = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let [r, g, b] = if (x / cell + y / cell) % 2 == 0 { light } else { dark };
            bytes.extend_from_slice(&[r, g, b, 255]);
        }
    }
    Ok(Texture::from_rgba8(size, size, &bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_faces_point_outwards() {
        let cube = Mesh::cube();
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.primitives().len(), 12);

        for &[a, b, c] in cube.primitives() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let p = &cube.positions;
            let face_normal = (p[b] - p[a]).cross(p[c] - p[a]);
            assert!(face_normal.dot(cube.normals[a]) > 0.0);
        }
    }

    #[test]
    fn test_checker_alternates() {
        let texture = checker_texture(4, 2, [255, 255, 255], [0, 0, 0]).unwrap();
        assert_eq!(texture.load_texel(0, 0).x, 1.0);
        assert_eq!(texture.load_texel(2, 0).x, 0.0);
        assert_eq!(texture.load_texel(2, 2).x, 1.0);
    }
}
