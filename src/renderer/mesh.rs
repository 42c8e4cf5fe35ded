use gl::types::*;
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use std::mem;

use crate::components::MeshHandle;

/// CPU-side geometry: interleaved position + normal, indexed triangles.
pub struct RawMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl RawMesh {
    fn push_vertex(&mut self, position: Vec3, normal: Vec3) {
        self.vertices
            .extend_from_slice(&[position.x, position.y, position.z, normal.x, normal.y, normal.z]);
    }

    fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }
}

/// GPU mesh: one VAO with interleaved vertex data and an index buffer.
pub struct Mesh {
    vao: GLuint,
    vbo: GLuint,
    ebo: GLuint,
    index_count: GLsizei,
}

impl Mesh {
    pub fn upload(raw: &RawMesh) -> Self {
        let mut vao: GLuint = 0;
        let mut vbo: GLuint = 0;
        let mut ebo: GLuint = 0;

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);
            gl::GenBuffers(1, &mut ebo);

            gl::BindVertexArray(vao);

            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                mem::size_of_val(raw.vertices.as_slice()) as GLsizeiptr,
                raw.vertices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                mem::size_of_val(raw.indices.as_slice()) as GLsizeiptr,
                raw.indices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );

            let stride = (6 * mem::size_of::<f32>()) as GLsizei;
            gl::EnableVertexAttribArray(0);
            gl::VertexAttribPointer(0, 3, gl::FLOAT, gl::FALSE, stride, std::ptr::null());
            gl::EnableVertexAttribArray(1);
            gl::VertexAttribPointer(
                1,
                3,
                gl::FLOAT,
                gl::FALSE,
                stride,
                (3 * mem::size_of::<f32>()) as *const _,
            );

            gl::BindVertexArray(0);
        }

        Self {
            vao,
            vbo,
            ebo,
            index_count: raw.indices.len() as GLsizei,
        }
    }

    pub fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawElements(gl::TRIANGLES, self.index_count, gl::UNSIGNED_INT, std::ptr::null());
            gl::BindVertexArray(0);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteBuffers(1, &self.ebo);
        }
    }
}

/// Holds all uploaded meshes. Entities reference meshes by MeshHandle index.
pub struct MeshStore {
    meshes: Vec<Mesh>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self { meshes: Vec::new() }
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len());
        self.meshes.push(mesh);
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> &Mesh {
        &self.meshes[handle.0]
    }
}

/// Latitude/longitude sphere centered at the origin.
pub fn uv_sphere(radius: f32, stacks: u32, slices: u32) -> RawMesh {
    let mut raw = RawMesh::new();
    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stacks as f32;
        let y = phi.cos();
        let ring = phi.sin();
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let normal = Vec3::new(ring * theta.cos(), y, ring * theta.sin());
            raw.push_vertex(normal * radius, normal);
        }
    }
    let ring_stride = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * ring_stride + slice;
            let b = a + ring_stride;
            raw.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    raw
}

/// Flat square in the XZ plane, normal up, centered at the origin.
pub fn plane(half_extent: f32) -> RawMesh {
    let mut raw = RawMesh::new();
    let h = half_extent;
    for (x, z) in [(-h, -h), (-h, h), (h, h), (h, -h)] {
        raw.push_vertex(Vec3::new(x, 0.0, z), Vec3::Y);
    }
    raw.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    raw
}

/// Small octahedron used as a light gizmo; flat-shaded per face.
pub fn gizmo_diamond(size: f32) -> RawMesh {
    let mut raw = RawMesh::new();
    let tips = [
        Vec3::new(0.0, size, 0.0),
        Vec3::new(0.0, -size, 0.0),
    ];
    let ring = [
        Vec3::new(size, 0.0, 0.0),
        Vec3::new(0.0, 0.0, size),
        Vec3::new(-size, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -size),
    ];
    for (ti, tip) in tips.iter().enumerate() {
        for i in 0..4 {
            let a = ring[i];
            let b = ring[(i + 1) % 4];
            // Flip winding on the bottom half so faces stay outward.
            let (a, b) = if ti == 0 { (a, b) } else { (b, a) };
            let normal = (a - *tip).cross(b - *tip).normalize() * -1.0;
            let base = raw.vertices.len() as u32 / 6;
            raw.push_vertex(*tip, normal);
            raw.push_vertex(a, normal);
            raw.push_vertex(b, normal);
            raw.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
    }
    raw
}

/// Interleave loaded glTF primitive data into the renderer's vertex layout.
pub fn from_raw(positions: &[[f32; 3]], normals: &[[f32; 3]], indices: Vec<u32>) -> RawMesh {
    let mut raw = RawMesh::new();
    for (p, n) in positions.iter().zip(normals.iter()) {
        raw.push_vertex(Vec3::from(*p), Vec3::from(*n));
    }
    raw.indices = indices;
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let raw = uv_sphere(2.0, 8, 12);
        for v in raw.vertices.chunks_exact(6) {
            let p = Vec3::new(v[0], v[1], v[2]);
            assert!((p.length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_index_count_matches_patch_grid() {
        let raw = uv_sphere(1.0, 4, 6);
        assert_eq!(raw.indices.len(), (4 * 6 * 6) as usize);
        let vertex_count = raw.vertices.len() / 6;
        assert!(raw.indices.iter().all(|&i| (i as usize) < vertex_count));
    }

    #[test]
    fn plane_is_flat_and_up_facing() {
        let raw = plane(10.0);
        for v in raw.vertices.chunks_exact(6) {
            assert_eq!(v[1], 0.0);
            assert_eq!([v[3], v[4], v[5]], [0.0, 1.0, 0.0]);
        }
    }
}
