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

use approx::assert_relative_eq;
use std::sync::Arc;
use vireo_core::jobs::{JobSystem, JobSystemConfig};
use vireo_core::math::{Mat4, Rgba8, Vec3, Vec4};
use vireo_core::renderer::{
    CompareFunction, CullMode, GraphicsPipelineState, RasterError, RenderTargetPool,
    ShaderPayload,
};
use vireo_lanes::render_lane::shaders::{DepthOnlyShader, DepthOnlyUniforms, MeshView};
use vireo_lanes::{PrimitiveDispatch, Rasterizer, RasterizerConfig};

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Clip-space vertices plus a per-vertex color carried in `world_position`.
type Vertices = Vec<(Vec4, Vec3)>;

fn vertex_stage(id: u32, out: &mut ShaderPayload, vertices: &Vertices) {
    let (clip, color) = vertices[id as usize];
    out.clip_position = clip;
    out.world_position = color;
}

fn white(_: &ShaderPayload, _: &Vertices) -> Vec4 {
    Vec4::ONE
}

fn first_vertex_color(_: &ShaderPayload, vertices: &Vertices) -> Vec4 {
    vertices[0].1.extend(1.0)
}

fn vertex_color(input: &ShaderPayload, _: &Vertices) -> Vec4 {
    input.world_position.extend(1.0)
}

fn rasterizer(dispatch: PrimitiveDispatch, size: u32) -> Rasterizer {
    let jobs = JobSystem::new(JobSystemConfig {
        worker_count: 3,
        fiber_count: 16,
        ..Default::default()
    })
    .expect("job system should start");
    let mut r = Rasterizer::new(
        Arc::new(jobs),
        RasterizerConfig {
            dispatch,
            tile_rows: 7,
            vertices_per_job: 1,
        },
    );
    r.set_viewport(0, 0, size, size);
    r
}

/// Maps a pixel position to clip space for a square viewport with `w = 1`.
fn from_screen(x: f32, y: f32, z: f32, size: f32) -> Vec4 {
    Vec4::new(2.0 * x / size - 1.0, 2.0 * y / size - 1.0, z, 1.0)
}

/// A triangle covering the whole viewport at constant NDC depth.
fn fullscreen(z: f32, color: Vec3) -> Vertices {
    vec![
        (Vec4::new(-1.0, -1.0, z, 1.0), color),
        (Vec4::new(3.0, -1.0, z, 1.0), color),
        (Vec4::new(-1.0, 3.0, z, 1.0), color),
    ]
}

#[test]
fn test_right_triangle_covers_exact_pixel_count() {
    // --- 1. ARRANGE ---
    let mut r = rasterizer(PrimitiveDispatch::Tiled, 100);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(100, 100);
    pool.color_mut(color).unwrap().clear(Rgba8::BLACK);

    // Legs of 10 pixels, corner a quarter pixel off the origin: pixel
    // centers with x + y <= 9 are covered.
    let vertices: Vertices = vec![
        (from_screen(0.25, 0.25, 0.5, 100.0), Vec3::ONE),
        (from_screen(10.25, 0.25, 0.5, 100.0), Vec3::ONE),
        (from_screen(0.25, 10.25, 0.5, 100.0), Vec3::ONE),
    ];
    let pipeline = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &white)
        .with_color_target(color)
        .with_depth_test(false, CompareFunction::Always)
        .with_depth_write(false);

    // --- 2. ACT ---
    let stats = r
        .draw_primitives(&pipeline, &mut pool, &vertices, 3, &[[0, 1, 2]], Z_NEAR, Z_FAR)
        .unwrap();

    // --- 3. ASSERT ---
    let target = pool.color(color).unwrap();
    let white_pixels = target.as_slice().iter().filter(|&&p| p == Rgba8::WHITE).count();
    assert_eq!(white_pixels, 55);
    assert_eq!(stats.pixels_shaded, 55);
    assert_eq!(stats.primitives_rasterized, 1);

    assert_eq!(target.load(0, 0), Rgba8::WHITE);
    assert_eq!(target.load(9, 0), Rgba8::WHITE);
    assert_eq!(target.load(5, 4), Rgba8::WHITE);
    assert_eq!(target.load(10, 0), Rgba8::BLACK);
    assert_eq!(target.load(5, 5), Rgba8::BLACK);
    let others = target.as_slice().iter().filter(|&&p| p == Rgba8::BLACK).count();
    assert_eq!(others, 100 * 100 - 55);
}

#[test]
fn test_triangle_before_near_plane_leaves_targets_untouched() {
    let mut r = rasterizer(PrimitiveDispatch::Inline, 16);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(16, 16);
    let depth = pool.create_depth(16, 16);
    pool.color_mut(color).unwrap().clear(Rgba8::BLACK);

    let vertices: Vertices = vec![
        (Vec4::new(-0.01, -0.01, 0.0, 0.05), Vec3::ONE),
        (Vec4::new(0.01, -0.01, 0.0, 0.05), Vec3::ONE),
        (Vec4::new(0.0, 0.01, 0.0, 0.05), Vec3::ONE),
    ];
    let pipeline = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &white)
        .with_color_target(color)
        .with_depth_target(depth)
        .with_cull_mode(CullMode::None);

    let stats = r
        .draw_primitives(&pipeline, &mut pool, &vertices, 3, &[[0, 1, 2]], Z_NEAR, Z_FAR)
        .unwrap();

    assert_eq!(stats.primitives_rejected, 1);
    assert_eq!(stats.pixels_tested, 0);
    assert!(pool.color(color).unwrap().as_slice().iter().all(|&p| p == Rgba8::BLACK));
    assert!(pool.depth(depth).unwrap().as_slice().iter().all(|&d| d == 1.0));
}

#[test]
fn test_depth_less_equal_passes_nearer_and_rejects_farther() {
    // --- 1. ARRANGE ---
    let mut r = rasterizer(PrimitiveDispatch::Tiled, 8);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(8, 8);
    let depth = pool.create_depth(8, 8);
    pool.depth_mut(depth).unwrap().clear(0.5);

    let pipeline = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &first_vertex_color)
        .with_color_target(color)
        .with_depth_target(depth)
        .with_depth_test(true, CompareFunction::LessEqual);

    // --- 2. ACT ---
    let near = fullscreen(0.4, Vec3::new(0.0, 1.0, 0.0));
    let passed = r
        .draw_primitives(&pipeline, &mut pool, &near, 3, &[[0, 1, 2]], Z_NEAR, Z_FAR)
        .unwrap();
    let far = fullscreen(0.6, Vec3::new(1.0, 0.0, 0.0));
    let failed = r
        .draw_primitives(&pipeline, &mut pool, &far, 3, &[[0, 1, 2]], Z_NEAR, Z_FAR)
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(passed.pixels_shaded, 64);
    assert_eq!(passed.pixels_depth_failed, 0);
    assert_eq!(failed.pixels_shaded, 0);
    assert_eq!(failed.pixels_depth_failed, 64);

    let green = Rgba8::new(0, 255, 0, 255);
    assert!(pool.color(color).unwrap().as_slice().iter().all(|&p| p == green));
    for &d in pool.depth(depth).unwrap().as_slice() {
        assert_relative_eq!(d, 0.4, epsilon = 1e-6);
    }

    let frame = r.frame_stats();
    assert_eq!(frame.draw_calls, 2);
    assert_eq!(frame.totals.pixels_shaded, 64);
    r.reset_stats();
    assert_eq!(r.frame_stats().draw_calls, 0);
}

#[test]
fn test_inline_and_tiled_dispatch_match() {
    // Overlapping triangles at different depths with per-vertex colors.
    let vertices: Vertices = vec![
        (Vec4::new(-0.9, -0.8, 0.3, 1.0), Vec3::new(1.0, 0.0, 0.0)),
        (Vec4::new(0.8, -0.9, 0.7, 1.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec4::new(0.1, 0.9, 0.5, 1.0), Vec3::new(0.0, 0.0, 1.0)),
        (Vec4::new(-1.5, 0.2, 0.2, 2.0), Vec3::new(1.0, 1.0, 0.0)),
        (Vec4::new(1.8, -0.4, 0.9, 2.0), Vec3::new(0.0, 1.0, 1.0)),
        (Vec4::new(0.3, 2.5, 1.2, 3.0), Vec3::new(1.0, 0.0, 1.0)),
    ];
    let primitives = [[0, 1, 2], [3, 4, 5], [2, 1, 0]];

    let render = |dispatch| {
        let mut r = rasterizer(dispatch, 61);
        let mut pool = RenderTargetPool::new();
        let color = pool.create_color(61, 61);
        let depth = pool.create_depth(61, 61);
        let pipeline = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &vertex_color)
            .with_color_target(color)
            .with_depth_target(depth)
            .with_cull_mode(CullMode::None);
        let stats = r
            .draw_primitives(&pipeline, &mut pool, &vertices, 6, &primitives, Z_NEAR, Z_FAR)
            .unwrap();
        let pixels = pool.color(color).unwrap().as_bytes().to_vec();
        let depths = pool.depth(depth).unwrap().as_slice().to_vec();
        (stats, pixels, depths)
    };

    let (inline_stats, inline_pixels, inline_depths) = render(PrimitiveDispatch::Inline);
    let (tiled_stats, tiled_pixels, tiled_depths) = render(PrimitiveDispatch::Tiled);

    assert!(inline_stats.pixels_shaded > 0);
    assert_eq!(inline_stats, tiled_stats);
    assert_eq!(inline_pixels, tiled_pixels);
    assert_eq!(inline_depths, tiled_depths);
}

#[test]
fn test_back_faces_are_culled() {
    let mut r = rasterizer(PrimitiveDispatch::Inline, 8);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(8, 8);
    let pipeline = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &white)
        .with_color_target(color)
        .with_depth_test(false, CompareFunction::Always);

    // Clockwise on screen.
    let vertices = fullscreen(0.5, Vec3::ONE);
    let stats = r
        .draw_primitives(&pipeline, &mut pool, &vertices, 3, &[[0, 2, 1]], Z_NEAR, Z_FAR)
        .unwrap();
    assert_eq!(stats.primitives_culled, 1);
    assert_eq!(stats.pixels_shaded, 0);
}

#[test]
fn test_stale_target_handle_is_rejected() {
    let mut r = rasterizer(PrimitiveDispatch::Tiled, 8);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(8, 8);
    assert!(pool.destroy_color(color).is_some());

    let pipeline = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &white)
        .with_color_target(color)
        .with_depth_test(false, CompareFunction::Always);
    let vertices = fullscreen(0.5, Vec3::ONE);

    assert_eq!(
        r.draw_primitives(&pipeline, &mut pool, &vertices, 3, &[[0, 1, 2]], Z_NEAR, Z_FAR),
        Err(RasterError::InvalidColorTarget(color))
    );
}

#[test]
fn test_out_of_range_index_is_rejected() {
    let mut r = rasterizer(PrimitiveDispatch::Tiled, 8);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(8, 8);
    let pipeline = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &white)
        .with_color_target(color)
        .with_depth_test(false, CompareFunction::Always);
    let vertices = fullscreen(0.5, Vec3::ONE);

    assert_eq!(
        r.draw_primitives(&pipeline, &mut pool, &vertices, 3, &[[0, 1, 5]], Z_NEAR, Z_FAR),
        Err(RasterError::IndexOutOfRange {
            primitive: 0,
            index: 5,
            vertex_count: 3
        })
    );
}

#[test]
fn test_target_misconfiguration_is_rejected() {
    let mut r = rasterizer(PrimitiveDispatch::Inline, 8);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(8, 8);
    let small_depth = pool.create_depth(4, 4);
    let vertices = fullscreen(0.5, Vec3::ONE);

    let no_depth = GraphicsPipelineState::<Vertices>::new(&vertex_stage, &white)
        .with_color_target(color);
    assert_eq!(
        r.draw_primitives(&no_depth, &mut pool, &vertices, 3, &[[0, 1, 2]], Z_NEAR, Z_FAR),
        Err(RasterError::DepthTestWithoutTarget)
    );

    let mismatched = no_depth.with_depth_target(small_depth);
    assert_eq!(
        r.draw_primitives(&mismatched, &mut pool, &vertices, 3, &[[0, 1, 2]], Z_NEAR, Z_FAR),
        Err(RasterError::TargetSizeMismatch {
            color: (8, 8),
            depth: (4, 4)
        })
    );
}

#[test]
fn test_depth_only_pass_writes_depth_without_color() {
    // --- 1. ARRANGE ---
    let mut r = rasterizer(PrimitiveDispatch::Tiled, 32);
    let mut pool = RenderTargetPool::new();
    let depth = pool.create_depth(32, 32);

    // A quad facing +z, seen from an orthographic light looking down -z.
    let positions = [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(-0.5, 0.5, 0.0),
    ];
    let light = Mat4::orthographic_rh_zo(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0)
        * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y).unwrap();
    let uniforms = DepthOnlyUniforms {
        mesh: MeshView::new(&positions),
        mvp: light,
    };
    let pipeline =
        GraphicsPipelineState::<DepthOnlyUniforms>::new(&DepthOnlyShader, &DepthOnlyShader)
            .with_depth_target(depth);

    // --- 2. ACT ---
    let stats = r
        .draw_primitives(&pipeline, &mut pool, &uniforms, 4, &[[0, 1, 2], [0, 2, 3]], 0.0, Z_FAR)
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(stats.pixels_shaded, 0);
    assert!(stats.pixels_tested > 0);
    let target = pool.depth(depth).unwrap();
    assert_relative_eq!(target.load(20, 12), 0.5, epsilon = 1e-5);
    assert_eq!(target.load(1, 1), 1.0);
}
