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

// Vireo Sandbox
// Renders a shadowed PBR scene headlessly and writes it to a PNG.

mod config;
mod scene;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use config::SandboxConfig;
use scene::{checker_texture, Mesh};
use vireo_core::math::{Mat4, Rgba8, Vec3, Vec4};
use vireo_core::renderer::{GraphicsPipelineState, RenderTargetPool};
use vireo_core::JobSystem;
use vireo_lanes::render_lane::shaders::{
    DepthOnlyShader, DepthOnlyUniforms, FrameData, LitShader, LitUniforms, Material, ShadowMap,
};
use vireo_lanes::Rasterizer;

const CLEAR_COLOR: Rgba8 = Rgba8::new(28, 32, 40, 255);

/// Half extent of the light's orthographic frustum, in world units.
const LIGHT_EXTENT: f32 = 4.0;
const LIGHT_DISTANCE: f32 = 10.0;

struct Object<'a> {
    mesh: &'a Mesh,
    model: Mat4,
    material: Material<'a>,
}

fn light_view_projection(direction: Vec3) -> Result<Mat4> {
    let direction = direction.normalize();
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(-direction * LIGHT_DISTANCE, Vec3::ZERO, up)
        .context("Light direction must be non-zero")?;
    let projection = Mat4::orthographic_rh_zo(
        -LIGHT_EXTENT,
        LIGHT_EXTENT,
        -LIGHT_EXTENT,
        LIGHT_EXTENT,
        0.1,
        2.0 * LIGHT_DISTANCE,
    );
    Ok(projection * view)
}

fn run(config: &SandboxConfig) -> Result<()> {
    let jobs = Arc::new(JobSystem::new(config.jobs)?);
    let mut rasterizer = Rasterizer::new(Arc::clone(&jobs), config.rasterizer);

    // --- Scene ---
    let cube = Mesh::cube();
    let floor = Mesh::floor(8.0, -0.5, 8.0);
    let checker = checker_texture(64, 2, [235, 235, 235], [90, 90, 100])?;
    let objects = [
        Object {
            mesh: &cube,
            model: Mat4::from_rotation_y(0.6),
            material: Material {
                base_color: Vec4::new(0.9, 0.25, 0.2, 1.0),
                metallic: 0.1,
                roughness: 0.4,
                ..Default::default()
            },
        },
        Object {
            mesh: &floor,
            model: Mat4::IDENTITY,
            material: Material {
                roughness: 0.8,
                base_color_map: Some(&checker),
                ..Default::default()
            },
        },
    ];

    // --- Shadow pass ---
    let light_matrix = light_view_projection(config.light.direction)?;
    let mut shadow_pool = RenderTargetPool::new();
    let shadow_size = config.light.shadow_map_size;
    let shadow_target =
        (shadow_size > 0).then(|| shadow_pool.create_depth(shadow_size, shadow_size));

    if let Some(shadow_target) = shadow_target {
        let started = Instant::now();
        rasterizer.reset_stats();
        rasterizer.set_viewport(0, 0, shadow_size, shadow_size);
        let pipeline =
            GraphicsPipelineState::<DepthOnlyUniforms>::new(&DepthOnlyShader, &DepthOnlyShader)
                .with_depth_target(shadow_target);
        for object in &objects {
            let uniforms = DepthOnlyUniforms {
                mesh: object.mesh.view(),
                mvp: light_matrix * object.model,
            };
            rasterizer.draw_primitives(
                &pipeline,
                &mut shadow_pool,
                &uniforms,
                uniforms.mesh.vertex_count(),
                object.mesh.primitives(),
                0.0,
                f32::MAX,
            )?;
        }
        log::info!(
            "Shadow pass: {} in {:?}",
            rasterizer.frame_stats().totals,
            started.elapsed()
        );
    }

    // --- Lit pass ---
    let (width, height) = (config.width, config.height);
    let mut pool = RenderTargetPool::new();
    let color = pool.create_color(width, height);
    let depth = pool.create_depth(width, height);
    if let Some(target) = pool.color_mut(color) {
        target.clear(CLEAR_COLOR);
    }

    let camera = &config.camera;
    let view = Mat4::look_at_rh(camera.position, camera.target, Vec3::Y)
        .context("Camera position and target must differ")?;
    let projection = Mat4::perspective_rh_zo(
        camera.fov_y_degrees.to_radians(),
        width as f32 / height.max(1) as f32,
        camera.z_near,
        camera.z_far,
    );
    let frame = FrameData {
        view_projection: projection * view,
        camera_position: camera.position,
        light_direction: config.light.direction,
        light_color: config.light.color,
        light_intensity: config.light.intensity,
        exposure: config.exposure,
        gamma: config.gamma,
        debug_view: config.debug_view,
    };
    let shadow = shadow_target
        .and_then(|id| shadow_pool.depth(id))
        .map(|depth| ShadowMap {
            depth,
            light_view_projection: light_matrix,
            bias: config.light.shadow_bias,
        });

    let started = Instant::now();
    rasterizer.reset_stats();
    rasterizer.set_viewport(0, 0, width, height);
    let pipeline = GraphicsPipelineState::<LitUniforms>::new(&LitShader, &LitShader)
        .with_color_target(color)
        .with_depth_target(depth);
    for object in &objects {
        let uniforms = LitUniforms {
            mesh: object.mesh.view(),
            model: object.model,
            frame: &frame,
            material: &object.material,
            shadow,
        };
        rasterizer.draw_primitives(
            &pipeline,
            &mut pool,
            &uniforms,
            uniforms.mesh.vertex_count(),
            object.mesh.primitives(),
            camera.z_near,
            camera.z_far,
        )?;
    }
    log::info!(
        "Lit pass: {} in {:?}",
        rasterizer.frame_stats().totals,
        started.elapsed()
    );

    // --- Output ---
    let target = pool.color(color).context("Color target vanished")?;
    let image = image::RgbaImage::from_raw(width, height, target.as_bytes().to_vec())
        .context("Color target size does not match the image size")?;
    // Rows are stored bottom-up.
    image::imageops::flip_vertical(&image)
        .save(&config.output)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    log::info!("Wrote {}", config.output.display());
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = SandboxConfig::load(config_path.as_deref())?;
    run(&config)
}
