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

//! Implements the draw call: vertex shading, primitive setup and scan
//! conversion on top of the job system.
//!
//! A draw runs two sequential stages. The vertex stage shades every vertex
//! into a reused payload buffer, one job per `vertices_per_job` vertices. The
//! primitive stage rejects and culls every triangle on the calling thread,
//! then scan-converts the survivors either inline or split into horizontal
//! bands of the render targets, one job per band. Every band walks the
//! primitives in submission order, so both dispatch modes produce the same
//! pixels.

use super::triangle::{interpolate, Discard, PixelRect, TriangleSetup};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use vireo_core::jobs::{Job, JobSystem};
use vireo_core::math::{Rgba8, Vec2};
use vireo_core::renderer::{
    DrawStats, FillMode, FrameStats, GraphicsPipelineState, Primitive, RasterError, RenderTarget,
    RenderTargetPool, RowBand, ShaderPayload, Viewport,
};

/// How the primitive stage of a draw is spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimitiveDispatch {
    /// Scan-convert every primitive on the calling thread.
    Inline,
    /// Split the targets into bands of rows and scan-convert each band in its
    /// own job.
    #[default]
    Tiled,
}

/// Tuning knobs of a [`Rasterizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterizerConfig {
    /// Primitive-stage threading.
    pub dispatch: PrimitiveDispatch,
    /// Rows per band in [`PrimitiveDispatch::Tiled`].
    pub tile_rows: u32,
    /// Vertices shaded by each vertex job.
    pub vertices_per_job: usize,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            dispatch: PrimitiveDispatch::Tiled,
            tile_rows: 32,
            vertices_per_job: 1,
        }
    }
}

/// The software rasterizer.
///
/// Owns the viewport, the per-vertex payload buffer reused across draws and
/// the running statistics of the current frame. Render targets are owned by
/// the caller and handed in per draw through a [`RenderTargetPool`].
pub struct Rasterizer {
    jobs: Arc<JobSystem>,
    config: RasterizerConfig,
    viewport: Viewport,
    payloads: Vec<ShaderPayload>,
    frame_stats: FrameStats,
}

/// The slice of the bound targets one primitive-stage task writes to.
struct Band<'t> {
    rows: Range<u32>,
    color: Option<RowBand<'t, Rgba8>>,
    depth: Option<RowBand<'t, f32>>,
}

impl Rasterizer {
    /// Creates a rasterizer with an empty viewport.
    pub fn new(jobs: Arc<JobSystem>, config: RasterizerConfig) -> Self {
        log::debug!("Creating rasterizer with {config:?}");
        Self {
            jobs,
            config,
            viewport: Viewport::default(),
            payloads: Vec::new(),
            frame_stats: FrameStats::default(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RasterizerConfig {
        &self.config
    }

    /// Sets the pixel rectangle NDC maps onto. Keeps the depth range.
    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Viewport {
            x,
            y,
            width,
            height,
            ..self.viewport
        };
    }

    /// Sets the depth range NDC `z` maps onto.
    pub fn set_depth_range(&mut self, min_depth: f32, max_depth: f32) {
        self.viewport = self.viewport.with_depth_range(min_depth, max_depth);
    }

    /// The active viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Statistics accumulated since the last [`reset_stats`](Self::reset_stats).
    pub fn frame_stats(&self) -> &FrameStats {
        &self.frame_stats
    }

    /// Clears the accumulated statistics, typically at the start of a frame.
    pub fn reset_stats(&mut self) {
        self.frame_stats = FrameStats::default();
    }

    /// Draws `primitives` indexing into `vertex_count` shaded vertices.
    ///
    /// Triangles whose three vertices all sit outside one clip plane, or whose
    /// `w` is entirely below `z_near` or above `z_far`, are rejected. The
    /// remainder are culled by facing, scan-converted, depth-tested and
    /// shaded into the targets the pipeline references.
    ///
    /// # Errors
    ///
    /// Fails before any vertex is shaded if a target handle is stale, the
    /// bound targets disagree in size, depth testing lacks a target, or a
    /// primitive indexes past `vertex_count`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_primitives<U: Sync>(
        &mut self,
        pipeline: &GraphicsPipelineState<'_, U>,
        targets: &mut RenderTargetPool,
        uniforms: &U,
        vertex_count: u32,
        primitives: &[Primitive],
        z_near: f32,
        z_far: f32,
    ) -> Result<DrawStats, RasterError> {
        let (color, depth) = targets.targets_mut(pipeline.color_target, pipeline.depth_target)?;
        if pipeline.depth_test_enable && depth.is_none() {
            return Err(RasterError::DepthTestWithoutTarget);
        }
        validate_indices(primitives, vertex_count)?;

        let mut stats = DrawStats {
            primitives_submitted: primitives.len() as u64,
            ..Default::default()
        };

        self.shade_vertices(pipeline, uniforms, vertex_count)?;
        stats.vertices_shaded = u64::from(vertex_count);

        let surface = surface_size(color.as_deref(), depth.as_deref(), &self.viewport);
        let limit = PixelRect {
            x0: self.viewport.x,
            y0: self.viewport.y,
            x1: self.viewport.x_end().min(surface.0),
            y1: self.viewport.y_end().min(surface.1),
        };

        let mut behind_eye = 0usize;
        let mut setups = Vec::with_capacity(primitives.len());
        for &primitive in primitives {
            match TriangleSetup::new(primitive, &self.payloads, pipeline, limit, z_near, z_far) {
                Ok(setup) => setups.push(setup),
                Err(Discard::Rejected) => stats.primitives_rejected += 1,
                Err(Discard::Culled) => stats.primitives_culled += 1,
                Err(Discard::BehindEye) => {
                    stats.primitives_rejected += 1;
                    behind_eye += 1;
                }
            }
        }
        if behind_eye > 0 {
            log::warn!("Discarded {behind_eye} primitive(s) with a vertex behind the eye");
        }
        stats.primitives_rasterized = setups.len() as u64;

        let band_rows = match self.config.dispatch {
            PrimitiveDispatch::Inline => surface.1.max(1),
            PrimitiveDispatch::Tiled => self.config.tile_rows.max(1),
        };
        let bands = split_bands(color, depth, surface.1, band_rows);
        let payloads = &self.payloads;
        let setups = &setups;

        match self.config.dispatch {
            PrimitiveDispatch::Inline => {
                for band in bands {
                    raster_band(band, setups, payloads, pipeline, uniforms, &mut stats);
                }
            }
            PrimitiveDispatch::Tiled => {
                let mut band_stats = vec![DrawStats::default(); bands.len()];
                let jobs: Vec<Job<'_>> = bands
                    .into_iter()
                    .zip(band_stats.iter_mut())
                    .map(|(band, out)| {
                        Box::new(move || {
                            raster_band(band, setups, payloads, pipeline, uniforms, out)
                        }) as Job<'_>
                    })
                    .collect();
                self.jobs.run_scoped(jobs)?;
                for s in &band_stats {
                    stats += *s;
                }
            }
        }

        log::trace!("Draw finished: {stats}");
        self.frame_stats.record(&stats);
        Ok(stats)
    }

    /// Runs the vertex stage over `vertex_count` fresh payloads.
    fn shade_vertices<U: Sync>(
        &mut self,
        pipeline: &GraphicsPipelineState<'_, U>,
        uniforms: &U,
        vertex_count: u32,
    ) -> Result<(), RasterError> {
        self.payloads.clear();
        self.payloads
            .resize(vertex_count as usize, ShaderPayload::default());

        let viewport = self.viewport;
        let shader = pipeline.vertex_shader;
        let per_job = self.config.vertices_per_job.max(1);

        let jobs: Vec<Job<'_>> = self
            .payloads
            .chunks_mut(per_job)
            .enumerate()
            .map(|(chunk, payloads)| {
                let first = (chunk * per_job) as u32;
                Box::new(move || {
                    for (offset, payload) in payloads.iter_mut().enumerate() {
                        shader.main(first + offset as u32, payload, uniforms);
                        payload.finalize(&viewport);
                    }
                }) as Job<'_>
            })
            .collect();
        self.jobs.run_scoped(jobs)?;
        Ok(())
    }
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("config", &self.config)
            .field("viewport", &self.viewport)
            .field("frame_stats", &self.frame_stats)
            .finish_non_exhaustive()
    }
}

fn validate_indices(primitives: &[Primitive], vertex_count: u32) -> Result<(), RasterError> {
    for (primitive, indices) in primitives.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(RasterError::IndexOutOfRange {
                primitive,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// The pixel extent draws are clipped to: the bound targets, or the viewport
/// when nothing is bound.
fn surface_size(
    color: Option<&RenderTarget<Rgba8>>,
    depth: Option<&RenderTarget<f32>>,
    viewport: &Viewport,
) -> (u32, u32) {
    color
        .map(RenderTarget::size)
        .or_else(|| depth.map(RenderTarget::size))
        .unwrap_or((viewport.x_end(), viewport.y_end()))
}

fn split_bands<'t>(
    color: Option<&'t mut RenderTarget<Rgba8>>,
    depth: Option<&'t mut RenderTarget<f32>>,
    height: u32,
    band_rows: u32,
) -> Vec<Band<'t>> {
    let mut colors = color.map(|c| c.rows_mut(band_rows));
    let mut depths = depth.map(|d| d.rows_mut(band_rows));
    (0..height)
        .step_by(band_rows as usize)
        .map(|y| Band {
            rows: y..(y + band_rows).min(height),
            color: colors.as_mut().and_then(Iterator::next),
            depth: depths.as_mut().and_then(Iterator::next),
        })
        .collect()
}

/// Scan-converts every setup triangle over the rows of one band.
fn raster_band<U>(
    mut band: Band<'_>,
    setups: &[TriangleSetup],
    payloads: &[ShaderPayload],
    pipeline: &GraphicsPipelineState<'_, U>,
    uniforms: &U,
    stats: &mut DrawStats,
) {
    let wireframe = pipeline.fill_mode == FillMode::Wireframe;

    for setup in setups {
        let rows = setup.bounds.y0.max(band.rows.start)..setup.bounds.y1.min(band.rows.end);
        if rows.is_empty() || setup.bounds.is_empty() {
            continue;
        }
        let vertices = setup.indices.map(|i| &payloads[i as usize]);

        for y in rows {
            for x in setup.bounds.x0..setup.bounds.x1 {
                let weights = setup.weights_at(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if !weights.is_inside() || (wireframe && !setup.is_near_edge(&weights)) {
                    continue;
                }
                stats.pixels_tested += 1;

                let pixel = interpolate(vertices, &weights);
                let depth_value = pixel.screen_position.z;

                if pipeline.depth_test_enable {
                    if let Some(depth) = band.depth.as_ref() {
                        if !pipeline.depth_compare.test(depth_value, depth.load(x, y)) {
                            stats.pixels_depth_failed += 1;
                            continue;
                        }
                    }
                }

                if let Some(color) = band.color.as_mut() {
                    let shaded = pipeline.pixel_shader.main(&pixel, uniforms);
                    color.store(x, y, Rgba8::from_vec4_clamped(shaded));
                    stats.pixels_shaded += 1;
                }

                if pipeline.depth_write_enable {
                    if let Some(depth) = band.depth.as_mut() {
                        depth.store(x, y, depth_value);
                    }
                }
            }
        }
    }
}
