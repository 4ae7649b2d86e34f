use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use vireo_core::jobs::{JobSystem, JobSystemConfig};
use vireo_core::math::{Mat4, Vec3, FRAC_PI_4};
use vireo_core::renderer::{GraphicsPipelineState, RenderTargetPool, SamplerState};
use vireo_lanes::render_lane::shaders::{MeshView, UnlitShader, UnlitUniforms};
use vireo_lanes::{PrimitiveDispatch, Rasterizer, RasterizerConfig};

const SIZE: u32 = 512;

/// A `n x n` grid of quads spanning `[-1, 1]` in the xy plane.
fn grid(n: u32) -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let mut positions = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            let u = i as f32 / n as f32 * 2.0 - 1.0;
            let v = j as f32 / n as f32 * 2.0 - 1.0;
            positions.push(Vec3::new(u, v, 0.0));
        }
    }
    let mut primitives = Vec::new();
    let row = n + 1;
    for j in 0..n {
        for i in 0..n {
            let a = j * row + i;
            primitives.push([a, a + 1, a + row + 1]);
            primitives.push([a, a + row + 1, a + row]);
        }
    }
    (positions, primitives)
}

fn bench_draw(c: &mut Criterion) {
    let jobs = Arc::new(JobSystem::new(JobSystemConfig::default()).unwrap());
    let (positions, primitives) = grid(32);
    let mvp = Mat4::perspective_rh_zo(FRAC_PI_4, 1.0, 0.1, 10.0)
        * Mat4::look_at_rh(Vec3::new(0.0, -1.0, 2.5), Vec3::ZERO, Vec3::Y).unwrap();
    let uniforms = UnlitUniforms {
        mesh: MeshView::new(&positions),
        mvp,
        color: vireo_core::math::Vec4::ONE,
        texture: None,
        sampler: SamplerState::LINEAR_WRAP,
    };

    let mut group = c.benchmark_group("Rasterizer");

    for (name, dispatch) in [
        ("Inline 32x32 grid", PrimitiveDispatch::Inline),
        ("Tiled 32x32 grid", PrimitiveDispatch::Tiled),
    ] {
        let mut rasterizer = Rasterizer::new(
            Arc::clone(&jobs),
            RasterizerConfig {
                dispatch,
                vertices_per_job: 64,
                ..Default::default()
            },
        );
        rasterizer.set_viewport(0, 0, SIZE, SIZE);
        let mut pool = RenderTargetPool::new();
        let color = pool.create_color(SIZE, SIZE);
        let depth = pool.create_depth(SIZE, SIZE);
        let pipeline = GraphicsPipelineState::<UnlitUniforms>::new(&UnlitShader, &UnlitShader)
            .with_color_target(color)
            .with_depth_target(depth);

        group.bench_function(name, |b| {
            b.iter(|| {
                if let Some(target) = pool.depth_mut(depth) {
                    target.clear(1.0);
                }
                let stats = rasterizer
                    .draw_primitives(
                        &pipeline,
                        &mut pool,
                        &uniforms,
                        positions.len() as u32,
                        &primitives,
                        0.1,
                        10.0,
                    )
                    .unwrap();
                black_box(stats);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_draw);
criterion_main!(benches);
