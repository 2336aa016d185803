use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use clipview::bench::{EdgeFunctionRasterizer, FlatShader, FragmentState, Renderer, ScreenVertex};
use clipview::clipping::build_planes;
use clipview::prelude::*;

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

fn vertex(x: f32, y: f32) -> ScreenVertex {
    ScreenVertex {
        position: Vec3::new(x, y, 1.0),
        world: Vec3::ZERO,
    }
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");
    let rasterizer = EdgeFunctionRasterizer::new();
    let shader = FlatShader::new(0xFFFF0000);
    let state = FragmentState::default();

    for (name, triangle) in [
        ("small", [vertex(100.0, 100.0), vertex(120.0, 100.0), vertex(110.0, 120.0)]),
        ("medium", [vertex(100.0, 100.0), vertex(300.0, 100.0), vertex(200.0, 300.0)]),
        ("large", [vertex(50.0, 50.0), vertex(750.0, 100.0), vertex(400.0, 550.0)]),
    ] {
        group.bench_with_input(BenchmarkId::new("edge_function", name), &triangle, |b, tri| {
            let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            b.iter(|| {
                let mut fb = renderer.as_framebuffer();
                rasterizer.fill_triangle(black_box(tri), &mut fb, &state, &shader);
            });
        });
    }

    group.finish();
}

/// Session with one cube cut by `planes` plane objects.
fn cut_cube(planes: usize) -> EditorSession {
    let mut session = EditorSession::new(SessionSettings::default()).unwrap();
    session
        .add_model("cube", Geometry::cuboid(1.0, 1.0, 1.0))
        .unwrap();
    for i in 0..planes {
        let plane = session.add_plane().unwrap();
        let node = session.scene_mut().get_mut(plane).unwrap();
        node.transform.rotate_y(i as f32 * 0.7);
    }
    session
}

fn benchmark_build_planes(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_planes");

    for count in [1, 4, 16] {
        let session = cut_cube(count);
        let planes = session.planes();
        group.bench_with_input(BenchmarkId::from_parameter(count), &planes, |b, planes| {
            b.iter(|| build_planes(session.scene(), black_box(planes)));
        });
    }

    group.finish();
}

fn benchmark_capped_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let camera = OrbitCamera::default();
    let projection = Projection::from_degrees(
        50.0,
        BUFFER_WIDTH as f32 / BUFFER_HEIGHT as f32,
        0.1,
        10.0,
    );

    for (name, capping) in [("clipped", false), ("capped", true)] {
        let mut session = cut_cube(2);
        session.toggle_clipping().unwrap();
        if session.is_capping() != capping {
            session.toggle_capping().unwrap();
        }
        let mut engine = Engine::new(BUFFER_WIDTH, BUFFER_HEIGHT);

        group.bench_function(name, |b| {
            b.iter(|| {
                engine.render(
                    black_box(session.scene()),
                    &camera,
                    &projection,
                    session.lighting(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_triangle,
    benchmark_build_planes,
    benchmark_capped_frame
);
criterion_main!(benches);
