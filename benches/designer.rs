use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flow_designer::config::{LayoutConfig, LayoutEngine, RenderConfig};
use flow_designer::layout::compute_layout;
use flow_designer::measure::measure_pages;
use flow_designer::model::Page;
use flow_designer::projector::project;
use flow_designer::render::render_svg;
use flow_designer::theme::Theme;
use std::hint::black_box;

/// A chain of `pages` pages with `extra_links` forward skips and one link
/// back to the start every tenth page.
fn dense_flow(pages: usize, extra_links: usize) -> Vec<Page> {
    let mut out: Vec<Page> = (0..pages).map(|i| Page::new(format!("/page-{i}"))).collect();
    for i in 0..pages.saturating_sub(1) {
        out[i].next.push(flow_designer::Link::new(format!("/page-{}", i + 1)));
    }
    let mut count = 0usize;
    'outer: for i in 0..pages {
        for j in (i + 2)..pages {
            if count >= extra_links {
                break 'outer;
            }
            out[i].next.push(flow_designer::Link::new(format!("/page-{j}")));
            count += 1;
        }
    }
    for i in (10..pages).step_by(10) {
        out[i].next.push(flow_designer::Link::new("/page-0"));
    }
    out
}

fn config(engine: LayoutEngine) -> LayoutConfig {
    LayoutConfig {
        engine,
        ..LayoutConfig::default()
    }
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::designer();
    for (pages, extra_links) in [(10usize, 5usize), (40, 80), (80, 320)] {
        let flow = dense_flow(pages, extra_links);
        let sizes = measure_pages(&flow, &theme, &LayoutConfig::default());
        let graph = project(&flow, &sizes);
        for engine in [LayoutEngine::Layered, LayoutEngine::Dagre] {
            let config = config(engine);
            let name = format!("{engine:?}_{pages}_{extra_links}").to_lowercase();
            group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
                b.iter(|| {
                    let layout = compute_layout(black_box(graph), &config);
                    black_box(layout.edges.len());
                });
            });
        }
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let theme = Theme::designer();
    let layout_config = config(LayoutEngine::Layered);
    let render_config = RenderConfig::default();
    for (pages, extra_links) in [(10usize, 5usize), (40, 80)] {
        let flow = dense_flow(pages, extra_links);
        let name = format!("flow_{pages}_{extra_links}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &flow, |b, flow| {
            b.iter(|| {
                let sizes = measure_pages(black_box(flow), &theme, &layout_config);
                let graph = project(flow, &sizes);
                let layout = compute_layout(&graph, &layout_config);
                let svg = render_svg(&layout, flow, &theme, &render_config);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_end_to_end
);
criterion_main!(benches);
