//! Benchmarks for parsing and rendering documents.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use std::fmt::Write;
use tagmark_renderer::{CommonMark, Components, RenderOptions, Renderer, parse};

/// Generate a document with `sections` cards, each holding markdown paragraphs.
fn generate_document(sections: usize, paragraphs_per_section: usize) -> String {
    let mut doc = String::with_capacity(sections * paragraphs_per_section * 120);
    doc.push_str("# Report\n\n");

    for i in 0..sections {
        doc.push_str(&format!("<Card title=\"Section {i}\" owner={{team.lead}} rank={i}>\n\n"));
        for j in 0..paragraphs_per_section {
            doc.push_str(&format!(
                "Paragraph {j} of section {i} with **bold** and *italic* text.\n\n"
            ));
        }
        doc.push_str("</Card>\n\n");
    }
    doc
}

fn renderer() -> Renderer {
    let components = Components::new().with("Card", |props, render| {
        let title = props.get_str("title").unwrap_or_default();
        write!(render, "<section><h2>{title}</h2>")?;
        render.render(props.children())?;
        render.write_str("</section>")?;
        Ok(())
    });
    Renderer::new(
        RenderOptions::new()
            .with_components(components)
            .with_markdown_engine(CommonMark::new()),
    )
}

fn bench_parse(c: &mut Criterion) {
    let doc = generate_document(20, 3);

    c.bench_function("parse_20_sections", |b| {
        b.iter(|| parse(&doc));
    });
}

fn bench_render_varying_sizes(c: &mut Criterion) {
    let renderer = renderer();
    let context = json!({"team": {"lead": "Ada"}});

    let mut group = c.benchmark_group("render_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let doc = generate_document(sections, paragraphs);
        let Ok(nodes) = parse(&doc) else {
            continue;
        };

        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("cards", format!("{sections}s_{paragraphs}p")),
            &nodes,
            |b, nodes| b.iter(|| renderer.render_to_string(nodes, &context)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_render_varying_sizes);
criterion_main!(benches);
