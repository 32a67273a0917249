use behaviors::{FilterEngine, normalize_query};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use html::{SelectorList, parse_document};

const SECTIONS: usize = 500;

fn make_docs_page(sections: usize) -> String {
    let mut out = String::from(r#"<html><body><main class="docs-content">"#);
    for i in 0..sections {
        out.push_str(&format!(r#"<section id="s{i}"><h2>Chapter {i}</h2>"#));
        for j in 0..6 {
            let topic = if (i + j) % 7 == 0 { "Patrol" } else { "Evidence" };
            out.push_str(&format!(
                r#"<div class="article-block"><h3>{topic} {i}.{j}</h3><p>Radio codes and <em>procedure</em> notes.</p></div>"#
            ));
        }
        out.push_str("</section>");
    }
    out.push_str("</main></body></html>");
    out
}

fn engine() -> FilterEngine {
    FilterEngine::new(
        SelectorList::parse(".article-block").unwrap(),
        SelectorList::parse(".docs-content section").unwrap(),
    )
}

fn bench_filter(c: &mut Criterion) {
    let page = make_docs_page(SECTIONS);
    let doc = parse_document(&page);
    let engine = engine();

    for (name, raw) in [
        ("bench_filter_match_some", "  Patrol "),
        ("bench_filter_match_none", "subpoena"),
        ("bench_filter_clear", ""),
    ] {
        let query = normalize_query(raw);
        c.bench_function(name, |b| {
            b.iter_batched(
                || doc.clone(),
                |mut doc| black_box(engine.apply(&mut doc, black_box(&query))),
                BatchSize::LargeInput,
            );
        });
    }
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
