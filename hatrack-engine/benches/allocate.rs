//! Benchmarks for hat allocation in hatrack-engine.
//!
//! Allocation runs on every cursor move, so it has to stay comfortably
//! inside interactive latency on realistic token counts (hundreds).
//!
//! Run with: `cargo bench -p hatrack-engine`

use divan::{
  Bencher,
  black_box,
};
use hatrack_core::{
  document::DocumentSnapshot,
  position::Span,
};
use hatrack_engine::{
  allocate::{
    HatStability,
    allocate_hats,
  },
  splitting::GraphemeSplitter,
  styles::default_style_map,
  token::EditorSnapshot,
};

fn main() {
  divan::main();
}

/// A synthetic document of identifier-ish tokens, heavy on repeated first
/// letters so styles actually contend.
fn make_editor(n_tokens: usize) -> EditorSnapshot {
  let words = [
    "foo", "fooBar", "value", "index", "offset", "tokenKind", "x", "parse_input", "emit", "f2",
  ];
  let mut text = String::new();
  let mut spans = Vec::with_capacity(n_tokens);
  let mut offset = 0usize;
  for i in 0..n_tokens {
    let word = words[i % words.len()];
    let len = word.chars().count();
    spans.push(Span::new(offset, offset + len));
    text.push_str(word);
    text.push(if i % 12 == 11 { '\n' } else { ' ' });
    offset += len + 1;
  }

  let doc = DocumentSnapshot::new(&text);
  let cursor = doc.range_of(Span::point(offset / 2));
  EditorSnapshot::from_document("bench", &doc, vec![cursor], &spans)
}

#[divan::bench(args = [100, 300, 600])]
fn greedy_allocation(bencher: Bencher, n_tokens: usize) {
  let splitter = GraphemeSplitter::default();
  let styles = default_style_map();
  let editors = [make_editor(n_tokens)];
  let active = editors[0].id.clone();

  bencher.bench(|| {
    allocate_hats(
      black_box(&splitter),
      black_box(styles),
      &[],
      HatStability::Greedy,
      &active,
      black_box(&editors),
    )
    .unwrap()
  });
}

#[divan::bench(args = [100, 300, 600])]
fn stable_reallocation(bencher: Bencher, n_tokens: usize) {
  let splitter = GraphemeSplitter::default();
  let styles = default_style_map();
  let editors = [make_editor(n_tokens)];
  let active = editors[0].id.clone();
  let old = allocate_hats(
    &splitter,
    styles,
    &[],
    HatStability::Greedy,
    &active,
    &editors,
  )
  .unwrap();

  bencher.bench(|| {
    allocate_hats(
      black_box(&splitter),
      black_box(styles),
      black_box(&old),
      HatStability::Stable,
      &active,
      black_box(&editors),
    )
    .unwrap()
  });
}
