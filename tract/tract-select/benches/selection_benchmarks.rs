//! Benchmarks for streamline selection.
//!
//! Run with: cargo bench -p tract-select
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p tract-select -- --save-baseline main
//! 2. After changes: cargo bench -p tract-select -- --baseline main

#![allow(
    missing_docs,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::unwrap_used
)]

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::f64::consts::PI;
use tract_index::SelectionBox;
use tract_interior::RegionMesh;
use tract_select::{IndexSource, Membership, SelectionConfig, StreamlineSelector};
use tract_types::{Point3, Streamline};

// =============================================================================
// Test Data Generation
// =============================================================================

/// Helical streamlines spread through a 200 mm cube.
fn create_streamlines(count: usize, vertices: usize) -> Vec<Streamline> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let origin = Point3::new(
                (t * 37.1) % 200.0 - 100.0,
                (t * 53.7) % 200.0 - 100.0,
                (t * 71.3) % 200.0 - 100.0,
            );
            let points = (0..vertices)
                .map(|k| {
                    let s = k as f64 / (vertices - 1) as f64;
                    let angle = s * PI * 2.0 + t;
                    Point3::new(
                        origin.x + 10.0 * angle.cos(),
                        origin.y + 10.0 * angle.sin(),
                        origin.z + 40.0 * s,
                    )
                })
                .collect();
            Streamline::new(points).unwrap()
        })
        .collect()
}

/// Closed UV sphere of the given radius.
fn create_sphere(radius: f64, rings: u32, sectors: u32) -> RegionMesh {
    let mut vertices = vec![Point3::new(0.0, 0.0, radius)];
    for r in 1..rings {
        let phi = PI * f64::from(r) / f64::from(rings);
        for s in 0..sectors {
            let theta = 2.0 * PI * f64::from(s) / f64::from(sectors);
            vertices.push(Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));
        }
    }
    let south = vertices.len() as u32;
    vertices.push(Point3::new(0.0, 0.0, -radius));

    let ring = |r: u32, s: u32| 1 + r * sectors + s % sectors;
    let mut faces = Vec::new();
    for s in 0..sectors {
        faces.push([0, ring(0, s), ring(0, s + 1)]);
        faces.push([south, ring(rings - 2, s + 1), ring(rings - 2, s)]);
    }
    for r in 0..rings - 2 {
        for s in 0..sectors {
            let (a, b) = (ring(r, s), ring(r, s + 1));
            let (c, d) = (ring(r + 1, s), ring(r + 1, s + 1));
            faces.push([a, c, b]);
            faces.push([b, c, d]);
        }
    }

    RegionMesh::new(vertices, faces).unwrap()
}

fn selection_box() -> SelectionBox {
    SelectionBox::new(
        Point3::origin(),
        Point3::new(-30.0, -30.0, -30.0),
        Point3::new(30.0, 30.0, 30.0),
    )
}

// =============================================================================
// Box Mode Benchmarks
// =============================================================================

fn bench_box_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("BoxSelection");
    let selector = StreamlineSelector::default();
    let selection = selection_box();

    for count in [1_000, 10_000, 100_000] {
        let streamlines = create_streamlines(count, 8);
        let index = selector.build_index(&streamlines);

        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(format!("rebuild_{count}"), |b| {
            b.iter(|| {
                selector
                    .select_by_region(black_box(&streamlines), black_box(&selection), IndexSource::Rebuild)
                    .unwrap()
            });
        });

        group.bench_function(format!("cached_{count}"), |b| {
            b.iter(|| {
                selector
                    .select_by_region(
                        black_box(&streamlines),
                        black_box(&selection),
                        IndexSource::Cached(&index),
                    )
                    .unwrap()
            });
        });
    }

    group.finish();
}

// =============================================================================
// Mesh Mode Benchmarks
// =============================================================================

fn bench_mesh_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("MeshSelection");
    group.sample_size(10); // Mesh selection over 100k endpoints is slow

    let sphere = create_sphere(40.0, 24, 48); // 2208 triangles
    let streamlines = create_streamlines(50_000, 8);

    group.throughput(Throughput::Elements(streamlines.len() as u64 * 2));

    for workers in [1, 4, 8] {
        let selector = StreamlineSelector::new(SelectionConfig::default().with_worker_count(workers));
        group.bench_function(format!("sphere_{workers}_workers"), |b| {
            b.iter(|| {
                selector
                    .select_by_mesh(black_box(&streamlines), black_box(&sphere), Membership::Include)
                    .unwrap()
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_box_selection, bench_mesh_selection);
criterion_main!(benches);
