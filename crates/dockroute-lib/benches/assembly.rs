use criterion::{criterion_group, criterion_main, Criterion};
use dockroute_lib::{ModelLibrary, StationCatalog, StationDefinition, StationType};
use once_cell::sync::Lazy;
use std::hint::black_box;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

static MODELS: Lazy<ModelLibrary> = Lazy::new(|| {
    ModelLibrary::load_dir(&fixtures_dir().join("models")).expect("fixture models load")
});
static RING: Lazy<StationDefinition> = Lazy::new(|| {
    StationDefinition::from_path(&fixtures_dir().join("stations/ring.json"))
        .expect("fixture definition parses")
});
static HUB: Lazy<StationDefinition> = Lazy::new(|| {
    StationDefinition::from_path(&fixtures_dir().join("stations/hub.json"))
        .expect("fixture definition parses")
});

fn benchmark_assembly(c: &mut Criterion) {
    let models = &*MODELS;

    c.bench_function("build_ring_station", |b| {
        let definition = &*RING;
        b.iter(|| {
            let station = StationType::build("ring", definition, models).expect("station builds");
            black_box(station.num_docking_ports())
        });
    });

    c.bench_function("build_legacy_hub", |b| {
        let definition = &*HUB;
        b.iter(|| {
            let station = StationType::build("hub", definition, models).expect("station builds");
            black_box(station.num_docking_ports())
        });
    });

    c.bench_function("load_fixture_catalog", |b| {
        let dir = fixtures_dir().join("stations");
        b.iter(|| {
            let catalog = StationCatalog::load_dir(&dir, models).expect("catalog loads");
            black_box(catalog.len())
        });
    });
}

criterion_group!(benches, benchmark_assembly);
criterion_main!(benches);
