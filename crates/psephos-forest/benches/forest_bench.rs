//! Criterion benchmarks for psephos-forest: training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use psephos_forest::{ForestConfig, TreeConfig};

/// Regional-sized synthetic data: 28 columns like the extracted feature
/// vector, 4 classes.
fn make_classification(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % 4;
        labels.push(class);
        features.push(
            (0..28)
                .map(|f| {
                    let base = if f < 4 { class as f64 } else { 0.0 };
                    base + rng.r#gen::<f64>()
                })
                .collect(),
        );
    }
    (features, labels)
}

fn bench_forest_train(c: &mut Criterion) {
    let (features, labels) = make_classification(370, 42);
    let config = ForestConfig::default();
    c.bench_function("forest_train_370x28_100trees", |b| {
        b.iter(|| config.fit(&features, &labels).unwrap());
    });
}

fn bench_forest_predict(c: &mut Criterion) {
    let (features, labels) = make_classification(370, 42);
    let forest = ForestConfig::default().fit(&features, &labels).unwrap();
    c.bench_function("forest_predict_proba_single", |b| {
        b.iter(|| forest.predict_proba(&features[0]).unwrap());
    });
    c.bench_function("forest_predict_batch_370", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

fn bench_single_tree(c: &mut Criterion) {
    let (features, labels) = make_classification(370, 42);
    let config = TreeConfig::new().with_max_depth(Some(10));
    c.bench_function("tree_fit_370x28", |b| {
        b.iter(|| config.fit(&features, &labels).unwrap());
    });
}

criterion_group!(benches, bench_forest_train, bench_forest_predict, bench_single_tree);
criterion_main!(benches);
