use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::mock::StepRng;

use service::build_risk::BuildRiskAssessor;
use service::monitoring::{AnomalyDetector, IncidentPredictor, MetricPoint};

fn bench_detect(c: &mut Criterion) {
    let mut detector = AnomalyDetector::default();
    for i in 0..1000 {
        detector.detect(MetricPoint::now("latency", 10.0 + (i % 7) as f64));
    }

    c.bench_function("anomaly_detect_full_history", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            black_box(detector.detect(MetricPoint::now("latency", 10.0 + (i % 7) as f64)));
        });
    });
}

fn bench_predict(c: &mut Criterion) {
    let mut predictor = IncidentPredictor::default();
    for m in 0..50 {
        let name = format!("cpu_{m}");
        for i in 0..100 {
            predictor.record(&name, 20.0 + i as f64 * 0.7);
        }
    }

    c.bench_function("incident_predict_50_metrics", |b| {
        b.iter(|| black_box(predictor.predict()));
    });
}

fn bench_build_risk(c: &mut Criterion) {
    let changes: BTreeMap<String, u32> = (0..200).map(|i| (format!("src/auth/module{i}.rs"), i % 60)).collect();
    let mut rng = StepRng::new(0, 1 << 40);

    c.bench_function("build_risk_200_files", |b| {
        b.iter(|| black_box(BuildRiskAssessor.assess(&changes, &mut rng)));
    });
}

criterion_group!(benches, bench_detect, bench_predict, bench_build_risk);
criterion_main!(benches);
