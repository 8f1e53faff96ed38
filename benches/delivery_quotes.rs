use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

use luminous_storefront::models::{
    fee_for, AddressHint, DeliveryQuote, LookupOutcome, PostalCode, PostalLookupRequest,
    StorefrontSession,
};
use luminous_storefront::observability::Metrics;
use luminous_storefront::repositories::{InMemorySessionRepository, SessionRepository};
use luminous_storefront::services::{
    DistanceEstimator, LookupError, PostalCodeLookup, ShippingService, SimulatedDistance,
};

/// Lookup that answers instantly so only local work is measured
struct InstantLookup;

#[async_trait]
impl PostalCodeLookup for InstantLookup {
    async fn lookup(&self, _postal_code: &PostalCode) -> Result<LookupOutcome, LookupError> {
        Ok(LookupOutcome::Found(AddressHint {
            street: "Rua Rui Costa".to_string(),
            neighborhood: "Altiplano".to_string(),
            city: Some("João Pessoa".to_string()),
            state: Some("PB".to_string()),
        }))
    }
}

fn bench_fee_bands(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_bands");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    for distance in [1.0, 6.5, 10.0, 15.5].iter() {
        group.bench_with_input(
            BenchmarkId::new("distance_km", distance),
            distance,
            |b, &km| {
                b.iter(|| black_box(fee_for(black_box(km))));
            },
        );
    }
    group.finish();
}

fn bench_quote_from_postal_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("quote_from_postal_code");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    let estimator = SimulatedDistance::default();
    for input in ["58046085", "58046-085", " 58.046-085 "].iter() {
        group.bench_with_input(BenchmarkId::new("input", input), input, |b, &raw| {
            b.iter(|| {
                let code = PostalCode::parse(black_box(raw)).unwrap();
                black_box(DeliveryQuote::for_distance(estimator.estimate_km(&code)))
            });
        });
    }
    group.finish();
}

fn bench_shipping_service_lookup(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("shipping_service_lookup");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("found", |b| {
        let sessions = Arc::new(InMemorySessionRepository::new());
        let session_id = rt
            .block_on(sessions.save_session(StorefrontSession::new()))
            .unwrap()
            .id;
        let shipping_service = ShippingService::new(
            sessions,
            Arc::new(InstantLookup),
            Arc::new(SimulatedDistance::default()),
            "Rua Rui Costa, 520, CEP 58046-085, João Pessoa - PB".to_string(),
            Arc::new(Metrics::new().unwrap()),
        );

        b.iter(|| {
            rt.block_on(async {
                let request = PostalLookupRequest {
                    postal_code: Some("58046-085".to_string()),
                };
                black_box(
                    shipping_service
                        .lookup_postal_code(&session_id, request)
                        .await
                        .unwrap(),
                )
            })
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_fee_bands,
    bench_quote_from_postal_code,
    bench_shipping_service_lookup
);
criterion_main!(benches);
