use common::{AggregateId, Money, ProductId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{DomainEvent, OrderEvent, OrderLine, OrderStatus, ShippingDetails};
use projections::{OrderSummariesView, ProjectionProcessor, SalesDashboardView};
use store::{EventEnvelope, EventStore, InMemoryEventStore, Version};

fn make_envelope(aggregate_id: AggregateId, version: i64, event: &OrderEvent) -> EventEnvelope {
    EventEnvelope::new(
        aggregate_id,
        "Order",
        event.event_type(),
        Version::new(version),
        event,
    )
    .unwrap()
}

fn placed(order_id: AggregateId) -> OrderEvent {
    let line = OrderLine {
        product_id: ProductId::new(1),
        product_name: "Premium Cat Food Mix".to_string(),
        quantity: 2,
        price: Money::from_major(890),
    };
    OrderEvent::order_placed(
        order_id,
        UserId::new("alice"),
        vec![line],
        ShippingDetails::new("House 12", "01700000000", None).unwrap(),
        Money::from_major(50),
    )
}

/// Populate a store with N orders, each placed, confirmed and shipped.
async fn populate_store(store: &InMemoryEventStore, n: usize) {
    let admin = UserId::new("root");
    for _ in 0..n {
        let id = AggregateId::new();
        let events = vec![
            make_envelope(id, 1, &placed(id)),
            make_envelope(
                id,
                2,
                &OrderEvent::status_changed(
                    OrderStatus::Pending,
                    OrderStatus::Confirmed,
                    admin.clone(),
                ),
            ),
            make_envelope(
                id,
                3,
                &OrderEvent::status_changed(
                    OrderStatus::Confirmed,
                    OrderStatus::Shipped,
                    admin.clone(),
                ),
            ),
        ];
        store.append(events, Version::initial()).await.unwrap();
    }
}

fn bench_catch_up(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    rt.block_on(populate_store(&store, 500));

    c.bench_function("projections/catch_up_1500_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut processor = ProjectionProcessor::new(store.clone());
                processor.register(Box::new(OrderSummariesView::new()));
                processor.register(Box::new(SalesDashboardView::new()));
                processor.run_catch_up().await.unwrap();
            });
        });
    });
}

fn bench_dashboard_stats(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let view = SalesDashboardView::new();
    rt.block_on(async {
        populate_store(&store, 1000).await;
        let mut processor = ProjectionProcessor::new(store.clone());
        processor.register(Box::new(view.clone()));
        processor.run_catch_up().await.unwrap();
    });

    c.bench_function("projections/dashboard_stats_1000_orders", |b| {
        b.iter(|| rt.block_on(view.stats()));
    });
}

fn bench_process_single_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut processor = ProjectionProcessor::new(InMemoryEventStore::new());
    processor.register(Box::new(OrderSummariesView::new()));
    processor.register(Box::new(SalesDashboardView::new()));

    c.bench_function("projections/process_single_event", |b| {
        b.iter(|| {
            let id = AggregateId::new();
            let envelope = make_envelope(id, 1, &placed(id));
            rt.block_on(processor.process_event(&envelope)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_catch_up,
    bench_dashboard_stats,
    bench_process_single_event
);
criterion_main!(benches);
