use brgy_event_bus::{EventBus, EventBusError, EventReceiverExt};

#[derive(Debug, Clone, PartialEq)]
struct Changed(u64);

#[derive(Debug, Clone, PartialEq)]
struct Other(&'static str);

#[tokio::test]
async fn publish_reaches_every_subscriber() {
    let bus = EventBus::new();
    let mut rx1 = bus.subscribe::<Changed>().unwrap();
    let mut rx2 = bus.subscribe::<Changed>().unwrap();

    assert_eq!(bus.publish(Changed(100)).unwrap(), 2);

    assert_eq!(*rx1.next_event().await.unwrap(), Changed(100));
    assert_eq!(*rx2.next_event().await.unwrap(), Changed(100));
}

#[tokio::test]
async fn event_types_are_isolated() {
    let bus = EventBus::new();
    let mut changed = bus.subscribe::<Changed>().unwrap();
    let _other = bus.subscribe::<Other>().unwrap();

    bus.publish(Other("noise")).unwrap();
    bus.publish(Changed(1)).unwrap();

    assert_eq!(*changed.next_event().await.unwrap(), Changed(1));
    assert_eq!(bus.subscriber_count::<Other>(), 1);
}

#[test]
fn publish_without_subscribers_is_not_an_error() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(Changed(1)).unwrap(), 0);
}

#[tokio::test]
async fn lagging_receiver_skips_to_retained_tail() {
    let bus = EventBus::with_capacity(2).unwrap();
    let mut rx = bus.subscribe::<Changed>().unwrap();

    for i in 0..50 {
        bus.publish(Changed(i)).unwrap();
    }

    let first = rx.next_event().await.unwrap();
    assert!(first.0 >= 48, "expected the retained tail, got {}", first.0);
    let second = rx.next_event().await.unwrap();
    assert_eq!(second.0, first.0 + 1);
}

#[tokio::test]
async fn shutdown_closes_subscriptions() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<Changed>().unwrap();

    assert_eq!(bus.shutdown(), 1);
    assert!(rx.next_event().await.is_none());
}

#[test]
fn zero_capacity_is_rejected() {
    let err = EventBus::with_capacity(0).unwrap_err();
    assert!(matches!(err, EventBusError::InvalidCapacity { .. }));
}
