use super::*;

#[tokio::test]
async fn subscription_yields_current_value_first() {
    let hub = SessionHub::new();
    let mut sub = hub.subscribe();
    assert_eq!(sub.recv().await, Some(false));

    hub.publish(true);
    let mut late = hub.subscribe();
    assert_eq!(late.recv().await, Some(true));
}

#[tokio::test]
async fn published_changes_arrive_in_order() {
    let hub = SessionHub::new();
    let mut sub = hub.subscribe();
    hub.publish(true);
    hub.publish(false);
    hub.publish(true);

    assert_eq!(sub.recv().await, Some(false));
    assert_eq!(sub.recv().await, Some(true));
    assert_eq!(sub.recv().await, Some(false));
    assert_eq!(sub.recv().await, Some(true));
}

#[tokio::test]
async fn republishing_same_value_is_dropped() {
    let hub = SessionHub::new();
    let mut sub = hub.subscribe();
    sub.recv().await;

    hub.publish(true);
    hub.publish(true);
    hub.publish(false);

    assert_eq!(sub.recv().await, Some(true));
    assert_eq!(sub.recv().await, Some(false));
}

#[test]
fn publish_updates_presence() {
    let hub = SessionHub::new();
    assert!(!hub.is_present());
    hub.publish(true);
    assert!(hub.is_present());
    hub.clone().publish(false);
    assert!(!hub.is_present());
}

#[test]
fn dropping_subscription_unsubscribes() {
    let hub = SessionHub::new();
    let sub = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 1);
    drop(sub);
    assert_eq!(hub.subscriber_count(), 0);
}

#[tokio::test]
async fn recv_ends_when_hub_is_dropped() {
    let hub = SessionHub::new();
    let mut sub = hub.subscribe();
    drop(hub);
    assert_eq!(sub.recv().await, Some(false));
    assert_eq!(sub.recv().await, None);
}
