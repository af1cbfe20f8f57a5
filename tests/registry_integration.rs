//! Registry behavior across its public API
//!
//! Expiry tests run on Tokio's paused clock, so every deadline is exact.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok, assert_pending, assert_ready};

use meal_alerts::config::NotificationConfig;
use meal_alerts::notification::{
    Category, NotificationError, NotificationOptions, NotificationRegistry,
};

fn registry() -> NotificationRegistry {
    NotificationRegistry::new(NotificationConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_ids_are_unique_across_registries() {
    let first = registry();
    let second = registry();

    let mut ids = HashSet::new();
    for i in 0..50 {
        assert!(ids.insert(first.info(format!("first {}", i))));
        assert!(ids.insert(second.warning(format!("second {}", i))));
    }
    assert_eq!(ids.len(), 100);
}

#[tokio::test(start_paused = true)]
async fn test_info_and_error_expire_on_their_own_schedule() {
    let registry = registry();
    let saved = registry.info("Meal plan saved");
    let failed = registry.error("Could not reach the nutrition service");
    assert_eq!(registry.len(), 2);

    sleep(Duration::from_millis(5001)).await;
    assert!(!registry.contains(saved));
    assert!(registry.contains(failed));

    sleep(Duration::from_millis(2000)).await;
    assert!(registry.is_empty());

    let stats = registry.stats();
    assert_eq!(stats.total_added, 2);
    assert_eq!(stats.total_expired, 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_duration_boundaries() {
    let registry = registry();
    let id = registry.success_with("Water goal met", NotificationOptions::new().duration_ms(250));

    sleep(Duration::from_millis(249)).await;
    assert!(registry.contains(id));

    sleep(Duration::from_millis(2)).await;
    assert!(!registry.contains(id));
}

#[tokio::test(start_paused = true)]
async fn test_remaining_order_is_preserved_after_expiry() {
    let registry = registry();
    let a = registry.info_with("a", NotificationOptions::new().duration_ms(3000));
    let b = registry.info_with("b", NotificationOptions::new().duration_ms(1000));
    let c = registry.info_with("c", NotificationOptions::new().duration_ms(3000));

    sleep(Duration::from_millis(1500)).await;

    let ids: Vec<_> = registry.snapshot().iter().map(|n| n.id()).collect();
    assert_eq!(ids, vec![a, c]);
    assert!(!registry.contains(b));
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_before_expiry_has_no_late_effect() {
    let registry = registry();
    let id = registry.warning("Low protein today");
    let mut watcher = registry.subscribe();

    assert!(registry.remove(id));
    assert!(!registry.remove(id));
    assert_eq!(watcher.changed().await.map(|list| list.len()), Some(0));

    sleep(Duration::from_secs(10)).await;
    assert!(!watcher.has_changed());
    assert_eq!(registry.stats().total_dismissed, 1);
    assert_eq!(registry.stats().total_expired, 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_cancels_every_timer() {
    let registry = registry();
    registry.success("one");
    registry.error("two");
    registry.info("three");
    let mut watcher = registry.subscribe();

    assert_eq!(registry.clear_all(), 3);
    assert_eq!(watcher.changed().await.map(|list| list.len()), Some(0));

    sleep(Duration::from_secs(10)).await;
    assert!(!watcher.has_changed());
    assert_eq!(registry.stats().total_cleared, 3);
    assert_eq!(registry.stats().total_expired, 0);

    // Nothing to clear: no new state is published
    assert_eq!(registry.clear_all(), 0);
    assert!(!watcher.has_changed());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_tag_leaves_registry_untouched() {
    let registry = registry();
    registry.info("existing");
    let before = registry.snapshot();

    let err = assert_err!(registry.add_tagged("critical", "nope", NotificationOptions::new()));
    assert_eq!(err, NotificationError::InvalidCategory("critical".to_string()));
    assert_eq!(registry.snapshot(), before);

    let trimmed = registry.add_tagged(" Error ", "tag is trimmed", NotificationOptions::new());
    let id = assert_ok!(trimmed);
    assert_eq!(registry.get(id).map(|n| n.category()), Some(Category::Error));
}

#[tokio::test(start_paused = true)]
async fn test_watcher_wakes_on_add() {
    let registry = registry();
    let mut watcher = registry.subscribe();

    let mut changed = tokio_test::task::spawn(watcher.changed());
    assert_pending!(changed.poll());

    let id = registry.success("Snack logged");
    assert!(changed.is_woken());
    let list = assert_ready!(changed.poll()).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id(), id);
}
