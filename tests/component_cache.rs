//! Component cache behavior against an in-memory cluster

mod common;

use common::{FakeDash, FakeQueryer, FakeStore, deployment, pod, replica_set, uid};
use resview::viewer::{
    ComponentCache, ObjectKey, PLACEHOLDER_ID, ViewerError, key_from_object,
};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_get_without_queryer_fails() {
    let store = FakeStore::new(vec![]);
    let cache = ComponentCache::new(FakeDash::new(store)).unwrap();

    let result = cache
        .get(&CancellationToken::new(), &deployment("web"))
        .await;
    assert!(matches!(result, Err(ViewerError::NoQueryerConfigured)));
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_zero_capacity_is_rejected() {
    let store = FakeStore::new(vec![]);
    assert!(matches!(
        ComponentCache::with_capacity(FakeDash::new(store), 0),
        Err(ViewerError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_placeholder_then_resolved_graph() {
    let web = deployment("web");
    let rs = replica_set("web-5d4f", &web);
    let pod_a = pod("web-5d4f-a", &[&rs]);
    let pod_b = pod("web-5d4f-b", &[&rs]);
    let store = FakeStore::new(vec![web.clone(), rs, pod_a, pod_b]);

    let cache = ComponentCache::new(FakeDash::new(store.clone())).unwrap();
    cache.set_queryer(FakeQueryer::new(store)).await;
    let ctx = CancellationToken::new();

    let (first, resolution) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    assert_eq!(first.config.nodes.len(), 1);
    assert_eq!(first.config.selected, PLACEHOLDER_ID);
    let placeholder = first.node(PLACEHOLDER_ID).unwrap();
    assert_eq!(placeholder.name, "web");
    assert_eq!(placeholder.path.as_deref(), Some("/default/deployment/web"));

    let resolved = resolution.unwrap().wait().await.unwrap();
    assert_eq!(resolved, key_from_object(&web).unwrap());

    let component = cache.get(&ctx, &web).await.unwrap();
    assert!(!component.is_pending());
    assert_eq!(component.config.nodes.len(), 4);
    assert_eq!(component.config.selected, uid("web"));
    assert_eq!(component.title(), "Resource Viewer");

    let root = component.node(&uid("web")).unwrap();
    assert_eq!(root.edges, vec![uid("web-5d4f")]);
    assert_eq!(root.path.as_deref(), Some("/default/deployment/web"));
    assert_eq!(component.node(&uid("web-5d4f")).unwrap().edges.len(), 2);

    // A hit returns the same content without side effects
    let again = cache.get(&ctx, &web).await.unwrap();
    assert_eq!(again, component);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_least_recently_used_entry_is_evicted() {
    let objects: Vec<_> = ["a", "b", "c"].into_iter().map(deployment).collect();
    let store = FakeStore::new(objects.clone());

    let cache = ComponentCache::with_capacity(FakeDash::new(store.clone()), 2).unwrap();
    cache.set_queryer(FakeQueryer::new(store)).await;
    let ctx = CancellationToken::new();

    for object in &objects {
        let (_, resolution) = cache.get_with_resolution(&ctx, object).await.unwrap();
        resolution.unwrap().wait().await.unwrap();
    }

    assert_eq!(cache.len().await, 2);
    assert_eq!(cache.capacity().await, 2);
    assert!(cache.cached(&key_from_object(&objects[0]).unwrap()).await.is_none());
    assert!(cache.cached(&key_from_object(&objects[1]).unwrap()).await.is_some());
    assert!(cache.cached(&key_from_object(&objects[2]).unwrap()).await.is_some());
}

#[tokio::test]
async fn test_concurrent_misses_share_one_resolution() {
    let web = deployment("web");
    let store = FakeStore::new(vec![web.clone()]);
    let queryer = FakeQueryer::new(store.clone());

    let cache = ComponentCache::new(FakeDash::new(store)).unwrap();
    cache.set_queryer(queryer.clone()).await;
    let ctx = CancellationToken::new();

    let (first, second) = tokio::join!(
        cache.get_with_resolution(&ctx, &web),
        cache.get_with_resolution(&ctx, &web)
    );
    let (_, first) = first.unwrap();
    let (_, second) = second.unwrap();

    let resolutions: Vec<_> = [first, second].into_iter().flatten().collect();
    assert_eq!(resolutions.iter().filter(|r| r.is_owner()).count(), 1);

    for resolution in resolutions {
        resolution.wait().await.unwrap();
    }
    assert_eq!(queryer.calls(), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_joined_caller_waits_for_running_resolution() {
    let web = deployment("web");
    let rs = replica_set("web-5d4f", &web);
    let store = FakeStore::new(vec![web.clone(), rs]);
    let (queryer, gate) = FakeQueryer::gated(store.clone());

    let cache = ComponentCache::new(FakeDash::new(store)).unwrap();
    cache.set_queryer(queryer.clone()).await;
    let ctx = CancellationToken::new();

    let (_, owner) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    let (pending, joined) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    let owner = owner.unwrap();
    let joined = joined.unwrap();

    assert!(pending.is_pending());
    assert!(owner.is_owner());
    assert!(!joined.is_owner());

    gate.add_permits(10);
    let key = key_from_object(&web).unwrap();
    assert_eq!(joined.wait().await.unwrap(), key);
    assert_eq!(owner.wait().await.unwrap(), key);

    assert_eq!(cache.cached(&key).await.unwrap().config.nodes.len(), 2);
    assert_eq!(queryer.calls(), 2);
}

#[tokio::test]
async fn test_recently_used_entry_survives_eviction() {
    let objects: Vec<_> = ["a", "b", "c"].into_iter().map(deployment).collect();
    let store = FakeStore::new(objects.clone());

    let cache = ComponentCache::with_capacity(FakeDash::new(store.clone()), 2).unwrap();
    cache.set_queryer(FakeQueryer::new(store)).await;
    let ctx = CancellationToken::new();

    for object in &objects[..2] {
        let (_, resolution) = cache.get_with_resolution(&ctx, object).await.unwrap();
        resolution.unwrap().wait().await.unwrap();
    }

    // Touch "a" so "b" becomes the least recently used entry
    let (_, resolution) = cache.get_with_resolution(&ctx, &objects[0]).await.unwrap();
    assert!(resolution.is_none());

    let (_, resolution) = cache.get_with_resolution(&ctx, &objects[2]).await.unwrap();
    resolution.unwrap().wait().await.unwrap();

    assert_eq!(cache.len().await, 2);
    assert!(cache.cached(&key_from_object(&objects[0]).unwrap()).await.is_some());
    assert!(cache.cached(&key_from_object(&objects[1]).unwrap()).await.is_none());
    assert!(cache.cached(&key_from_object(&objects[2]).unwrap()).await.is_some());
}

#[tokio::test]
async fn test_invalidate_discards_running_resolution() {
    let web = deployment("web");
    let store = FakeStore::new(vec![web.clone()]);
    let (queryer, gate) = FakeQueryer::gated(store.clone());

    let cache = ComponentCache::new(FakeDash::new(store)).unwrap();
    cache.set_queryer(queryer.clone()).await;
    let ctx = CancellationToken::new();
    let key = key_from_object(&web).unwrap();

    let (_, resolution) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    assert!(cache.invalidate(&key).await);

    gate.add_permits(10);
    assert!(resolution.unwrap().wait().await.is_err());
    assert!(cache.cached(&key).await.is_none());
    assert!(cache.is_empty().await);

    // The next get starts over
    let (component, resolution) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    assert!(component.is_pending());
    resolution.unwrap().wait().await.unwrap();
    assert!(!cache.cached(&key).await.unwrap().is_pending());
}

#[tokio::test]
async fn test_cancellation_keeps_placeholder() {
    let web = deployment("web");
    let store = FakeStore::new(vec![web.clone()]);

    let cache = ComponentCache::new(FakeDash::new(store.clone())).unwrap();
    cache.set_queryer(FakeQueryer::hanging(store)).await;
    let ctx = CancellationToken::new();

    let (_, resolution) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    ctx.cancel();

    let err = resolution.unwrap().wait().await.unwrap_err();
    assert!(err.is_cancelled());

    let key = key_from_object(&web).unwrap();
    let component = cache.cached(&key).await.unwrap();
    assert!(component.is_pending());
    assert_eq!(component.config.nodes.len(), 1);
}

#[tokio::test]
async fn test_invalidate_forces_new_traversal() {
    let web = deployment("web");
    let store = FakeStore::new(vec![web.clone()]);
    let queryer = FakeQueryer::new(store.clone());

    let cache = ComponentCache::new(FakeDash::new(store.clone())).unwrap();
    cache.set_queryer(queryer.clone()).await;
    let ctx = CancellationToken::new();

    let (_, resolution) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    resolution.unwrap().wait().await.unwrap();

    // A replica set created after the first traversal
    store.insert(replica_set("web-new", &web)).await;

    let key = ObjectKey::new("apps/v1", "Deployment", "default", "web");
    assert!(cache.invalidate(&key).await);

    let (_, resolution) = cache.get_with_resolution(&ctx, &web).await.unwrap();
    resolution.unwrap().wait().await.unwrap();

    let component = cache.cached(&key).await.unwrap();
    assert_eq!(component.config.nodes.len(), 2);
    assert!(queryer.calls() >= 3);
}
