//! Integration Tests for the Hook Host
//!
//! These tests verify that state, effects, and memos work together through
//! the render/commit/flush cycle.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use equimemo_core::deps;
use equimemo_core::reactive::{
    generation, is_first_render, use_effect, use_memo, use_state, RenderContext, RenderHook,
};
use equimemo_core::HostConfig;

/// Test that a memo recomputes when the state it depends on changes.
#[test]
fn memo_tracks_state_dependency() {
    let mut hook = RenderHook::new(|| {
        let (n, set_n) = use_state(10_i32);
        let doubled = use_memo(move || n * 2, deps![n]);
        (doubled, set_n)
    })
    .unwrap();

    assert_eq!(hook.result().0, 20);

    hook.act(|(_, set_n)| set_n.set(5)).unwrap();
    assert_eq!(hook.result().0, 10);
}

/// Test that an effect observes committed state.
#[test]
fn effect_tracks_state_dependency() {
    let observed = Arc::new(AtomicI32::new(-1));
    let observed_clone = observed.clone();

    let mut hook = RenderHook::new(move || {
        let (value, set_value) = use_state(0);
        let observed = observed_clone.clone();
        use_effect(move || observed.store(value, Ordering::SeqCst), deps![value]);
        set_value
    })
    .unwrap();

    // Effect runs after mount, captures initial value
    assert_eq!(observed.load(Ordering::SeqCst), 0);

    hook.act(|set_value| set_value.set(42)).unwrap();
    assert_eq!(observed.load(Ordering::SeqCst), 42);
}

/// Test that memos cache across renders that do not touch their deps.
#[test]
fn memo_caches_expensive_computation() {
    let compute_count = Arc::new(AtomicI32::new(0));
    let compute_clone = compute_count.clone();

    let mut hook = RenderHook::new(move || {
        let counted = compute_clone.clone();
        use_memo(
            move || {
                counted.fetch_add(1, Ordering::SeqCst);
                42
            },
            deps![],
        )
    })
    .unwrap();

    for _ in 0..3 {
        hook.rerender().unwrap();
        assert_eq!(*hook.result(), 42);
    }
    assert_eq!(compute_count.load(Ordering::SeqCst), 1);
}

/// Test that a memo can depend on another memo's output.
#[test]
fn memo_depends_on_memo() {
    let mut hook = RenderHook::new(|| {
        let (base, set_base) = use_state(5_i32);
        let doubled = use_memo(move || Arc::new(base * 2), deps![base]);
        let plus_ten = {
            let memo_deps = deps![&doubled];
            let doubled = Arc::clone(&doubled);
            use_memo(move || *doubled + 10, memo_deps)
        };
        (*doubled, plus_ten, set_base)
    })
    .unwrap();

    assert_eq!((hook.result().0, hook.result().1), (10, 20));

    hook.act(|(_, _, set_base)| set_base.set(10)).unwrap();
    assert_eq!((hook.result().0, hook.result().1), (20, 30));
}

/// Test that the render context is only active while the component runs.
#[test]
fn render_context_is_scoped_to_render() {
    assert!(!RenderContext::is_active());

    let hook = RenderHook::new(|| {
        let active = RenderContext::is_active();
        let scope = RenderContext::current_scope_id();
        let first = is_first_render();
        (active, scope, first, generation())
    })
    .unwrap();

    let (active, scope, first, generation) = *hook.result();
    assert!(active);
    assert_eq!(scope, Some(hook.scope_id()));
    assert!(first);
    assert_eq!(generation, 0);
    assert!(!RenderContext::is_active());
}

/// Test that hooks refuse to run outside a render.
#[test]
#[should_panic(expected = "outside of a component render")]
fn hook_outside_render_panics() {
    use_state(0_u8);
}

/// Test that setters can be driven from another task.
#[tokio::test]
async fn setter_from_spawned_task() {
    let mut hook = RenderHook::with_config(
        || use_state(String::from("idle")),
        HostConfig::default().with_render_limit(4),
    )
    .unwrap();

    let set = hook.result().1.clone();
    tokio::spawn(async move { set.set(String::from("loaded")) })
        .await
        .unwrap();

    // The update is queued until the renderer flushes
    assert_eq!(hook.result().0, "idle");
    hook.act(|_| ()).unwrap();
    assert_eq!(hook.result().0, "loaded");
}

/// Test the full chain: state -> memo -> effect, across several updates.
#[test]
fn full_chain_across_updates() {
    let last_seen = Arc::new(AtomicI32::new(0));
    let last_seen_clone = last_seen.clone();

    let mut hook = RenderHook::new(move || {
        let (n, set_n) = use_state(1_i32);
        let squared = use_memo(move || n * n, deps![n]);
        let seen = last_seen_clone.clone();
        use_effect(move || seen.store(squared, Ordering::SeqCst), deps![squared]);
        set_n
    })
    .unwrap();

    assert_eq!(last_seen.load(Ordering::SeqCst), 1);

    for n in 2..=4 {
        hook.act(|set_n| set_n.set(n)).unwrap();
        assert_eq!(last_seen.load(Ordering::SeqCst), n * n);
    }
    assert_eq!(hook.render_count(), 4);
}
