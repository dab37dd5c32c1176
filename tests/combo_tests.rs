//! Combo detection: timing budgets, restarts, recursion guards and
//! registration namespaces.

use std::cell::Cell;
use std::rc::Rc;

use keyspan::{ComboAction, ComboRegistry, KeyEvent, KeySource, Mode, ModeSet};

fn keys(s: &str) -> Vec<KeyEvent> {
    s.chars().map(KeyEvent::char).collect()
}

fn jk_registry(delay: u64) -> ComboRegistry {
    let mut reg = ComboRegistry::new();
    reg.register(
        ModeSet::INSERT,
        &keys("jk"),
        ComboAction::Keys("hello".into()),
        delay,
    )
    .unwrap();
    reg
}

fn typed(reg: &mut ComboRegistry, c: char, at: u64) -> Vec<keyspan::ComboFire> {
    reg.observe(Mode::Insert, KeyEvent::char(c), at, KeySource::Typed)
}

#[test]
fn sequence_within_budget_fires() {
    let mut reg = jk_registry(200);
    assert!(typed(&mut reg, 'j', 0).is_empty());
    let fires = typed(&mut reg, 'k', 150);
    assert_eq!(fires.len(), 1);
    assert_eq!(fires[0].erase_count, 2);
    assert_eq!(fires[0].keys.as_deref(), Some("hello"));
}

#[test]
fn sequence_at_exact_budget_fires() {
    let mut reg = jk_registry(200);
    assert!(typed(&mut reg, 'j', 0).is_empty());
    assert_eq!(typed(&mut reg, 'k', 200).len(), 1);
}

#[test]
fn sequence_past_budget_does_not_fire() {
    let mut reg = jk_registry(200);
    assert!(typed(&mut reg, 'j', 0).is_empty());
    assert!(typed(&mut reg, 'k', 201).is_empty());

    // And the detector recovered: a fresh in-time sequence still fires.
    assert!(typed(&mut reg, 'j', 1000).is_empty());
    assert_eq!(typed(&mut reg, 'k', 1100).len(), 1);
}

#[test]
fn budget_applies_to_every_gap_of_a_longer_sequence() {
    let mut reg = ComboRegistry::new();
    reg.register(ModeSet::INSERT, &keys("jkl"), ComboAction::Keys("x".into()), 100)
        .unwrap();

    // j..k in time, k..l too late: the whole match is lost.
    assert!(typed(&mut reg, 'j', 0).is_empty());
    assert!(typed(&mut reg, 'k', 80).is_empty());
    assert!(typed(&mut reg, 'l', 300).is_empty());

    // A fresh, fully in-time pass fires with the full erase count.
    assert!(typed(&mut reg, 'j', 1000).is_empty());
    assert!(typed(&mut reg, 'k', 1080).is_empty());
    let fires = typed(&mut reg, 'l', 1160);
    assert_eq!(fires.len(), 1);
    assert_eq!(fires[0].erase_count, 3);
}

#[test]
fn timed_out_first_key_can_restart_a_match() {
    let mut reg = jk_registry(200);
    assert!(typed(&mut reg, 'j', 0).is_empty());
    // Too late to continue, but 'j' itself starts a fresh match.
    assert!(typed(&mut reg, 'j', 500).is_empty());
    assert_eq!(typed(&mut reg, 'k', 600).len(), 1);
}

#[test]
fn combos_on_shared_prefix_are_independent() {
    let mut reg = ComboRegistry::new();
    let jk = reg
        .register(ModeSet::INSERT, &keys("jk"), ComboAction::Keys("A".into()), 200)
        .unwrap();
    let jj = reg
        .register(ModeSet::INSERT, &keys("jj"), ComboAction::Keys("B".into()), 200)
        .unwrap();

    assert!(typed(&mut reg, 'j', 0).is_empty());
    let fires = typed(&mut reg, 'j', 50);
    assert_eq!(fires.len(), 1);
    assert_eq!(fires[0].id, jj);

    // The second 'j' restarted the jk machine, so a 'k' now completes it.
    let fires = typed(&mut reg, 'k', 100);
    assert_eq!(fires.len(), 1);
    assert_eq!(fires[0].id, jk);
}

#[test]
fn emulated_keys_skip_the_originating_combo_only() {
    let mut reg = ComboRegistry::new();
    let first = reg
        .register(ModeSet::INSERT, &keys("ab"), ComboAction::Keys("x".into()), 500)
        .unwrap();
    let second = reg
        .register(ModeSet::INSERT, &keys("ab"), ComboAction::Keys("y".into()), 500)
        .unwrap();

    // Keys emulated by `first`'s action are invisible to it, but the other
    // combo still observes them.
    let fires: Vec<_> = ["a", "b"]
        .iter()
        .flat_map(|c| {
            reg.observe(
                Mode::Insert,
                KeyEvent::char(c.chars().next().unwrap()),
                10,
                KeySource::Emulated(first),
            )
        })
        .collect();
    assert_eq!(fires.len(), 1);
    assert_eq!(fires[0].id, second);
}

#[test]
fn callable_action_runs_at_match_time() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let mut reg = ComboRegistry::new();
    reg.register(
        ModeSet::NORMAL,
        &keys("gq"),
        ComboAction::Call(Box::new(move || {
            seen.set(seen.get() + 1);
            Some("done".to_string())
        })),
        100,
    )
    .unwrap();

    reg.observe(Mode::Normal, KeyEvent::char('g'), 0, KeySource::Typed);
    assert_eq!(calls.get(), 0, "action must not run before the match");
    let fires = reg.observe(Mode::Normal, KeyEvent::char('q'), 50, KeySource::Typed);
    assert_eq!(calls.get(), 1);
    assert_eq!(fires[0].keys.as_deref(), Some("done"));
}

#[test]
fn registrations_are_queryable_and_removable() {
    let mut reg = ComboRegistry::new();
    let a = reg
        .register(ModeSet::INSERT, &keys("jk"), ComboAction::Keys("x".into()), 100)
        .unwrap();
    let b = reg
        .register(
            ModeSet::NORMAL | ModeSet::VISUAL,
            &keys("gw"),
            ComboAction::Keys("y".into()),
            100,
        )
        .unwrap();

    let namespaces: Vec<_> = reg.namespaces().collect();
    assert_eq!(namespaces, vec!["combo:1:i:jk", "combo:2:n,x:gw"]);

    assert!(reg.remove(a));
    assert!(!reg.remove(a));
    assert!(reg.namespace(a).is_none());
    assert!(reg.namespace(b).is_some());

    // A removed combo never fires again.
    assert!(typed(&mut reg, 'j', 0).is_empty());
    assert!(typed(&mut reg, 'k', 10).is_empty());
}

#[test]
fn empty_registration_is_rejected() {
    let mut reg = ComboRegistry::new();
    assert!(reg
        .register(ModeSet::INSERT, &[], ComboAction::Keys("x".into()), 100)
        .is_err());
    assert!(reg
        .register(ModeSet::empty(), &keys("jk"), ComboAction::Keys("x".into()), 100)
        .is_err());
}
