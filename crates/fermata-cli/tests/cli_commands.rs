//! Integration tests for the `fermata` CLI binary.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

fn fermata() -> Command {
    Command::cargo_bin("fermata").unwrap()
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_reaches_requested_tick() {
    fermata()
        .args(["run", "--ticks", "120", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tick 120 reached"))
        .stdout(predicate::str::contains("Snapshot Ring"));
}

#[test]
fn run_is_deterministic_for_a_seed() {
    let first = fermata()
        .args(["run", "--ticks", "200", "--seed", "99"])
        .output()
        .unwrap();
    let second = fermata()
        .args(["run", "--ticks", "200", "--seed", "99"])
        .output()
        .unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn run_pause_holds_the_clock() {
    fermata()
        .args(["run", "--ticks", "100", "--pause-at", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tick 40 reached"))
        .stdout(predicate::str::contains("clock is paused"));
}

#[test]
fn run_bubble_slows_inner_bodies() {
    fermata()
        .args(["run", "--ticks", "60", "--bubble", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bubble#1"));
}

// ---------------------------------------------------------------------------
// rewind
// ---------------------------------------------------------------------------

#[test]
fn rewind_confirm_branches_timeline() {
    fermata()
        .args(["rewind", "--ticks", "300", "--target", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCHED"))
        .stdout(predicate::str::contains("timeline branched at tick 120"));
}

#[test]
fn rewind_cancel_returns_to_present() {
    fermata()
        .args(["rewind", "--ticks", "300", "--target", "120", "--cancel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CANCELLED"))
        .stdout(predicate::str::contains("returned to tick 301"));
}

#[test]
fn rewind_outside_window_fails() {
    fermata()
        .args(["rewind", "--ticks", "1000", "--target", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot rewind to tick 10"));
}

// ---------------------------------------------------------------------------
// features
// ---------------------------------------------------------------------------

#[test]
fn features_single_player_allows_rewind() {
    fermata()
        .args(["features", "single"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SinglePlayer"))
        .stdout(predicate::str::contains("Global rewind"));
}

#[test]
fn features_rejects_unknown_mode() {
    fermata()
        .args(["features", "banana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mode"));
}
