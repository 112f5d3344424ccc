/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for the runner state machine

use entity::cd_workflow_runner::RunnerStatus::{self, *};

#[test]
fn test_allowed_transitions() {
    assert!(Initiated.can_transition_to(Starting));
    assert!(Initiated.can_transition_to(Failed));
    assert!(Starting.can_transition_to(Running));
    assert!(Starting.can_transition_to(Failed));
    assert!(Running.can_transition_to(Succeeded));
    assert!(Running.can_transition_to(Failed));
    assert!(Queued.can_transition_to(Initiated));
    assert!(Queued.can_transition_to(Aborted));
}

#[test]
fn test_rejected_transitions() {
    assert!(!Initiated.can_transition_to(Running));
    assert!(!Initiated.can_transition_to(Succeeded));
    assert!(!Queued.can_transition_to(Running));
    assert!(!Running.can_transition_to(Aborted));
    assert!(!Succeeded.can_transition_to(Failed));
    assert!(!Failed.can_transition_to(Initiated));
    assert!(!Aborted.can_transition_to(Initiated));
}

#[test]
fn test_path_walks_the_diagram() {
    assert_eq!(Initiated.path_to(Running), Some(vec![Starting, Running]));
    assert_eq!(
        Initiated.path_to(Succeeded),
        Some(vec![Starting, Running, Succeeded])
    );
    assert_eq!(Initiated.path_to(Failed), Some(vec![Failed]));
    assert_eq!(Starting.path_to(Succeeded), Some(vec![Running, Succeeded]));
    assert_eq!(Running.path_to(Failed), Some(vec![Failed]));
}

#[test]
fn test_path_refuses_backwards_and_scheduler_edges() {
    assert_eq!(Running.path_to(Starting), None);
    assert_eq!(Succeeded.path_to(Failed), None);
    assert_eq!(Queued.path_to(Initiated), None);
    assert_eq!(Initiated.path_to(Aborted), None);
    assert_eq!(Running.path_to(Running), None);
}

#[test]
fn test_in_flight_set() {
    let in_flight: Vec<RunnerStatus> = RunnerStatus::in_flight();

    assert_eq!(in_flight.len(), 3);
    for status in in_flight {
        assert!(status.is_in_flight());
        assert!(!status.is_terminal());
    }

    assert!(!Queued.is_in_flight());
    assert!(!Queued.is_terminal());
    assert!(Aborted.is_terminal());
}
