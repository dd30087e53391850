// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use prov_core::test_support::strategies::{arb_event, arb_events};
use proptest::prelude::*;

proptest! {
    #[test]
    fn applying_twice_equals_once(prefix in arb_events(40), event in arb_event()) {
        let mut once = fold(&prefix);
        once.apply_event(&event);
        let mut twice = once.clone();
        twice.apply_event(&event);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn repositories_and_phase_never_regress(events in arb_events(60)) {
        let mut state = ArtifactGitState::default();
        for event in &events {
            let before = state.clone();
            state.apply_event(event);
            prop_assert!(before.repositories.iter().all(|r| state.repositories.contains(r)));
            prop_assert!(state.phase() >= before.phase());
        }
    }

    #[test]
    fn processed_details_never_change(events in arb_events(60)) {
        let mut state = ArtifactGitState::default();
        let mut settled: BTreeMap<String, CommitStatus> = BTreeMap::new();
        for event in &events {
            state.apply_event(event);
            for (version, status) in &state.versions {
                if status.is_processed() {
                    let first = settled.entry(version.clone()).or_insert_with(|| status.clone());
                    prop_assert_eq!(&*first, status);
                }
            }
        }
    }

    #[test]
    fn unresolved_work_is_pending_only_capped_and_descending(
        events in arb_events(60),
        cap in 0usize..8,
    ) {
        let state = fold(&events);
        let work = state.unresolved_work(cap);
        prop_assert!(work.commits.len() <= cap);
        for commit in &work.commits {
            let status = state.status(&commit.version);
            prop_assert_eq!(status.and_then(CommitStatus::pending_sha), Some(&commit.sha));
        }
        for pair in work.commits.windows(2) {
            prop_assert!(
                prov_core::MavenVersion::new(pair[0].version.as_str())
                    >= prov_core::MavenVersion::new(pair[1].version.as_str())
            );
        }
        if state.repositories.is_empty() {
            prop_assert!(work.is_empty());
        }
    }
}

proptest! {
    #[test]
    fn changes_predicts_apply(prefix in arb_events(40), event in arb_event()) {
        let state = fold(&prefix);
        let mut applied = state.clone();
        applied.apply_event(&event);
        prop_assert_eq!(state.changes(&event), applied != state);
    }
}
