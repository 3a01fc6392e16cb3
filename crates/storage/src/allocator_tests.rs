// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn workers(caps: &[u32]) -> Vec<WorkerCapacity> {
    caps.iter()
        .enumerate()
        .map(|(i, &max_vus)| WorkerCapacity { worker_id: format!("w{i}"), max_vus })
        .collect()
}

#[test]
fn even_split_gives_remainder_to_first_workers() {
    let result = allocate("run_1", "stage_1", 10, &workers(&[100, 100, 100])).unwrap();
    let ranges: Vec<_> = result.assignments.iter().map(|a| (a.vuid_range.start, a.vuid_range.end)).collect();
    assert_eq!(ranges, vec![(0, 4), (4, 7), (7, 10)]);
}

#[test]
fn union_of_ranges_covers_target_exactly() {
    let result = allocate("run_1", "stage_1", 37, &workers(&[50, 50, 50, 50])).unwrap();
    let mut covered = 0u32;
    for a in &result.assignments {
        covered += a.vuid_range.len();
    }
    assert_eq!(covered, 37);
    assert_eq!(result.assignments.last().unwrap().vuid_range.end, 37);
}

#[test]
fn ranges_are_contiguous_and_disjoint() {
    let result = allocate("run_1", "stage_1", 11, &workers(&[10, 10, 10])).unwrap();
    let mut prev_end = 0;
    for a in &result.assignments {
        assert_eq!(a.vuid_range.start, prev_end);
        prev_end = a.vuid_range.end;
    }
}

#[test]
fn insufficient_capacity_fails_with_exact_message() {
    let err = allocate("run_1", "stage_1", 1000, &workers(&[10, 10])).unwrap_err();
    assert!(err.to_string().contains("insufficient total capacity for target VUs"));
}

#[test]
fn empty_worker_list_fails() {
    let err = allocate("run_1", "stage_1", 10, &[]).unwrap_err();
    assert!(err.to_string().contains("no workers available"));
}

#[test]
fn by_worker_map_has_one_entry_per_worker() {
    let result = allocate("run_1", "stage_1", 10, &workers(&[10, 10])).unwrap();
    assert_eq!(result.by_worker.len(), 2);
    assert!(result.by_worker.contains_key("w0"));
    assert!(result.by_worker.contains_key("w1"));
}

#[test]
fn reallocate_excludes_given_workers() {
    let result = reallocate(
        "run_1",
        "stage_1",
        10,
        &workers(&[10, 10, 10]),
        &["w1".to_string()],
    )
    .unwrap();
    assert_eq!(result.by_worker.len(), 2);
    assert!(!result.by_worker.contains_key("w1"));
}

#[test]
fn reallocate_with_no_remaining_workers_fails() {
    let err = reallocate(
        "run_1",
        "stage_1",
        10,
        &workers(&[10]),
        &["w0".to_string()],
    )
    .unwrap_err();
    assert!(err.to_string().contains("no workers available"));
}

proptest::proptest! {
    #[test]
    fn partition_invariant_holds(target_vus in 0u32..500, worker_count in 1usize..10) {
        let caps: Vec<u32> = (0..worker_count).map(|_| 1000u32).collect();
        let result = allocate("run_1", "stage_1", target_vus, &workers(&caps)).unwrap();
        let mut prev_end = 0u32;
        for a in &result.assignments {
            prop_assert_eq!(a.vuid_range.start, prev_end);
            prev_end = a.vuid_range.end;
        }
        prop_assert_eq!(prev_end, target_vus);
    }
}
