//! Randomized checks of the seating guarantees over whole manifests.

use aisle_core::{Dataset, PurchaseId, SeatId, SeatTypeId};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use crate::adjacency::find_adjacent_seats;
use crate::assignment::assign_seats;
use crate::grouping::group_by_purchase;
use crate::models::{AllocationState, FlightSnapshot, Manifest, SeatPool};
use crate::orchestrator::allocate_snapshot;
use crate::segregation::segregate_by_age;
use crate::testkit::FlightBuilder;

fn manifest() -> impl Strategy<Value = Dataset> {
    let seats = prop::collection::vec((1i32..8, 0u8..5, 1i64..=3), 0..24);
    let passes = prop::collection::vec((1i64..5, 0i32..70, 1i64..=3), 0..12);

    (seats, passes).prop_map(|(seats, passes)| {
        let builder = seats
            .into_iter()
            .enumerate()
            .fold(FlightBuilder::new(), |b, (i, (row, column, seat_type))| {
                b.seat(i as SeatId + 1, row, (b'A' + column) as char, seat_type)
            });
        passes
            .into_iter()
            .enumerate()
            .fold(builder, |b, (i, (purchase, age, seat_type))| b.pass(i as i64 + 1, purchase, age, seat_type))
            .dataset()
    })
}

fn snapshot(dataset: &Dataset) -> FlightSnapshot {
    FlightSnapshot {
        flight: dataset.flights[0].clone(),
        boarding_passes: dataset.boarding_pass_details(1).unwrap(),
        passengers: dataset.passengers.clone(),
        available_seats: dataset.available_seats(1, 1),
    }
}

proptest! {
    #[test]
    fn no_seat_is_handed_out_twice(dataset in manifest()) {
        let before = snapshot(&dataset);
        let pool: HashSet<SeatId> = before.available_seats.iter().map(|s| s.seat_id).collect();
        let result = allocate_snapshot(before).unwrap();

        let mut assigned = HashSet::new();
        for assignment in &result.assignments {
            prop_assert!(assigned.insert(assignment.seat_id));
            prop_assert!(pool.contains(&assignment.seat_id));
        }

        // Every pool seat ends up either assigned or still available
        let left: HashSet<SeatId> = result.available_seats.iter().map(|s| s.seat_id).collect();
        prop_assert!(left.is_disjoint(&assigned));
        prop_assert_eq!(left.len() + assigned.len(), pool.len());
    }

    #[test]
    fn pool_shrinks_by_each_groups_assignments(dataset in manifest()) {
        let snapshot = snapshot(&dataset);
        let groups = group_by_purchase(1, &snapshot.boarding_passes).unwrap();
        let passengers: HashMap<_, _> = snapshot.passengers.iter().map(|p| (p.passenger_id, p)).collect();

        let mut state = AllocationState {
            manifest: Manifest::new(snapshot.boarding_passes.clone()).unwrap(),
            pool: SeatPool::new(snapshot.available_seats.clone()),
        };
        for group in &groups {
            let before: HashSet<SeatId> = state.pool.as_slice().iter().map(|s| s.seat_id).collect();

            let segregated = segregate_by_age(&group.boarding_passes, &passengers).unwrap();
            let seats = find_adjacent_seats(&state.pool, &segregated).unwrap();
            let (next, made) = assign_seats(state, &group.boarding_passes, &seats);
            state = next;

            let after: HashSet<SeatId> = state.pool.as_slice().iter().map(|s| s.seat_id).collect();
            prop_assert!(after.is_subset(&before));
            prop_assert_eq!(before.len() - after.len(), made.len());
            for assignment in &made {
                prop_assert!(before.contains(&assignment.seat_id));
                prop_assert!(!after.contains(&assignment.seat_id));
            }
        }
    }

    #[test]
    fn groups_are_seated_whole_or_not_at_all(dataset in manifest()) {
        let result = allocate_snapshot(snapshot(&dataset)).unwrap();

        let mut sizes: HashMap<PurchaseId, usize> = HashMap::new();
        for bp in &dataset.boarding_passes {
            *sizes.entry(bp.purchase_id).or_default() += 1;
        }

        let purchase_of: HashMap<_, _> = dataset
            .boarding_passes
            .iter()
            .map(|bp| (bp.boarding_pass_id, bp.purchase_id))
            .collect();
        let mut seated: HashMap<PurchaseId, usize> = HashMap::new();
        for assignment in &result.assignments {
            *seated.entry(purchase_of[&assignment.boarding_pass_id]).or_default() += 1;
        }

        for (purchase_id, count) in seated {
            prop_assert_eq!(count, sizes[&purchase_id]);
        }
    }

    #[test]
    fn seats_match_a_group_entitlement(dataset in manifest()) {
        let result = allocate_snapshot(snapshot(&dataset)).unwrap();

        let seat_type: HashMap<SeatId, SeatTypeId> = dataset.seats.iter().map(|s| (s.seat_id, s.seat_type_id)).collect();
        for group in &result.grouped_boarding_passes {
            let owed: HashSet<SeatTypeId> = group.boarding_passes.iter().map(|d| d.entitlement()).collect();
            for detail in &group.boarding_passes {
                if let Some(seat_id) = detail.boarding_pass.seat_id {
                    prop_assert!(owed.contains(&seat_type[&seat_id]));
                }
            }
        }
    }

    #[test]
    fn rerun_leaves_earlier_seats_alone(dataset in manifest()) {
        let first = allocate_snapshot(snapshot(&dataset)).unwrap();

        let mut stored = dataset.clone();
        stored.apply_assignments(1, &first.assignments).unwrap();
        let second = allocate_snapshot(snapshot(&stored)).unwrap();

        let first_passes: HashSet<_> = first.assignments.iter().map(|a| a.boarding_pass_id).collect();
        let first_seats: HashSet<_> = first.assignments.iter().map(|a| a.seat_id).collect();
        for assignment in &second.assignments {
            prop_assert!(!first_passes.contains(&assignment.boarding_pass_id));
            prop_assert!(!first_seats.contains(&assignment.seat_id));
        }
        for detail in &second.boarding_passes {
            if first_passes.contains(&detail.id()) {
                let kept = first.boarding_passes.iter().find(|d| d.id() == detail.id()).unwrap();
                prop_assert_eq!(detail.boarding_pass.seat_id, kept.boarding_pass.seat_id);
            }
        }
    }
}
