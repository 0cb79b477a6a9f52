use aisle_core::{BoardingPassDetail, Seat, SeatAssignment};
use tracing::trace;
use crate::models::AllocationState;

/// Hand the found seats to a purchase group, position by position.
///
/// The pass at position `i` of `group` gets `seats[i]` when it has no seat yet; the
/// seat then leaves the pool. Passes that are already seated, or that have no seat at
/// their position, are left as they are.
pub fn assign_seats(
    mut state: AllocationState,
    group: &[BoardingPassDetail],
    seats: &[Seat],
) -> (AllocationState, Vec<SeatAssignment>) {
    let mut made = Vec::new();

    for (member, seat) in group.iter().zip(seats) {
        let Some(entry) = state.manifest.get_mut(member.id()) else {
            continue;
        };
        if !entry.assign(seat.clone()) {
            continue;
        }

        state.pool.remove(seat.seat_id);
        trace!(boarding_pass_id = member.id(), seat = %seat.label(), "Seat assigned");
        made.push(SeatAssignment { boarding_pass_id: member.id(), seat_id: seat.seat_id });
    }

    (state, made)
}
