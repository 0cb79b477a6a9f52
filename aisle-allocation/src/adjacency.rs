use aisle_core::{Seat, SeatId, SeatTypeId};
use std::collections::HashSet;
use tracing::trace;
use crate::error::{AllocationError, Stage};
use crate::models::{SeatPool, SegregatedGroup};

/// Look for seats to keep a purchase group together.
///
/// Returns either no seats or exactly one seat per adult and child, ordered by row
/// then column, for the executor to hand out positionally.
///
/// A seat is a candidate when:
/// - its type is one the adults are entitled to and, when the group has children, one
///   the children are entitled to as well;
/// - the pool entries starting at it (as many as the group needs) have columns in
///   non-decreasing order; rows are not compared;
/// - no adult of the group already holds it.
///
/// The first run of candidates sharing a row that is long enough wins. Without one,
/// the window of candidates spanning the fewest rows is used, earliest on ties.
pub fn find_adjacent_seats(pool: &SeatPool, group: &SegregatedGroup<'_>) -> Result<Vec<Seat>, AllocationError> {
    let required = group.required_seats();
    if required == 0 {
        return Ok(Vec::new());
    }

    let adult_types: HashSet<SeatTypeId> = group.adults.iter().map(|d| d.entitlement()).collect();
    let child_types: Option<HashSet<SeatTypeId>> = group
        .has_children()
        .then(|| group.children.iter().map(|d| d.entitlement()).collect());
    let held: HashSet<SeatId> = group.adults.iter().filter_map(|d| d.boarding_pass.seat_id).collect();

    let seats = pool.as_slice();
    let mut candidates: Vec<&Seat> = seats
        .iter()
        .enumerate()
        .filter(|(_, seat)| is_entitled(seat, &adult_types, child_types.as_ref()))
        .filter(|(start, _)| columns_ascend_from(seats, *start, required))
        .map(|(_, seat)| seat)
        .filter(|seat| !held.contains(&seat.seat_id))
        .collect();

    candidates.sort_by(|a, b| {
        a.seat_row
            .cmp(&b.seat_row)
            .then(a.seat_column.cmp(&b.seat_column))
    });
    trace!(required, candidates = candidates.len(), "Searching adjacent seats");

    let found = match first_row_run(&candidates, required) {
        Some(run) => run,
        None => closest_window(&candidates, required)?,
    };
    Ok(found.into_iter().cloned().collect())
}

fn is_entitled(seat: &Seat, adult_types: &HashSet<SeatTypeId>, child_types: Option<&HashSet<SeatTypeId>>) -> bool {
    adult_types.contains(&seat.seat_type_id)
        && child_types.map_or(true, |types| types.contains(&seat.seat_type_id))
}

/// Whether the `len` pool entries from `start` (fewer at the end of the pool) have
/// non-decreasing columns
fn columns_ascend_from(seats: &[Seat], start: usize, len: usize) -> bool {
    let end = seats.len().min(start.saturating_add(len));
    seats[start..end]
        .windows(2)
        .all(|pair| pair[0].seat_column <= pair[1].seat_column)
}

/// First stretch of `required` sorted seats in which every neighbour shares a row
fn first_row_run<'a>(sorted: &[&'a Seat], required: usize) -> Option<Vec<&'a Seat>> {
    let mut run = Vec::with_capacity(required);
    let mut pairs = 0;

    for (i, seat) in sorted.iter().enumerate() {
        match sorted.get(i + 1) {
            Some(next) if next.seat_row == seat.seat_row => {
                pairs += 1;
                run.push(*seat);
                if pairs == required - 1 {
                    run.push(*next);
                    return Some(run);
                }
            }
            _ => {
                pairs = 0;
                run.clear();
            }
        }
    }
    None
}

/// Window of `required` sorted seats with the smallest row span; empty if the
/// candidates cannot fill one
fn closest_window<'a>(sorted: &[&'a Seat], required: usize) -> Result<Vec<&'a Seat>, AllocationError> {
    let mut best: Option<(i32, &[&'a Seat])> = None;

    for window in sorted.windows(required) {
        let span = row_span(window)?;
        if best.map_or(true, |(best_span, _)| span < best_span) {
            best = Some((span, window));
        }
    }

    Ok(best
        .filter(|(_, window)| window.len() == required)
        .map(|(_, window)| window.to_vec())
        .unwrap_or_default())
}

fn row_span(window: &[&Seat]) -> Result<i32, AllocationError> {
    let (min, max) = window.iter().fold((i32::MAX, i32::MIN), |(min, max), seat| {
        (min.min(seat.seat_row), max.max(seat.seat_row))
    });
    max.checked_sub(min).ok_or_else(|| {
        AllocationError::processing(Stage::Search, format!("row span {}..{} overflows", min, max))
    })
}
