use aisle_core::{BoardingPassDetail, Passenger, PassengerId};
use std::collections::HashMap;
use tracing::debug;
use crate::error::{AllocationError, Stage};
use crate::models::SegregatedGroup;

/// Age from which a passenger is seated as an adult
pub const ADULT_AGE: i32 = 18;

/// Split a purchase group into adults and children, keeping the group's order.
///
/// Ages come from the flight's passenger list. A pass whose passenger is missing
/// from it is left out of both halves.
pub fn segregate_by_age<'a>(
    group: &'a [BoardingPassDetail],
    passengers: &HashMap<PassengerId, &Passenger>,
) -> Result<SegregatedGroup<'a>, AllocationError> {
    let mut segregated = SegregatedGroup::default();

    for detail in group {
        let passenger_id = detail.boarding_pass.passenger_id;
        let Some(passenger) = passengers.get(&passenger_id) else {
            debug!(boarding_pass_id = detail.id(), passenger_id, "Passenger not on flight list, skipping");
            continue;
        };

        if passenger.age < 0 {
            return Err(AllocationError::processing(
                Stage::Segregation,
                format!("passenger {} has negative age {}", passenger_id, passenger.age),
            ));
        }

        if passenger.age >= ADULT_AGE {
            segregated.adults.push(detail);
        } else {
            segregated.children.push(detail);
        }
    }

    Ok(segregated)
}
