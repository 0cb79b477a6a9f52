use aisle_core::{BoardingPassDetail, FlightId, PurchaseId};
use std::collections::HashMap;
use crate::error::{AllocationError, Stage};
use crate::models::PurchaseGroup;

/// Bucket a flight's boarding passes by purchase.
///
/// Groups come out in the order their purchase is first seen in the manifest, which
/// is the order they get seated in. Inside a group passes are sorted by passenger age,
/// youngest first; equal ages keep their manifest order.
pub fn group_by_purchase(
    flight_id: FlightId,
    boarding_passes: &[BoardingPassDetail],
) -> Result<Vec<PurchaseGroup>, AllocationError> {
    let mut groups: Vec<PurchaseGroup> = Vec::new();
    let mut slots: HashMap<PurchaseId, usize> = HashMap::new();

    for detail in boarding_passes {
        check_consistency(flight_id, detail)?;

        let purchase_id = detail.purchase_id();
        let slot = *slots.entry(purchase_id).or_insert_with(|| {
            groups.push(PurchaseGroup { purchase_id, boarding_passes: Vec::new() });
            groups.len() - 1
        });
        groups[slot].boarding_passes.push(detail.clone());
    }

    for group in &mut groups {
        group.boarding_passes.sort_by_key(|detail| detail.passenger.age);
    }

    Ok(groups)
}

fn check_consistency(flight_id: FlightId, detail: &BoardingPassDetail) -> Result<(), AllocationError> {
    let pass = &detail.boarding_pass;
    let fault = |what: &str| -> Result<(), AllocationError> {
        Err(AllocationError::processing(
            Stage::Grouping,
            format!("boarding pass {} {}", pass.boarding_pass_id, what),
        ))
    };

    if pass.flight_id != flight_id || detail.flight.flight_id != flight_id {
        return fault(&format!("does not belong to flight {}", flight_id));
    }
    if detail.purchase.purchase_id != pass.purchase_id {
        return fault("is joined to the wrong purchase");
    }
    if detail.passenger.passenger_id != pass.passenger_id {
        return fault("is joined to the wrong passenger");
    }
    if detail.seat_type.seat_type_id != pass.seat_type_id {
        return fault("is joined to the wrong seat type");
    }
    Ok(())
}
