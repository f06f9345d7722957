//! Fee model.
//!
//! Fees are in the smallest currency unit. The amount is denormalized onto
//! each row at creation time for audit purposes, but is always derivable
//! from the stay type through these functions.

use crate::common::StayType;

pub const ON_CAMPUS_FEE: i64 = 15_000;
pub const OUTSIDE_FEE: i64 = 7_500;

/// Fee for a single registrant. Total function, no errors.
pub fn calculate_fee(stay_type: StayType) -> i64 {
    match stay_type {
        StayType::OnCampus => ON_CAMPUS_FEE,
        StayType::Outside => OUTSIDE_FEE,
    }
}

/// Total fee for a primary plus attendees.
pub fn calculate_total_fee(primary: StayType, attendees: &[StayType]) -> i64 {
    calculate_fee(primary) + attendees.iter().map(|s| calculate_fee(*s)).sum::<i64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_has_exactly_two_outputs() {
        assert_eq!(calculate_fee(StayType::OnCampus), 15_000);
        assert_eq!(calculate_fee(StayType::Outside), 7_500);
    }

    #[test]
    fn total_is_sum_of_member_fees() {
        // Primary on campus plus two outside attendees
        assert_eq!(
            calculate_total_fee(StayType::OnCampus, &[StayType::Outside, StayType::Outside]),
            30_000
        );
    }

    #[test]
    fn solo_registrant_total_equals_own_fee() {
        assert_eq!(calculate_total_fee(StayType::Outside, &[]), 7_500);
    }

    #[test]
    fn total_holds_for_max_group_size() {
        let attendees = vec![StayType::OnCampus; 10];
        assert_eq!(
            calculate_total_fee(StayType::OnCampus, &attendees),
            15_000 * 11
        );
    }
}
