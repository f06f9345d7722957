//! Group assembly.
//!
//! A group is never stored as its own entity; membership is recomputed on
//! demand from the `parent_application_id` back-reference so no multi-row
//! transaction is ever needed to keep an aggregate consistent.

use tracing::error;

use crate::common::{ApplicationId, CoreError, StayType};
use crate::domains::registration::fees::calculate_fee;
use crate::domains::registration::models::{NewRegistrationRow, Registration};
use crate::kernel::BaseRegistrationStore;

/// Upper bound on additional attendees per submission.
pub const MAX_ATTENDEES: usize = 10;

/// Primary registrant as submitted by the form layer.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegistrantSpec {
    pub full_name: String,
    pub email: String,
    pub stay_type: StayType,
}

/// One additional attendee riding on the primary's registration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AttendeeSpec {
    pub full_name: String,
    pub stay_type: StayType,
}

/// In-memory group for a not-yet-submitted registration, with per-member
/// fees already priced in.
#[derive(Debug, Clone)]
pub struct PlannedGroup {
    pub primary: NewRegistrationRow,
    pub attendees: Vec<NewRegistrationRow>,
}

impl PlannedGroup {
    pub fn total_fee(&self) -> i64 {
        self.primary.registration_fee
            + self
                .attendees
                .iter()
                .map(|a| a.registration_fee)
                .sum::<i64>()
    }

    pub fn size(&self) -> usize {
        1 + self.attendees.len()
    }
}

/// Pure construction for a new submission. Membership is fixed here; later
/// additions or removals are not supported.
pub fn build_group(
    primary: RegistrantSpec,
    attendees: Vec<AttendeeSpec>,
) -> Result<PlannedGroup, CoreError> {
    if attendees.len() > MAX_ATTENDEES {
        return Err(CoreError::validation(format!(
            "at most {} additional attendees allowed, got {}",
            MAX_ATTENDEES,
            attendees.len()
        )));
    }

    let primary_row = NewRegistrationRow {
        full_name: primary.full_name,
        email: Some(primary.email),
        stay_type: primary.stay_type,
        registration_fee: calculate_fee(primary.stay_type),
    };

    let attendee_rows = attendees
        .into_iter()
        .map(|a| NewRegistrationRow {
            full_name: a.full_name,
            email: None,
            stay_type: a.stay_type,
            registration_fee: calculate_fee(a.stay_type),
        })
        .collect();

    Ok(PlannedGroup {
        primary: primary_row,
        attendees: attendee_rows,
    })
}

/// A persisted group: the primary plus every row referencing it.
#[derive(Debug, Clone)]
pub struct Group {
    pub primary: Registration,
    pub dependents: Vec<Registration>,
}

impl Group {
    pub fn members(&self) -> impl Iterator<Item = &Registration> {
        std::iter::once(&self.primary).chain(self.dependents.iter())
    }

    pub fn member_ids(&self) -> Vec<ApplicationId> {
        self.members().map(|r| r.application_id.clone()).collect()
    }

    pub fn total_fee(&self) -> i64 {
        self.members().map(|r| r.registration_fee).sum()
    }
}

/// Resolve the full group from any member's id.
///
/// Symmetric: entering through the primary or through any dependent yields
/// the same member set. A dependent whose primary row is missing is a
/// data-integrity violation, reported as `NotFound` and never auto-repaired.
pub async fn discover_group(
    store: &dyn BaseRegistrationStore,
    application_id: &ApplicationId,
) -> Result<Group, CoreError> {
    let entry = store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))?;

    let primary = match &entry.parent_application_id {
        None => entry,
        Some(parent_id) => match store.select_by_application_id(parent_id).await? {
            Some(primary) => primary,
            None => {
                error!(
                    "Data integrity violation: dependent {} references missing primary {}",
                    application_id, parent_id
                );
                return Err(CoreError::not_found(format!(
                    "primary {} referenced by {}",
                    parent_id, application_id
                )));
            }
        },
    };

    let dependents = store.select_by_parent(&primary.application_id).await?;

    Ok(Group {
        primary,
        dependents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MemoryRegistrationStore;

    fn registrant() -> RegistrantSpec {
        RegistrantSpec {
            full_name: "Asha Varma".to_string(),
            email: "asha@example.org".to_string(),
            stay_type: StayType::OnCampus,
        }
    }

    fn attendee(name: &str) -> AttendeeSpec {
        AttendeeSpec {
            full_name: name.to_string(),
            stay_type: StayType::Outside,
        }
    }

    #[test]
    fn build_group_prices_every_member() {
        let group = build_group(registrant(), vec![attendee("Ravi"), attendee("Mira")]).unwrap();
        assert_eq!(group.size(), 3);
        assert_eq!(group.primary.registration_fee, 15_000);
        assert!(group.attendees.iter().all(|a| a.registration_fee == 7_500));
        assert_eq!(group.total_fee(), 30_000);
    }

    #[test]
    fn build_group_rejects_oversized_groups() {
        let attendees = (0..MAX_ATTENDEES + 1)
            .map(|i| attendee(&format!("Guest {}", i)))
            .collect();
        let err = build_group(registrant(), attendees).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn build_group_accepts_the_bound_exactly() {
        let attendees = (0..MAX_ATTENDEES)
            .map(|i| attendee(&format!("Guest {}", i)))
            .collect();
        assert!(build_group(registrant(), attendees).is_ok());
    }

    #[tokio::test]
    async fn discovery_is_symmetric_across_members() {
        let store = MemoryRegistrationStore::new();
        let planned = build_group(registrant(), vec![attendee("Ravi"), attendee("Mira")]).unwrap();
        let created = store
            .create_group_rows(planned.primary, planned.attendees)
            .await
            .unwrap();

        let via_primary = discover_group(&store, &created.application_id).await.unwrap();
        let via_dependent = discover_group(&store, &created.attendee_application_ids[1])
            .await
            .unwrap();

        let mut a = via_primary.member_ids();
        let mut b = via_dependent.member_ids();
        a.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        b.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(
            via_dependent.primary.application_id,
            created.application_id
        );
    }

    #[tokio::test]
    async fn dangling_parent_is_reported_not_repaired() {
        let store = MemoryRegistrationStore::new();
        let planned = build_group(registrant(), vec![attendee("Ravi")]).unwrap();
        let created = store
            .create_group_rows(planned.primary, planned.attendees)
            .await
            .unwrap();

        // Simulate the integrity violation: primary row deleted out of band.
        store.remove_row(&created.application_id);

        let err = discover_group(&store, &created.attendee_application_ids[0])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_entry_row_is_not_found() {
        let store = MemoryRegistrationStore::new();
        let err = discover_group(&store, &ApplicationId::from("AM26-NOPE01"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
