use super::common::*;
use crate::matching::case::Case;
use crate::matching::domain::TargetRole;
use crate::matching::eligibility::{CandidateFilter, VolunteerClass};

#[test]
fn volunteer_class_follows_flow_flags() {
    assert_eq!(
        VolunteerClass::of(&volunteer_x().profile),
        VolunteerClass::Patient
    );
    assert_eq!(
        VolunteerClass::of(&volunteer_y().profile),
        VolunteerClass::Caregiver
    );

    let mut undecided = volunteer_z().profile;
    undecided.has_blood_cancer = None;
    undecided.caring_for_someone = None;
    assert_eq!(VolunteerClass::of(&undecided), VolunteerClass::Unclassified);
}

#[test]
fn patient_target_admits_only_patient_volunteers() {
    let pool = vec![volunteer_x(), volunteer_y(), volunteer_z(), caregiver_volunteer()];

    for case in [
        Case::Patient,
        Case::CaregiverWithCancer,
        Case::CaregiverWithoutCancer,
    ] {
        let filter = CandidateFilter::new(case, TargetRole::Patient);
        let ids: Vec<_> = filter.eligible_pool(&pool).iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![VOLUNTEER_X, VOLUNTEER_Z], "case {case:?}");
    }
}

#[test]
fn caregiver_target_requires_caregiver_participant() {
    let pool = vec![volunteer_x(), volunteer_y(), caregiver_volunteer()];

    let caregiver = CandidateFilter::new(Case::CaregiverWithoutCancer, TargetRole::Caregiver);
    let ids: Vec<_> = caregiver
        .eligible_pool(&pool)
        .iter()
        .map(|v| v.id())
        .collect();
    assert_eq!(ids, vec![VOLUNTEER_Y, CAREGIVER_VOLUNTEER]);

    let patient = CandidateFilter::new(Case::Patient, TargetRole::Caregiver);
    assert_eq!(patient.wanted_class(), None);
    assert!(patient.eligible_pool(&pool).is_empty());
}

#[test]
fn only_caregivers_targeting_patients_force_self_scope() {
    let table = [
        (Case::CaregiverWithCancer, TargetRole::Patient, true),
        (Case::CaregiverWithoutCancer, TargetRole::Patient, true),
        (Case::Patient, TargetRole::Patient, false),
        (Case::CaregiverWithoutCancer, TargetRole::Caregiver, false),
    ];

    for (case, target_role, forced) in table {
        assert_eq!(
            CandidateFilter::new(case, target_role).forces_volunteer_self_scope(),
            forced,
            "{case:?} targeting {target_role:?}"
        );
    }
}
