use std::collections::HashSet;

use super::super::domain::{Attributes, ExperienceRef, TreatmentRef};
use super::accessors::AttributeValue;

/// Match value in `[0, 1]` for a resolved quality comparison. Missing values
/// and mismatched value types never match.
pub(crate) fn quality_match(
    participant: Option<AttributeValue<'_>>,
    volunteer: Option<AttributeValue<'_>>,
) -> f64 {
    match (participant, volunteer) {
        (Some(AttributeValue::Age(participant)), Some(AttributeValue::Age(volunteer))) => {
            age_similarity(participant, volunteer)
        }
        (Some(AttributeValue::Groups(participant)), Some(AttributeValue::Groups(volunteer))) => {
            indicator(groups_intersect(participant, volunteer))
        }
        (Some(AttributeValue::Text(participant)), Some(AttributeValue::Text(volunteer))) => {
            indicator(normalize(participant) == normalize(volunteer))
        }
        (Some(AttributeValue::Flag(participant)), Some(AttributeValue::Flag(volunteer))) => {
            indicator(participant == volunteer)
        }
        _ => 0.0,
    }
}

/// Linear decay relative to the participant's own age.
pub(crate) fn age_similarity(participant_age: f64, volunteer_age: f64) -> f64 {
    if !participant_age.is_finite() || !volunteer_age.is_finite() || participant_age <= 0.0 {
        return 0.0;
    }

    let difference = (participant_age - volunteer_age).abs();
    (1.0 - difference / participant_age).clamp(0.0, 1.0)
}

pub(crate) fn groups_intersect(left: &[String], right: &[String]) -> bool {
    let left: HashSet<String> = left
        .iter()
        .map(|group| normalize(group))
        .filter(|group| !group.is_empty())
        .collect();

    right
        .iter()
        .map(|group| normalize(group))
        .any(|group| !group.is_empty() && left.contains(&group))
}

pub(crate) fn has_treatment(attributes: &Attributes, wanted: &TreatmentRef) -> bool {
    attributes
        .treatments
        .iter()
        .any(|treatment| same_item(treatment.id, &treatment.name, wanted.id, &wanted.name))
}

pub(crate) fn has_experience(attributes: &Attributes, wanted: &ExperienceRef) -> bool {
    attributes
        .experiences
        .iter()
        .any(|experience| same_item(experience.id, &experience.name, wanted.id, &wanted.name))
}

fn same_item(id: i64, name: &str, wanted_id: i64, wanted_name: &str) -> bool {
    if id == wanted_id {
        return true;
    }
    let name = normalize(name);
    !name.is_empty() && name == normalize(wanted_name)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn indicator(matched: bool) -> f64 {
    if matched {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_ages_are_fully_similar() {
        assert_eq!(age_similarity(40.0, 40.0), 1.0);
    }

    #[test]
    fn age_gap_equal_to_participant_age_clamps_to_zero() {
        assert_eq!(age_similarity(30.0, 60.0), 0.0);
        assert_eq!(age_similarity(30.0, 95.0), 0.0);
        assert_eq!(age_similarity(0.0, 10.0), 0.0);
    }

    #[test]
    fn ethnic_groups_compare_case_insensitively() {
        let participant = vec![" South Asian".to_string(), "Métis".to_string()];
        let volunteer = vec!["east asian".to_string(), "south asian ".to_string()];
        assert!(groups_intersect(&participant, &volunteer));
        assert!(groups_intersect(&volunteer, &participant));

        let disjoint = vec!["Black".to_string()];
        assert!(!groups_intersect(&participant, &disjoint));
    }

    #[test]
    fn mismatched_value_types_never_match() {
        assert_eq!(
            quality_match(Some(AttributeValue::Text("40")), Some(AttributeValue::Age(40.0))),
            0.0
        );
        assert_eq!(quality_match(None, Some(AttributeValue::Flag(true))), 0.0);
    }
}
