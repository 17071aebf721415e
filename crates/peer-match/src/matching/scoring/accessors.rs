use chrono::{Datelike, NaiveDate};

use super::super::domain::{Attributes, Profile, QualitySlug, Scope};

/// Typed value read from one half of a profile for a quality comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AttributeValue<'a> {
    Text(&'a str),
    Flag(bool),
    Age(f64),
    Groups(&'a [String]),
}

type Accessor = for<'a> fn(&'a Attributes, NaiveDate) -> Option<AttributeValue<'a>>;

/// Supported `(slug, scope)` combinations. Anything absent is a lookup miss.
const ACCESSORS: &[(QualitySlug, Scope, Accessor)] = &[
    (QualitySlug::SameGenderIdentity, Scope::Own, gender_identity),
    (QualitySlug::SameGenderIdentity, Scope::LovedOne, gender_identity),
    (QualitySlug::SameDiagnosis, Scope::Own, diagnosis),
    (QualitySlug::SameDiagnosis, Scope::LovedOne, diagnosis),
    (QualitySlug::SameAge, Scope::Own, age_from_birth_year),
    (QualitySlug::SameAge, Scope::LovedOne, stated_age),
    (QualitySlug::SameMaritalStatus, Scope::Own, marital_status),
    (QualitySlug::SameParentalStatus, Scope::Own, parental_status),
    (QualitySlug::SameEthnicOrCulturalGroup, Scope::Own, ethnic_groups),
];

fn accessor(slug: QualitySlug, scope: Scope) -> Option<Accessor> {
    ACCESSORS
        .iter()
        .find(|(candidate, candidate_scope, _)| *candidate == slug && *candidate_scope == scope)
        .map(|(_, _, accessor)| *accessor)
}

pub(crate) fn is_supported(slug: QualitySlug, scope: Scope) -> bool {
    accessor(slug, scope).is_some()
}

/// Reads the comparison value for `slug` from the requested half of `profile`.
pub(crate) fn resolve(
    profile: &Profile,
    slug: QualitySlug,
    scope: Scope,
    reference_date: NaiveDate,
) -> Option<AttributeValue<'_>> {
    let read = accessor(slug, scope)?;
    let attributes = profile.attributes(scope)?;
    read(attributes, reference_date)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn gender_identity(attributes: &Attributes, _: NaiveDate) -> Option<AttributeValue<'_>> {
    non_blank(&attributes.gender_identity).map(AttributeValue::Text)
}

fn diagnosis(attributes: &Attributes, _: NaiveDate) -> Option<AttributeValue<'_>> {
    non_blank(&attributes.diagnosis).map(AttributeValue::Text)
}

fn marital_status(attributes: &Attributes, _: NaiveDate) -> Option<AttributeValue<'_>> {
    non_blank(&attributes.marital_status).map(AttributeValue::Text)
}

fn parental_status(attributes: &Attributes, _: NaiveDate) -> Option<AttributeValue<'_>> {
    attributes.has_kids.map(AttributeValue::Flag)
}

fn ethnic_groups(attributes: &Attributes, _: NaiveDate) -> Option<AttributeValue<'_>> {
    if attributes.ethnic_groups.is_empty() {
        None
    } else {
        Some(AttributeValue::Groups(&attributes.ethnic_groups))
    }
}

// Whole birth-year difference; birthdays within the year are ignored.
fn age_from_birth_year(attributes: &Attributes, today: NaiveDate) -> Option<AttributeValue<'_>> {
    attributes
        .date_of_birth
        .map(|born| f64::from(today.year() - born.year()))
        .map(AttributeValue::Age)
}

fn stated_age(attributes: &Attributes, _: NaiveDate) -> Option<AttributeValue<'_>> {
    non_blank(&attributes.age)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|age| age.is_finite())
        .map(AttributeValue::Age)
}
