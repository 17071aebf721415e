use crate::infra::{matching_service, parse_date, parse_user_id, DEMO_PATIENT};
use chrono::{Local, NaiveDate};
use clap::Args;
use peer_match::config::MatchingConfig;
use peer_match::error::AppError;
use peer_match::matching::{
    AdminCandidateView, PreferenceOptions, RankedVolunteer, RawPreference, Scope, TargetRole,
    UserId,
};
use serde_json::json;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seeded participant to run discovery for (1 patient, 2 caregiver, 3 caregiver with cancer).
    #[arg(long, value_parser = parse_user_id)]
    pub(crate) participant: Option<UserId>,
    /// Volunteer type to search for. Defaults to the participant's stored preference group.
    #[arg(long, value_parser = parse_target_role)]
    pub(crate) target_role: Option<TargetRole>,
    /// Number of volunteers shown in the participant view.
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Date used for age derivation (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the preference submission portion of the demo.
    #[arg(long)]
    pub(crate) skip_submission: bool,
}

pub(crate) fn parse_target_role(raw: &str) -> Result<TargetRole, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "patient" => Ok(TargetRole::Patient),
        "caregiver" => Ok(TargetRole::Caregiver),
        other => Err(format!("unknown target role '{other}' (patient|caregiver)")),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        participant,
        target_role,
        limit,
        today,
        skip_submission,
    } = args;

    let participant = participant.unwrap_or(DEMO_PATIENT);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (service, submissions) = matching_service(MatchingConfig::default(), Some(today));

    println!("Peer matching demo for participant {participant} (ages as of {today})");

    let probe = service.preference_options(participant, TargetRole::Patient)?;
    let options_role = target_role.unwrap_or(match probe.case {
        Some(case) if case.is_caregiver() => TargetRole::Caregiver,
        _ => TargetRole::Patient,
    });
    let options = if options_role == TargetRole::Patient {
        probe
    } else {
        service.preference_options(participant, options_role)?
    };
    render_options(&options);

    let ranked = service.find_matches(participant, target_role, limit)?;
    render_ranked(&ranked);

    let candidates = service.admin_matches(participant, target_role)?;
    render_admin(&candidates);

    if skip_submission {
        return Ok(());
    }

    let items = sample_submission(&options);
    if items.is_empty() {
        println!("\nNo selectable qualities; submission skipped");
        return Ok(());
    }
    let stored = service.submit_preferences(participant, options.target_role, &items)?;
    println!(
        "\nSubmitted {} preference(s) for {} volunteers -> {}",
        stored.items.len(),
        stored.target_role.as_str(),
        stored.status.label()
    );
    for entry in &stored.items {
        println!(
            "  {}. {} #{} ({})",
            entry.rank,
            entry.kind.as_str(),
            entry.item_id,
            entry.scope.as_str()
        );
    }
    println!("  Awaiting review: {}", submissions.pending().len());

    Ok(())
}

fn render_options(options: &PreferenceOptions) {
    let case = options.case.map_or("no intake profile", |case| case.label());
    println!(
        "\nPreference options ({} target, case {})",
        options.target_role.as_str(),
        case
    );
    for quality in &options.static_qualities {
        let scopes: Vec<&str> = quality
            .allowed_scopes
            .iter()
            .map(|scope| scope.as_str())
            .collect();
        if scopes.is_empty() {
            println!("  - {} (not selectable)", quality.label);
        } else {
            println!("  - {} [{}]", quality.label, scopes.join(", "));
        }
    }
    for option in &options.dynamic_options {
        println!(
            "  - {} {} [{}]",
            option.kind.as_str(),
            option.name,
            option.scope.as_str()
        );
    }
}

fn render_ranked(ranked: &[RankedVolunteer]) {
    println!("\nTop volunteers");
    if ranked.is_empty() {
        println!("  none eligible");
        return;
    }
    for (position, entry) in ranked.iter().enumerate() {
        let volunteer = &entry.volunteer;
        println!(
            "  {}. {} ({}, {}) score {:.3} | {}",
            position + 1,
            volunteer.first_name,
            volunteer.city.as_deref().unwrap_or("unknown city"),
            volunteer.province.as_deref().unwrap_or("--"),
            entry.score,
            volunteer.diagnosis.as_deref().unwrap_or("no diagnosis on file")
        );
    }
}

fn render_admin(candidates: &[AdminCandidateView]) {
    println!("\nAdmin view");
    for candidate in candidates {
        println!(
            "  - {} {} <{}> match {:.2}% | {} active match(es)",
            candidate.first_name,
            candidate.last_name,
            candidate.email,
            candidate.match_score,
            candidate.active_match_count
        );
    }
}

/// Ranks the first three selectable qualities, preferring the loved-one scope when offered.
fn sample_submission(options: &PreferenceOptions) -> Vec<RawPreference> {
    options
        .static_qualities
        .iter()
        .filter_map(|quality| {
            let scope = if quality.allowed_scopes.contains(&Scope::LovedOne) {
                Scope::LovedOne
            } else {
                *quality.allowed_scopes.first()?
            };
            Some((quality.id, scope))
        })
        .take(3)
        .zip(1..)
        .map(|((item_id, scope), rank)| RawPreference {
            kind: "quality".to_string(),
            item_id: json!(item_id),
            scope: scope.as_str().to_string(),
            rank,
        })
        .collect()
}
