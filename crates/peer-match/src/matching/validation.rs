use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{PreferenceKind, Scope};

pub const MAX_PREFERENCES: usize = 5;
pub const MAX_RANK: u8 = 5;

/// Preference as submitted by the editor, before any typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPreference {
    pub kind: String,
    pub item_id: Value,
    pub scope: String,
    pub rank: i64,
}

/// Typed, validated preference ready for the pending-approval hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub kind: PreferenceKind,
    pub item_id: i64,
    pub scope: Scope,
    pub rank: u8,
}

/// A submission that passed every structural rule, ordered by rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedPreferences {
    pub items: Vec<PreferenceEntry>,
}

/// Structural violations. The whole batch is rejected on the first one found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceValidationError {
    #[error("at most {max} preferences may be ranked, found {found}")]
    TooManyPreferences { max: usize, found: usize },
    #[error("preference {index} has unknown kind '{kind}'")]
    UnknownKind { index: usize, kind: String },
    #[error("preference {index} has unknown scope '{scope}'")]
    UnknownScope { index: usize, scope: String },
    #[error("preference {index} has rank {rank}, expected 1 to {max}")]
    RankOutOfRange { index: usize, rank: i64, max: u8 },
    #[error("rank {rank} is assigned more than once")]
    DuplicateRank { rank: u8 },
    #[error("preference {index} has a non-integer item id: {value}")]
    InvalidItemId { index: usize, value: String },
    #[error(
        "{} {item_id} with scope {} is ranked more than once",
        .kind.as_str(),
        .scope.as_str()
    )]
    DuplicateItem {
        kind: PreferenceKind,
        item_id: i64,
        scope: Scope,
    },
}

/// Enforces the structural rules of a preference list. Never persists anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceValidator;

impl PreferenceValidator {
    pub fn new() -> Self {
        Self
    }

    /// Rules run in a fixed order across the whole batch; the first failing rule wins.
    pub fn validate(
        &self,
        items: &[RawPreference],
    ) -> Result<ValidatedPreferences, PreferenceValidationError> {
        if items.len() > MAX_PREFERENCES {
            return Err(PreferenceValidationError::TooManyPreferences {
                max: MAX_PREFERENCES,
                found: items.len(),
            });
        }

        let kinds = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                PreferenceKind::parse(&item.kind).ok_or_else(|| {
                    PreferenceValidationError::UnknownKind {
                        index,
                        kind: item.kind.clone(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scopes = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Scope::parse(&item.scope).ok_or_else(|| PreferenceValidationError::UnknownScope {
                    index,
                    scope: item.scope.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ranks = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                u8::try_from(item.rank)
                    .ok()
                    .filter(|rank| (1..=MAX_RANK).contains(rank))
                    .ok_or(PreferenceValidationError::RankOutOfRange {
                        index,
                        rank: item.rank,
                        max: MAX_RANK,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen_ranks = HashSet::new();
        for rank in &ranks {
            if !seen_ranks.insert(*rank) {
                return Err(PreferenceValidationError::DuplicateRank { rank: *rank });
            }
        }

        let item_ids = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                parse_item_id(&item.item_id).ok_or_else(|| {
                    PreferenceValidationError::InvalidItemId {
                        index,
                        value: item.item_id.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen_items = HashSet::new();
        let mut entries = Vec::with_capacity(items.len());
        for (((kind, item_id), scope), rank) in kinds
            .into_iter()
            .zip(item_ids)
            .zip(scopes)
            .zip(ranks)
        {
            if !seen_items.insert((kind, item_id, scope)) {
                return Err(PreferenceValidationError::DuplicateItem {
                    kind,
                    item_id,
                    scope,
                });
            }
            entries.push(PreferenceEntry {
                kind,
                item_id,
                scope,
                rank,
            });
        }

        entries.sort_by_key(|entry| entry.rank);
        Ok(ValidatedPreferences { items: entries })
    }
}

/// Only JSON integers qualify, so digits inside a string are rejected.
fn parse_item_id(value: &Value) -> Option<i64> {
    value.as_i64()
}
