// caseflow-committee/src/selection.rs
// ============================================================================
// Module: Provider Pool Selection
// Description: Deterministic, family-diverse provider selection for a
//              committee invocation.
// Purpose: Pick N providers from the configured pool, preferring one
//          provider per model family, without any wall-clock or OS-entropy
//          randomness so the orchestration body stays replay-deterministic.
// Dependencies: caseflow-core, rand
// ============================================================================

//! ## Overview
//! Provider selection must be deterministic with respect to the case id: the
//! same case, replayed or retried, always proposes the same provider pool
//! before any provider call is attempted. Randomness is seeded from a hash of
//! the case id rather than drawn from OS entropy or wall-clock jitter, per
//! the rule that random choices must seed from the case id or occur inside
//! activities rather than the orchestration body.

use caseflow_core::CaseId;
use caseflow_core::HashAlgorithm;
use caseflow_core::ProviderFamily;
use caseflow_core::ProviderId;
use caseflow_core::hash_bytes;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// One configured committee provider's static identity and weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Configured provider identifier.
    pub id: ProviderId,
    /// Model family, used to enforce diversity.
    pub family: ProviderFamily,
    /// Calibrated weight applied during weighted voting.
    pub weight: f64,
}

/// Result of selecting a provider pool for one committee invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selected providers, in call order.
    pub providers: Vec<ProviderConfig>,
    /// True when the configured pool could not satisfy `want` providers
    /// without repeating a family, and the selection fell back to
    /// non-diverse selection.
    pub diversity_downgraded: bool,
}

/// Derives a deterministic 64-bit seed from a case id so provider selection
/// never depends on wall-clock time or OS entropy.
fn seed_from_case_id(case_id: &CaseId) -> u64 {
    let digest = hash_bytes(HashAlgorithm::Sha256, case_id.as_str().as_bytes());
    let bytes = digest.value.as_bytes();
    let mut seed = [0u8; 8];
    for (index, byte) in seed.iter_mut().enumerate() {
        *byte = bytes.get(index).copied().unwrap_or(0);
    }
    u64::from_le_bytes(seed)
}

/// Selects `want` providers from `pool`, enforcing one provider per model
/// family when the pool allows it. Selection order (and, when a tie must be
/// broken, which provider wins) is derived deterministically from `case_id`.
///
/// When the pool cannot satisfy `want` providers without repeating a family,
/// the selection falls back to a simple deterministic shuffle of the whole
/// pool and reports the downgrade via [`Selection::diversity_downgraded`].
#[must_use]
pub fn select_providers(pool: &[ProviderConfig], case_id: &CaseId, want: usize) -> Selection {
    let mut rng = StdRng::seed_from_u64(seed_from_case_id(case_id));

    let mut by_family: std::collections::BTreeMap<ProviderFamily, Vec<&ProviderConfig>> =
        std::collections::BTreeMap::new();
    for provider in pool {
        by_family.entry(provider.family).or_default().push(provider);
    }

    if by_family.len() >= want {
        let mut families: Vec<ProviderFamily> = by_family.keys().copied().collect();
        families.sort_by_key(|family| family_order(*family));
        families.shuffle(&mut rng);

        let providers: Vec<ProviderConfig> = families
            .into_iter()
            .take(want)
            .filter_map(|family| {
                let mut candidates = by_family.get(&family)?.clone();
                candidates.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
                candidates.choose(&mut rng).map(|p| (*p).clone())
            })
            .collect();

        if providers.len() == want {
            return Selection {
                providers,
                diversity_downgraded: false,
            };
        }
    }

    let mut fallback: Vec<ProviderConfig> = pool.to_vec();
    fallback.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    fallback.shuffle(&mut rng);
    fallback.truncate(want);

    Selection {
        providers: fallback,
        diversity_downgraded: true,
    }
}

/// Stable ordering key for families so selection is independent of map
/// iteration order before the seeded shuffle is applied.
const fn family_order(family: ProviderFamily) -> u8 {
    match family {
        ProviderFamily::OpenAi => 0,
        ProviderFamily::Anthropic => 1,
        ProviderFamily::DeepSeek => 2,
        ProviderFamily::Google => 3,
        ProviderFamily::XAi => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: &str, family: ProviderFamily) -> ProviderConfig {
        ProviderConfig {
            id: ProviderId::new(id),
            family,
            weight: 1.0,
        }
    }

    #[test]
    fn selects_one_per_family_when_pool_allows() {
        let pool = vec![
            provider("openai-a", ProviderFamily::OpenAi),
            provider("anthropic-a", ProviderFamily::Anthropic),
            provider("deepseek-a", ProviderFamily::DeepSeek),
            provider("google-a", ProviderFamily::Google),
        ];
        let selection = select_providers(&pool, &CaseId::new("case-1"), 3);
        assert!(!selection.diversity_downgraded);
        assert_eq!(selection.providers.len(), 3);
        let mut families: Vec<_> = selection.providers.iter().map(|p| p.family).collect();
        families.sort_by_key(|f| family_order(*f));
        families.dedup();
        assert_eq!(families.len(), 3);
    }

    #[test]
    fn downgrades_when_pool_lacks_diversity() {
        let pool = vec![
            provider("openai-a", ProviderFamily::OpenAi),
            provider("openai-b", ProviderFamily::OpenAi),
        ];
        let selection = select_providers(&pool, &CaseId::new("case-2"), 3);
        assert!(selection.diversity_downgraded);
        assert_eq!(selection.providers.len(), 2);
    }

    #[test]
    fn selection_is_deterministic_for_same_case_id() {
        let pool = vec![
            provider("openai-a", ProviderFamily::OpenAi),
            provider("anthropic-a", ProviderFamily::Anthropic),
            provider("deepseek-a", ProviderFamily::DeepSeek),
            provider("google-a", ProviderFamily::Google),
            provider("xai-a", ProviderFamily::XAi),
        ];
        let case_id = CaseId::new("case-3");
        let first = select_providers(&pool, &case_id, 3);
        let second = select_providers(&pool, &case_id, 3);
        assert_eq!(first, second);
    }
}
