//! Condition templating with placeholder substitution

use esperf_core::{RunContext, Sampler, SamplerError, SearchRequest, SubstitutionSet};
use rand::seq::SliceRandom;
use rand::RngCore;
use std::sync::Arc;

/// Marker that starts a placeholder token in a condition body
pub const PLACEHOLDER_PREFIX: char = '$';

/// Builds request bodies from the run's conditions
///
/// Each call picks one condition uniformly at random, serializes its body to
/// JSON text and replaces every `$key` token with a single value drawn from
/// that key's candidates.
pub struct TemplateSampler {
    context: Arc<RunContext>,
    /// Substitution keys, longest first
    keys: Vec<String>,
}

impl TemplateSampler {
    /// Create a sampler over the given run context
    pub fn new(context: Arc<RunContext>) -> Self {
        let keys = substitution_order(&context.substitutions);
        tracing::debug!(
            conditions = context.conditions.len(),
            keys = keys.len(),
            "Template sampler ready"
        );
        Self { context, keys }
    }
}

impl Sampler for TemplateSampler {
    fn name(&self) -> &str {
        "template"
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Result<SearchRequest, SamplerError> {
        let condition = self
            .context
            .conditions
            .as_slice()
            .choose(rng)
            .ok_or(SamplerError::Empty)?;

        let text = serde_json::to_string(&condition.body).map_err(|source| {
            SamplerError::Serialize {
                condition_id: condition.id,
                source,
            }
        })?;

        let body = substitute_in_order(text, &self.keys, &self.context.substitutions, rng);
        Ok(SearchRequest::new(condition.id, body.into_bytes()))
    }
}

impl std::fmt::Debug for TemplateSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateSampler")
            .field("conditions", &self.context.conditions.len())
            .field("keys", &self.keys)
            .finish()
    }
}

/// Replace every `$key` token in `text` with a random candidate of `key`
///
/// One value is drawn per key that occurs, and all occurrences of that key
/// receive it. Keys that do not occur are skipped without drawing.
pub fn substitute(text: &str, substitutions: &SubstitutionSet, rng: &mut dyn RngCore) -> String {
    let keys = substitution_order(substitutions);
    substitute_in_order(text.to_owned(), &keys, substitutions, rng)
}

/// Longer keys go first so `$user_id` is not eaten by `$user`
fn substitution_order(substitutions: &SubstitutionSet) -> Vec<String> {
    let mut keys: Vec<String> = substitutions.iter().map(|(k, _)| k.to_owned()).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    keys
}

fn substitute_in_order(
    mut text: String,
    keys: &[String],
    substitutions: &SubstitutionSet,
    rng: &mut dyn RngCore,
) -> String {
    for key in keys {
        let token = format!("{PLACEHOLDER_PREFIX}{key}");
        if !text.contains(&token) {
            continue;
        }
        let Some(value) = substitutions
            .candidates(key)
            .and_then(|candidates| candidates.choose(rng))
        else {
            continue;
        };
        text = text.replace(&token, value);
    }
    text
}
