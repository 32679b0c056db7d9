//! The embedding router (§2.4, §6): synchronous, no queueing, no worker.

use relay_core::cost::{embedding_cost_usd, EMBEDDING_CREDITS};
use relay_core::Usage;

use crate::error::ProviderResult;
use crate::router::ProviderRouter;

pub struct EmbeddingResult {
    pub embeddings: Vec<Vec<f32>>,
    pub total_tokens: u64,
    pub credits_used: f64,
    pub cost_usd: f64,
}

pub async fn embed(
    router: &ProviderRouter,
    provider: &str,
    texts: &[String],
) -> ProviderResult<EmbeddingResult> {
    let (embeddings, usage) = router.embeddings(provider, texts).await?;
    let total_tokens = usage_total_tokens(usage);

    Ok(EmbeddingResult {
        embeddings,
        total_tokens,
        credits_used: EMBEDDING_CREDITS,
        cost_usd: embedding_cost_usd(provider, total_tokens),
    })
}

fn usage_total_tokens(usage: Usage) -> u64 {
    usage.prompt_tokens + usage.completion_tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tokens_sums_prompt_and_completion() {
        let usage = Usage {
            prompt_tokens: 12,
            completion_tokens: 3,
        };
        assert_eq!(usage_total_tokens(usage), 15);
    }
}
