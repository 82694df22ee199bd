/// Counts tokens in a rendered response. Injected into the invoker so callers
/// can swap in a real tokenizer.
pub trait TokenCounter: Send + Sync {
    fn count(&self, rendered: &str) -> u32;
}

/// chars/4 heuristic. Close enough for size and cost reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, rendered: &str) -> u32 {
        estimate_str_tokens(rendered)
    }
}

/// Estimate tokens for a plain string.
pub fn estimate_str_tokens(s: &str) -> u32 {
    tokens_for_len(s.len())
}

/// Saturates at `u32::MAX`.
fn tokens_for_len(bytes: usize) -> u32 {
    u32::try_from(bytes / 4).unwrap_or(u32::MAX)
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> u32 + Send + Sync,
{
    fn count(&self, rendered: &str) -> u32 {
        self(rendered)
    }
}
