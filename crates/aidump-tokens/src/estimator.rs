use std::sync::Arc;
use tiktoken_rs::CoreBPE;

/// Token estimator using tiktoken (cl100k_base encoding)
pub struct TokenEstimator {
    bpe: Arc<CoreBPE>,
}

impl TokenEstimator {
    /// Create new estimator with cl100k_base encoding (GPT-4, GPT-3.5-turbo)
    pub fn new() -> anyhow::Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| anyhow::anyhow!("Failed to load tiktoken encoding: {}", e))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    pub fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Human-readable token count, e.g. `1.2k`
pub fn format_tokens(count: usize) -> String {
    if count < 1000 {
        count.to_string()
    } else {
        format!("{:.1}k", count as f64 / 1000.0)
    }
}
