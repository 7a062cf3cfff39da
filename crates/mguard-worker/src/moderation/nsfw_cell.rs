//! Compute-once NSFW result for a single job.

use std::future::Future;

/// State of the NSFW signal within one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NsfwCell {
    #[default]
    Unevaluated,
    Evaluated(bool),
}

impl NsfwCell {
    pub fn new() -> Self {
        Self::Unevaluated
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self, NsfwCell::Evaluated(_))
    }

    /// Cached value, if any.
    pub fn get(&self) -> Option<bool> {
        match self {
            NsfwCell::Evaluated(value) => Some(*value),
            NsfwCell::Unevaluated => None,
        }
    }

    /// Return the cached value, running `eval` only the first time.
    pub async fn get_or_eval<F, Fut>(&mut self, eval: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        if let NsfwCell::Evaluated(value) = self {
            return *value;
        }
        let value = eval().await;
        *self = NsfwCell::Evaluated(value);
        value
    }
}
