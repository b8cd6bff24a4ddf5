//! Scoring back-ends that need the runtime: the external model adapter and
//! the providers it can talk to. Synthetic scoring lives in the core crate.

pub mod external;
pub mod provider;

pub use external::ExternalScorer;
pub use provider::{CompletionOptions, HttpModelProvider, ModelProvider, ProviderError};
