//! Verdict Train
//!
//! Offline fitting of the spam and churn models served by `verdict-server`.
//! Artifacts land under `<artifacts>/spam/` and `<artifacts>/churn/`, the
//! layout the default registry configuration expects.

pub mod churn;
pub mod cli;
pub mod spam;
pub mod split;

pub use churn::{train_churn, ChurnReport, ChurnTrainOptions};
pub use cli::{Cli, Commands, SpamModelKind};
pub use spam::{prepare_corpus, train_spam, SpamCorpus, SpamTrainOptions};
