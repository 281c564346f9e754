pub mod analyzer;
pub mod extraction;
pub mod ruleset;
pub mod server;
pub mod store;

pub use analyzer::{Analyzer, Features, InputKind, RiskCategory, Signal, Verdict};
pub use ruleset::RuleSet;
pub use server::AppState;
pub use store::{ReportStore, StoredReport};
