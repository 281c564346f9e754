use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Keyword lists, weights, caps and thresholds driving the analyzer.
///
/// A ruleset is loaded once at startup (from YAML, or the compiled-in
/// default) and handed to `Analyzer::new`. It is never mutated afterwards,
/// so a given ruleset version always produces the same verdict for the same
/// input text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_rule_set_timestamp")]
    pub rule_set_timestamp: String,

    /// TLDs with high abuse rates; matched against the final hostname label.
    pub suspicious_tlds: Vec<String>,
    /// Consumer webmail brand fragments, matched as substrings of the
    /// domain part of extracted email addresses.
    pub free_email_providers: Vec<String>,
    pub payment_keywords: Vec<String>,
    pub scam_phrases: Vec<String>,
    /// Phrases that push the reader toward a payment/confirmation action.
    pub action_phrases: Vec<String>,
    /// "No fee" style disclaimers used by the contradiction rule.
    pub no_fee_phrases: Vec<String>,
    /// TLDs accepted when falling back to bare-domain URL extraction.
    pub bare_domain_tlds: Vec<String>,

    pub weights: Weights,
    pub thresholds: Thresholds,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_rule_set_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

/// Per-signal score contributions. All weights are additive; no rule ever
/// subtracts from the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub free_email: u32,
    pub phone: u32,
    pub payment_id: u32,
    pub payment_keyword: u32,
    pub payment_keyword_cap: u32,
    pub scam_phrase: u32,
    pub scam_phrase_cap: u32,
    pub action_phrase: u32,
    pub action_phrase_cap: u32,
    pub suspicious_tld: u32,
    pub hyphenated_host: u32,
    pub high_entropy_host: u32,
    pub plain_http: u32,
    pub exclamations: u32,
    pub caps_heavy: u32,
    pub contradiction: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Score at or above which a verdict is categorized High.
    pub high_score: u32,
    /// Score at or above which a verdict is categorized Medium.
    pub medium_score: u32,
    /// Hostname entropy above this flags a randomized-looking hostname.
    pub host_entropy: f64,
    /// Entropy estimates are clamped to this ceiling before comparison.
    pub entropy_ceiling: f64,
    /// Exclamation marks above this count flag shouty punctuation.
    pub max_exclamations: usize,
    /// Uppercase/alphabetic ratio above this flags ALL CAPS text.
    pub caps_ratio: f64,
    /// Hostname hyphens above this count flag a spoofed-looking domain.
    pub max_host_hyphens: usize,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            version: default_version(),
            rule_set_timestamp: default_rule_set_timestamp(),
            suspicious_tlds: string_vec(&[
                "xyz", "info", "top", "bit", "club", "loan", "online", "site",
            ]),
            free_email_providers: string_vec(&[
                "gmail",
                "yahoo",
                "hotmail",
                "outlook",
                "rediff",
                "yandex",
                "protonmail",
            ]),
            payment_keywords: string_vec(&[
                "processing fee",
                "registration fee",
                "security deposit",
                "pay before",
                "pay to",
                "refund",
                "transfer",
                "upi",
                "bank account",
                "account number",
                "pay via",
                "paytm",
                "gpay",
                "phonepe",
                "deposit",
                "send money",
                "send ₹",
                "send rs",
                "send inr",
                "pay now",
                "pay ₹",
                "pay rs",
                "join fee",
            ]),
            scam_phrases: string_vec(&[
                "work from home",
                "earn ₹",
                "earn rs",
                "earn per day",
                "no interview",
                "join immediately",
                "urgent hiring",
                "limited seats",
                "guaranteed",
                "100% placement",
                "get paid daily",
                "no experience required",
                "apply now",
                "contact hr",
            ]),
            action_phrases: string_vec(&[
                "send screenshot",
                "send payment",
                "send money",
                "you are selected",
                "selected for internship",
                "selected for job",
                "pay to confirm",
                "pay to process",
                "pay now",
            ]),
            no_fee_phrases: string_vec(&["no fees", "no fee", "no payment required"]),
            bare_domain_tlds: string_vec(&[
                "com", "in", "xyz", "info", "org", "net", "club", "site", "online",
            ]),
            weights: Weights::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            free_email: 30,
            phone: 18,
            payment_id: 45,
            payment_keyword: 18,
            payment_keyword_cap: 60,
            scam_phrase: 12,
            scam_phrase_cap: 36,
            action_phrase: 15,
            action_phrase_cap: 45,
            suspicious_tld: 22,
            hyphenated_host: 8,
            high_entropy_host: 14,
            plain_http: 6,
            exclamations: 4,
            caps_heavy: 6,
            contradiction: 14,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_score: 60,
            medium_score: 30,
            host_entropy: 3.5,
            entropy_ceiling: 6.0,
            max_exclamations: 2,
            caps_ratio: 0.6,
            max_host_hyphens: 1,
        }
    }
}

impl RuleSet {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read ruleset {}: {e}", path.display()))?;
        let ruleset: RuleSet = serde_yaml::from_str(&content)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    pub fn write_yaml(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("failed to write ruleset {}: {e}", path.display()))?;
        Ok(())
    }

    /// Sanity checks applied before the ruleset is accepted by the engine.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.payment_keywords.is_empty()
            || self.scam_phrases.is_empty()
            || self.action_phrases.is_empty()
        {
            anyhow::bail!("keyword lists must not be empty");
        }
        if self.bare_domain_tlds.is_empty() {
            anyhow::bail!("bare_domain_tlds must not be empty");
        }
        if self.thresholds.medium_score >= self.thresholds.high_score {
            anyhow::bail!(
                "medium_score ({}) must be below high_score ({})",
                self.thresholds.medium_score,
                self.thresholds.high_score
            );
        }
        if self.thresholds.entropy_ceiling <= self.thresholds.host_entropy {
            anyhow::bail!(
                "entropy_ceiling ({}) must exceed the host_entropy threshold ({})",
                self.thresholds.entropy_ceiling,
                self.thresholds.host_entropy
            );
        }
        for term in self
            .payment_keywords
            .iter()
            .chain(&self.scam_phrases)
            .chain(&self.action_phrases)
            .chain(&self.no_fee_phrases)
        {
            if term != &term.to_lowercase() {
                anyhow::bail!("keyword terms must be lowercase: {term:?}");
            }
        }
        Ok(())
    }
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
