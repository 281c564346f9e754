//! The scoring engine: a deterministic mapping from raw text to a `Verdict`.
//!
//! Signals are evaluated in a fixed order and each contributes a
//! non-negative weight; the final score is the clamped sum, so reordering
//! rules would change the sequence of reasons but never the score.

use crate::extraction::{self, UrlCandidate};
use crate::ruleset::{RuleSet, Thresholds};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Three-tier risk label derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub fn from_score(score: u32, thresholds: &Thresholds) -> Self {
        if score >= thresholds.high_score {
            RiskCategory::High
        } else if score >= thresholds.medium_score {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }
}

/// Kind of input submitted for analysis.
///
/// Accepted alongside the text but not branched on yet; reserved for
/// per-kind rule variants (an email body and a job-board posting warrant
/// different phrasing lists eventually).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Email,
    Url,
    Other,
}

impl InputKind {
    /// Map a wire-level type tag onto a kind; unknown tags analyze as
    /// `Other` rather than being rejected.
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "" | "text" => InputKind::Text,
            "email" => InputKind::Email,
            "url" => InputKind::Url,
            _ => InputKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Url => "url",
            InputKind::Other => "other",
        }
    }
}

/// Diagnostic values extracted during analysis, serialized with the wire
/// field names the clients expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    pub email_count: usize,
    pub free_email_count: usize,
    pub phone_count: usize,
    pub payment_id_count: usize,
    pub payment_keyword_count: usize,
    pub scam_phrase_count: usize,
    pub action_phrase_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(rename = "suspiciousTLD")]
    pub suspicious_tld: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_entropy: Option<f64>,
    pub exclamation_count: usize,
    pub caps_ratio: f64,
}

/// The output of one analysis call. Constructed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub score: u32,
    pub category: RiskCategory,
    /// Human-readable detections, in the order the rules fired.
    pub reasons: Vec<String>,
    pub features: Features,
}

/// One detection rule's contribution to the score.
#[derive(Debug, Clone)]
pub struct Signal {
    pub weight: u32,
    pub reason: String,
}

pub struct Analyzer {
    ruleset: RuleSet,
    bare_domain: Regex,
}

impl Analyzer {
    pub fn new(ruleset: RuleSet) -> Result<Self> {
        ruleset.validate()?;
        let bare_domain = extraction::bare_domain_regex(&ruleset.bare_domain_tlds)?;
        Ok(Self {
            ruleset,
            bare_domain,
        })
    }

    pub fn ruleset(&self) -> &RuleSet {
        &self.ruleset
    }

    /// Score a piece of text. Never fails: any input string, including the
    /// empty string, yields a verdict.
    pub fn analyze(&self, kind: InputKind, text: &str) -> Verdict {
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();
        let weights = &self.ruleset.weights;
        let thresholds = &self.ruleset.thresholds;

        log::debug!("analyzing {} input ({} bytes)", kind.as_str(), trimmed.len());

        let mut score: u32 = 0;
        let mut reasons: Vec<String> = Vec::new();
        let mut features = Features::default();

        // contact channels
        let emails = extraction::extract_emails(trimmed);
        features.email_count = emails.len();
        let free_emails: Vec<&String> = emails
            .iter()
            .filter(|e| self.is_free_email(e.as_str()))
            .collect();
        features.free_email_count = free_emails.len();
        if !free_emails.is_empty() {
            let samples: Vec<&str> = free_emails.iter().take(2).map(|e| e.as_str()).collect();
            reasons.push(format!(
                "Using free email provider ({})",
                samples.join(", ")
            ));
            score += weights.free_email;
        }

        let phones = extraction::extract_phones(trimmed);
        features.phone_count = phones.len();
        if let Some(first) = phones.first() {
            reasons.push(format!("Phone/WhatsApp number detected ({first})"));
            score += weights.phone;
        }

        let payment_ids = extraction::extract_payment_ids(trimmed);
        features.payment_id_count = payment_ids.len();
        if let Some(first) = payment_ids.first() {
            reasons.push(format!("UPI/payment id detected ({first})"));
            score += weights.payment_id;
        }

        // keyword lists; payment keyword count feeds the contradiction rule
        let payment_matches = count_terms(&lowered, &self.ruleset.payment_keywords);
        features.payment_keyword_count = payment_matches;
        if payment_matches > 0 {
            reasons.push(format!(
                "Detected payment-related keywords ({payment_matches})"
            ));
            score += (weights.payment_keyword * payment_matches as u32)
                .min(weights.payment_keyword_cap);
        }

        let scam_matches = count_terms(&lowered, &self.ruleset.scam_phrases);
        features.scam_phrase_count = scam_matches;
        if scam_matches > 0 {
            reasons.push(format!("Detected suspicious phrases ({scam_matches})"));
            score += (weights.scam_phrase * scam_matches as u32).min(weights.scam_phrase_cap);
        }

        // hostname signals; a missing or unparseable candidate skips the
        // whole block rather than failing the analysis
        if let Some(candidate) = extraction::extract_url_candidate(trimmed, &self.bare_domain) {
            for signal in self.hostname_signals(&candidate, &mut features) {
                reasons.push(signal.reason);
                score += signal.weight;
            }
        }

        let action_matches = count_terms(&lowered, &self.ruleset.action_phrases);
        features.action_phrase_count = action_matches;
        if action_matches > 0 {
            reasons.push(format!("Action/payment flow phrases ({action_matches})"));
            score += (weights.action_phrase * action_matches as u32).min(weights.action_phrase_cap);
        }

        // surface features; the caps ratio reads the original text, not the
        // lowered copy
        let exclamations = trimmed.matches('!').count();
        features.exclamation_count = exclamations;
        if exclamations > thresholds.max_exclamations {
            reasons.push("Excessive exclamation marks".to_string());
            score += weights.exclamations;
        }

        let ratio = caps_ratio(text);
        features.caps_ratio = (ratio * 100.0).round() / 100.0;
        if ratio > thresholds.caps_ratio {
            reasons.push("Unusual ALL CAPS usage".to_string());
            score += weights.caps_heavy;
        }

        // contradiction: a no-fee disclaimer only matters when payment
        // keywords fired above
        if payment_matches > 0
            && self
                .ruleset
                .no_fee_phrases
                .iter()
                .any(|p| lowered.contains(p.as_str()))
        {
            reasons.push("Claims no fees but mentions payment (contradictory)".to_string());
            score += weights.contradiction;
        }

        let score = score.min(100);
        if score == 0 {
            reasons.push("No immediate red flags found".to_string());
        }

        Verdict {
            score,
            category: RiskCategory::from_score(score, thresholds),
            reasons,
            features,
        }
    }

    fn is_free_email(&self, email: &str) -> bool {
        let Some(domain) = email.split('@').nth(1) else {
            return false;
        };
        let domain = domain.to_lowercase();
        self.ruleset
            .free_email_providers
            .iter()
            .any(|provider| domain.contains(provider.as_str()))
    }

    fn hostname_signals(&self, candidate: &UrlCandidate, features: &mut Features) -> Vec<Signal> {
        let weights = &self.ruleset.weights;
        let thresholds = &self.ruleset.thresholds;
        let mut signals = Vec::new();

        features.hostname = Some(candidate.hostname.clone());

        if let Some(tld) = candidate.hostname.rsplit('.').next() {
            if self.ruleset.suspicious_tlds.iter().any(|s| s == tld) {
                features.suspicious_tld = true;
                signals.push(Signal {
                    weight: weights.suspicious_tld,
                    reason: format!("Suspicious TLD .{tld}"),
                });
            }
        }

        if candidate.hostname.matches('-').count() > thresholds.max_host_hyphens {
            signals.push(Signal {
                weight: weights.hyphenated_host,
                reason: "Hostname contains multiple hyphens".to_string(),
            });
        }

        let entropy = extraction::hostname_entropy(&candidate.hostname, thresholds.entropy_ceiling);
        features.host_entropy = Some(entropy);
        if entropy > thresholds.host_entropy {
            signals.push(Signal {
                weight: weights.high_entropy_host,
                reason: "Hostname looks randomized (high entropy)".to_string(),
            });
        }

        if candidate.plain_http {
            signals.push(Signal {
                weight: weights.plain_http,
                reason: "Using http (not https)".to_string(),
            });
        }

        signals
    }
}

/// Per-term presence count: each list term counts once if it occurs in the
/// lowered text, regardless of how many times it repeats.
fn count_terms(lowered: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|term| lowered.contains(term.as_str()))
        .count()
}

/// Uppercase share of the alphabetic characters. Zero letters means 0.0.
fn caps_ratio(text: &str) -> f64 {
    let upper = text.chars().filter(|c| c.is_ascii_uppercase()).count();
    let letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if letters == 0 {
        0.0
    } else {
        upper as f64 / letters as f64
    }
}
