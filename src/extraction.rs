//! Entity extraction over raw text.
//!
//! Each extractor is a pure function returning every match it finds; none of
//! them validate real-world existence of what they extract. Scoring happens
//! in the analyzer, not here.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"[\w.+-]+@([\w-]+\.)+[\w-]{2,}").unwrap();
    // Indian mobile numbering: optional +91/91, then a 10-digit number
    // starting 6-9, or a hyphenated 3-3-4 grouping.
    static ref PHONE_RE: Regex =
        Regex::new(r"(?:\+91|91)?[\s-]?(?:[6-9]\d{9}|\d{3}-\d{3}-\d{4})").unwrap();
    // Payment-app handles like name@okaxis. Looser than the email pattern on
    // purpose: the part after @ is a short bare word, not a dotted domain.
    static ref PAYMENT_ID_RE: Regex = Regex::new(r"\b[A-Za-z0-9._-]{2,}@[A-Za-z]{2,}\b").unwrap();
    static ref URL_RE: Regex = Regex::new(r"(?i)https?://[^\s)]+").unwrap();
}

pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

pub fn extract_phones(text: &str) -> Vec<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

pub fn extract_payment_ids(text: &str) -> Vec<String> {
    PAYMENT_ID_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A URL (or bare domain) pulled out of the text, with its parsed hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCandidate {
    /// The raw matched substring.
    pub raw: String,
    /// Hostname as parsed by the `url` crate (lowercased).
    pub hostname: String,
    /// The match explicitly carried an `http://` scheme.
    pub plain_http: bool,
}

/// Build the bare-domain fallback pattern from a ruleset's TLD allow-list.
pub fn bare_domain_regex(tlds: &[String]) -> anyhow::Result<Regex> {
    let alternation = tlds
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&format!(r"(?i)\b[\w.-]+\.({alternation})\b"))?)
}

/// Find the first URL-looking candidate in the text.
///
/// An explicit `http(s)://` URL wins; otherwise a bare domain ending in one
/// of the allow-listed TLDs is tried. A candidate that fails to parse yields
/// `None` so the caller skips hostname signals instead of aborting.
pub fn extract_url_candidate(text: &str, bare_domain: &Regex) -> Option<UrlCandidate> {
    let raw = match URL_RE.find(text) {
        Some(m) => m.as_str().to_string(),
        None => bare_domain.find(text)?.as_str().to_string(),
    };

    let has_scheme = raw.to_ascii_lowercase().starts_with("http");
    let parseable = if has_scheme {
        raw.clone()
    } else {
        format!("https://{raw}")
    };

    match Url::parse(&parseable) {
        Ok(parsed) => parsed.host_str().map(|host| UrlCandidate {
            hostname: host.to_string(),
            plain_http: raw.to_ascii_lowercase().starts_with("http://"),
            raw,
        }),
        Err(e) => {
            log::debug!("skipping unparseable URL candidate {raw:?}: {e}");
            None
        }
    }
}

/// Shannon entropy (base 2) of the hostname's character distribution, dots
/// removed, clamped to `ceiling`. Randomly generated hostnames spread their
/// character frequencies and land noticeably higher than dictionary words.
pub fn hostname_entropy(hostname: &str, ceiling: f64) -> f64 {
    let chars: Vec<char> = hostname.chars().filter(|c| *c != '.').collect();
    if chars.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in &chars {
        *freq.entry(*c).or_insert(0) += 1;
    }

    let len = chars.len() as f64;
    let mut entropy = 0.0;
    for count in freq.values() {
        let p = *count as f64 / len;
        entropy -= p * p.log2();
    }

    entropy.min(ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_bare_domain() -> Regex {
        bare_domain_regex(&crate::ruleset::RuleSet::default().bare_domain_tlds).unwrap()
    }

    #[test]
    fn test_extract_emails() {
        let emails = extract_emails("Contact hr@gmail.com or jobs@acme-corp.co.in today");
        assert_eq!(emails, vec!["hr@gmail.com", "jobs@acme-corp.co.in"]);
        assert!(extract_emails("no contact info here").is_empty());
    }

    #[test]
    fn test_extract_phones() {
        assert_eq!(extract_phones("call +91 9876543210"), vec!["+91 9876543210"]);
        assert_eq!(extract_phones("call 9876543210 now"), vec!["9876543210"]);
        assert_eq!(extract_phones("dial 555-123-4567"), vec!["555-123-4567"]);
        assert!(extract_phones("room 1234").is_empty());
    }

    #[test]
    fn test_extract_payment_ids() {
        let ids = extract_payment_ids("send to upi@ybl before friday");
        assert_eq!(ids, vec!["upi@ybl"]);
        // email-shaped strings also match up to the first dot
        let ids = extract_payment_ids("hr@gmail.com");
        assert_eq!(ids, vec!["hr@gmail"]);
        assert!(extract_payment_ids("a@b").is_empty());
    }

    #[test]
    fn test_extract_url_explicit_scheme_wins() {
        let re = default_bare_domain();
        let candidate =
            extract_url_candidate("see jobs.example.com and http://apply-here.xyz/form", &re)
                .unwrap();
        assert_eq!(candidate.hostname, "apply-here.xyz");
        assert!(candidate.plain_http);
    }

    #[test]
    fn test_extract_url_bare_domain_fallback() {
        let re = default_bare_domain();
        let candidate = extract_url_candidate("visit job-portal.online for details", &re).unwrap();
        assert_eq!(candidate.hostname, "job-portal.online");
        assert!(!candidate.plain_http);

        // TLD not in the allow-list
        assert!(extract_url_candidate("visit portal.dev for details", &re).is_none());
        assert!(extract_url_candidate("no urls here", &re).is_none());
    }

    #[test]
    fn test_extract_url_parse_failure_is_silent() {
        let re = default_bare_domain();
        // explicit scheme but no parseable host
        assert!(extract_url_candidate("click http://[broken", &re).is_none());
    }

    #[test]
    fn test_hostname_entropy() {
        assert_eq!(hostname_entropy("", 6.0), 0.0);
        // single repeated character has zero entropy
        assert_eq!(hostname_entropy("aaaa", 6.0), 0.0);
        // uniform distribution over 4 characters = 2 bits
        let ent = hostname_entropy("abcd", 6.0);
        assert!((ent - 2.0).abs() < 1e-9);
        // dots are excluded from the distribution
        assert_eq!(hostname_entropy("a.a.a.a", 6.0), 0.0);
        // clamped to the ceiling
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_eq!(hostname_entropy(long, 4.0), 4.0);
    }

    #[test]
    fn test_entropy_separates_dictionary_from_random() {
        let dictionary = hostname_entropy("jobs.careers.com", 6.0);
        let random = hostname_entropy("xk7qz2vw9j4.xyz", 6.0);
        assert!(random > dictionary);
    }
}
