//! Automated-vs-human email heuristic.
//!
//! Checks the sender first, then the subject:
//! - no-reply / mailer-daemon style senders → automated
//! - known transactional/ESP domains → automated
//! - verification, password-reset, security and shipping subjects → automated
//!
//! Inputs are lower-cased before matching. Anything unmatched is treated as
//! a human message.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Sender patterns, checked in order.
const SENDER_PATTERNS: &[&str] = &[
    r"^(no[\-_.]?reply|do[\-_.]?not[\-_.]?reply)([+\-_.][^@]*)?@",
    r"^(mailer[\-_]?daemon|postmaster|bounces?)([+\-_.][^@]*)?@",
    r"^(notifications?|alerts?|notify|automated|system|updates?)@",
    r"@bounces?\.[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$",
    r"@([a-z0-9\-]+\.)*(amazonses|sendgrid|mailchimp|mcsv|mandrillapp|mailgun|postmarkapp|sparkpostmail|hubspot(email)?|intercom-mail|salesforce|exacttarget|klaviyo(mail)?)\.(com|net|io)$",
    r"@accounts\.google\.com$",
];

/// Subject patterns, checked in order after the sender patterns.
const SUBJECT_PATTERNS: &[&str] = &[
    r"\b(verification|security|confirmation|login|sign[\- ]?in|one[\- ]time|access) code\b",
    r"\bverify your (email|account|identity|address)\b",
    r"\bconfirm your (email|account|subscription|address|registration)\b",
    r"\b(password reset|reset your password|forgot your password|password (has been )?changed)\b",
    r"\b(security alert|suspicious (activity|sign[\- ]?in)|new (sign[\- ]?in|login)|(sign[\- ]?in|login) attempt)\b",
    r"\b(one[\- ]time pass(word|code)|otp|2fa|two[\- ]factor|two[\- ]step)\b",
    r"\b(your (order|package|shipment|delivery)|has (shipped|been delivered)|out for delivery|delivery update|tracking (number|update))\b",
    r"\b(receipt|invoice|payment (received|confirmed|failed)|order confirmation)\b",
    r"\bunsubscribe\b",
    r"^welcome to\b",
];

static DEFAULT_CLASSIFIER: Lazy<EmailClassifier> = Lazy::new(EmailClassifier::default_patterns);

/// Classify a message as automated (`true`) or human-sent (`false`).
pub fn is_automated_email(sender: &str, subject: Option<&str>) -> bool {
    DEFAULT_CLASSIFIER.is_automated(sender, subject)
}

/// Ordered sender and subject pattern sets.
#[derive(Debug, Clone)]
pub struct EmailClassifier {
    sender_patterns: Vec<Regex>,
    subject_patterns: Vec<Regex>,
}

impl EmailClassifier {
    /// Create a classifier with the built-in pattern sets.
    pub fn default_patterns() -> Self {
        Self {
            sender_patterns: compile(SENDER_PATTERNS),
            subject_patterns: compile(SUBJECT_PATTERNS),
        }
    }

    /// Create a classifier with no patterns (classifies everything as human).
    pub fn empty() -> Self {
        Self {
            sender_patterns: Vec::new(),
            subject_patterns: Vec::new(),
        }
    }

    /// Append a sender pattern. Patterns see the lower-cased address.
    pub fn add_sender_pattern(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.sender_patterns.push(Regex::new(pattern)?);
        Ok(())
    }

    /// Append a subject pattern. Patterns see the lower-cased subject.
    pub fn add_subject_pattern(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.subject_patterns.push(Regex::new(pattern)?);
        Ok(())
    }

    pub fn is_automated(&self, sender: &str, subject: Option<&str>) -> bool {
        let sender = sender.trim().to_lowercase();
        if let Some(re) = self.sender_patterns.iter().find(|re| re.is_match(&sender)) {
            trace!(sender = %sender, pattern = %re.as_str(), "Automated sender");
            return true;
        }

        let Some(subject) = subject else {
            return false;
        };
        let subject = subject.trim().to_lowercase();
        if let Some(re) = self.subject_patterns.iter().find(|re| re.is_match(&subject)) {
            trace!(subject = %subject, pattern = %re.as_str(), "Automated subject");
            return true;
        }

        false
    }
}

impl Default for EmailClassifier {
    fn default() -> Self {
        Self::default_patterns()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid built-in pattern {p}: {e}")))
        .collect()
}
