//! Keyword and timeframe matching used when the model is unavailable

use chrono::{DateTime, Months, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ai::types::{EmailAnalysis, EmailDigest};

/// Words that describe the cleanup rather than the mail being cleaned
const STOP_WORDS: &[&str] = &[
    "delete", "remove", "archive", "clear", "clean", "old", "emails", "from", "the", "all", "my",
];

static MONTHS_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*months?").ok());
static YEARS_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*years?").ok());

/// An age threshold such as "6 months"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Months(u32),
    Years(u32),
}

impl Timeframe {
    /// The instant `self` before `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = match *self {
            Timeframe::Months(n) => n,
            Timeframe::Years(n) => n.checked_mul(12)?,
        };
        now.checked_sub_months(Months::new(months))
    }
}

/// Lowercased words longer than three characters, minus stop words.
pub fn extract_keywords(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// First "N months" mention, else first "N years" mention.
pub fn extract_timeframe(prompt: &str) -> Option<Timeframe> {
    fn leading_number(pattern: &Lazy<Option<Regex>>, prompt: &str) -> Option<u32> {
        let captures = Lazy::force(pattern).as_ref()?.captures(prompt)?;
        captures.get(1)?.as_str().parse().ok()
    }

    leading_number(&MONTHS_PATTERN, prompt)
        .map(Timeframe::Months)
        .or_else(|| leading_number(&YEARS_PATTERN, prompt).map(Timeframe::Years))
}

/// Action named by the prompt; `delete` when nothing matches.
pub fn detect_action(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();
    if prompt.contains("delete") {
        "delete"
    } else if prompt.contains("archive") {
        "archive"
    } else if prompt.contains("mark") && prompt.contains("read") {
        "mark_read"
    } else {
        "delete"
    }
}

/// True when the RFC 2822 `date` is strictly before `cutoff`.
/// Unparseable dates never match.
fn sent_before(date: &str, cutoff: DateTime<Utc>) -> bool {
    // Gmail often appends a zone comment, e.g. "+0000 (UTC)".
    let date = match date.find(" (") {
        Some(idx) => &date[..idx],
        None => date,
    };

    DateTime::parse_from_rfc2822(date.trim())
        .map(|sent| sent.with_timezone(&Utc) < cutoff)
        .unwrap_or(false)
}

fn mentions_any(email: &EmailDigest, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }

    let fields = [
        email.subject.to_lowercase(),
        email.from.to_lowercase(),
        email.snippet.to_lowercase(),
    ];
    keywords
        .iter()
        .any(|keyword| fields.iter().any(|field| field.contains(keyword.as_str())))
}

/// Match `emails` against `prompt` without a model.
///
/// An email matches when it mentions any keyword (or there are none) and,
/// if the prompt names a timeframe, it was sent before that cutoff.
pub fn analyze_locally(prompt: &str, emails: &[EmailDigest], now: DateTime<Utc>) -> EmailAnalysis {
    let keywords = extract_keywords(prompt);
    let cutoff = extract_timeframe(prompt).and_then(|t| t.cutoff(now));

    let matched_emails: Vec<EmailDigest> = emails
        .iter()
        .filter(|email| mentions_any(email, &keywords))
        .filter(|email| cutoff.map_or(true, |cutoff| sent_before(&email.date, cutoff)))
        .cloned()
        .collect();

    EmailAnalysis {
        total_emails: emails.len(),
        summary: format!("Found {} emails matching your criteria", matched_emails.len()),
        matched_emails,
        action: detect_action(prompt).to_string(),
        reasoning: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn email(id: &str, from: &str, subject: &str, date: &str) -> EmailDigest {
        EmailDigest {
            id: id.to_string(),
            from: from.to_string(),
            subject: subject.to_string(),
            date: date.to_string(),
            snippet: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_keywords_skip_short_and_stop_words() {
        assert_eq!(
            extract_keywords("Delete all the LinkedIn notifications from my inbox"),
            vec!["linkedin", "notifications", "inbox"]
        );
    }

    #[test]
    fn test_timeframe_prefers_months() {
        assert_eq!(extract_timeframe("older than 2 years or 6months"), Some(Timeframe::Months(6)));
        assert_eq!(extract_timeframe("anything past 1 Year"), Some(Timeframe::Years(1)));
        assert_eq!(extract_timeframe("archive newsletters"), None);
    }

    #[test]
    fn test_timeframe_cutoff() {
        let cutoff = Timeframe::Years(1).cutoff(now()).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_detect_action() {
        assert_eq!(detect_action("Archive and delete promos"), "delete");
        assert_eq!(detect_action("archive newsletters"), "archive");
        assert_eq!(detect_action("Mark GitHub mail as read"), "mark_read");
        assert_eq!(detect_action("tidy up"), "delete");
    }

    #[test]
    fn test_local_analysis_applies_keywords_and_age() {
        let emails = vec![
            email("old", "news@shop.example", "Shop newsletter", "Mon, 3 Mar 2025 09:00:00 +0000 (UTC)"),
            email("new", "news@shop.example", "Shop newsletter", "Wed, 16 Sep 2026 09:00:00 +0000"),
            email("other", "boss@work.example", "Quarterly plan", "Mon, 3 Mar 2025 09:00:00 +0000"),
            email("undated", "news@shop.example", "Shop newsletter", "yesterday"),
        ];

        let analysis = analyze_locally("Archive shop emails older than 6 months", &emails, now());

        let ids: Vec<&str> = analysis.matched_emails.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["old"]);
        assert_eq!(analysis.total_emails, 4);
        assert_eq!(analysis.action, "archive");
        assert_eq!(analysis.summary, "Found 1 emails matching your criteria");
    }

    #[test]
    fn test_local_analysis_without_keywords_matches_everything() {
        let emails = vec![email("a", "x@y.z", "Hi", ""), email("b", "x@y.z", "Yo", "")];
        let analysis = analyze_locally("delete all", &emails, now());
        assert_eq!(analysis.matched_emails.len(), 2);
    }
}
