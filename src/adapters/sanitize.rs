//! Log redaction for patient identifiers and genomic data.
//!
//! Twin runs log patient ids, profile details and DNA excerpts at debug
//! level. Everything written through [`SanitizingMakeWriter`] is scrubbed
//! line by line before it reaches the sink:
//! - UUID-shaped patient ids
//! - Medical record numbers
//! - Emails and phone numbers
//! - Nucleotide runs of 16 bases or more
//!
//! Input is capped (see `BIOTWIN_SANITIZE_MAX_BYTES`) so a runaway log line
//! cannot stall the writer.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static REDACTION_RULES: OnceLock<RedactionRules> = OnceLock::new();

/// Default per-call cap, 16 KiB.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct RedactionRules {
    any: RegexSet,
    rules: Vec<Rule>,
}

const RULES: [(&str, &str); 5] = [
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (r"\bMRN[:\s]?\d{6,10}\b", "[REDACTED-MRN]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
        "[REDACTED-PHONE]",
    ),
    // Short snippets ("ATCGATCGATCG...") stay readable.
    (r"(?i)\b[ACGTUN]{16,}\b", "[REDACTED-SEQUENCE]"),
];

fn rules() -> &'static RedactionRules {
    REDACTION_RULES.get_or_init(|| RedactionRules {
        any: RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set"),
        rules: RULES
            .iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement: *replacement,
            })
            .collect(),
    })
}

fn max_sanitize_bytes() -> usize {
    std::env::var("BIOTWIN_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact identifiers and sequences from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let rules = rules();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in rules.any.matches(prefix).into_iter() {
        let rule = &rules.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// True if `input` contains anything [`sanitize`] would redact.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    rules().any.is_match(prefix)
}

/// `MakeWriter` wrapper that redacts each formatted log line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let sanitized = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline in sight is emitted capped.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_redacts_patient_uuid() {
        let out = sanitize("Twin 550e8400-e29b-41d4-a716-446655440000 assembled");
        assert!(out.contains("[REDACTED-UUID]"));
        assert!(!out.contains("550e8400"));
    }

    #[test]
    fn test_redacts_mrn_and_email() {
        let out = sanitize("MRN:12345678 contact jane@clinic.org");
        assert!(out.contains("[REDACTED-MRN]"));
        assert!(out.contains("[REDACTED-EMAIL]"));
    }

    #[test]
    fn test_redacts_long_sequences_only() {
        let out = sanitize("dna=ATCGATCGATCGATCGATCG snippet=ATCGATCG...");
        assert!(out.contains("[REDACTED-SEQUENCE]"));
        assert!(out.contains("snippet=ATCGATCG..."));
    }

    #[test]
    fn test_plain_text_untouched() {
        let line = "T3: M -> OK";
        assert!(!contains_sensitive(line));
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_truncates_large_inputs() {
        let out = sanitize_with_limit("risk vector computed for cohort", 8);
        assert_eq!(out, "risk vec [TRUNCATED]");
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let sink = Capture::default();
        let mut writer = SanitizingWriter::new(sink.clone());
        writer.write_all(b"patient 550e8400-e29b-").unwrap();
        writer.write_all(b"41d4-a716-446655440000\nok\n").unwrap();
        writer.flush().unwrap();

        let written = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "patient [REDACTED-UUID]\nok\n");
    }
}
