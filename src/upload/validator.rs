use std::sync::Arc;

use super::error::UploadError;
use super::types::SelectedFile;
use crate::utils::file_size::FileSizeUtils;

/// Caller-supplied admission rule, run after the size and type checks.
pub type CustomRule = Arc<dyn Fn(&SelectedFile) -> RuleOutcome + Send + Sync>;

/// Verdict of a custom rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Accept,
    Reject,
    RejectWith(String),
}

impl From<bool> for RuleOutcome {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Accept
        } else {
            Self::Reject
        }
    }
}

impl From<String> for RuleOutcome {
    fn from(reason: String) -> Self {
        Self::RejectWith(reason)
    }
}

/// Which files the type check lets through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AcceptSpec {
    #[default]
    Any,
    /// Extensions (`.pdf`), exact MIME types (`application/pdf`) or MIME prefixes (`image/*`).
    List(Vec<String>),
}

impl AcceptSpec {
    /// Parses an HTML-style accept string such as `image/*,.pdf`.
    pub fn parse(accept: &str) -> Self {
        let entries: Vec<String> = accept
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        if entries.is_empty() || entries.iter().any(|e| e == "*" || e == "*/*") {
            return Self::Any;
        }
        Self::List(entries)
    }

    pub fn matches(&self, file: &SelectedFile) -> bool {
        let entries = match self {
            Self::Any => return true,
            Self::List(entries) => entries,
        };

        let name = file.name.to_lowercase();
        let mime = file.mime_type.to_lowercase();

        entries.iter().any(|entry| {
            let entry = entry.to_lowercase();
            if entry.starts_with('.') {
                name.ends_with(&entry)
            } else if let Some(prefix) = entry.strip_suffix("/*") {
                mime.split('/').next() == Some(prefix)
            } else {
                mime == entry
            }
        })
    }
}

/// Limits a file must satisfy to be admitted.
#[derive(Clone, Default)]
pub struct ValidationRules {
    pub max_size: u64,
    pub accept: AcceptSpec,
    pub custom: Option<CustomRule>,
}

/// Decides whether `file` may enter the store. The first failing check wins:
/// size, then type, then the custom rule.
pub fn validate(file: &SelectedFile, rules: &ValidationRules) -> Result<(), UploadError> {
    if file.size > rules.max_size {
        return Err(UploadError::Validation(format!(
            "File size exceeds {} limit",
            FileSizeUtils::format_megabytes(rules.max_size)
        )));
    }

    if !rules.accept.matches(file) {
        return Err(UploadError::Validation("File type not accepted".to_string()));
    }

    if let Some(rule) = &rules.custom {
        match rule(file) {
            RuleOutcome::Accept => {}
            RuleOutcome::Reject => {
                return Err(UploadError::Validation("File validation failed".to_string()))
            }
            RuleOutcome::RejectWith(reason) => return Err(UploadError::Validation(reason)),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn file(name: &str, mime: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, mime, vec![0; size])
    }

    fn reason(result: Result<(), UploadError>) -> String {
        match result {
            Err(UploadError::Validation(reason)) => reason,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn rules(max_size: u64, accept: &str) -> ValidationRules {
        ValidationRules {
            max_size,
            accept: AcceptSpec::parse(accept),
            custom: None,
        }
    }

    #[test]
    fn oversized_file_names_the_limit() {
        let err = reason(validate(
            &file("big.bin", "application/octet-stream", 2 * MB as usize),
            &rules(MB, "*"),
        ));
        assert!(err.contains("1.0MB"), "{err}");
    }

    #[test]
    fn size_is_checked_before_type() {
        let err = reason(validate(
            &file("big.txt", "text/plain", 2 * MB as usize),
            &rules(MB, "image/*"),
        ));
        assert!(err.contains("exceeds"), "{err}");
    }

    #[test]
    fn mime_prefix_wildcard() {
        let r = rules(MB, "image/*");
        assert!(validate(&file("a.png", "image/png", 10), &r).is_ok());
        let err = reason(validate(&file("a.txt", "text/plain", 10), &r));
        assert!(err.contains("type not accepted"));
    }

    #[test]
    fn extension_and_exact_mime() {
        let r = rules(MB, ".pdf, application/zip");
        assert!(validate(&file("Report.PDF", "application/octet-stream", 10), &r).is_ok());
        assert!(validate(&file("bundle", "application/zip", 10), &r).is_ok());
        assert!(validate(&file("notes.txt", "text/plain", 10), &r).is_err());
    }

    #[test]
    fn wildcard_accepts_anything() {
        assert_eq!(AcceptSpec::parse("*"), AcceptSpec::Any);
        assert_eq!(AcceptSpec::parse(""), AcceptSpec::Any);
        assert_eq!(AcceptSpec::parse("image/*, */*"), AcceptSpec::Any);
    }

    #[test]
    fn custom_rule_outcomes() {
        let mut r = rules(MB, "*");

        r.custom = Some(Arc::new(|_| RuleOutcome::from(false)));
        assert_eq!(
            reason(validate(&file("a.txt", "text/plain", 1), &r)),
            "File validation failed"
        );

        r.custom = Some(Arc::new(|f| {
            if f.name.starts_with("tmp") {
                RuleOutcome::from(format!("{} is a temp file", f.name))
            } else {
                RuleOutcome::Accept
            }
        }));
        assert_eq!(
            reason(validate(&file("tmp1", "text/plain", 1), &r)),
            "tmp1 is a temp file"
        );
        assert!(validate(&file("real.txt", "text/plain", 1), &r).is_ok());
    }

    #[test]
    fn custom_rule_runs_last() {
        let mut r = rules(MB, "image/*");
        r.custom = Some(Arc::new(|_| RuleOutcome::RejectWith("custom".into())));
        let err = validate(&file("a.txt", "text/plain", 1), &r).unwrap_err();
        assert_eq!(err.to_string(), "File type not accepted");
    }
}
