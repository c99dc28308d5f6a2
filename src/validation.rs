//! Field constraint checks for incoming forms
//!
//! Checks collect into [`Violations`] so a single response can report every
//! failing field at once

use serde::Serialize;
use url::Url;

/// Maximum length of a note/bookmark title, in characters
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum length of a bookmark description, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Maximum length of a username, in characters
pub const USERNAME_MAX_CHARS: usize = 50;

/// Minimum length of a password, in characters
pub const PASSWORD_MIN_CHARS: usize = 8;

/// A single violated constraint, pointing at the offending field
#[derive(Debug, Serialize)]
pub struct FieldError {
    /// Name of the field, as it appears in the request body
    pub field: String,

    /// Human readable description of the violation
    pub message: String,
}

/// Collector for all violations of a single request body
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Check a (trimmed) title: required, bounded length
pub fn check_title(violations: &mut Violations, title: &str) {
    if title.is_empty() {
        violations.add("title", "Title is required");
    } else if title.chars().count() > TITLE_MAX_CHARS {
        violations.add("title", "Title cannot be more than 200 characters");
    }
}

/// Check note content: required
pub fn check_content(violations: &mut Violations, content: &str) {
    if content.is_empty() {
        violations.add("content", "Content is required");
    }
}

/// Check a bookmark URL: required, parseable, http(s) only
///
/// Returns the parsed URL when it passes
pub fn check_url(violations: &mut Violations, url: &str) -> Option<Url> {
    if url.is_empty() {
        violations.add("url", "URL is required");
        return None;
    }

    match Url::parse(url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        _ => {
            violations.add("url", "Please enter a valid URL");
            None
        }
    }
}

/// Check a (trimmed) bookmark description: bounded length
pub fn check_description(violations: &mut Violations, description: &str) {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        violations.add(
            "description",
            "Description cannot be more than 500 characters",
        );
    }
}

/// Check a (trimmed) username: required, bounded length
pub fn check_username(violations: &mut Violations, username: &str) {
    if username.is_empty() {
        violations.add("username", "Username is required");
    } else if username.chars().count() > USERNAME_MAX_CHARS {
        violations.add("username", "Username cannot be more than 50 characters");
    }
}

/// Check a password: minimum length
pub fn check_password(violations: &mut Violations, password: &str) {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        violations.add("password", "Password must be at least 8 characters");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_title() {
        let mut violations = Violations::new();
        check_title(&mut violations, "Groceries");
        assert!(violations.is_empty());

        let mut violations = Violations::new();
        check_title(&mut violations, "");
        let errors = violations.into_errors();
        assert_eq!(1, errors.len());
        assert_eq!("title", errors[0].field);
        assert_eq!("Title is required", errors[0].message);

        let mut violations = Violations::new();
        check_title(&mut violations, &"a".repeat(TITLE_MAX_CHARS + 1));
        let errors = violations.into_errors();
        assert_eq!(1, errors.len());
        assert_eq!("title", errors[0].field);
    }

    #[test]
    fn test_check_title_counts_characters_not_bytes() {
        // 200 multi-byte characters are still within bounds
        let mut violations = Violations::new();
        check_title(&mut violations, &"é".repeat(TITLE_MAX_CHARS));
        assert!(violations.is_empty());
    }

    #[test]
    fn test_check_url() {
        let mut violations = Violations::new();
        assert!(check_url(&mut violations, "https://www.example.com/").is_some());
        assert!(check_url(&mut violations, "http://example.com").is_some());
        assert!(violations.is_empty());

        let mut violations = Violations::new();
        assert!(check_url(&mut violations, "ftp://example.com").is_none());
        assert!(check_url(&mut violations, "not a url").is_none());
        assert!(check_url(&mut violations, "").is_none());
        assert_eq!(3, violations.into_errors().len());
    }

    #[test]
    fn test_collects_multiple_violations() {
        let mut violations = Violations::new();
        check_title(&mut violations, "");
        check_content(&mut violations, "");

        let errors = violations.into_errors();
        assert_eq!(2, errors.len());
        assert_eq!("title", errors[0].field);
        assert_eq!("content", errors[1].field);
    }
}
