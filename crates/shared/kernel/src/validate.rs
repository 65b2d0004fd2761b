//! Input validation and sanitization helpers shared by the feature slices.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Accumulated per-field validation failures.
///
/// Fields keep insertion-independent (sorted) order so messages are stable
/// across runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Cow<'static, str>>,
}

impl FieldErrors {
    /// Records a failure for `field`; the first message per field wins.
    pub fn push(&mut self, field: &'static str, message: impl Into<Cow<'static, str>>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(Cow::as_ref)
    }

    /// Converts the accumulator into a `Result`, erring when any field
    /// failed.
    ///
    /// # Errors
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// True when the value is empty or whitespace only.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Structural email check: one `@`, a non-empty local part, and a dotted
/// domain. Deliverability is the transport's problem, not ours.
#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    if address.len() > 254 || address.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}

/// Strips everything except letters, digits, underscores, and inner
/// whitespace from free-text input, then trims it.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    cleaned.trim().to_owned()
}
