//! Citizen identifier (CPF) normalisation.
//!
//! The registry indexes documents by the bare digit string of the CPF, while citizens
//! usually type it formatted as `123.456.789-00`. [`CanonicalCpf`] strips exactly the
//! formatting punctuation and nothing else: checksum and length are not validated, the
//! upstream simply returns no hits for a malformed value.

use std::fmt;

/// Punctuation used in the standard CPF formatting.
const FORMATTING_CHARS: [char; 2] = ['.', '-'];

/// Citizen identifier with formatting punctuation removed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CanonicalCpf(String);

impl CanonicalCpf {
    /// Normalise a raw identifier.
    pub fn new(raw: &str) -> Self {
        Self(
            raw.chars()
                .filter(|c| !FORMATTING_CHARS.contains(c))
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form safe to write to logs: every character but the last four is masked.
    pub fn masked(&self) -> String {
        let visible_from = self.0.chars().count().saturating_sub(4);
        self.0
            .chars()
            .enumerate()
            .map(|(i, c)| if i < visible_from { '*' } else { c })
            .collect()
    }
}

// Keep the full identifier out of `{:?}` output.
impl fmt::Debug for CanonicalCpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CanonicalCpf").field(&self.masked()).finish()
    }
}

impl AsRef<str> for CanonicalCpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
