//! Normalization of guest-supplied contact details.
//!
//! Invites are unique per event and email address, so the address has to be
//! compared in one canonical form no matter how the organizer typed it.

use unicode_normalization::UnicodeNormalization;

/// Canonical form of an email address: NFC, trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfc().collect::<String>().to_lowercase()
}

/// Canonical display name: NFC with whitespace collapsed.
pub fn normalize_display_name(name: &str) -> String {
    name.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
