// ABOUTME: RFC 6749 Appendix A character-class predicates
// ABOUTME: Anchored regex checks used by every endpoint's parse step
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use regex::Regex;
use std::sync::LazyLock;

// Patterns are compile-time constants; a failure here is a build defect,
// not a runtime condition.
static NCHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-._\w]+$").expect("NCHAR pattern"));

static NQCHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\x21\x23-\x5B\x5D-\x7E]+$").expect("NQCHAR pattern"));

static NQSCHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\x20-\x21\x23-\x5B\x5D-\x7E]+$").expect("NQSCHAR pattern"));

static UNICODECHARNOCRLF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x09\x20-\x7E\u{0080}-\u{D7FF}\u{E000}-\u{FFFD}\u{10000}-\u{10FFFF}]+$")
        .expect("UNICODECHARNOCRLF pattern")
});

static URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").expect("URI pattern"));

static VSCHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\x20-\x7E]+$").expect("VSCHAR pattern"));

/// NCHAR: word characters plus `-`, `.`, `_` (RFC 6749 §A.1 style).
#[must_use]
pub fn is_nchar(value: &str) -> bool {
    NCHAR.is_match(value)
}

/// NQCHAR: visible ASCII excluding double quote and backslash.
#[must_use]
pub fn is_nqchar(value: &str) -> bool {
    NQCHAR.is_match(value)
}

/// NQSCHAR: NQCHAR plus the space character.
#[must_use]
pub fn is_nqschar(value: &str) -> bool {
    NQSCHAR.is_match(value)
}

/// UNICODECHARNOCRLF: any Unicode scalar except control characters other
/// than horizontal tab. Used for resource-owner usernames and passwords.
#[must_use]
pub fn is_unicode_char_no_crlf(value: &str) -> bool {
    UNICODECHARNOCRLF.is_match(value)
}

/// URI scheme-prefix check only: `scheme:` with a valid scheme name.
#[must_use]
pub fn is_uri(value: &str) -> bool {
    URI.is_match(value)
}

/// VSCHAR: printable ASCII including space.
#[must_use]
pub fn is_vschar(value: &str) -> bool {
    VSCHAR.is_match(value)
}
