// ABOUTME: Default opaque token generation for codes and tokens
// ABOUTME: Produces 40-char hex identifiers from SHA-1 over 256 random bytes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::errors::OAuthError;
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::error;

/// Generate an opaque high-entropy token string.
///
/// The output is the lowercase hex of SHA-1 over 256 random bytes: a
/// 40-character opaque identifier, not a secret derivation. Models may
/// substitute their own generators through the `generate_*` hooks.
///
/// # Errors
/// Returns `server_error` if the system RNG fails; the engine cannot
/// mint credentials without working randomness.
pub fn generate_random_token() -> Result<String, OAuthError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 256];

    rng.fill(&mut bytes).map_err(|e| {
        error!("system RNG failure, cannot generate token material: {e}");
        OAuthError::server_error("token generation failed: system RNG unavailable")
    })?;

    let digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, &bytes);
    Ok(hex::encode(digest.as_ref()))
}
