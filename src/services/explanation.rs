// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Generated character explanations.
//!
//! Calls a hosted language model to draft the explanation text for a
//! character. This boundary never fails the caller: a missing API key
//! and a transport error both resolve to fixed placeholder strings,
//! and the curator can always type an explanation by hand.

use anyhow::{Context, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Returned when no API key is configured.
pub const MISSING_KEY_MESSAGE: &str =
    "API key missing. Set GEMINI_API_KEY to enable generated explanations.";

/// Returned when the request fails for any reason.
pub const UNAVAILABLE_MESSAGE: &str = "Explanation temporarily unavailable.";

/// Generate an explanation for a single character. Always returns a
/// displayable string.
pub fn generate(character: &str) -> String {
    let Some(key) = api_key() else {
        return MISSING_KEY_MESSAGE.to_string();
    };
    match request(&key, character) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Explanation request failed: {e:#}");
            UNAVAILABLE_MESSAGE.to_string()
        }
    }
}

fn api_key() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}

fn request(api_key: &str, character: &str) -> Result<String> {
    let prompt = format!(
        "Provide a concise, vivid explanation (under 80 words) of the Chinese \
         character \"{character}\": its meaning, a brief note on its origin or \
         structure, and common usage. Use an educational tone suited to museum \
         and kiosk visitors."
    );
    let body = serde_json::json!({
        "contents": [{
            "parts": [{
                "text": prompt
            }]
        }]
    });

    let url = format!("{ENDPOINT}?key={api_key}");
    let response: serde_json::Value = ureq::post(&url)
        .header("Content-Type", "application/json")
        .send_json(&body)
        .context("Failed to call explanation endpoint")?
        .body_mut()
        .read_json()
        .context("Failed to parse explanation response")?;

    let text = response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("No text in explanation response"))?;

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_yields_placeholder() {
        std::env::remove_var(API_KEY_ENV);
        assert_eq!(generate("天"), MISSING_KEY_MESSAGE);
    }
}
