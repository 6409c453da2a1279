// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media import and resolution.
//!
//! Imported images and audio files are converted to self-contained
//! base64 data URLs so the document carries its own media. For
//! display, an image reference (data URL, http(s) URL, or file path)
//! is resolved to RGBA pixels suitable for an egui texture.

use anyhow::{Context, Result};
use base64::Engine;
use std::path::Path;

/// Decoded RGBA image ready for texture upload.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Read an image file and embed it as a data URL.
pub fn import_image(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    // Validate before embedding so a bad file is rejected at import
    // time, not at first render.
    image::load_from_memory(&bytes).context("Unsupported image format")?;
    Ok(to_data_url(image_mime(path), &bytes))
}

/// Read an audio file and embed it as a data URL.
pub fn import_audio(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(to_data_url(audio_mime(path), &bytes))
}

/// Resolve any image reference to decoded pixels.
pub fn resolve_image(reference: &str) -> Result<LoadedImage> {
    let bytes = fetch_bytes(reference)?;
    decode_image(&bytes)
}

/// Raw payload behind a reference: decoded data URL, http(s) body,
/// or file contents.
pub fn fetch_bytes(reference: &str) -> Result<Vec<u8>> {
    if let Some(payload) = data_url_payload(reference) {
        return payload;
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        let mut response = ureq::get(reference)
            .call()
            .with_context(|| format!("Failed to fetch {reference}"))?;
        return response
            .body_mut()
            .read_to_vec()
            .context("Failed to read response body");
    }
    std::fs::read(reference).with_context(|| format!("Failed to read {reference}"))
}

/// Decode the payload of a base64 data URL, or None for other
/// reference kinds.
fn data_url_payload(reference: &str) -> Option<Result<Vec<u8>>> {
    let rest = reference.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return Some(Err(anyhow::anyhow!("Only base64 data URLs are supported")));
    }
    Some(
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .context("Invalid base64 payload"),
    )
}

fn decode_image(bytes: &[u8]) -> Result<LoadedImage> {
    let img = image::load_from_memory(bytes).context("Failed to decode image")?;
    let rgba = img.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

fn audio_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "audio/mpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_data_url_roundtrip() {
        let png = tiny_png();
        let url = to_data_url("image/png", &png);
        assert!(url.starts_with("data:image/png;base64,"));

        let loaded = resolve_image(&url).unwrap();
        assert_eq!(loaded.width, 2);
        assert_eq!(loaded.height, 3);
        assert_eq!(loaded.pixels.len(), 2 * 3 * 4);
        assert_eq!(&loaded.pixels[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_non_base64_data_url_rejected() {
        let result = fetch_bytes("data:text/plain,hello");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let result = fetch_bytes("data:image/png;base64,@@not-base64@@");
        assert!(result.is_err());
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(image_mime(Path::new("a.PNG")), "image/png");
        assert_eq!(image_mime(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(audio_mime(Path::new("a.wav")), "audio/wav");
        assert_eq!(audio_mime(Path::new("a.mp3")), "audio/mpeg");
    }
}
