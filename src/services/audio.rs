// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Narration audio output (behind the `audio-playback` feature).
//!
//! The narration data model works without this module; builds with
//! the feature off simply toggle the playing state without producing
//! sound.

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;

pub struct AudioPlayer {
    // Keeps the output device open for the app's lifetime.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl AudioPlayer {
    pub fn new() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("No audio output device")?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
        })
    }

    /// Decode and play an embedded audio payload from the start,
    /// replacing whatever was playing.
    pub fn play_bytes(&mut self, bytes: Vec<u8>) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        let sink = Sink::try_new(&self.handle).context("Failed to open audio sink")?;
        let source = Decoder::new(Cursor::new(bytes)).context("Failed to decode audio")?;
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    pub fn pause(&self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    /// True once the current clip has played to its end.
    pub fn finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.empty())
    }
}
