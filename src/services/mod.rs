// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! External collaborators: generated explanations, stroke-order
//! rendering, and optional narration playback.

#[cfg(feature = "audio-playback")]
pub mod audio;
pub mod explanation;
pub mod strokes;
