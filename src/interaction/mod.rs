// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive state machines: hotspot geometry editing, swipe
//! navigation, and the presentation-exit hold gate.

pub mod engine;
pub mod longpress;
pub mod swipe;
