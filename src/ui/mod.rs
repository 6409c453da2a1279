// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the STELE application.

pub mod dialogs;
pub mod sidebar;
pub mod stage;
