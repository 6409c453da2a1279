// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: media embedding, document storage, export/import.

pub mod media;
pub mod serialization;
pub mod storage;
