// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! STELE - Stone Tablet Exploration and Labeling Environment
//!
//! A cross-platform kiosk application for annotating inscription
//! images with character hotspots and presenting them as a swipeable,
//! tap-to-explore exhibit.

mod app;
mod interaction;
mod io;
mod models;
mod services;
mod session;
mod ui;
mod util;

use anyhow::Result;
use app::SteleApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("STELE - Stone Tablet Exploration and Labeling Environment"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "STELE",
        options,
        Box::new(|cc| {
            app::install_cjk_fonts(&cc.egui_ctx);
            Ok(Box::new(SteleApp::new()))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
