// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait, coordinating the interaction engines, the
//! document model, background loaders, and the UI components.

use crate::interaction::engine::HotspotEngine;
use crate::interaction::longpress::{self, LongPressGate};
use crate::interaction::swipe::{SwipeOutcome, SwipeTracker};
use crate::io::{media, serialization, storage};
use crate::models::group::{demo_data, AppData};
use crate::models::hotspot::Hotspot;
use crate::models::slides::SlideModel;
use crate::services::explanation;
use crate::services::strokes::StrokePlayer;
use crate::session::EditSession;
use crate::ui::{dialogs, sidebar, stage};
use crate::util::debounce::Debouncer;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::{Duration, Instant};

/// Quiet period between the last mutation and the mirrored save.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

const STATUS_DURATION: Duration = Duration::from_secs(4);
const SWIPE_HINT_DURATION: Duration = Duration::from_secs(4);
const STROKE_CANVAS_SIZE: f32 = 300.0;

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    View,
    Edit,
}

/// Result of a background file import.
struct ImportedFile {
    name: String,
    data_url: String,
}

/// Where an imported file goes once conversion completes.
enum ImportTarget {
    NewGroup,
    Variant(String),
    Audio(String),
}

struct ImportJob {
    target: ImportTarget,
    rx: Receiver<Result<ImportedFile, String>>,
}

enum TexEntry {
    Loading(Receiver<Result<media::LoadedImage, String>>),
    Ready(egui::TextureHandle),
    Failed,
}

/// Textures for resolved image references, keyed by reference hash.
/// References resolve on background threads; entries are polled from
/// the event loop.
#[derive(Default)]
struct TextureCache {
    entries: HashMap<u64, TexEntry>,
}

impl TextureCache {
    fn key(reference: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        reference.hash(&mut hasher);
        hasher.finish()
    }

    fn ensure(&mut self, reference: &str) {
        let key = Self::key(reference);
        if self.entries.contains_key(&key) {
            return;
        }
        let (tx, rx) = channel();
        let reference = reference.to_string();
        std::thread::spawn(move || {
            let result = media::resolve_image(&reference).map_err(|e| format!("{e:#}"));
            let _ = tx.send(result);
        });
        self.entries.insert(key, TexEntry::Loading(rx));
    }

    /// Drain finished loads; returns true while any load is pending.
    fn poll(&mut self, ctx: &egui::Context) -> bool {
        let mut any_loading = false;
        for entry in self.entries.values_mut() {
            if let TexEntry::Loading(rx) = entry {
                match rx.try_recv() {
                    Ok(Ok(image)) => {
                        let size = [image.width as usize, image.height as usize];
                        let color_image =
                            egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                        *entry = TexEntry::Ready(ctx.load_texture(
                            "slide_image",
                            color_image,
                            egui::TextureOptions::LINEAR,
                        ));
                    }
                    Ok(Err(e)) => {
                        log::error!("Failed to load image: {e}");
                        *entry = TexEntry::Failed;
                    }
                    Err(TryRecvError::Empty) => any_loading = true,
                    Err(TryRecvError::Disconnected) => *entry = TexEntry::Failed,
                }
            }
        }
        any_loading
    }

    fn ready(&self, reference: &str) -> Option<egui::TextureHandle> {
        match self.entries.get(&Self::key(reference)) {
            Some(TexEntry::Ready(texture)) => Some(texture.clone()),
            _ => None,
        }
    }
}

/// Main application state.
pub struct SteleApp {
    /// Authoritative document; the saved file mirrors it.
    data: AppData,
    /// Derived flat slide sequence.
    slides: SlideModel,
    /// Index into the flattened sequence.
    active_index: usize,
    mode: AppMode,
    presentation: bool,

    engine: HotspotEngine,
    swipe: SwipeTracker,
    session: EditSession,
    exit_gate: LongPressGate,

    save_debounce: Debouncer,
    save_worker: Option<Receiver<()>>,

    textures: TextureCache,
    import_job: Option<ImportJob>,
    explanation_rx: Option<Receiver<String>>,

    /// Hotspot open in the detail view.
    active_hotspot: Option<Hotspot>,
    stroke_player: Option<StrokePlayer>,

    audio_popup_open: bool,
    audio_playing: bool,
    #[cfg(feature = "audio-playback")]
    audio_out: Option<crate::services::audio::AudioPlayer>,

    /// Group shown last frame; a change stops narration.
    last_group_id: Option<String>,
    hint_until: Option<Instant>,
    status: Option<(String, Instant)>,
}

impl Default for SteleApp {
    fn default() -> Self {
        Self::new()
    }
}

impl SteleApp {
    /// Create the application, loading the saved document or falling
    /// back to the demo content.
    pub fn new() -> Self {
        let data = storage::load().unwrap_or_else(|| {
            log::info!("No saved document; starting with demo data");
            demo_data()
        });
        let slides = SlideModel::from_groups(&data.images);
        let hint_until = if slides.len() > 1 {
            Some(Instant::now() + SWIPE_HINT_DURATION)
        } else {
            None
        };

        Self {
            data,
            slides,
            active_index: 0,
            mode: AppMode::View,
            presentation: false,
            engine: HotspotEngine::new(),
            swipe: SwipeTracker::new(),
            session: EditSession::new(),
            exit_gate: LongPressGate::new(),
            save_debounce: Debouncer::new(SAVE_DEBOUNCE),
            save_worker: None,
            textures: TextureCache::default(),
            import_job: None,
            explanation_rx: None,
            active_hotspot: None,
            stroke_player: None,
            audio_popup_open: false,
            audio_playing: false,
            #[cfg(feature = "audio-playback")]
            audio_out: None,
            last_group_id: None,
            hint_until,
            status: None,
        }
    }

    /// Record a mutation: rebuild the derived sequence, re-derive the
    /// active index, and (re)arm the debounced save.
    fn touch(&mut self, now: Instant) {
        self.slides.rebuild(&self.data.images);
        self.active_index = self.slides.clamp(self.active_index);
        self.save_debounce.arm(now);
    }

    fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status = Some((message.into(), now + STATUS_DURATION));
    }

    /// Apply a command result: success arms the save, rejection
    /// surfaces its message.
    fn apply_command(&mut self, result: anyhow::Result<()>, now: Instant) {
        match result {
            Ok(()) => self.touch(now),
            Err(e) => self.set_status(e.to_string(), now),
        }
    }

    fn active_group_id(&self) -> Option<String> {
        self.slides
            .get(self.active_index)
            .map(|s| s.group_id.clone())
    }

    fn enter_presentation(&mut self, ctx: &egui::Context) {
        self.presentation = true;
        self.mode = AppMode::View;
        self.engine.cancel();
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
        log::info!("Entered presentation mode");
    }

    fn exit_presentation(&mut self, ctx: &egui::Context) {
        self.presentation = false;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
        log::info!("Exited presentation mode");
    }

    /// Open the native picker and convert the chosen file on a
    /// background thread.
    fn start_import(&mut self, target: ImportTarget) {
        let audio = matches!(target, ImportTarget::Audio(_));
        let dialog = if audio {
            rfd::FileDialog::new().add_filter("Audio", &["mp3", "wav", "ogg", "m4a"])
        } else {
            rfd::FileDialog::new()
                .add_filter("Images", &["jpg", "jpeg", "png", "gif", "webp", "bmp"])
        };
        let Some(path) = dialog.pick_file() else {
            return;
        };

        let (tx, rx) = channel();
        std::thread::spawn(move || {
            let result = (|| -> Result<ImportedFile, String> {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string();
                let data_url = if audio {
                    media::import_audio(&path)
                } else {
                    media::import_image(&path)
                }
                .map_err(|e| format!("{e:#}"))?;
                Ok(ImportedFile { name, data_url })
            })();
            let _ = tx.send(result);
        });

        self.import_job = Some(ImportJob { target, rx });
    }

    fn poll_import(&mut self, now: Instant) {
        let Some(job) = self.import_job.take() else {
            return;
        };
        match job.rx.try_recv() {
            Ok(Ok(file)) => match job.target {
                ImportTarget::NewGroup => {
                    let id = self.data.import_group(file.name, file.data_url);
                    self.touch(now);
                    if let Some(index) = self.slides.jump_to_group(&id) {
                        self.active_index = index;
                    }
                }
                ImportTarget::Variant(group_id) => {
                    let result = self.data.add_variant(&group_id, file.data_url);
                    self.apply_command(result, now);
                }
                ImportTarget::Audio(group_id) => {
                    let result = self.data.attach_audio(&group_id, file.data_url);
                    self.apply_command(result, now);
                }
            },
            Ok(Err(e)) => self.set_status(e, now),
            Err(TryRecvError::Empty) => self.import_job = Some(job),
            Err(TryRecvError::Disconnected) => self.set_status("Import failed.", now),
        }
    }

    fn poll_save(&mut self, now: Instant) {
        if self.save_debounce.fire_due(now) {
            let snapshot = self.data.clone();
            let (tx, rx) = channel();
            std::thread::spawn(move || {
                storage::save(&snapshot);
                let _ = tx.send(());
            });
            self.save_worker = Some(rx);
        }
        if let Some(rx) = self.save_worker.take() {
            if matches!(rx.try_recv(), Err(TryRecvError::Empty)) {
                self.save_worker = Some(rx);
            }
        }
    }

    fn poll_explanation(&mut self) {
        let Some(rx) = self.explanation_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(text) => {
                if let Some(pending) = self.session.pending_mut() {
                    pending.explanation = text;
                }
            }
            Err(TryRecvError::Empty) => self.explanation_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {}
        }
    }

    fn open_detail(&mut self, group_id: &str, hotspot_id: &str) {
        let Some(hotspot) = self
            .data
            .group(group_id)
            .and_then(|g| g.hotspot(hotspot_id))
            .cloned()
        else {
            return;
        };
        log::info!("Opened detail for '{}'", hotspot.character);
        // Replacing the player drops the previous character's canvas
        // and in-flight load before the new one starts.
        self.stroke_player = Some(StrokePlayer::new(&hotspot.character, STROKE_CANVAS_SIZE));
        self.active_hotspot = Some(hotspot);
    }

    fn close_detail(&mut self) {
        self.active_hotspot = None;
        self.stroke_player = None;
    }

    fn audio_stop(&mut self) {
        self.audio_playing = false;
        self.audio_popup_open = false;
        #[cfg(feature = "audio-playback")]
        if let Some(out) = &mut self.audio_out {
            out.stop();
        }
    }

    fn audio_play_from_start(&mut self) {
        self.audio_playing = true;
        #[cfg(feature = "audio-playback")]
        {
            let url = self
                .active_group_id()
                .and_then(|id| self.data.group(&id).and_then(|g| g.audio_url.clone()));
            let Some(url) = url else {
                self.audio_playing = false;
                return;
            };
            if self.audio_out.is_none() {
                match crate::services::audio::AudioPlayer::new() {
                    Ok(player) => self.audio_out = Some(player),
                    Err(e) => log::error!("Audio device unavailable: {e:#}"),
                }
            }
            if let Some(out) = &mut self.audio_out {
                match media::fetch_bytes(&url) {
                    Ok(bytes) => {
                        if let Err(e) = out.play_bytes(bytes) {
                            log::error!("Audio playback failed: {e:#}");
                        }
                    }
                    Err(e) => log::error!("Audio payload unreadable: {e:#}"),
                }
            }
        }
    }

    fn audio_toggle(&mut self) {
        if self.audio_playing {
            self.audio_playing = false;
            #[cfg(feature = "audio-playback")]
            if let Some(out) = &self.audio_out {
                out.pause();
            }
        } else {
            self.audio_playing = true;
            #[cfg(feature = "audio-playback")]
            if let Some(out) = &self.audio_out {
                out.resume();
            }
        }
    }

    fn handle_stage_action(&mut self, action: stage::StageAction, now: Instant) {
        let Some(slide) = self.slides.get(self.active_index).cloned() else {
            return;
        };
        match action {
            stage::StageAction::None => {}
            stage::StageAction::ProposeHotspot(rect) => {
                self.session.propose(slide.group_id.clone(), rect);
            }
            stage::StageAction::MoveHotspot { id, x, y } => {
                if let Some(hotspot) = self
                    .data
                    .group_mut(&slide.group_id)
                    .and_then(|g| g.hotspot_mut(&id))
                {
                    hotspot.set_origin(x, y);
                    self.touch(now);
                }
            }
            stage::StageAction::ReshapeHotspot { id, rect } => {
                if let Some(hotspot) = self
                    .data
                    .group_mut(&slide.group_id)
                    .and_then(|g| g.hotspot_mut(&id))
                {
                    hotspot.set_rect(rect);
                    self.touch(now);
                }
            }
            stage::StageAction::DeleteHotspot(id) => {
                let result = self.data.delete_hotspot(&slide.group_id, &id);
                self.apply_command(result, now);
            }
            stage::StageAction::SelectHotspot(id) => {
                self.open_detail(&slide.group_id, &id);
            }
            stage::StageAction::Navigate(outcome) => {
                self.active_index = match outcome {
                    SwipeOutcome::Next => self.slides.next(self.active_index),
                    SwipeOutcome::Previous => self.slides.previous(self.active_index),
                    SwipeOutcome::None => self.active_index,
                };
            }
            stage::StageAction::RenameGroup(name) => {
                let result = self.data.rename_group(&slide.group_id, name);
                self.apply_command(result, now);
            }
        }
    }

    fn handle_sidebar_action(&mut self, action: sidebar::SidebarAction, ctx: &egui::Context, now: Instant) {
        match action {
            sidebar::SidebarAction::None => {}
            sidebar::SidebarAction::JumpToGroup(id) => {
                if let Some(index) = self.slides.jump_to_group(&id) {
                    self.active_index = index;
                }
            }
            sidebar::SidebarAction::DeleteGroup(id) => {
                let result = self.data.delete_group(&id);
                let deleted = result.is_ok();
                self.apply_command(result, now);
                if deleted {
                    self.active_index = 0;
                }
            }
            sidebar::SidebarAction::ImportGroup => self.start_import(ImportTarget::NewGroup),
            sidebar::SidebarAction::SetMode(mode) => {
                self.mode = mode;
                self.engine.cancel();
            }
            sidebar::SidebarAction::EnterPresentation => self.enter_presentation(ctx),
            sidebar::SidebarAction::SetTitle(title) => {
                self.data.app_title = title;
                self.touch(now);
            }
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context, now: Instant) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Import Image...").clicked() {
                        self.start_import(ImportTarget::NewGroup);
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export Document", |ui| {
                        if ui.button("Export as YAML...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("YAML", &["yaml", "yml"])
                                .set_file_name("exhibit.yaml")
                                .save_file()
                            {
                                match serialization::export_yaml(&self.data, &path) {
                                    Ok(_) => log::info!("Exported document to {}", path.display()),
                                    Err(e) => log::error!("Failed to export document: {e:#}"),
                                }
                            }
                            ui.close_menu();
                        }
                        if ui.button("Export as JSON...").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .set_file_name("exhibit.json")
                                .save_file()
                            {
                                match serialization::export_json(&self.data, &path) {
                                    Ok(_) => log::info!("Exported document to {}", path.display()),
                                    Err(e) => log::error!("Failed to export document: {e:#}"),
                                }
                            }
                            ui.close_menu();
                        }
                    });
                    if ui.button("Import Document...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Documents", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            let imported = match path.extension().and_then(|s| s.to_str()) {
                                Some("yaml") | Some("yml") => serialization::import_yaml(&path),
                                _ => serialization::import_json(&path),
                            };
                            match imported {
                                Ok(data) => {
                                    log::info!("Imported document from {}", path.display());
                                    self.data = data;
                                    self.active_index = 0;
                                    self.close_detail();
                                    self.touch(now);
                                }
                                Err(e) => self.set_status(format!("Import failed: {e}"), now),
                            }
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn show_edit_overlays(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(slide) = self.slides.get(self.active_index).cloned() else {
            return;
        };
        let has_audio = self
            .data
            .group(&slide.group_id)
            .is_some_and(|g| g.audio_url.is_some());

        egui::Area::new(egui::Id::new("curator_controls"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 64.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if ui.button("Add variant...").clicked() {
                        self.start_import(ImportTarget::Variant(slide.group_id.clone()));
                    }
                    if slide.total_variants > 1 && ui.button("Delete this variant").clicked() {
                        let result = self
                            .data
                            .remove_variant(&slide.group_id, slide.variant_index);
                        let removed = result.is_ok();
                        self.apply_command(result, now);
                        if removed && self.active_index > 0 {
                            self.active_index -= 1;
                        }
                    }
                    ui.separator();
                    if has_audio {
                        if ui.button("Remove audio").clicked() {
                            let result = self.data.detach_audio(&slide.group_id);
                            self.apply_command(result, now);
                            self.audio_stop();
                        }
                    } else if ui.button("Attach audio...").clicked() {
                        self.start_import(ImportTarget::Audio(slide.group_id.clone()));
                    }
                });
            });
    }

    fn show_audio_button(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("audio_button"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-32.0, -32.0))
            .show(ctx, |ui| {
                let label = if self.audio_playing { "⏸" } else { "🔊" };
                let button = egui::Button::new(egui::RichText::new(label).size(26.0))
                    .min_size(egui::vec2(56.0, 56.0))
                    .rounding(28.0);
                if ui.add(button).clicked() {
                    self.audio_popup_open = true;
                    if !self.audio_playing {
                        self.audio_play_from_start();
                    }
                }
            });
    }

    fn show_exit_gate(&mut self, ctx: &egui::Context, now: Instant) {
        egui::Area::new(egui::Id::new("exit_gate"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(16.0, -16.0))
            .show(ctx, |ui| {
                let response = ui
                    .add(egui::Button::new("🔒").min_size(egui::vec2(40.0, 40.0)))
                    .on_hover_text("Hold for 3 seconds to exit");

                let held = response.is_pointer_button_down_on();
                if held && !self.exit_gate.is_pressed() {
                    self.exit_gate.press(now);
                }
                if !held && self.exit_gate.is_pressed() {
                    self.exit_gate.release();
                }

                if self.exit_gate.progress() > 0.0 {
                    ui.add(
                        egui::ProgressBar::new((self.exit_gate.progress() / 100.0) as f32)
                            .desired_width(40.0),
                    );
                }
            });

        if self.exit_gate.poll(now) {
            self.exit_presentation(ctx);
        }
    }

    fn show_swipe_hint(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(until) = self.hint_until else {
            return;
        };
        let pointer_active = ctx.input(|i| i.pointer.any_pressed());
        if now >= until || pointer_active || self.mode == AppMode::Edit || self.slides.len() < 2 {
            self.hint_until = None;
            return;
        }
        if self.active_hotspot.is_some() {
            return;
        }
        egui::Area::new(egui::Id::new("swipe_hint"))
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(
                        egui::RichText::new("⇆  Swipe left or right to change slides")
                            .size(18.0),
                    );
                });
            });
    }

    fn show_status(&mut self, ctx: &egui::Context, now: Instant) {
        let Some((message, until)) = &self.status else {
            return;
        };
        if now >= *until {
            self.status = None;
            return;
        }
        let message = message.clone();
        egui::Area::new(egui::Id::new("status_toast"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(message);
                });
            });
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.active_hotspot.is_some() {
                self.close_detail();
            } else if self.session.is_capturing() {
                self.session.cancel();
            } else if self.audio_popup_open {
                self.audio_popup_open = false;
            } else {
                self.engine.cancel();
            }
        }

        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.active_index = self.slides.next(self.active_index);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                self.active_index = self.slides.previous(self.active_index);
            }
        }
    }
}

impl eframe::App for SteleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Background work.
        self.poll_import(now);
        self.poll_save(now);
        self.poll_explanation();
        let textures_loading = self.textures.poll(ctx);

        // Narration stops when the visitor leaves the group.
        let current_group = self.active_group_id();
        if current_group != self.last_group_id {
            if self.last_group_id.is_some() {
                self.audio_stop();
            }
            self.last_group_id = current_group;
        }

        #[cfg(feature = "audio-playback")]
        if self.audio_playing {
            if let Some(out) = &self.audio_out {
                if out.finished() {
                    self.audio_playing = false;
                }
            }
        }

        self.handle_keys(ctx);

        // Request textures for the active slide and sidebar thumbnails.
        if let Some(slide) = self.slides.get(self.active_index) {
            if let Some(group) = self.data.group(&slide.group_id) {
                if let Some(reference) = group.variants.get(slide.variant_index) {
                    self.textures.ensure(reference);
                }
            }
        }
        let first_variants: Vec<String> = self
            .data
            .images
            .iter()
            .filter_map(|g| g.variants.first().cloned())
            .collect();
        for reference in &first_variants {
            self.textures.ensure(reference);
        }

        if !self.presentation {
            self.show_menu_bar(ctx, now);
        }

        // Sidebar.
        let sidebar_width = if self.presentation { 72.0 } else { 260.0 };
        let sidebar_action = egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(sidebar_width)
            .show(ctx, |ui| {
                sidebar::show(
                    ui,
                    &self.data,
                    self.last_group_id.as_deref(),
                    self.mode,
                    self.presentation,
                    self.save_worker.is_some() || self.save_debounce.is_armed(),
                    &|reference: &str| self.textures.ready(reference),
                )
            })
            .inner;
        self.handle_sidebar_action(sidebar_action, ctx, now);

        // Main stage.
        let stage_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let slide = self.slides.get(self.active_index).cloned();
                let Some(slide) = slide else {
                    ui.centered_and_justified(|ui| {
                        ui.label("Import an image to begin.");
                    });
                    return stage::StageAction::None;
                };
                let Some(group) = self.data.group(&slide.group_id) else {
                    return stage::StageAction::None;
                };
                let texture = group
                    .variants
                    .get(slide.variant_index)
                    .and_then(|r| self.textures.ready(r));
                stage::show(
                    ui,
                    group,
                    &slide,
                    texture.as_ref(),
                    self.mode,
                    self.presentation,
                    &mut self.engine,
                    &mut self.swipe,
                    now,
                )
            })
            .inner;
        self.handle_stage_action(stage_action, now);

        // Floating overlays.
        if self.mode == AppMode::Edit && !self.presentation {
            self.show_edit_overlays(ctx, now);
        }
        let active_has_audio = self
            .active_group_id()
            .and_then(|id| self.data.group(&id).map(|g| g.audio_url.is_some()))
            .unwrap_or(false);
        if active_has_audio {
            self.show_audio_button(ctx);
        }
        if self.presentation {
            self.show_exit_gate(ctx, now);
        }
        self.show_swipe_hint(ctx, now);
        self.show_status(ctx, now);

        // Dialogs.
        if self.session.is_capturing() {
            let generating = self.explanation_rx.is_some();
            match dialogs::creation_dialog(ctx, &mut self.session, generating) {
                dialogs::CreationAction::None => {}
                dialogs::CreationAction::Cancel => self.session.cancel(),
                dialogs::CreationAction::Confirm => {
                    match self.session.confirm(&mut self.data) {
                        Ok(_) => self.touch(now),
                        Err(e) => self.set_status(e.to_string(), now),
                    }
                }
                dialogs::CreationAction::GenerateExplanation(character) => {
                    let (tx, rx) = channel();
                    std::thread::spawn(move || {
                        let _ = tx.send(explanation::generate(&character));
                    });
                    self.explanation_rx = Some(rx);
                }
            }
        }

        if let Some(hotspot) = self.active_hotspot.clone() {
            if let Some(player) = &mut self.stroke_player {
                player.poll(now);
                if let dialogs::DetailAction::Close =
                    dialogs::detail_dialog(ctx, &hotspot, player, now)
                {
                    self.close_detail();
                }
            }
        }

        if self.audio_popup_open {
            let group_id = self.active_group_id();
            let action = group_id.as_ref().and_then(|id| self.data.group(id)).map(
                |group| dialogs::audio_dialog(ctx, group, self.mode, self.audio_playing),
            );
            match action {
                Some(dialogs::AudioAction::Close) => self.audio_popup_open = false,
                Some(dialogs::AudioAction::Toggle) => self.audio_toggle(),
                Some(dialogs::AudioAction::Restart) => self.audio_play_from_start(),
                Some(dialogs::AudioAction::SetText(text)) => {
                    if let Some(id) = group_id {
                        let result = self.data.set_audio_text(&id, text);
                        self.apply_command(result, now);
                    }
                }
                _ => {}
            }
        }

        // Repaint scheduling for timers and background work.
        if self.exit_gate.is_pressed() {
            ctx.request_repaint_after(longpress::POLL_INTERVAL);
        }
        if let Some(remaining) = self.save_debounce.remaining(now) {
            ctx.request_repaint_after(remaining + Duration::from_millis(10));
        }
        if let Some(player) = &self.stroke_player {
            if player.is_animating() {
                ctx.request_repaint();
            }
        }
        let busy = textures_loading
            || self.import_job.is_some()
            || self.save_worker.is_some()
            || self.explanation_rx.is_some()
            || self
                .stroke_player
                .as_ref()
                .is_some_and(|p| p.is_loading());
        if busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if self.hint_until.is_some() || self.status.is_some() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

/// Install a system CJK font so hanzi render; egui's bundled fonts
/// have no CJK coverage.
pub fn install_cjk_fonts(ctx: &egui::Context) {
    const CANDIDATES: [&str; 6] = [
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
        "/System/Library/Fonts/PingFang.ttc",
        "C:\\Windows\\Fonts\\msyh.ttc",
        "C:\\Windows\\Fonts\\simsun.ttc",
    ];
    for path in CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            let mut fonts = egui::FontDefinitions::default();
            fonts
                .font_data
                .insert("cjk".to_owned(), egui::FontData::from_owned(bytes));
            for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                fonts
                    .families
                    .entry(family)
                    .or_default()
                    .push("cjk".to_owned());
            }
            ctx.set_fonts(fonts);
            log::info!("Loaded CJK font from {path}");
            return;
        }
    }
    log::warn!("No CJK font found; characters may render as boxes");
}
