// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stroke-order rendering for a single character.
//!
//! Loads per-character stroke data (median point sequences in a
//! 1024-unit glyph box) from the hanzi-writer data set, then animates
//! the strokes in order on an egui canvas. Besides the looping
//! animation the player offers an explicit replay and a quiz mode
//! where the visitor traces each stroke in turn.
//!
//! A player is bound to one character; switching characters means
//! dropping the player and creating a fresh one, which releases the
//! previous canvas and in-flight load.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

const DATA_URL_BASE: &str = "https://cdn.jsdelivr.net/npm/hanzi-writer-data@2.0.1";

/// Em box of the stroke data set.
const GLYPH_BOX: f64 = 1024.0;
/// The data's y axis grows upward from a baseline 124 units below the
/// box; 900 is the top in data coordinates.
const GLYPH_TOP: f64 = 900.0;

const STROKE_DRAW_TIME: Duration = Duration::from_millis(600);
const STROKE_GAP: Duration = Duration::from_millis(200);

const INK: egui::Color32 = egui::Color32::from_rgb(0x2c, 0x18, 0x10);
const OUTLINE: egui::Color32 = egui::Color32::from_rgb(0xe7, 0xe5, 0xe4);
const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x8b, 0x23, 0x23);

/// Stroke data for one character.
#[derive(Debug, Clone, Deserialize)]
pub struct StrokeData {
    /// Outline path commands, kept for export tooling.
    #[serde(default)]
    pub strokes: Vec<String>,
    /// Ordered stroke skeletons as point sequences.
    pub medians: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug)]
struct QuizState {
    current: usize,
    trace: Vec<(f32, f32)>,
    mistakes: u32,
}

#[derive(Debug)]
enum Phase {
    Loading,
    Failed,
    Animating { started: Instant, looping: bool },
    Quiz(QuizState),
}

pub struct StrokePlayer {
    character: String,
    size: f32,
    rx: Option<Receiver<Result<StrokeData, String>>>,
    data: Option<StrokeData>,
    phase: Phase,
}

impl StrokePlayer {
    /// Create a player and start loading stroke data in the
    /// background.
    pub fn new(character: &str, size: f32) -> Self {
        let (tx, rx) = channel();
        let character_owned = character.to_string();
        std::thread::spawn(move || {
            let result = fetch(&character_owned).map_err(|e| format!("{e:#}"));
            let _ = tx.send(result);
        });

        Self {
            character: character.to_string(),
            size,
            rx: Some(rx),
            data: None,
            phase: Phase::Loading,
        }
    }

    #[cfg(test)]
    fn with_data(character: &str, size: f32, data: StrokeData) -> Self {
        Self {
            character: character.to_string(),
            size,
            rx: None,
            data: Some(data),
            phase: Phase::Loading,
        }
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    /// Drain the loader. On success the looping animation starts.
    pub fn poll(&mut self, now: Instant) {
        let Some(rx) = &self.rx else {
            return;
        };
        if let Ok(result) = rx.try_recv() {
            self.rx = None;
            match result {
                Ok(data) => {
                    log::info!(
                        "Loaded stroke data for '{}' ({} strokes)",
                        self.character,
                        data.medians.len()
                    );
                    self.data = Some(data);
                    self.phase = Phase::Animating {
                        started: now,
                        looping: true,
                    };
                }
                Err(e) => {
                    log::error!("Failed to load stroke data for '{}': {e}", self.character);
                    self.phase = Phase::Failed;
                }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed)
    }

    pub fn is_ready(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating { .. })
    }

    pub fn is_quiz(&self) -> bool {
        matches!(self.phase, Phase::Quiz(_))
    }

    /// Restart the animation once from the first stroke.
    pub fn replay(&mut self, now: Instant) {
        if self.data.is_some() {
            self.phase = Phase::Animating {
                started: now,
                looping: false,
            };
        }
    }

    /// Enter trace-the-strokes mode.
    pub fn start_quiz(&mut self) {
        if self.data.is_some() {
            self.phase = Phase::Quiz(QuizState {
                current: 0,
                trace: Vec::new(),
                mistakes: 0,
            });
        }
    }

    /// (strokes completed, total strokes) while in quiz mode.
    pub fn quiz_progress(&self) -> Option<(usize, usize)> {
        match (&self.phase, &self.data) {
            (Phase::Quiz(q), Some(data)) => Some((q.current, data.medians.len())),
            _ => None,
        }
    }

    /// Per-stroke draw fraction (0..=1) at `now`.
    fn stroke_fractions(&self, now: Instant) -> Vec<f64> {
        let Some(data) = &self.data else {
            return Vec::new();
        };
        let n = data.medians.len();
        if n == 0 {
            return Vec::new();
        }
        let per = STROKE_DRAW_TIME + STROKE_GAP;
        let total = per * n as u32;

        match &self.phase {
            Phase::Animating { started, looping } => {
                let mut elapsed = now.saturating_duration_since(*started);
                if *looping {
                    let cycle = total.as_millis().max(1);
                    elapsed = Duration::from_millis((elapsed.as_millis() % cycle) as u64);
                } else if elapsed > total {
                    elapsed = total;
                }
                (0..n)
                    .map(|i| {
                        let begin = per * i as u32;
                        if elapsed <= begin {
                            0.0
                        } else {
                            ((elapsed - begin).as_secs_f64()
                                / STROKE_DRAW_TIME.as_secs_f64())
                            .min(1.0)
                        }
                    })
                    .collect()
            }
            Phase::Quiz(q) => (0..n)
                .map(|i| if i < q.current { 1.0 } else { 0.0 })
                .collect(),
            _ => vec![0.0; n],
        }
    }

    /// Draw the canvas and handle quiz tracing input.
    pub fn paint(&mut self, ui: &mut egui::Ui, now: Instant) {
        let (response, painter) =
            ui.allocate_painter(egui::vec2(self.size, self.size), egui::Sense::click_and_drag());
        let rect = response.rect;
        painter.rect_filled(rect, 8.0, egui::Color32::WHITE);
        painter.rect_stroke(rect, 8.0, egui::Stroke::new(1.0, OUTLINE));

        if self.data.is_none() {
            let message = if self.has_failed() {
                "Could not load stroke data."
            } else {
                "Loading stroke data..."
            };
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(14.0),
                egui::Color32::from_gray(120),
            );
            return;
        }

        let fractions = self.stroke_fractions(now);
        let width = self.size * 0.06;
        let size = self.size;

        let Some(data) = &self.data else {
            return;
        };

        // Faint skeleton of the full character underneath.
        for median in &data.medians {
            let points = median_screen_points(median, rect, size);
            if points.len() >= 2 {
                painter.add(egui::Shape::line(
                    points,
                    egui::Stroke::new(width, OUTLINE),
                ));
            }
        }

        // Strokes drawn so far, possibly mid-stroke.
        for (median, fraction) in data.medians.iter().zip(&fractions) {
            if *fraction <= 0.0 {
                continue;
            }
            let canvas: Vec<(f32, f32)> = median
                .iter()
                .map(|p| glyph_to_canvas(*p, size))
                .collect();
            let partial = partial_path(&canvas, *fraction as f32);
            let points: Vec<egui::Pos2> = partial
                .iter()
                .map(|(x, y)| egui::pos2(rect.min.x + x, rect.min.y + y))
                .collect();
            if points.len() >= 2 {
                painter.add(egui::Shape::line(points, egui::Stroke::new(width, INK)));
            }
        }

        // Quiz tracing: collect the drag, grade it on release.
        if let Phase::Quiz(quiz) = &mut self.phase {
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    quiz.trace.push((pos.x - rect.min.x, pos.y - rect.min.y));
                }
            }

            if quiz.trace.len() >= 2 {
                let points: Vec<egui::Pos2> = quiz
                    .trace
                    .iter()
                    .map(|(x, y)| egui::pos2(rect.min.x + x, rect.min.y + y))
                    .collect();
                painter.add(egui::Shape::line(
                    points,
                    egui::Stroke::new(width * 0.8, ACCENT),
                ));
            }

            if response.drag_stopped() {
                let total = data.medians.len();
                if quiz.current < total {
                    let median = &data.medians[quiz.current];
                    if trace_matches(&quiz.trace, median, size) {
                        quiz.current += 1;
                    } else {
                        quiz.mistakes += 1;
                    }
                }
                quiz.trace.clear();
            }

            if quiz.mistakes > 0 && quiz.current < data.medians.len() {
                painter.text(
                    egui::pos2(rect.center().x, rect.max.y - 14.0),
                    egui::Align2::CENTER_CENTER,
                    "Follow the highlighted stroke order",
                    egui::FontId::proportional(12.0),
                    egui::Color32::from_gray(140),
                );
            }
        }
    }
}

fn fetch(character: &str) -> Result<StrokeData> {
    let url = format!("{DATA_URL_BASE}/{}.json", percent_encode(character));
    ureq::get(&url)
        .call()
        .with_context(|| format!("Failed to fetch stroke data for '{character}'"))?
        .body_mut()
        .read_json()
        .context("Failed to parse stroke data")
}

/// Percent-encode the UTF-8 bytes of a URL path segment.
fn percent_encode(s: &str) -> String {
    s.bytes().map(|b| format!("%{b:02X}")).collect()
}

/// Map a glyph-box point to canvas coordinates (origin top-left).
fn glyph_to_canvas(p: [f64; 2], size: f32) -> (f32, f32) {
    (
        (p[0] / GLYPH_BOX * size as f64) as f32,
        ((GLYPH_TOP - p[1]) / GLYPH_BOX * size as f64) as f32,
    )
}

fn median_screen_points(median: &[[f64; 2]], rect: egui::Rect, size: f32) -> Vec<egui::Pos2> {
    median
        .iter()
        .map(|p| {
            let (x, y) = glyph_to_canvas(*p, size);
            egui::pos2(rect.min.x + x, rect.min.y + y)
        })
        .collect()
}

/// Prefix of a polyline covering `fraction` of its total length,
/// interpolating the final point.
fn partial_path(points: &[(f32, f32)], fraction: f32) -> Vec<(f32, f32)> {
    if points.len() < 2 {
        return points.to_vec();
    }
    if fraction >= 1.0 {
        return points.to_vec();
    }
    if fraction <= 0.0 {
        return Vec::new();
    }

    let total: f32 = points
        .windows(2)
        .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
        .sum();
    let mut budget = total * fraction;

    let mut out = vec![points[0]];
    for w in points.windows(2) {
        let seg = ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt();
        if seg <= budget {
            out.push(w[1]);
            budget -= seg;
        } else {
            if seg > 0.0 {
                let t = budget / seg;
                out.push((w[0].0 + (w[1].0 - w[0].0) * t, w[0].1 + (w[1].1 - w[0].1) * t));
            }
            break;
        }
    }
    out
}

/// Grade a traced stroke against the expected median: the trace must
/// begin near the stroke's start and finish near its end.
fn trace_matches(trace: &[(f32, f32)], median: &[[f64; 2]], size: f32) -> bool {
    if trace.len() < 2 || median.len() < 2 {
        return false;
    }
    let tolerance = size * 0.2;
    let expected_start = glyph_to_canvas(median[0], size);
    let expected_end = glyph_to_canvas(median[median.len() - 1], size);

    let start = trace[0];
    let end = trace[trace.len() - 1];

    distance(start, expected_start) <= tolerance && distance(end, expected_end) <= tolerance
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> StrokeData {
        StrokeData {
            strokes: Vec::new(),
            medians: vec![
                vec![[0.0, 900.0], [1024.0, 900.0]],
                vec![[512.0, 900.0], [512.0, -124.0]],
            ],
        }
    }

    #[test]
    fn test_glyph_box_maps_to_canvas() {
        let size = 300.0;
        assert_eq!(glyph_to_canvas([0.0, 900.0], size), (0.0, 0.0));

        let (x, y) = glyph_to_canvas([1024.0, -124.0], size);
        assert!((x - 300.0).abs() < 1e-4);
        assert!((y - 300.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_path_midpoint() {
        let line = [(0.0, 0.0), (100.0, 0.0)];
        let half = partial_path(&line, 0.5);
        assert_eq!(half.len(), 2);
        assert!((half[1].0 - 50.0).abs() < 1e-4);

        assert_eq!(partial_path(&line, 1.0).len(), 2);
        assert!(partial_path(&line, 0.0).is_empty());
    }

    #[test]
    fn test_partial_path_spans_segments() {
        let bent = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];
        let three_quarters = partial_path(&bent, 0.75);
        let last = three_quarters.last().unwrap();
        assert!((last.0 - 10.0).abs() < 1e-4);
        assert!((last.1 - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_animation_progresses_in_order() {
        let mut player = StrokePlayer::with_data("天", 300.0, sample_data());
        let t0 = Instant::now();
        player.replay(t0);

        // Mid-way through the first stroke the second has not begun.
        let f = player.stroke_fractions(t0 + Duration::from_millis(300));
        assert!(f[0] > 0.4 && f[0] < 0.6);
        assert_eq!(f[1], 0.0);

        // After the full cycle both strokes are complete and stay so.
        let f = player.stroke_fractions(t0 + Duration::from_millis(5000));
        assert_eq!(f, vec![1.0, 1.0]);
    }

    #[test]
    fn test_quiz_advances_on_matching_trace() {
        let mut player = StrokePlayer::with_data("天", 300.0, sample_data());
        player.start_quiz();
        assert_eq!(player.quiz_progress(), Some((0, 2)));

        // First median runs along the top edge: (0,0) -> (300,0).
        let good: Vec<(f32, f32)> = vec![(2.0, 38.0), (150.0, 36.0), (295.0, 34.0)];
        let bad: Vec<(f32, f32)> = vec![(2.0, 38.0), (10.0, 200.0)];

        let median = &sample_data().medians[0];
        assert!(trace_matches(&good, median, 300.0));
        assert!(!trace_matches(&bad, median, 300.0));
    }
}
