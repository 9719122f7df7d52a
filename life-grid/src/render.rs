use crate::cell::MAX_ALIVE_FRAMES;
use crate::matrix::CellMatrix;
use crate::{GridSize, Loc};

const HUE_YOUNG: f32 = 0.6;
const HUE_OLD: f32 = 0.08;
const FULL_SATURATION: f32 = 0.9;
const FULL_LIGHTNESS: f32 = 0.55;
// Largest f32 below 1.
const LAST_PROGRESS: f32 = 1.0 - f32::EPSILON / 2.0;

/// How a cell looks partway between two ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Alive,
    Dying,
    Reviving,
    Invisible,
}

impl Phase {
    pub fn new(previous_alive: bool, next_alive: bool) -> Self {
        match (previous_alive, next_alive) {
            (true, true) => Phase::Alive,
            (true, false) => Phase::Dying,
            (false, true) => Phase::Reviving,
            (false, false) => Phase::Invisible,
        }
    }

    pub fn is_visible(self) -> bool {
        self != Phase::Invisible
    }

    pub fn alpha(self, progress: f32) -> f32 {
        match self {
            Phase::Alive => 1.0,
            Phase::Dying => 1.0 - progress,
            Phase::Reviving => progress,
            Phase::Invisible => 0.0,
        }
    }

    /// Scales saturation and lightness.
    pub fn intensity(self, progress: f32) -> f32 {
        self.alpha(progress)
    }
}

/// What a renderer needs to know about one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellView {
    pub previous_alive: bool,
    pub next_alive: bool,
    pub alive_frames: u8,
}

impl CellView {
    pub fn phase(&self) -> Phase {
        Phase::new(self.previous_alive, self.next_alive)
    }

    /// Hue in `[0, 1)`, moving from blue toward orange as the cell ages.
    ///
    /// A cell that will still be alive after the next tick is treated as
    /// already `progress` of the way into that tick, so the hue is
    /// continuous across tick boundaries.
    pub fn hue(&self, progress: f32) -> f32 {
        let growth = if self.next_alive { progress } else { 0.0 };
        let age = (self.alive_frames as f32 + growth).min(MAX_ALIVE_FRAMES as f32);
        HUE_YOUNG + (HUE_OLD - HUE_YOUNG) * age / MAX_ALIVE_FRAMES as f32
    }

    /// Straight (non-premultiplied) RGBA, or `None` if there is nothing to draw.
    pub fn color_rgba(&self, progress: f32) -> Option<[u8; 4]> {
        let phase = self.phase();
        if !phase.is_visible() {
            return None;
        }
        let progress = progress.clamp(0.0, 1.0);
        let intensity = phase.intensity(progress);
        let [red, green, blue] = hsl_to_rgb(
            self.hue(progress),
            FULL_SATURATION * intensity,
            FULL_LIGHTNESS * intensity,
        );
        Some(color_as_bytes([red, green, blue, phase.alpha(progress)]))
    }
}

/// One displayed frame: the grid plus how far it is toward its next tick.
pub struct Frame<'a> {
    matrix: &'a CellMatrix,
    progress: f64,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(matrix: &'a CellMatrix, progress: f64) -> Self {
        Self { matrix, progress }
    }

    pub fn size(&self) -> GridSize {
        self.matrix.size()
    }

    /// In `[0, 1)`, like the scheduler's own progress.
    pub fn progress(&self) -> f32 {
        (self.progress as f32).min(LAST_PROGRESS)
    }

    pub fn matrix(&self) -> &'a CellMatrix {
        self.matrix
    }

    pub fn cells(&self) -> impl Iterator<Item = (Loc, CellView)> + 'a {
        self.matrix.views()
    }
}

/// Called once per displayed frame, whether or not the grid ticked.
pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    if saturation < 0.0001 {
        return [lightness, lightness, lightness];
    }

    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    [
        hue_to_rgb(p, q, hue + 1.0 / 3.0),
        hue_to_rgb(p, q, hue),
        hue_to_rgb(p, q, hue - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

// From https://en.wikipedia.org/wiki/Alpha_compositing, with the background
// treated as opaque.
pub fn alpha_blend_with_background(above: [u8; 4], below: [u8; 4]) -> [u8; 4] {
    if above[3] == 0xff {
        return above;
    }
    if above[3] == 0x00 {
        return below;
    }

    let above = color_as_fractions(above);
    let below = color_as_fractions(below);

    let above_alpha = above[3];
    let blend = |i: usize| above[i] * above_alpha + below[i] * (1.0 - above_alpha);
    color_as_bytes([blend(0), blend(1), blend(2), 1.0])
}

fn color_as_fractions(color: [u8; 4]) -> [f32; 4] {
    color.map(|channel| channel as f32 / 0xff as f32)
}

fn color_as_bytes(color: [f32; 4]) -> [u8; 4] {
    color.map(|channel| (channel.clamp(0.0, 1.0) * 0xff as f32).round() as u8)
}
