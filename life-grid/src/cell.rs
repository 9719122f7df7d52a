use crate::render::CellView;

/// Ages saturate here; older cells all render the same.
pub const MAX_ALIVE_FRAMES: u8 = 12;

/// B3/S23: a live cell survives with two or three live neighbors, a dead
/// cell is born with exactly three.
pub fn next_alive(alive: bool, live_neighbors: usize) -> bool {
    match (alive, live_neighbors) {
        (true, 0..=1) => false, // underpopulation
        (true, 2..=3) => true,
        (true, _) => false, // overpopulation
        (false, 3) => true,
        (false, _) => false,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    alive: bool,
    pending_alive: bool,
    alive_frames: u8,
}

impl Cell {
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// The state the next commit will install.
    pub fn pending_alive(&self) -> bool {
        self.pending_alive
    }

    pub fn alive_frames(&self) -> u8 {
        self.alive_frames
    }

    pub fn view(&self) -> CellView {
        CellView {
            previous_alive: self.alive,
            next_alive: self.pending_alive,
            alive_frames: self.alive_frames,
        }
    }

    pub(crate) fn set_pending(&mut self, alive: bool) {
        self.pending_alive = alive;
    }

    pub(crate) fn reseed(&mut self, alive: bool) {
        self.pending_alive = alive;
        self.alive_frames = 0;
    }

    pub(crate) fn commit(&mut self) {
        self.alive = self.pending_alive;
        if self.alive {
            self.alive_frames = (self.alive_frames + 1).min(MAX_ALIVE_FRAMES);
        } else {
            self.alive_frames = 0;
        }
    }
}
