use crate::matrix::CellMatrix;
use crate::render::{Frame, Renderer};
use crate::scheduler::{FrameOutcome, Scheduler, Speed};
use crate::{GridSize, Loc, Random};
use log::{debug, info};

/// A grid together with the scheduler that drives it.
#[derive(Debug)]
pub struct Simulation {
    matrix: CellMatrix,
    scheduler: Scheduler,
    rand: Random,
}

impl Simulation {
    /// Starts from an empty grid whose first tick brings in a random seed.
    pub fn new(size: GridSize, speed: Speed, mut rand: Random) -> Self {
        info!(
            "Starting {}x{} grid at speed {}",
            size.width,
            size.height,
            speed.value()
        );
        Self {
            matrix: CellMatrix::with_seed(size, &mut rand),
            scheduler: Scheduler::new(speed),
            rand,
        }
    }

    pub fn matrix(&self) -> &CellMatrix {
        &self.matrix
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn speed(&self) -> f64 {
        self.scheduler.speed().value()
    }

    pub fn progress(&self) -> f64 {
        self.scheduler.progress()
    }

    pub fn add_seed(&mut self) {
        info!("Reseeding at generation {}", self.matrix.generation());
        self.matrix.add_seed(&mut self.rand);
    }

    pub fn seed_pattern(&mut self, live: &[Loc]) {
        self.matrix.seed_pattern(live);
    }

    pub fn set_speed(&mut self, value: f64) -> f64 {
        let speed = self.scheduler.set_speed(value);
        debug!("Speed {speed}");
        speed
    }

    pub fn adjust_speed(&mut self, delta: f64) -> f64 {
        let speed = self.scheduler.adjust_speed(delta);
        debug!("Speed {speed}");
        speed
    }

    /// Runs one animation frame: maybe ticks, then always renders.
    pub fn on_frame<R: Renderer>(&mut self, renderer: &mut R) -> FrameOutcome {
        let outcome = self.scheduler.advance_frame(&mut self.matrix);
        renderer.render(&Frame::new(&self.matrix, outcome.progress));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CellView, Phase};
    use crate::scheduler::SpeedBounds;

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(f32, Vec<CellView>)>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, frame: &Frame<'_>) {
            let views = frame.cells().map(|(_, view)| view).collect();
            self.frames.push((frame.progress(), views));
        }
    }

    fn simulation(speed: f64) -> Simulation {
        Simulation::new(
            GridSize::new(8, 6),
            Speed::new(speed, SpeedBounds::default()),
            Random::from_seed(11),
        )
    }

    #[test]
    fn renders_every_frame() {
        let mut simulation = simulation(25.0);
        let mut renderer = RecordingRenderer::default();
        let ticks = (0..10)
            .filter(|_| simulation.on_frame(&mut renderer).ticked)
            .count();
        assert_eq!(renderer.frames.len(), 10);
        assert_eq!(ticks, 2);
        assert!(renderer
            .frames
            .iter()
            .all(|(progress, views)| (0.0..1.0).contains(progress) && views.len() == 48));
    }

    #[test]
    fn initial_seed_fades_in() {
        let mut simulation = simulation(20.0);
        let mut renderer = RecordingRenderer::default();
        simulation.on_frame(&mut renderer);
        let (_, views) = &renderer.frames[0];
        assert!(views.iter().all(|view| !view.previous_alive));
        assert!(views.iter().any(|view| view.phase() == Phase::Reviving));
    }

    #[test]
    fn seed_shows_as_upcoming_transition() {
        let mut simulation = simulation(20.0);
        let mut renderer = RecordingRenderer::default();
        for _ in 0..5 {
            simulation.on_frame(&mut renderer);
        }
        assert_eq!(simulation.matrix().generation(), 1);
        let committed: Vec<bool> = simulation.matrix().cells_iter().map(|c| c.is_alive()).collect();

        simulation.seed_pattern(&[Loc::new(0, 0), Loc::new(5, 7)]);
        simulation.on_frame(&mut renderer);

        let (_, views) = renderer.frames.last().unwrap();
        let previous: Vec<bool> = views.iter().map(|view| view.previous_alive).collect();
        assert_eq!(previous, committed);
        let upcoming: Vec<usize> = views
            .iter()
            .enumerate()
            .filter(|(_, view)| view.next_alive)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(upcoming, vec![0, 47]);
        assert_eq!(simulation.matrix().generation(), 1);
    }

    #[test]
    fn random_reseed_waits_for_tick() {
        let mut simulation = simulation(50.0);
        let mut renderer = RecordingRenderer::default();
        simulation.on_frame(&mut renderer);
        simulation.on_frame(&mut renderer);
        let committed: Vec<bool> = simulation.matrix().cells_iter().map(|c| c.is_alive()).collect();

        simulation.add_seed();
        let seeded: Vec<bool> = simulation
            .matrix()
            .cells_iter()
            .map(|c| c.pending_alive())
            .collect();
        simulation.on_frame(&mut renderer);
        let (_, views) = renderer.frames.last().unwrap();
        assert_eq!(
            views.iter().map(|view| view.previous_alive).collect::<Vec<_>>(),
            committed
        );
        assert!(views.iter().all(|view| view.alive_frames == 0));

        simulation.on_frame(&mut renderer);
        let now: Vec<bool> = simulation.matrix().cells_iter().map(|c| c.is_alive()).collect();
        assert_eq!(now, seeded);
    }

    #[test]
    fn speed_controls_clamp() {
        let mut simulation = simulation(20.0);
        assert_eq!(simulation.adjust_speed(-50.0), 1.0);
        assert_eq!(simulation.set_speed(75.0), 75.0);
        assert_eq!(simulation.speed(), 75.0);
    }
}
