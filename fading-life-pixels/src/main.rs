#![deny(clippy::all)]
#![forbid(unsafe_code)]

use life_grid::{Random, Simulation};
use log::info;
use pixels_main_support::{Settings, animate};
use winit::error::EventLoopError;

fn main() -> Result<(), EventLoopError> {
    env_logger::init();
    info!("Click to reseed, scroll or use the arrow keys to change speed, Esc to quit");
    animate(Settings::default(), |grid_size, speed| {
        Simulation::new(grid_size, speed, Random::new())
    })
}
