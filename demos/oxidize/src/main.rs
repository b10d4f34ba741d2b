use std::env;
use std::fs;

use log::info;
use ndarray::Array2;
use oxide::d2::{Observer, Simulation};
use oxide::{BoxError, SimulationParameters};

struct Frames {
    ticks: usize,
}

impl Observer for Frames {
    fn observe(
        &mut self,
        tick: usize,
        elapsed: f64,
        snapshot: &Array2<u8>,
    ) -> Result<(), BoxError> {
        image_util::save_cell_states("oxidation", tick, snapshot)?;
        info!("frame {}: {:.2} hours", tick, elapsed / 3600.0);

        eprint!("\r {} / {}", tick + 1, self.ticks);
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let params = match env::args().nth(1) {
        Some(path) => SimulationParameters::from_path(path)?,
        None => SimulationParameters::default(),
    };

    fs::create_dir_all("out")?;

    let mut frames = Frames {
        ticks: params.ticks(),
    };
    let mut sim = Simulation::new(params)?;
    let census = sim.run(&mut frames)?;

    eprintln!(
        "\r {} / {}: {} metallic, {} oxide, {} void",
        sim.tick(),
        frames.ticks,
        census.metallic,
        census.oxide,
        census.void
    );

    Ok(())
}
