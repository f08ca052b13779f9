//! Headless runner: mount one simulation and print readouts as JSON lines
//!
//! Usage: `biolab [enzyme|membrane|gene|atp|protein|mutation] [--seed N]
//! [--seconds S] [--report-every S] [--config settings.json]`

use biolab::consts::SIM_DT;
use biolab::{Lab, LabResult, Settings};

fn run(settings: &Settings) -> LabResult<()> {
    log::info!(
        "Running {} for {}s with seed: {}",
        settings.simulation.title(),
        settings.seconds,
        settings.seed
    );
    log::debug!("Effective settings: {}", settings.to_json()?);

    let mut lab = Lab::new(settings.seed);
    lab.mount(settings.simulation);
    lab.set_controls(settings.controls.clone());

    let ticks = (settings.seconds.max(0.0) / SIM_DT).round() as u64;
    let report_ticks = ((settings.report_every / SIM_DT).round() as u64).max(1);
    for tick in 1..=ticks {
        lab.step();
        if tick % report_ticks == 0 || tick == ticks {
            if let Some(readout) = lab.readout() {
                println!("{}", serde_json::to_string(&readout)?);
            }
        }
    }

    lab.unmount();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match Settings::default().apply_args(std::env::args().skip(1)) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run(&settings) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
