//! Headless lock-on симуляция
//!
//! Спавнит demo арену, прогоняет скриптованный input и печатает lock trace.
//! Опционально: путь к JSON с LockOnConfig первым аргументом.

use std::error::Error;

use lockon_simulation::scenario::{spawn_arena, ArenaLayout, LockTrace, ScenarioPlugin};
use lockon_simulation::{create_headless_app, log_info, LockOnConfig, SimulationPlugin};

fn load_config(path: &str) -> Result<LockOnConfig, Box<dyn Error>> {
    let json = std::fs::read_to_string(path)?;
    let config = LockOnConfig::from_json_str(&json)?;
    log_info(&format!("⚙️ Loaded lock-on config from {}", path));
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    let seed = 42;
    println!("Starting lock-on headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin::default(), ScenarioPlugin { scripted: true }));

    let mut layout = ArenaLayout::default();
    if let Some(path) = std::env::args().nth(1) {
        layout.config = load_config(&path)?;
    }
    spawn_arena(app.world_mut(), &layout);

    // ~10 секунд симуляции при 60Hz
    for frame in 0..600 {
        app.update();

        if frame % 100 == 0 {
            let entity_count = app.world().entities().len();
            println!("Frame {}: {} entities", frame, entity_count);
        }
    }

    let trace = app.world().resource::<LockTrace>();
    log_info(&format!("📜 Lock trace ({} entries):", trace.entries.len()));
    for entry in &trace.entries {
        println!(
            "  tick {:>4}: {} {} → {}",
            entry.tick,
            if entry.locked { "LOCK  " } else { "UNLOCK" },
            entry.owner,
            entry.target
        );
    }

    println!("Simulation complete!");
    Ok(())
}
