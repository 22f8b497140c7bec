// src/main.rs
// Entry point for Astrolabe: flies the full survey mission against the
// simulated platform, with a scripted detector standing in for the real
// recognition backends.

// Imports dependencies and Astrolabe modules.
// - env_logger: Logging for debugging.
// - Astrolabe modules: mission driver, simulated platform, detection types.
use astrolabe::platform::sim::{ScriptedDetector, SimPlatform, tagged_frame};
use astrolabe::{Detection, MissionConfig, MissionDriver};
use log::{info, warn};
use nalgebra::Point3;
use std::error::Error;
use std::path::Path;

/// Main function to initialize and run one simulated mission.
fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging for debugging
    env_logger::init();
    info!("Starting Astrolabe mission demo...");

    // Load the mission file, falling back to the built-in mission
    let config = match std::env::args().nth(1) {
        Some(path) => MissionConfig::load(&path)?,
        None => {
            let default_path = "config/mission.yaml";
            if Path::new(default_path).exists() {
                MissionConfig::load(default_path)?
            } else {
                warn!("no mission file given, using the built-in mission");
                MissionConfig::default()
            }
        }
    };

    // Simulated robot: one frame queued per site, then the operator's clue
    let mut platform = SimPlatform::new(Point3::new(9.815, -9.806, 4.293));
    for tag in 1..=5u8 {
        platform.push_frame(tagged_frame(tag));
    }

    // Scripted detections: landmarks at the sites, the clue shows a treasure
    let detector = ScriptedDetector::new()
        .on_tag(1, vec![Detection::new("coral", 3.0), Detection::new("coin", 1.0)])
        .on_tag(2, vec![Detection::new("crystal", 2.0)])
        .on_tag(3, vec![Detection::new("key", 5.0), Detection::new("shell", 5.0)])
        .on_tag(4, vec![Detection::new("coin", 1.0)])
        .on_tag(5, vec![Detection::new("coral", 2.0), Detection::new("crystal", 4.0)]);

    // Fly the mission
    let mut driver = MissionDriver::new(config.to_plan()?, config.navigator());
    let report = driver.run(&mut platform, &detector);

    // Summarize
    for (site, outcome) in &report.site_moves {
        info!("site {}: move {:?}", site, outcome);
    }
    for (site, observation) in &report.observations {
        info!(
            "site {}: {} (strength {})",
            site, observation.label, observation.strength
        );
    }
    match report.target_site {
        Some(site) => info!(
            "target '{}' located at site {}",
            report.target_label, site
        ),
        None => warn!(
            "target '{}' not located, fell back to the default site",
            report.target_label
        ),
    }
    info!("Astrolabe mission demo completed");
    Ok(())
}
