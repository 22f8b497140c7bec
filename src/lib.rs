//! Astrolabe - patrol-and-survey mission stack for a free-flying robot
//!
//! This library sequences movement to survey waypoints with confirmed
//! arrival, aggregates per-site item observations, and resolves an
//! operator's clue to the site holding the target item. Cameras, detection
//! backends and the robot itself are consumed through capability traits.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod mission;
pub mod navigation;
pub mod perception;
pub mod platform;
pub mod pose;
pub mod survey;

// Re-export commonly used items for easier access
pub use mission::{MissionDriver, MissionPhase, MissionPlan, MissionReport, Waypoint};
pub use navigation::{MoveOutcome, MoveRequest, NavigationError, Navigator};
pub use perception::{Detection, ItemDetector};
pub use platform::{
    CameraKind, Frame, MissionReporter, MotionSystem, Platform, PlatformError, TelemetrySource,
};
pub use pose::Pose;
pub use survey::{SiteId, SiteMap, SiteObservation};

use std::time::Duration;

/// Top-level mission configuration, loaded from YAML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MissionConfig {
    /// Navigation limits shared by every move.
    pub navigation: NavigationLimits,
    /// The tour itself.
    pub plan: PlanConfig,
}

/// Navigation limits applied to every move of the mission.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NavigationLimits {
    /// Arrival tolerance in meters.
    pub tolerance_m: f64,
    /// Command retries per move (total attempts is this plus one).
    pub command_retries: u32,
    /// Arrival deadline per move, in seconds.
    pub arrival_timeout_s: f64,
    /// Pause between telemetry samples, in milliseconds.
    pub poll_interval_ms: u64,
}

/// Tour definition: sites, operator pose and fallback site.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanConfig {
    /// Survey sites in visit order.
    pub sites: Vec<SiteConfig>,
    /// Operator waypoint.
    pub operator: PoseConfig,
    /// Site to approach when the clued target cannot be located.
    pub default_site: SiteId,
}

/// One configured survey site.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SiteConfig {
    /// Site ordinal.
    pub id: SiteId,
    /// Position in meters, world frame.
    pub position: [f64; 3],
    /// Orientation quaternion components (x, y, z, w); normalized on load.
    pub orientation: [f64; 4],
}

/// A configured pose without a site id.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PoseConfig {
    /// Position in meters, world frame.
    pub position: [f64; 3],
    /// Orientation quaternion components (x, y, z, w); normalized on load.
    pub orientation: [f64; 4],
}

impl PoseConfig {
    fn to_pose(&self, what: &str) -> Result<Pose, ConfigError> {
        Pose::from_parts(self.position, self.orientation).ok_or_else(|| {
            ConfigError::Invalid(format!("{}: non-finite or degenerate pose", what))
        })
    }
}

impl MissionConfig {
    /// Loads and validates a mission file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: MissionConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the mission cannot fly with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        if !(nav.tolerance_m > 0.0) || !nav.tolerance_m.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "tolerance_m must be positive, got {}",
                nav.tolerance_m
            )));
        }
        if !(nav.arrival_timeout_s > 0.0) || !nav.arrival_timeout_s.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "arrival_timeout_s must be positive, got {}",
                nav.arrival_timeout_s
            )));
        }
        if self.plan.sites.is_empty() {
            return Err(ConfigError::Invalid("tour has no sites".to_string()));
        }
        for site in &self.plan.sites {
            let count = self.plan.sites.iter().filter(|s| s.id == site.id).count();
            if count > 1 {
                return Err(ConfigError::Invalid(format!(
                    "site id {} appears {} times in the tour",
                    site.id, count
                )));
            }
            PoseConfig {
                position: site.position,
                orientation: site.orientation,
            }
            .to_pose(&format!("site {}", site.id))?;
        }
        self.plan.operator.to_pose("operator")?;
        if !self.plan.sites.iter().any(|s| s.id == self.plan.default_site) {
            return Err(ConfigError::Invalid(format!(
                "default_site {} is not part of the tour",
                self.plan.default_site
            )));
        }
        Ok(())
    }

    /// Builds the mission plan this configuration describes.
    pub fn to_plan(&self) -> Result<MissionPlan, ConfigError> {
        self.validate()?;
        let mut sites = Vec::with_capacity(self.plan.sites.len());
        for site in &self.plan.sites {
            let pose = PoseConfig {
                position: site.position,
                orientation: site.orientation,
            }
            .to_pose(&format!("site {}", site.id))?;
            sites.push(Waypoint { id: site.id, pose });
        }
        Ok(MissionPlan {
            sites,
            operator: self.plan.operator.to_pose("operator")?,
            default_site: self.plan.default_site,
            tolerance_m: self.navigation.tolerance_m,
            command_retries: self.navigation.command_retries,
            arrival_timeout: Duration::from_secs_f64(self.navigation.arrival_timeout_s),
        })
    }

    /// Builds a navigator with this configuration's poll interval.
    pub fn navigator(&self) -> Navigator {
        Navigator::new(Duration::from_millis(self.navigation.poll_interval_ms))
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        let level = [0.0, 0.0, 0.0, 1.0];
        MissionConfig {
            navigation: NavigationLimits {
                tolerance_m: 0.05,
                command_retries: 2,
                arrival_timeout_s: 30.0,
                poll_interval_ms: 250,
            },
            plan: PlanConfig {
                sites: vec![
                    SiteConfig {
                        id: 1,
                        position: [10.95, -10.58, 5.195],
                        orientation: level,
                    },
                    SiteConfig {
                        id: 2,
                        position: [10.925, -8.875, 3.76203],
                        orientation: level,
                    },
                    SiteConfig {
                        id: 3,
                        position: [10.925, -7.925, 3.76093],
                        orientation: level,
                    },
                    SiteConfig {
                        id: 4,
                        position: [9.866984, -6.8525, 4.945],
                        orientation: level,
                    },
                ],
                operator: PoseConfig {
                    position: [11.143, -6.7607, 4.9654],
                    orientation: [0.0, 0.0, 0.707, 0.707],
                },
                default_site: 1,
            },
        }
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// The mission file could not be read.
    Io(String),
    /// The mission file could not be parsed as YAML.
    Parse(String),
    /// The mission file parsed but holds unusable values.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "config invalid: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
