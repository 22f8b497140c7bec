// src/platform/ros.rs

//! ROS 2 adapter for the platform traits, built on r2r. Move commands are
//! published as goal poses, telemetry comes from the latest odometry sample,
//! captures take the latest frame from the matching image topic, and mission
//! reports go out as plain strings. Subscription streams are drained by a
//! local executor each time the node spins.

// Dependencies
use futures::StreamExt;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use log::{debug, error, info};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::{CameraKind, Frame, MissionReporter, MotionSystem, PlatformError, TelemetrySource};
use crate::pose::Pose;

/// Topic and node configuration for the ROS adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosConfig {
    /// Node name.
    pub node_name: String,
    /// Goal pose topic (published).
    pub goal_topic: String,
    /// Odometry topic (subscribed).
    pub odom_topic: String,
    /// Navigation camera image topic (subscribed).
    pub nav_camera_topic: String,
    /// Dock camera image topic (subscribed).
    pub dock_camera_topic: String,
    /// Mission report topic (published).
    pub report_topic: String,
    /// Frame id stamped on outgoing goals.
    pub frame_id: String,
}

impl Default for RosConfig {
    fn default() -> Self {
        RosConfig {
            node_name: "astrolabe".to_string(),
            goal_topic: "/astrolabe/goal".to_string(),
            odom_topic: "/odom".to_string(),
            nav_camera_topic: "/camera/nav/image_raw".to_string(),
            dock_camera_topic: "/camera/dock/image_raw".to_string(),
            report_topic: "/astrolabe/report".to_string(),
            frame_id: "map".to_string(),
        }
    }
}

type Latest<T> = Arc<Mutex<Option<T>>>;

fn latest<T>() -> Latest<T> {
    Arc::new(Mutex::new(None))
}

fn store<T>(cache: &Latest<T>, value: T) {
    *cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
}

fn take<T>(cache: &Latest<T>) -> Option<T> {
    cache.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Platform adapter speaking ROS 2 through r2r.
pub struct RosPlatform {
    node: r2r::Node,
    pool: LocalPool,
    goal_pub: r2r::Publisher<r2r::geometry_msgs::msg::PoseStamped>,
    report_pub: r2r::Publisher<r2r::std_msgs::msg::String>,
    latest_position: Latest<Point3<f64>>,
    latest_nav_frame: Latest<Frame>,
    latest_dock_frame: Latest<Frame>,
    last_position: Point3<f64>,
    frame_id: String,
}

impl RosPlatform {
    /// Creates the node, publishers and subscriptions.
    pub fn new(config: &RosConfig) -> Result<Self, PlatformError> {
        let ctx = r2r::Context::create().map_err(init_err)?;
        let mut node = r2r::Node::create(ctx, &config.node_name, "").map_err(init_err)?;

        let goal_pub = node
            .create_publisher::<r2r::geometry_msgs::msg::PoseStamped>(
                &config.goal_topic,
                r2r::QosProfile::default(),
            )
            .map_err(init_err)?;
        let report_pub = node
            .create_publisher::<r2r::std_msgs::msg::String>(
                &config.report_topic,
                r2r::QosProfile::default(),
            )
            .map_err(init_err)?;

        let pool = LocalPool::new();
        let spawner = pool.spawner();

        let latest_position = latest();
        let mut odom_sub = node
            .subscribe::<r2r::nav_msgs::msg::Odometry>(
                &config.odom_topic,
                r2r::QosProfile::default(),
            )
            .map_err(init_err)?;
        let position_cache = latest_position.clone();
        spawner
            .spawn_local(async move {
                while let Some(odom) = odom_sub.next().await {
                    let p = &odom.pose.pose.position;
                    store(&position_cache, Point3::new(p.x, p.y, p.z));
                }
            })
            .map_err(|e| PlatformError::Init(e.to_string()))?;

        let latest_nav_frame = latest();
        let mut nav_sub = node
            .subscribe::<r2r::sensor_msgs::msg::Image>(
                &config.nav_camera_topic,
                r2r::QosProfile::default(),
            )
            .map_err(init_err)?;
        let nav_cache = latest_nav_frame.clone();
        spawner
            .spawn_local(async move {
                while let Some(image) = nav_sub.next().await {
                    store(&nav_cache, image_to_frame(image));
                }
            })
            .map_err(|e| PlatformError::Init(e.to_string()))?;

        let latest_dock_frame = latest();
        let mut dock_sub = node
            .subscribe::<r2r::sensor_msgs::msg::Image>(
                &config.dock_camera_topic,
                r2r::QosProfile::default(),
            )
            .map_err(init_err)?;
        let dock_cache = latest_dock_frame.clone();
        spawner
            .spawn_local(async move {
                while let Some(image) = dock_sub.next().await {
                    store(&dock_cache, image_to_frame(image));
                }
            })
            .map_err(|e| PlatformError::Init(e.to_string()))?;

        info!("ROS platform up as node '{}'", config.node_name);
        Ok(RosPlatform {
            node,
            pool,
            goal_pub,
            report_pub,
            latest_position,
            latest_nav_frame,
            latest_dock_frame,
            last_position: Point3::origin(),
            frame_id: config.frame_id.clone(),
        })
    }

    /// Processes pending ROS work and drains subscription streams.
    fn spin(&mut self, budget: Duration) {
        self.node.spin_once(budget);
        self.pool.run_until_stalled();
    }

    fn publish_report(&mut self, text: String) {
        debug!("report: {}", text);
        let msg = r2r::std_msgs::msg::String { data: text };
        if let Err(e) = self.report_pub.publish(&msg) {
            error!("report publish failed: {}", e);
        }
    }
}

impl MotionSystem for RosPlatform {
    fn command_move(&mut self, target: &Pose) -> Result<(), PlatformError> {
        let v = target.orientation.vector();
        let msg = r2r::geometry_msgs::msg::PoseStamped {
            header: r2r::std_msgs::msg::Header {
                frame_id: self.frame_id.clone(),
                ..Default::default()
            },
            pose: r2r::geometry_msgs::msg::Pose {
                position: r2r::geometry_msgs::msg::Point {
                    x: target.position.x,
                    y: target.position.y,
                    z: target.position.z,
                },
                orientation: r2r::geometry_msgs::msg::Quaternion {
                    x: v[0],
                    y: v[1],
                    z: v[2],
                    w: target.orientation.scalar(),
                },
            },
        };
        self.goal_pub
            .publish(&msg)
            .map_err(|e| PlatformError::CommandRejected(e.to_string()))
    }
}

impl TelemetrySource for RosPlatform {
    fn current_position(&mut self) -> Point3<f64> {
        self.spin(Duration::from_millis(10));
        if let Some(position) = take(&self.latest_position) {
            self.last_position = position;
        }
        self.last_position
    }
}

impl CameraSource for RosPlatform {
    fn capture(&mut self, camera: CameraKind) -> Option<Frame> {
        self.spin(Duration::from_millis(10));
        match camera {
            CameraKind::Navigation => take(&self.latest_nav_frame),
            CameraKind::Dock => take(&self.latest_dock_frame),
        }
    }
}

impl MissionReporter for RosPlatform {
    fn mission_started(&mut self) {
        self.publish_report("mission_started".to_string());
    }

    fn site_info(&mut self, site: u32, label: &str, count: u32) {
        self.publish_report(format!("site_info {} {} {}", site, label, count));
    }

    fn patrol_complete(&mut self) {
        self.publish_report("patrol_complete".to_string());
    }

    fn target_recognized(&mut self) {
        self.publish_report("target_recognized".to_string());
    }

    fn target_snapshot(&mut self) {
        self.publish_report("target_snapshot".to_string());
    }

    fn mission_complete(&mut self) {
        self.publish_report("mission_complete".to_string());
    }
}

fn init_err(e: r2r::Error) -> PlatformError {
    PlatformError::Init(e.to_string())
}

fn image_to_frame(image: r2r::sensor_msgs::msg::Image) -> Frame {
    Frame {
        width: image.width,
        height: image.height,
        data: image.data,
    }
}

// Weaknesses:
// - Captures hand back the latest cached frame, not a frame taken at call
//   time; a stale image can survive one capture after the robot moves.
// - Telemetry falls back to the last known position until the first odometry
//   sample lands.
