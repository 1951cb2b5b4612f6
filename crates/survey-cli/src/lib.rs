//! Survey CLI - Command line tools for the survey mission planner.
//!
//! This crate provides the CLI binaries:
//! - plan_mission: plan a mission from a JSON snapshot
//! - survey_demo: random survey scenario comparing the route algorithms

pub mod config;
pub mod report;
pub mod runner;
pub mod scenario;

pub use config::CliConfig;
pub use report::{render_summary, MissionReport};
pub use runner::run_with_deadline;
pub use scenario::{create_demo_scenario, load_request, DemoScenario};
