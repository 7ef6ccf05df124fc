#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Box-Push Puzzle
//!
//! An agent pushes boxes onto goal markers in a walled room. This crate holds
//! the puzzle rules and a ready-made environment for training harnesses.
//!
//! ## Key Components
//!
//! -   **Episode controller:** [`EpisodeController`] reads a [`Scene`]
//!     snapshot each tick, pairs boxes with goals, and returns a shaped
//!     reward with a terminal/success signal.
//! -   **Stuck detection:** [`StuckDetector`] probes the four ground-plane
//!     directions around a box through any [`physics::RayCaster`].
//! -   **Environment:** [`BoxPushEnv`] wires the controller to a
//!     [`physics::KinematicWorld`], random layouts and a padded observation
//!     vector behind the [`Env`] trait.
//! -   **Configuration:** [`PuzzleConfig`] holds every constant and loads
//!     from JSON.
//!
//! ## Usage
//!
//! ```rust
//! use puzzle::{BoxPushEnv, Env, PuzzleConfig};
//!
//! let mut env = BoxPushEnv::new(PuzzleConfig::default(), Some(0))?;
//! let obs = env.reset()?;
//! assert_eq!(obs.len(), env.obs_size());
//! let t = env.step(&[1.0, 0.0])?;
//! assert!(t.reward.is_finite());
//! # Ok::<(), puzzle::PuzzleError>(())
//! ```

pub mod config;
pub mod controller;
pub mod env;
pub mod error;
pub mod matching;
pub mod observation;
pub mod placement;
pub mod policy;
pub mod reward;
pub mod scene;
pub mod stuck;

pub use config::{
    Assignment, LayoutConfig, MatchingConfig, MovementConfig, ObservationConfig, ProgressPolicy,
    PuzzleConfig, RewardConfig, StuckConfig,
};
pub use controller::{
    EpisodeController, EpisodeState, FailureCause, MatchedPair, PendingTick, Phase, StepOutcome,
};
pub use env::{BoxPushEnv, Env, Transition};
pub use error::PuzzleError;
pub use placement::{Placement, Spawner};
pub use policy::{Axis, AxisInput, HeldAxes, HeuristicPolicy, IdlePolicy, Policy, RandomPolicy};
pub use reward::RewardBreakdown;
pub use scene::{Agent, Goal, PuzzleBox, Scene};
pub use stuck::StuckDetector;
