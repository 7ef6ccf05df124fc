#![deny(clippy::all, clippy::pedantic)]
//! # Box-Push Runtime
//!
//! Drives one or more [`BoxPushEnv`] instances through a number of episodes
//! with a built-in policy and reports how each episode ended. Episodes that
//! reach `--max-steps` without terminating are truncated here; the puzzle
//! itself has no step budget.
//!
//! Independent environments run on their own scoped threads with no shared
//! state. Each gets `seed + index` so a seeded run is reproducible.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use puzzle::{BoxPushEnv, Env, FailureCause, IdlePolicy, Policy, PuzzleConfig, PuzzleError, RandomPolicy};
use serde::Serialize;

#[derive(Parser, Debug, Clone)]
#[command(name = "box_push", about = "Run box-push puzzle episodes headless")]
pub struct Args {
    /// JSON puzzle config; defaults are used for anything it leaves out
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Episodes per environment
    #[arg(long, default_value_t = 10)]
    pub episodes: usize,
    /// Truncate an episode after this many steps
    #[arg(long, default_value_t = 500)]
    pub max_steps: usize,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = PolicyKind::Random)]
    pub policy: PolicyKind,
    /// Independent environments stepped in parallel
    #[arg(long, default_value_t = 1)]
    pub envs: usize,
    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Random,
    Idle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    Success,
    Failure,
    Truncated,
}

#[derive(Clone, Debug, Serialize)]
pub struct EpisodeSummary {
    pub env: usize,
    pub episode: usize,
    pub steps: usize,
    #[serde(rename = "return")]
    pub total_reward: f32,
    pub ending: Ending,
    pub matched: usize,
    pub failure: Option<FailureCause>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub episodes: Vec<EpisodeSummary>,
    pub successes: usize,
    pub failures: usize,
    pub truncated: usize,
    pub mean_return: f32,
}

impl RunSummary {
    #[allow(clippy::cast_precision_loss)]
    fn from_episodes(episodes: Vec<EpisodeSummary>) -> Self {
        let count = |ending| episodes.iter().filter(|e| e.ending == ending).count();
        let mean_return = if episodes.is_empty() {
            0.0
        } else {
            episodes.iter().map(|e| e.total_reward).sum::<f32>() / episodes.len() as f32
        };
        Self {
            successes: count(Ending::Success),
            failures: count(Ending::Failure),
            truncated: count(Ending::Truncated),
            mean_return,
            episodes,
        }
    }
}

/// Keeps the policy's RNG stream apart from the spawner's.
fn policy_seed(env_seed: Option<u64>) -> Option<u64> {
    env_seed.map(|s| s ^ 0x9E37_79B9)
}

fn make_policy(kind: PolicyKind, seed: Option<u64>) -> Box<dyn Policy> {
    match kind {
        PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
        PolicyKind::Idle => Box::new(IdlePolicy),
    }
}

fn run_env(index: usize, config: PuzzleConfig, args: &Args) -> Result<Vec<EpisodeSummary>, PuzzleError> {
    let seed = args.seed.map(|s| s.wrapping_add(index as u64));
    let mut env = BoxPushEnv::new(config, seed)?;
    let mut policy = make_policy(args.policy, policy_seed(seed));
    let mut summaries = Vec::with_capacity(args.episodes);

    for episode in 0..args.episodes {
        let mut obs = env.reset()?;
        let mut total_reward = 0.0;
        let mut ending = Ending::Truncated;
        let mut failure = None;

        for _ in 0..args.max_steps {
            let t = env.step(&policy.act(&obs))?;
            total_reward += t.reward;
            obs = t.obs;
            if t.done {
                ending = if t.success { Ending::Success } else { Ending::Failure };
                failure = t.info.failure;
                break;
            }
        }

        let summary = EpisodeSummary {
            env: index,
            episode,
            steps: env.steps(),
            total_reward,
            ending,
            matched: env.controller().matched_count(),
            failure,
        };
        tracing::info!(
            env = index,
            episode,
            steps = summary.steps,
            total_reward,
            matched = summary.matched,
            ending = ?ending,
            "episode finished"
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Run every environment to completion and collect the episode summaries.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, an environment fails to
/// build or step, or a worker thread panics.
pub fn run(args: &Args) -> Result<RunSummary> {
    let config = match &args.config {
        Some(path) => PuzzleConfig::from_path(path)
            .with_context(|| format!("loading puzzle config from {}", path.display()))?,
        None => PuzzleConfig::default(),
    };
    if args.envs == 0 {
        return Err(anyhow!("--envs must be at least 1"));
    }

    tracing::info!(
        envs = args.envs,
        episodes = args.episodes,
        max_steps = args.max_steps,
        policy = ?args.policy,
        "starting run"
    );

    let results: Vec<Result<Vec<EpisodeSummary>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..args.envs)
            .map(|i| {
                let config = config.clone();
                scope.spawn(move || run_env(i, config, args))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(i, h)| {
                h.join()
                    .map_err(|_| anyhow!("environment {i} panicked"))?
                    .with_context(|| format!("environment {i}"))
            })
            .collect()
    });

    let mut episodes = Vec::new();
    for result in results {
        episodes.extend(result?);
    }

    let summary = RunSummary::from_episodes(episodes);
    tracing::info!(
        successes = summary.successes,
        failures = summary.failures,
        truncated = summary.truncated,
        mean_return = summary.mean_return,
        "run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_and_spawner_use_different_seeds() {
        assert_eq!(policy_seed(None), None);
        for seed in [0, 1, 42, u64::MAX] {
            let policy = policy_seed(Some(seed)).unwrap();
            assert_ne!(policy, seed);

            let mut spawn = fastrand::Rng::with_seed(seed);
            let mut act = fastrand::Rng::with_seed(policy);
            assert_ne!(spawn.u64(..), act.u64(..));
        }
    }
}
