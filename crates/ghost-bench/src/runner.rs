use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, AgentKind, BenchConfig, ResolvedOutputs};
use ghost_bot::policy::{GreedyConfig, GreedyPolicy, PlayerAction, Policy, PolicyContext, SweepPolicy};
use ghost_core::game::config::{ConfigError, SessionConfig};
use ghost_core::game::session::{GameSession, SessionError, SessionState};

/// Primary entry point for orchestrating benchmark runs. Every agent plays
/// the same seed sequence, so all of them face identical target placements.
pub struct BenchRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
    session_config: SessionConfig,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub sessions_per_agent: usize,
    pub agents: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
}

/// One JSONL row per finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub agent: String,
    pub kind: AgentKind,
    pub session_index: usize,
    pub seed: u64,
    pub won: bool,
    pub turns: u32,
    pub senses_used: u32,
    pub busts_used: u32,
    pub final_peak_probability: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serializing session row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid session configuration: {0}")]
    Session(#[from] ConfigError),
    #[error("agent '{agent}' issued a rejected action in session {session}: {source}")]
    RejectedAction {
        agent: String,
        session: usize,
        #[source]
        source: SessionError,
    },
    #[error("agent '{agent}' failed to finish session {session} within the turn limit")]
    Stalled { agent: String, session: usize },
    #[error("invalid parameters for agent '{agent}': {message}")]
    Params { agent: String, message: String },
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl BenchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let session_config = config.sessions.session;
        session_config.validate()?;

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            session_config,
            config,
            outputs,
        })
    }

    /// Execute the benchmark, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        let mut rows_written = 0usize;

        let mut rng = StdRng::seed_from_u64(self.config.sessions.seed.unwrap_or(0));
        let seeds: Vec<u64> = (0..self.config.sessions.count)
            .map(|_| rng.next_u64())
            .collect();

        for agent in &self.config.agents {
            for (session_index, seed) in seeds.iter().enumerate() {
                let record = self.play_session(agent, session_index, *seed)?;
                analytics.record_session(&record)?;
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
                rows_written += 1;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        let telemetry_path = if self.logging_enabled {
            self.outputs
                .summary_md
                .parent()
                .map(|dir| dir.join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            sessions_per_agent: self.config.sessions.count,
            agents: self.config.agents.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            telemetry_path,
        })
    }

    fn play_session(
        &self,
        agent: &AgentConfig,
        session_index: usize,
        seed: u64,
    ) -> Result<SessionRecord, RunnerError> {
        let mut session = GameSession::with_seed(&self.session_config, seed)?;
        let mut policy = build_policy(agent)?;

        // Every turn spends a sense or a bust, so a session can never take
        // more turns than the combined opening resources.
        let turn_limit = self.session_config.sense_budget + self.session_config.bust_attempts;
        let mut turns = 0u32;
        let mut senses_used = 0u32;
        let mut busts_used = 0u32;

        while !session.is_terminal() {
            if turns >= turn_limit {
                return Err(RunnerError::Stalled {
                    agent: agent.name.clone(),
                    session: session_index,
                });
            }

            let ctx = PolicyContext {
                grid: session.grid(),
                status: session.status(),
                belief: session.belief(),
                last_observation: session.last_observation(),
            };

            let rejected = |source| RunnerError::RejectedAction {
                agent: agent.name.clone(),
                session: session_index,
                source,
            };
            match policy.choose(&ctx) {
                PlayerAction::Sense(cell) => {
                    session.query(cell).map_err(rejected)?;
                    senses_used += 1;
                }
                PlayerAction::Bust(cell) => {
                    session.bust(cell).map_err(rejected)?;
                    busts_used += 1;
                }
            }
            turns += 1;
        }

        policy.reset();

        let won = session.state() == SessionState::Won;
        let (_, final_peak_probability) = session.belief().peak();
        event!(
            Level::DEBUG,
            agent = %agent.name,
            session_index,
            seed,
            won,
            turns,
            "session complete"
        );

        Ok(SessionRecord {
            agent: agent.name.clone(),
            kind: agent.kind.clone(),
            session_index,
            seed,
            won,
            turns,
            senses_used,
            busts_used,
            final_peak_probability,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GreedyOverrides {
    bust_threshold: Option<f64>,
    sense_reserve: Option<u32>,
}

fn build_policy(agent: &AgentConfig) -> Result<Box<dyn Policy>, RunnerError> {
    match agent.kind {
        AgentKind::Greedy => {
            let overrides: GreedyOverrides = serde_yaml::from_value(agent.params.clone())
                .map_err(|err| RunnerError::Params {
                    agent: agent.name.clone(),
                    message: err.to_string(),
                })?;

            let mut config = GreedyConfig::from_env();
            if let Some(threshold) = overrides.bust_threshold {
                config.bust_threshold = threshold.clamp(0.05, 0.99);
            }
            if let Some(reserve) = overrides.sense_reserve {
                config.sense_reserve = reserve;
            }
            Ok(Box::new(GreedyPolicy::new(config)))
        }
        AgentKind::Sweep => Ok(Box::new(SweepPolicy::new())),
    }
}
