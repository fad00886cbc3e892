use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentKind, BenchConfig};
use crate::runner::SessionRecord;

const CONFIDENCE: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in benchmark results")]
    MissingBaseline(String),
    #[error("agent '{0}' present in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind.clone()),
            );
            order.push(agent.name.clone());
        }

        Ok(Self {
            baseline,
            agents,
            agent_order: order,
        })
    }

    pub fn record_session(&mut self, record: &SessionRecord) -> Result<(), AnalyticsError> {
        let acc = self
            .agents
            .get_mut(&record.agent)
            .ok_or_else(|| AnalyticsError::UnknownAgent(record.agent.clone()))?;
        acc.record_session(record);
        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let baseline_report = reports
            .iter()
            .find(|report| report.name == self.baseline)
            .cloned()
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        let comparisons = reports
            .iter()
            .map(|report| {
                let p_value = if report.name == self.baseline {
                    1.0
                } else {
                    two_proportion_p_value(
                        report.wins,
                        report.sessions,
                        baseline_report.wins,
                        baseline_report.sessions,
                    )
                };
                ComparisonReport {
                    agent: report.name.clone(),
                    p_value,
                    sample_size: report.sessions,
                }
            })
            .collect();

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            agents: reports,
            comparisons,
        }
        .enrich())
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    sessions: usize,
    wins: usize,
    total_turns: u64,
    total_senses: u64,
    total_busts: u64,
    total_final_peak: f64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            sessions: 0,
            wins: 0,
            total_turns: 0,
            total_senses: 0,
            total_busts: 0,
            total_final_peak: 0.0,
        }
    }

    fn record_session(&mut self, record: &SessionRecord) {
        self.sessions += 1;
        if record.won {
            self.wins += 1;
        }
        self.total_turns += record.turns as u64;
        self.total_senses += record.senses_used as u64;
        self.total_busts += record.busts_used as u64;
        self.total_final_peak += record.final_peak_probability;
    }

    fn into_report(self) -> AgentReport {
        let sessions = self.sessions.max(1) as f64;
        let win_rate = self.wins as f64 / sessions;
        let ci95 = wilson_interval(self.wins, self.sessions);

        AgentReport {
            name: self.name,
            kind: self.kind,
            sessions: self.sessions,
            wins: self.wins,
            win_rate,
            ci95,
            avg_turns: self.total_turns as f64 / sessions,
            avg_senses: self.total_senses as f64 / sessions,
            avg_busts: self.total_busts as f64 / sessions,
            avg_final_peak: self.total_final_peak / sessions,
            delta_vs_baseline: 0.0, // Filled later once we know baseline report
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_rate = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.win_rate)
            .unwrap_or(0.0);

        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.win_rate - baseline_rate;
        }

        self
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Benchmark Summary\n\n");
        rows.push_str(&format!("Baseline agent: {}\n\n", self.baseline));
        rows.push_str("| Agent | Kind | Sessions | Win % | 95% CI | Δ vs baseline | Avg turns | Avg senses | Avg busts | Avg peak | p-value |\n");
        rows.push_str("|-------|------|----------|-------|--------|----------------|-----------|------------|-----------|----------|---------|\n");

        for agent in &self.agents {
            let comparison = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);

            rows.push_str(&format!(
                "| {name} | {kind:?} | {sessions} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {delta:+.1}% | {turns:.2} | {senses:.2} | {busts:.2} | {peak:.3} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                sessions = agent.sessions,
                win = agent.win_rate * 100.0,
                ci_low = agent.ci95.0 * 100.0,
                ci_high = agent.ci95.1 * 100.0,
                delta = agent.delta_vs_baseline * 100.0,
                turns = agent.avg_turns,
                senses = agent.avg_senses,
                busts = agent.avg_busts,
                peak = agent.avg_final_peak,
                pval = comparison,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("win_rate.png");
        let baseline = self.baseline.clone();
        let agents_snapshot = self.agents.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let mut agents = agents_snapshot;
            agents.sort_by(|a, b| {
                b.win_rate
                    .partial_cmp(&a.win_rate)
                    .expect("win rates are finite")
            });

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Win rate by agent", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..agents.len(), 0.0..1.0f64)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Win rate")
                .x_desc("Agent")
                .x_label_formatter(&|idx| {
                    agents
                        .get(*idx)
                        .map(|agent| agent.name.clone())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(agents.iter().enumerate().map(|(idx, agent)| {
                    let color = if agent.name == baseline { &BLUE } else { &GREEN };
                    Rectangle::new([(idx, 0.0), (idx + 1, agent.win_rate)], color.filled())
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub sessions: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub avg_turns: f64,
    pub avg_senses: f64,
    pub avg_busts: f64,
    pub avg_final_peak: f64,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

/// Wilson score interval for a win count; well-behaved at 0% and 100%.
fn wilson_interval(wins: usize, sessions: usize) -> (f64, f64) {
    if sessions == 0 {
        return (0.0, 0.0);
    }

    let normal = Normal::new(0.0, 1.0).unwrap();
    let z = normal.inverse_cdf(0.5 + CONFIDENCE / 2.0);
    let n = sessions as f64;
    let p = wins as f64 / n;

    let denominator = 1.0 + z * z / n;
    let center = (p + z * z / (2.0 * n)) / denominator;
    let margin = (z / denominator) * (p * (1.0 - p) / n + z * z / (4.0 * n * n)).sqrt();
    ((center - margin).max(0.0), (center + margin).min(1.0))
}

/// Two-sided two-proportion z-test against the baseline's win rate.
fn two_proportion_p_value(wins_a: usize, n_a: usize, wins_b: usize, n_b: usize) -> f64 {
    if n_a == 0 || n_b == 0 {
        return 1.0;
    }

    let p_a = wins_a as f64 / n_a as f64;
    let p_b = wins_b as f64 / n_b as f64;
    let pooled = (wins_a + wins_b) as f64 / (n_a + n_b) as f64;
    let variance = pooled * (1.0 - pooled) * (1.0 / n_a as f64 + 1.0 / n_b as f64);
    if variance <= 0.0 {
        return 1.0;
    }

    let z = (p_a - p_b).abs() / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).unwrap();
    let p = 2.0 * (1.0 - normal.cdf(z));
    p.clamp(0.0, 1.0)
}
