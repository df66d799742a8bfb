//! Scripted scenarios run against the in-memory host.

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use edge_anim::animation::schema::AnimationSpec;
use edge_anim::animation::{AnimationEvent, AnimationSample, Animator, Keyframe, Timing};
use edge_anim::host::memory::{MemoryElement, MemoryHost, RecordedWrite};
use edge_config::EdgeConfig;
use serde::{Deserialize, Serialize};

/// Upper bound on timers run while draining after the last step.
const DRAIN_LIMIT: usize = 10_000;

/// A control call applied at a point in virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Play,
    Pause,
    Cancel,
    Finish,
    Reverse,
    Sample,
    Seek(f64),
    Rate(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Virtual milliseconds at which the action runs.
    pub at: f64,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub keyframes: Vec<Keyframe>,
    pub timing: Timing,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json).context("invalid scenario JSON")?;
        AnimationSpec::new(scenario.keyframes.clone(), scenario.timing.clone()).validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("failed to load scenario {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub at: f64,
    pub action: Action,
    pub sample: AnimationSample,
}

/// Everything observable after a scenario ran.
#[derive(Debug, Clone)]
pub struct Report {
    pub name: String,
    pub steps: Vec<StepReport>,
    pub final_sample: AnimationSample,
    pub writes: Vec<RecordedWrite>,
    pub events: Vec<AnimationEvent>,
    pub stylesheet: String,
}

pub fn run(scenario: &Scenario, config: &EdgeConfig) -> Result<Report> {
    let host = MemoryHost::new();
    let animator = Animator::with_config(host.host(), config);
    let element = Rc::new(MemoryElement::new());
    let animation = animator.animate(element.clone(), &scenario.keyframes, scenario.timing.clone());
    log::info!(
        "animating {} (total {} ms)",
        animation.name(),
        animation.total_active_duration()
    );

    let mut steps = scenario.steps.clone();
    steps.sort_by(|a, b| a.at.total_cmp(&b.at));

    let mut reports = Vec::with_capacity(steps.len());
    for step in steps {
        host.run_until(step.at);
        match step.action {
            Action::Play => animation.play(),
            Action::Pause => animation.pause(),
            Action::Cancel => animation.cancel(),
            Action::Finish => animation.finish(),
            Action::Reverse => animation.reverse(),
            Action::Sample => {}
            Action::Seek(time) => animation.seek(time),
            Action::Rate(rate) => animation.set_rate(rate),
        }
        let sample = animation.sample();
        log::debug!("t={} {:?} -> {:?}", host.now(), step.action, sample);
        reports.push(StepReport {
            at: host.now(),
            action: step.action,
            sample,
        });
    }

    host.timers().run_all(DRAIN_LIMIT);
    let final_sample = animation.last_sample();
    let stylesheet = host
        .document()
        .style_sheets()
        .first()
        .map(|sheet| sheet.contents())
        .unwrap_or_default();

    Ok(Report {
        name: animation.name(),
        steps: reports,
        final_sample,
        writes: element.writes(),
        events: animator.drain_events(),
        stylesheet,
    })
}
