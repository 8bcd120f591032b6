//! Replays person match page scenarios against the in-memory store and router
//! and prints every recorded frame as one JSON line.

#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use person_match_sync::{
    ControllerConfig, Fixture, HistoryMode, PageEvent, PageSession, PersonMatchConfig,
    StaleFetchPolicy, StoreConfig, verify_no_flicker,
};
use serde::Deserialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "person-match-harness")]
#[command(about = "Replay person match page scenarios and print rendered frames")]
pub struct Args {
    /// Scenario file (JSON)
    #[arg(long)]
    pub scenario: PathBuf,
    /// Fail if any frame rendered a mode switch the URL did not ask for
    #[arg(long)]
    pub check: bool,
    /// Flush deferred store writes and resolve pending fetches after the last step
    #[arg(long)]
    pub settle: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub initial_href: String,
    #[serde(default)]
    pub fixture: Fixture,
    #[serde(default)]
    pub controller: ScenarioControllerOptions,
    #[serde(default)]
    pub store: ScenarioStoreOptions,
    #[serde(default)]
    pub steps: Vec<PageEvent>,
}

/// Controller settings a scenario may pin. Unset fields keep the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ScenarioControllerOptions {
    #[serde(default)]
    pub toggle_history: Option<HistoryMode>,
}

impl ScenarioControllerOptions {
    #[must_use]
    pub fn merge(self, base: ControllerConfig) -> ControllerConfig {
        ControllerConfig {
            toggle_history: self.toggle_history.unwrap_or(base.toggle_history),
        }
    }
}

/// Store settings a scenario may pin. Unset fields keep the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ScenarioStoreOptions {
    #[serde(default)]
    pub defer_writes: Option<bool>,
    #[serde(default)]
    pub stale_fetch_policy: Option<StaleFetchPolicy>,
}

impl ScenarioStoreOptions {
    #[must_use]
    pub fn merge(self, base: StoreConfig) -> StoreConfig {
        StoreConfig {
            defer_writes: self.defer_writes.unwrap_or(base.defer_writes),
            stale_fetch_policy: self.stale_fetch_policy.unwrap_or(base.stale_fetch_policy),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("decode scenario {}", path.display()))
    }

    /// Settings spelled out in the scenario take precedence over `base`, field by field.
    #[must_use]
    pub fn config(&self, base: PersonMatchConfig) -> PersonMatchConfig {
        PersonMatchConfig {
            controller: self.controller.merge(base.controller),
            store: self.store.merge(base.store),
        }
    }
}

pub fn replay(
    scenario: &Scenario,
    config: PersonMatchConfig,
    settle: bool,
) -> Result<PageSession> {
    let mut session = PageSession::open(&scenario.initial_href, scenario.fixture.clone(), config)
        .with_context(|| format!("open {}", scenario.initial_href))?;

    for (step, event) in scenario.steps.iter().enumerate() {
        let outcome = session
            .dispatch(event.clone())
            .with_context(|| format!("step {step} ({event:?})"))?;
        if let Some(outcome) = outcome {
            info!(step, ?outcome, "toggle handled");
        }
    }

    if settle {
        session.settle();
    }
    Ok(session)
}

pub fn write_frames(session: &PageSession, out: &mut impl Write) -> Result<()> {
    for record in session.frames() {
        let line = serde_json::to_string(record).context("encode frame")?;
        writeln!(out, "{line}").context("write frame")?;
    }
    out.flush().context("flush frames")
}

pub fn run(args: Args) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let base = PersonMatchConfig::from_env().context("load person match config from env")?;
    let session = replay(&scenario, scenario.config(base), args.settle)?;

    let stdout = std::io::stdout();
    write_frames(&session, &mut stdout.lock())?;
    info!(
        frames = session.frames().len(),
        href = %session.href(),
        phase = session.phase().as_str(),
        "scenario replayed"
    );

    if args.check {
        verify_no_flicker(session.frames()).context("flicker check failed")?;
    }
    Ok(())
}
