// services.rs — Build the lifecycle controller from configuration.
//
// Picks one implementation per collaborator:
//   store    — MemoryGoalStore (memory = true) or FileGoalStore under data_dir
//   judge    — MockJudge or OpenAiJudge
//   attestor — LedgerAttestor, which mocks itself when credentials are missing
//   verifier — SyndicationVerifier or StaticPostVerifier seeded from config

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pod_attest::{Attestor, LedgerAttestor};
use pod_dispute::{PostContent, PostVerifier, StaticPostVerifier, SyndicationVerifier};
use pod_goal::{EventDispatcher, FileGoalStore, GoalStore, LogSink, MemoryGoalStore};
use pod_judge::{Judge, MockJudge, OpenAiJudge};
use pod_lifecycle::Controller;

use crate::config::{DaemonConfig, JudgeProvider, VerifierProvider};

pub fn build_store(config: &DaemonConfig) -> anyhow::Result<Arc<dyn GoalStore>> {
    if config.memory {
        tracing::warn!("using in-memory goal store, goals will not survive a restart");
        return Ok(Arc::new(MemoryGoalStore::new()));
    }
    let store = FileGoalStore::new(&config.data_dir)
        .with_context(|| format!("opening goal store at {}", config.data_dir.display()))?;
    tracing::info!(data_dir = %config.data_dir.display(), "using file goal store");
    Ok(Arc::new(store))
}

pub fn build_judge(config: &DaemonConfig) -> anyhow::Result<Arc<dyn Judge>> {
    let judge = &config.judge;
    match judge.provider {
        JudgeProvider::Mock => Ok(Arc::new(MockJudge::new())),
        JudgeProvider::Openai => {
            if judge.api_key.is_none() {
                tracing::warn!("judge provider is openai but no API key is set");
            }
            let openai = OpenAiJudge::new(
                judge.base_url.clone(),
                judge.model.clone(),
                judge.api_key.clone(),
                Duration::from_secs(judge.timeout_secs),
            )
            .context("building OpenAI judge")?;
            Ok(Arc::new(openai))
        }
    }
}

pub fn build_attestor(config: &DaemonConfig) -> anyhow::Result<Arc<dyn Attestor>> {
    let ledger = &config.ledger;
    let attestor = LedgerAttestor::new(
        ledger.endpoint.clone(),
        ledger.api_key.clone(),
        ledger.schema_uid.clone(),
        Duration::from_secs(ledger.timeout_secs),
    )
    .context("building ledger attestor")?;
    Ok(Arc::new(attestor))
}

pub fn build_verifier(config: &DaemonConfig) -> anyhow::Result<Arc<dyn PostVerifier>> {
    let verifier = &config.verifier;
    match verifier.provider {
        VerifierProvider::Syndication => {
            let syndication = SyndicationVerifier::new(
                verifier.base_url.clone(),
                Duration::from_secs(verifier.timeout_secs),
            )
            .context("building syndication verifier")?;
            Ok(Arc::new(syndication))
        }
        VerifierProvider::Static => {
            let posts = StaticPostVerifier::new();
            for (id, text) in &verifier.posts {
                posts.insert(id.clone(), PostContent::new(text.clone()));
            }
            Ok(Arc::new(posts))
        }
    }
}

/// Wire every collaborator into a controller.
pub fn build_controller(config: &DaemonConfig) -> anyhow::Result<Controller> {
    let mut events = EventDispatcher::new();
    if let Some(path) = &config.events_log {
        events.add_sink(Box::new(LogSink::new(path)));
    }

    let controller = Controller::new(
        build_store(config)?,
        build_judge(config)?,
        build_attestor(config)?,
        build_verifier(config)?,
        config.lifecycle.clone(),
    )
    .with_events(events);

    tracing::info!(
        judge = controller.judge().name(),
        attestor = controller.attestor().name(),
        verifier = controller.verifier().name(),
        "controller ready"
    );
    Ok(controller)
}
