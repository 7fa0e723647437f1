//! Flow controllers: submit → prompt → gateway → parser → state.
//!
//! A [`FlowController`] owns the [`FlowState`] of one flow. The presentation
//! layer reads snapshots through [`FlowController::state`] and calls
//! [`FlowController::submit`]; it never writes the state itself.
//!
//! Every accepted submission is tagged with a sequence number. A completion is
//! only applied if its number is still the latest, so a slow earlier request
//! can never overwrite the result of a newer one.

use crate::gateway::{GatewayError, ModelGateway};
use crate::model::{RecommendationSet, SummaryResult};
use crate::parser::{self, ParseError};
use crate::prompt::{self, Prompt, RequestMode};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::task::JoinHandle;

/// Anything that can go wrong between an accepted submit and its result
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Observable state of one flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState<T> {
    pub status: FlowStatus,
    /// Trimmed input of the latest accepted submit
    pub query: Option<String>,
    pub result: Option<T>,
    pub error_message: Option<String>,
}

impl<T> Default for FlowState<T> {
    fn default() -> Self {
        Self {
            status: FlowStatus::Idle,
            query: None,
            result: None,
            error_message: None,
        }
    }
}

impl<T> FlowState<T> {
    pub fn is_pending(&self) -> bool {
        self.status == FlowStatus::Pending
    }
}

/// The per-flow parts of the pipeline.
pub trait Flow: Send + Sync + 'static {
    type Output: Clone + Send + 'static;

    /// Short name used in logs
    const NAME: &'static str;
    /// Fixed message shown to the user when a submission fails
    const FAILURE_MESSAGE: &'static str;

    fn build_prompt(&self, input: &str) -> Prompt;
    fn parse(&self, raw: &str) -> Result<Self::Output, ParseError>;
}

/// Book summary flow.
#[derive(Debug, Clone, Copy)]
pub struct Summarize {
    mode: RequestMode,
}

impl Summarize {
    pub fn new(mode: RequestMode) -> Self {
        Self { mode }
    }
}

impl Flow for Summarize {
    type Output = SummaryResult;

    const NAME: &'static str = "summarize";
    const FAILURE_MESSAGE: &'static str =
        "Failed to generate summary. The book may not be well-known or the title could be incorrect.";

    fn build_prompt(&self, input: &str) -> Prompt {
        prompt::build_summary_prompt(input, self.mode)
    }

    fn parse(&self, raw: &str) -> Result<SummaryResult, ParseError> {
        parser::parse_summary(raw)
    }
}

/// Learning recommendation flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recommend;

impl Flow for Recommend {
    type Output = RecommendationSet;

    const NAME: &'static str = "recommend";
    const FAILURE_MESSAGE: &'static str =
        "Failed to generate recommendations. Please try a different topic.";

    fn build_prompt(&self, input: &str) -> Prompt {
        prompt::build_recommendation_prompt(input)
    }

    fn parse(&self, raw: &str) -> Result<RecommendationSet, ParseError> {
        parser::parse_recommendations(raw)
    }
}

struct Shared<T> {
    state: FlowState<T>,
    latest: u64,
}

/// Drives one flow and owns its state.
pub struct FlowController<F: Flow> {
    flow: Arc<F>,
    gateway: Arc<dyn ModelGateway>,
    shared: Arc<Mutex<Shared<F::Output>>>,
}

impl<F: Flow> FlowController<F> {
    pub fn new(flow: F, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            flow: Arc::new(flow),
            gateway,
            shared: Arc::new(Mutex::new(Shared {
                state: FlowState::default(),
                latest: 0,
            })),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FlowState<F::Output> {
        lock(&self.shared).state.clone()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.shared).state.is_pending()
    }

    /// Submit user input.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the state moves to
    /// `Pending` before this returns, and the spawned task settles it to
    /// `Succeeded` or `Failed`. Must be called inside a tokio runtime.
    pub fn submit(&self, input: &str) -> Option<JoinHandle<()>> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let seq = {
            let mut shared = lock(&self.shared);
            shared.latest += 1;
            shared.state = FlowState {
                status: FlowStatus::Pending,
                query: Some(input.to_string()),
                result: None,
                error_message: None,
            };
            shared.latest
        };
        log::info!("{} #{seq}: submitted {input:?}", F::NAME);

        let flow = Arc::clone(&self.flow);
        let gateway = Arc::clone(&self.gateway);
        let shared = Arc::clone(&self.shared);
        let input = input.to_string();

        Some(tokio::spawn(async move {
            let outcome = run(flow.as_ref(), gateway.as_ref(), &input).await;

            let mut shared = lock(&shared);
            if shared.latest != seq {
                log::debug!(
                    "{} #{seq}: discarding stale response, latest is #{}",
                    F::NAME,
                    shared.latest
                );
                return;
            }

            match outcome {
                Ok(result) => {
                    log::info!("{} #{seq}: succeeded", F::NAME);
                    shared.state.status = FlowStatus::Succeeded;
                    shared.state.result = Some(result);
                }
                Err(err) => {
                    log::error!("{} #{seq}: {err}", F::NAME);
                    shared.state.status = FlowStatus::Failed;
                    shared.state.error_message = Some(F::FAILURE_MESSAGE.to_string());
                }
            }
        }))
    }
}

async fn run<F: Flow>(
    flow: &F,
    gateway: &dyn ModelGateway,
    input: &str,
) -> Result<F::Output, FlowError> {
    let prompt = flow.build_prompt(input);
    let raw = gateway.invoke(&prompt).await?;
    log::debug!("{}: raw reply {raw:?}", F::NAME);
    Ok(flow.parse(&raw)?)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
