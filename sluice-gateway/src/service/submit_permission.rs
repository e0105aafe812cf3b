//! Submit-Permission Service
//!
//! Decides whether a caller may submit a value for a paused input step.
//!
//! Order of evaluation:
//! 1. An already cancelled request aborts before any lookup.
//! 2. Callers holding the platform-administrator role are always allowed.
//! 3. Otherwise the run's node-detail tree is fetched and the input request at
//!    the target node/step supplies the expected submitters. No input metadata
//!    or an empty list means anyone may submit.
//! 4. The caller must match one comma separated, trimmed entry exactly.
//!
//! A failed lookup is never folded into allow or deny: it surfaces as a
//! [`DecisionError`] so callers can tell "we don't know" from "no".

use std::future::Future;
use std::sync::Arc;

use sluice_core::domain::node::find_input;
use sluice_core::domain::{CallerIdentity, StepRef};
use sluice_core::dto::ForwardedRequest;
use sluice_core::{BackendError, PipelineOperator, RoleResolver};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Outcome of a successful evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// The evaluation could not reach an answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("cannot resolve the global role of {user}: {source}")]
    RoleResolution { user: String, source: BackendError },

    #[error("cannot get the submitters of the current pipeline run: {0}")]
    NodeDetail(BackendError),

    #[error("request was cancelled before the decision completed")]
    Cancelled,
}

/// Submit-permission evaluator
///
/// Holds no per-request state; a single instance is shared by all requests.
#[derive(Clone)]
pub struct SubmitPolicy {
    roles: Arc<dyn RoleResolver>,
    operator: Arc<dyn PipelineOperator>,
    admin_role: String,
}

impl SubmitPolicy {
    pub fn new(
        roles: Arc<dyn RoleResolver>,
        operator: Arc<dyn PipelineOperator>,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            roles,
            operator,
            admin_role: admin_role.into(),
        }
    }

    /// Evaluate whether `caller` may submit the input step at `step`
    ///
    /// `req` is the inbound submission; only its headers are reused for the
    /// node-detail read so the backend sees the same credentials.
    pub async fn decide(
        &self,
        caller: Option<&CallerIdentity>,
        step: &StepRef,
        req: &ForwardedRequest,
        cancel: &CancellationToken,
    ) -> Result<Decision, DecisionError> {
        if cancel.is_cancelled() {
            return Err(DecisionError::Cancelled);
        }

        let current_user = match caller {
            Some(caller) => {
                let role = guarded(cancel, self.roles.role_of(&caller.name))
                    .await?
                    .map_err(|source| DecisionError::RoleResolution {
                        user: caller.name.clone(),
                        source,
                    })?;

                if role.is(&self.admin_role) {
                    tracing::debug!("{} holds {}, skipping submitter check", caller.name, role.name);
                    return Ok(Decision::Allow);
                }
                caller.name.as_str()
            }
            None => "",
        };

        let detail_req = ForwardedRequest {
            method: "GET".to_string(),
            query: None,
            headers: req.headers.clone(),
            body: Vec::new(),
        };
        let nodes = guarded(cancel, self.operator.get_nodes_detail(step.run(), &detail_req))
            .await?
            .map_err(|err| {
                tracing::error!("Cannot get nodes detail for {}: {}", step.run(), err);
                DecisionError::NodeDetail(err)
            })?;

        let expected = find_input(&nodes, &step.node.node, &step.step)
            .map(|input| input.submitters())
            .unwrap_or_default();

        Ok(evaluate(current_user, &expected, step))
    }
}

/// Match the caller against the expected submitters
fn evaluate(current_user: &str, expected: &[String], step: &StepRef) -> Decision {
    if expected.is_empty() {
        return Decision::Allow;
    }

    if expected.iter().any(|submitter| submitter == current_user) {
        return Decision::Allow;
    }

    let who = if current_user.is_empty() {
        "anonymous user"
    } else {
        current_user
    };
    Decision::Deny {
        reason: format!(
            "{} is not an allowed submitter of step {} in node {}",
            who, step.step, step.node.node
        ),
    }
}

/// Race a collaborator call against request cancellation
async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = T>,
) -> Result<T, DecisionError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DecisionError::Cancelled),
        out = call => Ok(out),
    }
}
