//! Scripted sessions for the `run` command.
//!
//! A script is a JSON array of operations executed in order against one
//! in-memory service:
//!
//! ```json
//! [
//!   {"op": "create", "payload": {"name": "Cuota X", "baseAmount": 100}},
//!   {"op": "schedule", "id": "$last", "payload": {"validFrom": "2030-01-01", "baseAmount": 150}},
//!   {"op": "disable", "id": "$1"},
//!   {"op": "delete", "id": "@FEE-MANT"}
//! ]
//! ```
//!
//! Ids may be literal, `$last` (the concept produced by the latest
//! successful step), `$N` (the concept produced by step N, 1-based), or
//! `@CODE` (lookup by exact code). A failing step is reported and the
//! script carries on.

use fc_common::{ConceptId, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::boundary;
use crate::model::Concept;
use crate::query::{ConceptPage, ListQuery};
use crate::service::ConceptService;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    List {
        #[serde(default)]
        query: ListQuery,
    },
    Get {
        id: String,
    },
    Create {
        payload: Value,
    },
    Update {
        id: String,
        payload: Value,
    },
    Clone {
        id: String,
    },
    Enable {
        id: String,
    },
    Disable {
        id: String,
    },
    Delete {
        id: String,
    },
    Schedule {
        id: String,
        payload: Value,
    },
    Reconcile,
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::List { .. } => "list",
            ScriptOp::Get { .. } => "get",
            ScriptOp::Create { .. } => "create",
            ScriptOp::Update { .. } => "update",
            ScriptOp::Clone { .. } => "clone",
            ScriptOp::Enable { .. } => "enable",
            ScriptOp::Disable { .. } => "disable",
            ScriptOp::Delete { .. } => "delete",
            ScriptOp::Schedule { .. } => "schedule",
            ScriptOp::Reconcile => "reconcile",
        }
    }
}

/// Error details for a failed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepError {
    pub kind: &'static str,
    pub code: u32,
    pub message: String,
}

impl From<&Error> for StepError {
    fn from(e: &Error) -> Self {
        Self {
            kind: e.kind(),
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub step: usize,
    pub op: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<ConceptPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

/// What a successful step yielded.
enum StepValue {
    Concept(Concept),
    Page(ConceptPage),
    Promoted(usize),
    Done,
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptOp>> {
    Ok(serde_json::from_str(json)?)
}

/// Executes scripts against one service, remembering produced ids.
pub struct ScriptRunner<'a> {
    service: &'a ConceptService,
    produced: Vec<Option<ConceptId>>,
    last: Option<ConceptId>,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(service: &'a ConceptService) -> Self {
        Self {
            service,
            produced: Vec::new(),
            last: None,
        }
    }

    pub async fn run(&mut self, ops: Vec<ScriptOp>) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(ops.len());
        for op in ops {
            let step = self.produced.len() + 1;
            let name = op.name();
            let outcome = match self.execute(op).await {
                Ok(value) => {
                    let mut outcome = StepOutcome {
                        step,
                        op: name,
                        ok: true,
                        concept: None,
                        page: None,
                        promoted: None,
                        error: None,
                    };
                    let produced = match value {
                        StepValue::Concept(c) => {
                            let id = c.id.clone();
                            outcome.concept = Some(c);
                            Some(id)
                        }
                        StepValue::Page(p) => {
                            outcome.page = Some(p);
                            None
                        }
                        StepValue::Promoted(n) => {
                            outcome.promoted = Some(n);
                            None
                        }
                        StepValue::Done => None,
                    };
                    if let Some(id) = &produced {
                        self.last = Some(id.clone());
                    }
                    self.produced.push(produced);
                    outcome
                }
                Err(e) => {
                    self.produced.push(None);
                    StepOutcome {
                        step,
                        op: name,
                        ok: false,
                        concept: None,
                        page: None,
                        promoted: None,
                        error: Some(StepError::from(&e)),
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn execute(&self, op: ScriptOp) -> Result<StepValue> {
        let svc = self.service;
        match op {
            ScriptOp::List { query } => svc.list(&query).await.map(StepValue::Page),
            ScriptOp::Get { id } => {
                let id = self.resolve_id(&id).await?;
                svc.get(&id).await.map(StepValue::Concept)
            }
            ScriptOp::Create { payload } => {
                let payload = boundary::create_from_json(payload)?;
                svc.create(payload).await.map(StepValue::Concept)
            }
            ScriptOp::Update { id, payload } => {
                let id = self.resolve_id(&id).await?;
                let payload = boundary::update_from_json(payload)?;
                svc.update(&id, payload).await.map(StepValue::Concept)
            }
            ScriptOp::Clone { id } => {
                let id = self.resolve_id(&id).await?;
                svc.clone_concept(&id).await.map(StepValue::Concept)
            }
            ScriptOp::Enable { id } => {
                let id = self.resolve_id(&id).await?;
                svc.enable(&id).await.map(StepValue::Concept)
            }
            ScriptOp::Disable { id } => {
                let id = self.resolve_id(&id).await?;
                svc.disable(&id).await.map(StepValue::Concept)
            }
            ScriptOp::Delete { id } => {
                let id = self.resolve_id(&id).await?;
                svc.delete(&id).await.map(|_| StepValue::Done)
            }
            ScriptOp::Schedule { id, payload } => {
                let id = self.resolve_id(&id).await?;
                let payload = boundary::schedule_from_json(payload)?;
                svc.schedule_version(&id, payload)
                    .await
                    .map(StepValue::Concept)
            }
            ScriptOp::Reconcile => Ok(StepValue::Promoted(svc.reconcile().await)),
        }
    }

    async fn resolve_id(&self, raw: &str) -> Result<ConceptId> {
        let raw = raw.trim();
        if raw == "$last" {
            return self
                .last
                .clone()
                .ok_or_else(|| Error::Validation("$last used before any concept was produced".to_string()));
        }
        if let Some(step) = raw.strip_prefix('$') {
            let n: usize = step
                .parse()
                .map_err(|_| Error::Validation(format!("bad step reference {:?}", raw)))?;
            return n
                .checked_sub(1)
                .and_then(|i| self.produced.get(i))
                .and_then(Option::clone)
                .ok_or_else(|| Error::Validation(format!("step {} produced no concept", n)));
        }
        if let Some(code) = raw.strip_prefix('@') {
            return Ok(self.service.find_by_code(code).await?.id);
        }
        Ok(ConceptId::from(raw))
    }
}
