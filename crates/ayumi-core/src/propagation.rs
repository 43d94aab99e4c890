pub mod error;

use crate::authorize::{Authorizer, ManageTarget};
use crate::event::{EventEmitter, enrolment_state};
use crate::tree::TreeReader;
use ayumi_db::enrolment::{Mutation, Query};
use ayumi_db::lo::ChildLo;
use ayumi_db::util::FlattenTransactionResultExt;
use ayumi_entity::enrolment::{Model as Enrolment, Pass, Status};
use ayumi_model::event::{EventAction, EventMessage, EventTopic};
use error::PropagationError;
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A child as the aggregation rules see it: its elective flag and its
/// current enrolment state. Tree children without an enrolment yet count as
/// not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChildState {
    elective: bool,
    status: Status,
    pass: Pass,
}

/// Recompute a parent's status and pass from its children.
///
/// Returns `None` when aggregation does not apply: no children, or the
/// single non-elective child shortcut, where the node is driven by direct
/// updates only.
pub(crate) fn aggregate(
    children: &[ChildState],
    elective_minimum: Option<i32>,
    current: (Status, Pass),
) -> Option<(Status, Pass)> {
    if children.is_empty() || (children.len() == 1 && !children[0].elective) {
        return None;
    }

    let mandatory: Vec<&ChildState> = children.iter().filter(|c| !c.elective).collect();
    let electives: Vec<&ChildState> = children.iter().filter(|c| c.elective).collect();

    // No explicit quorum means every elective is required.
    let quorum = elective_minimum
        .map_or(electives.len(), |min| min.max(0) as usize)
        .min(electives.len());

    let mandatory_done = mandatory.iter().all(|c| c.status.completed());
    let completed_electives = electives.iter().filter(|c| c.status.completed()).count();

    let status = if mandatory_done && completed_electives >= quorum {
        Status::Completed
    } else if children.iter().any(|c| c.status.started()) {
        Status::InProgress
    } else {
        // An explicit pending (or untouched not-started) survives until a
        // child actually starts.
        current.0
    };

    let pass = if status == Status::Completed {
        // Electives that completed without passing satisfy the completion
        // quorum above but not the pass quorum here.
        let mandatory_passed = mandatory.iter().all(|c| c.pass.passed());
        let passed_electives = electives.iter().filter(|c| c.status.completed() && c.pass.passed()).count();
        if mandatory_passed && passed_electives >= quorum {
            Pass::Passed
        } else {
            Pass::Failed
        }
    } else {
        current.1
    };

    Some((status, pass))
}

/// One ancestor of the walk with everything needed to recompute it.
struct Level {
    enrolment: Enrolment,
    tree_children: Vec<ChildLo>,
    child_enrolments: HashMap<Uuid, Enrolment>,
    elective_minimum: Option<i32>,
}

impl Level {
    fn child_states(&self, overrides: &HashMap<Uuid, (Status, Pass)>) -> Vec<ChildState> {
        self.tree_children
            .iter()
            .map(|child| {
                let enrolment = self.child_enrolments.get(&child.id);
                let (status, pass) = enrolment
                    .map(|e| overrides.get(&e.id).copied().unwrap_or((e.status, e.pass)))
                    .unwrap_or((Status::NotStarted, Pass::Unset));
                ChildState {
                    elective: child.elective,
                    status,
                    pass,
                }
            })
            .collect()
    }
}

/// Walks an enrolment tree upward after a leaf change, recomputing each
/// ancestor from its children and persisting the ones that moved. All writes
/// of one walk commit in a single transaction; events go out only afterwards.
pub struct Propagator {
    tree: Arc<dyn TreeReader>,
    emitter: Arc<dyn EventEmitter>,
    authorizer: Arc<dyn Authorizer>,
}

impl Propagator {
    #[must_use]
    pub fn new(tree: Arc<dyn TreeReader>, emitter: Arc<dyn EventEmitter>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            tree,
            emitter,
            authorizer,
        }
    }

    /// Direct status write onto any enrolment in the tree, followed by the
    /// upward walk. The admin/assessor override path.
    pub async fn set_status<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        enrolment_id: Uuid,
        status: Status,
        pass: Pass,
        result: Option<f64>,
        actor: Option<Uuid>,
    ) -> Result<(), PropagationError> {
        let enrolment = Query::load(conn, enrolment_id)
            .await?
            .ok_or(PropagationError::EnrolmentNotFound)?;
        if !self
            .authorizer
            .can_manage(actor, ManageTarget::Enrolment(enrolment_id))
            .await
        {
            return Err(PropagationError::Permission);
        }

        let mut updated = enrolment.clone();
        updated.status = status;
        updated.pass = pass;
        updated.result = result;
        if status.started() && updated.start_date.is_none() {
            updated.start_date = Some(chrono::Utc::now().naive_utc());
        }
        if status.completed() && updated.end_date.is_none() {
            updated.end_date = Some(chrono::Utc::now().naive_utc());
        }

        let leaf_action = if status.completed() {
            EventAction::Completed
        } else {
            EventAction::Update
        };
        let mut leaf_event = EventMessage::new(EventTopic::EnrolmentUpdate, enrolment.id);
        leaf_event.before = Some(enrolment_state(&enrolment));
        leaf_event.after = Some(enrolment_state(&updated));
        leaf_event.context.action = Some(leaf_action);
        leaf_event.context.actor_id = actor;

        self.run_walk(conn, Some(updated.clone()), &updated, actor, vec![leaf_event])
            .await
    }

    /// Upward recomputation for an enrolment whose own row the caller has
    /// already persisted.
    pub async fn propagate<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        enrolment_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), PropagationError> {
        let enrolment = Query::load(conn, enrolment_id)
            .await?
            .ok_or(PropagationError::EnrolmentNotFound)?;
        self.run_walk(conn, None, &enrolment, actor, Vec::new()).await
    }

    /// Recompute a node in place from its current children, then continue
    /// upward. A no-op when nothing drifted: no writes, no events.
    pub async fn recalculate<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        enrolment_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), PropagationError> {
        let enrolment = Query::load(conn, enrolment_id)
            .await?
            .ok_or(PropagationError::EnrolmentNotFound)?;
        if !self
            .authorizer
            .can_manage(actor, ManageTarget::Enrolment(enrolment_id))
            .await
        {
            return Err(PropagationError::Permission);
        }

        let level = self.load_level(conn, enrolment.clone()).await?;
        let overrides = HashMap::new();
        let states = level.child_states(&overrides);
        let Some((status, pass)) = aggregate(
            &states,
            level.elective_minimum,
            (enrolment.status, enrolment.pass),
        ) else {
            return Ok(());
        };
        if status == enrolment.status && pass == enrolment.pass {
            tracing::debug!(%enrolment_id, "recalculate found no drift");
            return Ok(());
        }

        let mut updated = enrolment.clone();
        updated.status = status;
        updated.pass = pass;

        let mut event = EventMessage::new(EventTopic::EnrolmentUpdate, enrolment.id);
        event.before = Some(enrolment_state(&enrolment));
        event.after = Some(enrolment_state(&updated));
        event.context.action = Some(EventAction::Update);
        event.context.actor_id = actor;

        self.run_walk(conn, Some(updated.clone()), &updated, actor, vec![event]).await
    }

    async fn load_level<C: ConnectionTrait>(&self, conn: &C, enrolment: Enrolment) -> Result<Level, PropagationError> {
        let tree_children = self.tree.children(enrolment.lo_id).await?;
        let elective_minimum = self.tree.elective_minimum(enrolment.lo_id).await?;
        let child_enrolments: HashMap<Uuid, Enrolment> = Query::load_children(conn, enrolment.id)
            .await?
            .into_iter()
            .map(|e| (e.lo_id, e))
            .collect();
        Ok(Level {
            enrolment,
            tree_children,
            child_enrolments,
            elective_minimum,
        })
    }

    /// Batch-load the strict ancestor chain of `from`, leaf side first.
    async fn load_chain<C: ConnectionTrait>(&self, conn: &C, from: &Enrolment) -> Result<Vec<Level>, PropagationError> {
        let mut chain = Vec::new();
        let mut next_parent = from.parent_enrolment_id;
        while let Some(parent_id) = next_parent {
            let parent = Query::load(conn, parent_id)
                .await?
                .ok_or(PropagationError::EnrolmentNotFound)?;
            next_parent = parent.parent_enrolment_id;
            chain.push(self.load_level(conn, parent).await?);
        }
        Ok(chain)
    }

    /// The shared engine: computes the changed ancestor set in memory,
    /// persists every change in one transaction, and only then hands the
    /// buffered events to the emitter, child events before parent events.
    async fn run_walk<C: ConnectionTrait + TransactionTrait>(
        &self,
        conn: &C,
        write_node: Option<Enrolment>,
        from: &Enrolment,
        actor: Option<Uuid>,
        mut events: Vec<EventMessage>,
    ) -> Result<(), PropagationError> {
        let chain = self.load_chain(conn, from).await?;

        let mut overrides: HashMap<Uuid, (Status, Pass)> = HashMap::new();
        overrides.insert(from.id, (from.status, from.pass));

        let mut changed: Vec<Enrolment> = write_node.into_iter().collect();

        for level in &chain {
            let states = level.child_states(&overrides);
            let current = (level.enrolment.status, level.enrolment.pass);
            let Some((status, pass)) = aggregate(&states, level.elective_minimum, current) else {
                break;
            };
            if (status, pass) == current {
                break;
            }

            let mut updated = level.enrolment.clone();
            updated.status = status;
            updated.pass = pass;
            if status.completed() && updated.end_date.is_none() {
                updated.end_date = Some(chrono::Utc::now().naive_utc());
            }

            let mut event = EventMessage::new(EventTopic::EnrolmentUpdate, updated.id);
            event.before = Some(enrolment_state(&level.enrolment));
            event.after = Some(enrolment_state(&updated));
            event.context.action = Some(if status.completed() {
                EventAction::Completed
            } else {
                EventAction::Update
            });
            event.context.actor_id = actor;
            events.push(event);

            overrides.insert(updated.id, (status, pass));
            changed.push(updated);
        }

        // Dependency edges: a completed leaf also notifies every enrolment of
        // a module that depends on its parent module, dependants first.
        if from.status.completed() {
            if let Some(parent) = chain.first() {
                for dependant_lo in self.tree.dependants(parent.enrolment.lo_id).await? {
                    let Some(dependant) =
                        Query::load_by_user_lo_portal(conn, from.user_id, dependant_lo, from.taken_portal_id).await?
                    else {
                        continue;
                    };
                    let mut event = EventMessage::new(EventTopic::EnrolmentUpdate, dependant.id);
                    let state = enrolment_state(&dependant);
                    event.before = Some(state.clone());
                    event.after = Some(state);
                    event.context.action = Some(EventAction::Update);
                    event.context.actor_id = actor;
                    events.push(event);
                }
            }
        }

        if !changed.is_empty() {
            conn.transaction(|txn| {
                Box::pin(async move {
                    for enrolment in changed {
                        Mutation::save(txn, enrolment, actor, None).await?;
                    }
                    Ok(())
                })
            })
            .await
            .flatten_res()
            .map_err(PropagationError::Database)?;
        } else if events.is_empty() {
            return Ok(());
        }

        for message in events {
            if let Err(error) = self.emitter.emit(message).await {
                tracing::warn!(error = &error as &dyn std::error::Error, "failed to emit enrolment event");
            }
        }
        Ok(())
    }
}
