//! Drives a [`CoordinationMachine`] against a responder.
//!
//! The coordinator owns no workflow rules: it asks the machine for the next
//! request, performs it through [`crate::actions`] or the escalation policy,
//! and feeds the outcome back. The session is saved after every step when a
//! store is attached, so an aborted run is still inspectable.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::actions;
use crate::error::CoordinationError;
use crate::responder::{Responder, ResponderError};
use crate::setup::InterviewSetup;
use crate::store::SessionStore;

use super::escalation::EscalationPolicy;
use super::machine::{ActionOutcome, ActionRequest, CoordinationMachine};
use super::session::CoordinationSession;

pub struct Coordinator {
    responder: Arc<dyn Responder>,
    store: Option<Arc<dyn SessionStore>>,
    policy: EscalationPolicy,
}

impl Coordinator {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            store: None,
            policy: EscalationPolicy::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate `setup` and run a session to completion.
    pub async fn run(&self, setup: InterviewSetup) -> Result<CoordinationSession, CoordinationError> {
        setup.validate()?;
        let mut machine = CoordinationMachine::new(setup);
        self.drive(&mut machine).await?;
        Ok(machine.into_session())
    }

    /// Step `machine` until it has nothing left to do.
    pub async fn drive(&self, machine: &mut CoordinationMachine) -> Result<(), CoordinationError> {
        self.save(machine.session()).await?;
        while let Some(request) = machine.next_request() {
            tracing::debug!(
                session = %machine.session().id(),
                action = request.label(),
                "performing action"
            );
            let outcome = match self.perform(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        session = %machine.session().id(),
                        action = request.label(),
                        error = %e,
                        "responder failed, stopping session"
                    );
                    machine.abort(&e.to_string());
                    self.save(machine.session()).await?;
                    return Err(e.into());
                }
            };
            machine.apply(outcome)?;
            self.save(machine.session()).await?;
        }
        tracing::info!(
            session = %machine.session().id(),
            status = %machine.session().status(),
            "coordination session finished"
        );
        Ok(())
    }

    async fn perform(&self, request: &ActionRequest) -> Result<ActionOutcome, ResponderError> {
        let responder = self.responder.as_ref();
        Ok(match request {
            ActionRequest::Contact { request, domain } => {
                ActionOutcome::Contacted(actions::call(responder, request, *domain).await?)
            }
            ActionRequest::FollowUpEmail {
                request,
                reply_domain,
            } => {
                let (attempt, result) =
                    actions::email_contact(responder, request, *reply_domain).await?;
                ActionOutcome::Emailed { attempt, result }
            }
            ActionRequest::Schedule(request) => {
                ActionOutcome::Scheduled(actions::schedule(responder, request).await?)
            }
            ActionRequest::Escalate(request) => {
                ActionOutcome::Decided(self.policy.escalate(responder, request).await?)
            }
            ActionRequest::Confirm(request) => {
                ActionOutcome::Confirmed(actions::notify(responder, request).await?)
            }
        })
    }

    async fn save(&self, session: &CoordinationSession) -> Result<(), CoordinationError> {
        if let Some(store) = &self.store {
            store.save(session).await?;
        }
        Ok(())
    }
}

/// Run independent sessions concurrently, each with its own responder.
///
/// Results come back in the order of `jobs`.
pub async fn run_many(
    jobs: Vec<(InterviewSetup, Arc<dyn Responder>)>,
    store: Option<Arc<dyn SessionStore>>,
) -> Vec<Result<CoordinationSession, CoordinationError>> {
    let mut set = JoinSet::new();
    let count = jobs.len();
    for (index, (setup, responder)) in jobs.into_iter().enumerate() {
        let mut coordinator = Coordinator::new(responder);
        if let Some(store) = &store {
            coordinator = coordinator.with_store(store.clone());
        }
        set.spawn(async move { (index, coordinator.run(setup).await) });
    }

    let mut results: Vec<Option<Result<CoordinationSession, CoordinationError>>> =
        (0..count).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => tracing::error!("coordination task panicked: {}", e),
        }
    }
    results
        .into_iter()
        .map(|r| {
            r.unwrap_or_else(|| {
                Err(CoordinationError::Responder(ResponderError::Io(
                    std::io::Error::other("coordination task did not finish"),
                )))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{SessionStatus, Stage};
    use crate::responder::{PromptKind, ScriptedResponder};
    use crate::setup::Directory;
    use crate::store::InMemorySessionStore;

    fn happy_script() -> ScriptedResponder {
        ScriptedResponder::new([
            "Available Tuesday 2pm",
            "Tuesday 2pm is great",
            "confirmed",
            "delivered",
            "",
            "delivered",
            "",
            "delivered",
            "",
        ])
    }

    #[tokio::test]
    async fn test_run_happy_path_persists() {
        let responder = Arc::new(happy_script());
        let store = Arc::new(InMemorySessionStore::new());
        let coordinator = Coordinator::new(responder.clone()).with_store(store.clone());

        let session = coordinator
            .run(Directory::builtin().sample_setup().unwrap())
            .await
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(responder.remaining().await, 0);

        let stored = store.get(session.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), SessionStatus::Completed);
        assert_eq!(stored.notifications().len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_script_aborts_but_persists() {
        let responder = Arc::new(ScriptedResponder::new(["no answer"]));
        let store = Arc::new(InMemorySessionStore::new());
        let coordinator = Coordinator::new(responder).with_store(store.clone());

        let err = coordinator
            .run(Directory::builtin().sample_setup().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::Responder(ResponderError::ScriptExhausted(PromptKind::EmailDelivery))
        ));

        let stored = store.list(10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status(), SessionStatus::InProgress);
        assert_eq!(stored[0].stage(), Stage::AwaitInterviewerSlots);
        assert_eq!(stored[0].attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_setup_rejected_before_start() {
        let mut setup = Directory::builtin().sample_setup().unwrap();
        setup.candidate.email = "nobody".to_string();
        let coordinator = Coordinator::new(Arc::new(ScriptedResponder::new(Vec::<String>::new())));
        assert!(matches!(
            coordinator.run(setup).await,
            Err(CoordinationError::Setup(_))
        ));
    }

    #[tokio::test]
    async fn test_run_many_keeps_sessions_apart() {
        let directory = Directory::builtin();
        let completed: Arc<dyn Responder> = Arc::new(happy_script());
        let cancelled: Arc<dyn Responder> = Arc::new(ScriptedResponder::new([
            "no answer",
            "delivered",
            "",
            "ok",
            "cancel the interview",
            "",
        ]));
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

        let results = run_many(
            vec![
                (directory.sample_setup().unwrap(), completed),
                (directory.sample_setup().unwrap(), cancelled),
            ],
            Some(store.clone()),
        )
        .await;

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        let second = results[1].as_ref().unwrap();
        assert_eq!(first.status(), SessionStatus::Completed);
        assert_eq!(second.status(), SessionStatus::Cancelled);
        assert_ne!(first.id(), second.id());
        assert!(second.notes().read().contains("escalation_cancelled"));
        assert!(!first.notes().read().contains("escalation_cancelled"));
        assert_eq!(store.list(10).await.unwrap().len(), 2);
    }
}
