//! Conversation runtime
//!
//! Owns the state, transcript and result list. Events are processed one at a
//! time; the transport call runs as a background task and reports back as an
//! event, so submissions that arrive meanwhile hit the busy guard.

use super::transition::{transition, TransitionError};
use super::{ConvContext, ConvState, Effect, Event, FailureReason, Message, Transcript};
use crate::cache::ResponseCache;
use crate::protocol::{decode_response, encode_request, is_ranked, IntentRequest, ProjectSearchResult};
use crate::transport::SearchTransport;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Updates sent to observers (renderers never touch controller state)
#[derive(Debug, Clone)]
pub enum ConversationUpdate {
    Message(Message),
    Results(Vec<ProjectSearchResult>),
    State { dispatching: bool },
    Rejected { reason: String },
}

#[derive(Debug, Error)]
#[error("conversation runtime has stopped")]
pub struct RuntimeStopped;

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<ConversationUpdate>,
}

impl ConversationHandle {
    /// Queue a query; the runtime decides whether to accept it
    pub async fn submit(&self, query: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.event_tx
            .send(Event::submit(query))
            .await
            .map_err(|_| RuntimeStopped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationUpdate> {
        self.broadcast_tx.subscribe()
    }
}

pub struct ConversationRuntime<T>
where
    T: SearchTransport + 'static,
{
    context: ConvContext,
    state: ConvState,
    transcript: Transcript,
    results: Vec<ProjectSearchResult>,
    transport: Arc<T>,
    /// `None` when caching is disabled
    cache: Option<ResponseCache>,
    /// Intent currently on the wire, kept for cache insertion
    in_flight: Option<IntentRequest>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<ConversationUpdate>,
}

impl<T> ConversationRuntime<T>
where
    T: SearchTransport + 'static,
{
    pub fn new(context: ConvContext, transport: T, cache: Option<ResponseCache>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        Self {
            context,
            state: ConvState::Idle,
            transcript: Transcript::new(),
            results: Vec::new(),
            transport: Arc::new(transport),
            cache,
            in_flight: None,
            event_rx,
            event_tx,
            broadcast_tx,
        }
    }

    pub fn handle(&self) -> ConversationHandle {
        ConversationHandle {
            event_tx: self.event_tx.clone(),
            broadcast_tx: self.broadcast_tx.clone(),
        }
    }

    /// Run on a background task, returning a handle to it
    pub fn spawn(self) -> ConversationHandle {
        let handle = self.handle();
        tokio::spawn(self.run());
        handle
    }

    pub fn state(&self) -> &ConvState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn results(&self) -> &[ProjectSearchResult] {
        &self.results
    }

    pub async fn run(mut self) {
        tracing::info!(conv_id = %self.context.conversation_id, "Starting conversation runtime");

        while let Some(event) = self.event_rx.recv().await {
            if let Err(e) = self.process_event(event) {
                tracing::debug!(error = %e, "Event rejected");
            }
        }

        tracing::info!(conv_id = %self.context.conversation_id, "Conversation runtime stopped");
    }

    /// Process every event until nothing is in flight
    pub async fn run_until_idle(&mut self) {
        while self.state.is_dispatching() {
            let Some(event) = self.event_rx.recv().await else {
                break;
            };
            if let Err(e) = self.process_event(event) {
                tracing::debug!(error = %e, "Event rejected");
            }
        }
    }

    pub fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let resolves = current_event.is_resolution();
            let fresh_response = match &current_event {
                Event::DispatchSucceeded {
                    response,
                    from_cache: false,
                } => Some(response.clone()),
                _ => None,
            };

            // Pure state transition
            let result = match transition(&self.state, &self.context, current_event) {
                Ok(r) => r,
                Err(e) => {
                    let _ = self.broadcast_tx.send(ConversationUpdate::Rejected {
                        reason: e.to_string(),
                    });
                    return Err(e);
                }
            };

            self.state = result.new_state;

            if resolves {
                let request = self.in_flight.take();
                if let (Some(cache), Some(request), Some(response)) =
                    (self.cache.as_mut(), request, fresh_response)
                {
                    cache.insert(&request, &response);
                }
            }

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect) {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::AppendMessage {
                kind,
                text,
                response,
            } => {
                let message = self.transcript.push(Message::new(kind, text, response)).clone();
                tracing::debug!(
                    conv_id = %self.context.conversation_id,
                    kind = ?message.kind,
                    entries = self.transcript.len(),
                    "Transcript entry appended"
                );
                let _ = self.broadcast_tx.send(ConversationUpdate::Message(message));
                None
            }

            Effect::ReplaceResults { results } => {
                if !is_ranked(&results) {
                    tracing::warn!(
                        count = results.len(),
                        "Backend returned results out of relevance order"
                    );
                }
                self.results.clone_from(&results);
                let _ = self.broadcast_tx.send(ConversationUpdate::Results(results));
                None
            }

            Effect::NotifyState => {
                let _ = self.broadcast_tx.send(ConversationUpdate::State {
                    dispatching: self.state.is_dispatching(),
                });
                None
            }

            Effect::Dispatch { request } => self.dispatch(request),
        }
    }

    /// Start a dispatch. Returns an event only when it resolves synchronously.
    fn dispatch(&mut self, request: IntentRequest) -> Option<Event> {
        if let Some(response) = self.cache.as_mut().and_then(|cache| cache.get(&request)) {
            tracing::info!(
                conv_id = %self.context.conversation_id,
                request_id = %response.request_id,
                "Serving search from cache"
            );
            return Some(Event::DispatchSucceeded {
                response,
                from_cache: true,
            });
        }

        let body = match encode_request(&request) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode intent");
                return Some(Event::failed(FailureReason::from(&e), e.to_string()));
            }
        };
        self.in_flight = Some(request);

        let transport = self.transport.clone();
        let event_tx = self.event_tx.clone();
        let conv_id = self.context.conversation_id.clone();

        tokio::spawn(async move {
            tracing::info!(conv_id = %conv_id, endpoint = %transport.endpoint(), "Dispatching intent (background)");

            let event = match transport.send(body).await {
                Ok(raw) => match decode_response(&raw) {
                    Ok(response) => Event::DispatchSucceeded {
                        response,
                        from_cache: false,
                    },
                    Err(e) => {
                        tracing::warn!(conv_id = %conv_id, error = %e, kind = e.kind(), "Undecodable response");
                        Event::failed(FailureReason::from(&e), e.to_string())
                    }
                },
                Err(e) => Event::failed(FailureReason::Transport(e.kind), e.message),
            };

            if event_tx.send(event).await.is_err() {
                tracing::warn!(conv_id = %conv_id, "Runtime gone before dispatch resolved");
            }
        });

        None
    }
}
