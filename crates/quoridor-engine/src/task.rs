//! Background search on a dedicated thread.
//!
//! A task speaks a two-message protocol: [`TaskMessage::Ready`] once the
//! thread has built its searcher, then exactly one [`TaskMessage::Finished`]
//! for the single request it accepts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use quoridor_core::{Move, Position, SearchError, SearchLimits};
use thiserror::Error;
use tracing::{debug, info};

use crate::alphabeta::AlphaBetaSearcher;
use crate::config::EngineConfig;

pub type SearchOutcome = Result<Move, SearchError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskMessage {
    Ready,
    Finished(SearchOutcome),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("a search was already submitted to this task")]
    AlreadySubmitted,
    #[error("search thread disconnected")]
    Disconnected,
    #[error("failed to spawn search thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
struct SearchRequest {
    position: Position,
    limits: SearchLimits,
}

#[derive(Debug)]
pub struct SearchTask {
    request_tx: Option<Sender<SearchRequest>>,
    message_rx: Receiver<TaskMessage>,
    stop_flag: Arc<AtomicBool>,
    ready: bool,
    outcome: Option<SearchOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl SearchTask {
    pub fn spawn(config: EngineConfig) -> Result<Self, TaskError> {
        let (request_tx, request_rx) = channel::bounded::<SearchRequest>(1);
        let (message_tx, message_rx) = channel::bounded::<TaskMessage>(2);
        let stop_flag = Arc::new(AtomicBool::new(false));

        let worker_flag = Arc::clone(&stop_flag);
        let handle = thread::Builder::new()
            .name("quoridor-search".to_string())
            .spawn(move || search_loop(config, worker_flag, request_rx, message_tx))?;
        debug!(depth = config.max_depth, "search task spawned");

        Ok(Self {
            request_tx: Some(request_tx),
            message_rx,
            stop_flag,
            ready: false,
            outcome: None,
            handle: Some(handle),
        })
    }

    /// Hands the task its one search. Later calls fail with
    /// [`TaskError::AlreadySubmitted`].
    pub fn submit(&mut self, position: Position, limits: SearchLimits) -> Result<(), TaskError> {
        let tx = self.request_tx.take().ok_or(TaskError::AlreadySubmitted)?;
        tx.send(SearchRequest { position, limits })
            .map_err(|_| TaskError::Disconnected)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn wait_ready(&mut self) -> Result<(), TaskError> {
        while !self.ready {
            let message = self.message_rx.recv().map_err(|_| TaskError::Disconnected)?;
            self.absorb(message);
        }
        Ok(())
    }

    pub fn wait_result(&mut self) -> Result<SearchOutcome, TaskError> {
        loop {
            if let Some(outcome) = self.outcome.clone() {
                return Ok(outcome);
            }
            let message = self.message_rx.recv().map_err(|_| TaskError::Disconnected)?;
            self.absorb(message);
        }
    }

    /// `Ok(None)` when the search is still running after `timeout`.
    pub fn wait_result_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<SearchOutcome>, TaskError> {
        loop {
            if let Some(outcome) = self.outcome.clone() {
                return Ok(Some(outcome));
            }
            match self.message_rx.recv_timeout(timeout) {
                Ok(message) => self.absorb(message),
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(TaskError::Disconnected),
            }
        }
    }

    pub fn try_result(&mut self) -> Result<Option<SearchOutcome>, TaskError> {
        loop {
            if let Some(outcome) = self.outcome.clone() {
                return Ok(Some(outcome));
            }
            match self.message_rx.try_recv() {
                Ok(message) => self.absorb(message),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(TaskError::Disconnected),
            }
        }
    }

    /// Asks the search to stop; the deepest completed iteration still
    /// produces the result.
    pub fn cancel(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    fn absorb(&mut self, message: TaskMessage) {
        match message {
            TaskMessage::Ready => self.ready = true,
            TaskMessage::Finished(outcome) => {
                self.ready = true;
                self.outcome = Some(outcome);
            }
        }
    }
}

impl Drop for SearchTask {
    fn drop(&mut self) {
        self.cancel();
        self.request_tx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn search_loop(
    config: EngineConfig,
    stop_flag: Arc<AtomicBool>,
    request_rx: Receiver<SearchRequest>,
    message_tx: Sender<TaskMessage>,
) {
    let mut searcher =
        AlphaBetaSearcher::new(config.searcher_config()).with_stop_flag(stop_flag);
    if message_tx.send(TaskMessage::Ready).is_err() {
        return;
    }

    let Ok(request) = request_rx.recv() else {
        debug!("search task closed without a request");
        return;
    };

    let outcome = searcher.best_move(&request.position, request.limits);
    match &outcome {
        Ok(mv) => info!(?mv, "search task finished"),
        Err(err) => info!(%err, "search task rejected position"),
    }
    let _ = message_tx.send(TaskMessage::Finished(outcome));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_arrives_before_any_request() {
        let mut task = SearchTask::spawn(EngineConfig {
            tt_size_mb: 1,
            ..EngineConfig::default()
        })
        .unwrap();
        task.wait_ready().unwrap();
        assert!(task.is_ready());
    }

    #[test]
    fn second_submit_is_rejected() {
        let mut task = SearchTask::spawn(EngineConfig {
            tt_size_mb: 1,
            ..EngineConfig::default()
        })
        .unwrap();
        task.submit(Position::new(), SearchLimits::depth(1)).unwrap();
        assert!(matches!(
            task.submit(Position::new(), SearchLimits::depth(1)),
            Err(TaskError::AlreadySubmitted)
        ));
        assert!(task.wait_result().unwrap().is_ok());
    }
}
