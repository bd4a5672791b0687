//! Remote leaderboard integration.
//!
//! Bridges the sync game loop with a blocking leaderboard service running on
//! its own thread, so a slow or missing service never stalls input.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, warn};

use crate::grid::GridDimension;
use crate::player::GameMode;
use crate::scores::HighScoreRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("online leaderboard unavailable")]
    Unavailable,
    #[error("online leaderboard rejected the request: {0}")]
    Rejected(String),
}

/// Which online table to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardFilter {
    pub mode: GameMode,
    pub grid: GridDimension,
}

/// A shared online leaderboard.
pub trait RemoteLeaderboard: Send {
    fn submit(&mut self, record: &HighScoreRecord) -> Result<(), RemoteError>;
    fn fetch(&mut self, filter: &LeaderboardFilter) -> Result<Vec<HighScoreRecord>, RemoteError>;
}

/// The service used when no online leaderboard is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

impl RemoteLeaderboard for Offline {
    fn submit(&mut self, _record: &HighScoreRecord) -> Result<(), RemoteError> {
        Err(RemoteError::Unavailable)
    }

    fn fetch(&mut self, _filter: &LeaderboardFilter) -> Result<Vec<HighScoreRecord>, RemoteError> {
        Err(RemoteError::Unavailable)
    }
}

/// Work handed to the service thread.
#[derive(Debug, Clone)]
enum Request {
    Submit(HighScoreRecord),
    Fetch(LeaderboardFilter),
}

/// Result delivered back to the game loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Submitted(Result<(), RemoteError>),
    Fetched {
        filter: LeaderboardFilter,
        result: Result<Vec<HighScoreRecord>, RemoteError>,
    },
}

/// Running service thread.
pub struct RemoteWorker {
    requests: Option<Sender<Request>>,
    responses: Receiver<Response>,
    handle: Option<JoinHandle<()>>,
}

impl RemoteWorker {
    pub fn spawn<S: RemoteLeaderboard + 'static>(mut service: S) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (resp_tx, resp_rx) = mpsc::channel::<Response>();

        let handle = thread::spawn(move || {
            for request in req_rx {
                let response = match request {
                    Request::Submit(record) => Response::Submitted(service.submit(&record)),
                    Request::Fetch(filter) => Response::Fetched {
                        filter,
                        result: service.fetch(&filter),
                    },
                };
                if resp_tx.send(response).is_err() {
                    break;
                }
            }
            debug!("remote worker stopped");
        });

        RemoteWorker {
            requests: Some(req_tx),
            responses: resp_rx,
            handle: Some(handle),
        }
    }

    pub fn submit(&self, record: HighScoreRecord) {
        self.send(Request::Submit(record));
    }

    pub fn fetch(&self, filter: LeaderboardFilter) {
        self.send(Request::Fetch(filter));
    }

    /// Next finished response, if any. Never blocks.
    pub fn poll(&self) -> Option<Response> {
        match self.responses.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("remote worker is gone");
                None
            }
        }
    }

    fn send(&self, request: Request) {
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            warn!("remote worker is not accepting requests");
        }
    }
}

impl Drop for RemoteWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker's loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
