use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::error::SourceError;
use crate::logger;
use crate::models::Grid;
use crate::source::{Backend, Outcome, OutcomeEcho};

/// Grid I/O runs on a dedicated worker thread so the draw loop never blocks
/// on the network. Requests and responses carry the session epoch the shell
/// stamped them with; the shell bumps the epoch on every level change and
/// drops responses whose epoch no longer matches, so a slow fetch can never
/// land on a session it was not issued for.
#[derive(Debug)]
pub enum IoRequest {
    FetchCatalog { epoch: u64, range: String },
    RecordOutcome { epoch: u64, outcome: Outcome },
}

#[derive(Debug)]
pub enum IoResponse {
    Catalog {
        epoch: u64,
        result: Result<Grid, SourceError>,
    },
    Recorded {
        epoch: u64,
        outcome: Outcome,
        result: Result<OutcomeEcho, SourceError>,
    },
}

impl IoResponse {
    pub fn epoch(&self) -> u64 {
        match self {
            IoResponse::Catalog { epoch, .. } => *epoch,
            IoResponse::Recorded { epoch, .. } => *epoch,
        }
    }
}

pub fn spawn_io_worker(
    backend: Arc<dyn Backend>,
    response_tx: Sender<IoResponse>,
    request_rx: Receiver<IoRequest>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("sheetcards::io_worker".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    logger::log(&format!("worker: failed to start runtime: {}", e));
                    return;
                }
            };

            loop {
                match request_rx.recv() {
                    Ok(IoRequest::FetchCatalog { epoch, range }) => {
                        logger::log(&format!("worker: fetch {} (epoch {})", range, epoch));
                        let result = rt.block_on(backend.fetch(&range));
                        if let Err(e) = &result {
                            logger::log(&format!("worker: fetch failed: {}", e));
                        }
                        let _ = response_tx.send(IoResponse::Catalog { epoch, result });
                    }
                    Ok(IoRequest::RecordOutcome { epoch, outcome }) => {
                        let result = rt.block_on(backend.record(&outcome));
                        if let Err(e) = &result {
                            logger::log(&format!("worker: record failed: {}", e));
                        }
                        let _ = response_tx.send(IoResponse::Recorded {
                            epoch,
                            outcome,
                            result,
                        });
                    }
                    Err(_) => {
                        // Channel disconnected, exit worker
                        logger::log("worker: channel disconnected, exiting");
                        break;
                    }
                }
            }
        })
        .expect("Failed to spawn I/O worker thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossbeam_channel::unbounded;
    use std::sync::Mutex;

    use crate::models::{AttemptRecord, Cell};
    use crate::source::{AnswerRecorder, TabularSource};

    /// Canned backend: one scripted result per call, in order.
    struct ScriptedBackend {
        grids: Mutex<Vec<Result<Grid, SourceError>>>,
        fetched_ranges: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(grids: Vec<Result<Grid, SourceError>>) -> Self {
            Self {
                grids: Mutex::new(grids),
                fetched_ranges: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TabularSource for ScriptedBackend {
        async fn fetch(&self, range: &str) -> Result<Grid, SourceError> {
            self.fetched_ranges.lock().unwrap().push(range.to_string());
            let mut grids = self.grids.lock().unwrap();
            if grids.is_empty() {
                Ok(Vec::new())
            } else {
                grids.remove(0)
            }
        }
    }

    #[async_trait]
    impl AnswerRecorder for ScriptedBackend {
        async fn record(&self, outcome: &Outcome) -> Result<OutcomeEcho, SourceError> {
            Ok(OutcomeEcho {
                row: outcome.row,
                attempt: AttemptRecord {
                    chosen_index: outcome.chosen_index as i32,
                    was_correct: outcome.was_correct,
                    elapsed_millis: outcome.elapsed_millis,
                },
            })
        }
    }

    #[test]
    fn test_worker_round_trip_fetch() {
        let grid: Grid = vec![vec![Cell::from("cat")]];
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(grid.clone())]));
        let (req_tx, req_rx) = unbounded();
        let (res_tx, res_rx) = unbounded();
        let handle = spawn_io_worker(backend.clone(), res_tx, req_rx);

        req_tx
            .send(IoRequest::FetchCatalog {
                epoch: 7,
                range: "Sheet1!A:L".to_string(),
            })
            .unwrap();

        match res_rx.recv().unwrap() {
            IoResponse::Catalog { epoch, result } => {
                assert_eq!(epoch, 7);
                assert_eq!(result.unwrap(), grid);
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(
            backend.fetched_ranges.lock().unwrap().as_slice(),
            &["Sheet1!A:L".to_string()]
        );

        drop(req_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_worker_round_trip_record() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let (req_tx, req_rx) = unbounded();
        let (res_tx, res_rx) = unbounded();
        let handle = spawn_io_worker(backend, res_tx, req_rx);

        let outcome = Outcome {
            sheet: "Sheet2".to_string(),
            row: 5,
            chosen_index: 1,
            was_correct: true,
            elapsed_millis: 400,
        };
        req_tx
            .send(IoRequest::RecordOutcome {
                epoch: 3,
                outcome: outcome.clone(),
            })
            .unwrap();

        match res_rx.recv().unwrap() {
            IoResponse::Recorded {
                epoch,
                outcome: echoed,
                result,
            } => {
                assert_eq!(epoch, 3);
                assert_eq!(echoed, outcome);
                let echo = result.unwrap();
                assert_eq!(echo.row, 5);
                assert_eq!(echo.attempt.chosen_index, 1);
            }
            other => panic!("unexpected response: {:?}", other),
        }

        drop(req_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_worker_passes_errors_through() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(SourceError::AuthRequired)]));
        let (req_tx, req_rx) = unbounded();
        let (res_tx, res_rx) = unbounded();
        let handle = spawn_io_worker(backend, res_tx, req_rx);

        req_tx
            .send(IoRequest::FetchCatalog {
                epoch: 1,
                range: "Sheet1!A:L".to_string(),
            })
            .unwrap();

        match res_rx.recv().unwrap() {
            IoResponse::Catalog { result, .. } => {
                assert!(matches!(result, Err(SourceError::AuthRequired)));
            }
            other => panic!("unexpected response: {:?}", other),
        }

        drop(req_tx);
        handle.join().unwrap();
    }
}
