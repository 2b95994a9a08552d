use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

use crate::auth::AccountStore;
use crate::catalog;
use crate::config::{Config, SourceConfig};
use crate::error::SourceError;
use crate::logger;
use crate::models::{ExerciseRecord, Screen};
use crate::range;
use crate::session::{self, Effect, Event, Phase, SessionState};
use crate::source::Outcome;
use crate::worker::{IoRequest, IoResponse};

/// A request that bounced with `AuthRequired` and is owed exactly one
/// retry once the account picker has run.
#[derive(Debug, Clone, PartialEq)]
enum PendingRetry {
    Fetch,
    Record(Outcome),
}

/// Top-level shell state: screen navigation, the current level's catalog
/// and session, and the bookkeeping that ties I/O responses back to the
/// session they were issued for. Key handling returns the I/O requests to
/// send, so all of this drives without a terminal or a network.
pub struct App {
    pub config: Config,
    pub accounts: Arc<AccountStore>,
    pub screen: Screen,
    pub level: u32,
    /// Bumped on every level change; stale responses are dropped by it.
    pub epoch: u64,
    pub records: Vec<ExerciseRecord>,
    pub session: Option<SessionState>,
    pub loading: bool,
    pub load_failed: bool,
    /// Highlighted candidate on the exercise screen.
    pub selected: usize,
    pub picking_account: bool,
    pub account_cursor: usize,
    pub should_quit: bool,
    pending_retry: Option<PendingRetry>,
}

impl App {
    /// Build the shell and the startup requests. With the Sheets variant
    /// the account picker runs before the first fetch, mirroring the
    /// cold-start flow; the CSV variant needs no account and fetches
    /// straight away.
    pub fn new(config: Config, accounts: Arc<AccountStore>) -> (Self, Vec<IoRequest>) {
        let needs_picker = matches!(config.source, SourceConfig::Sheets { .. })
            && !accounts.is_empty()
            && accounts.active_name().is_none();

        let mut app = Self {
            config,
            accounts,
            screen: Screen::Task,
            level: 1,
            epoch: 0,
            records: Vec::new(),
            session: None,
            loading: false,
            load_failed: false,
            selected: 0,
            picking_account: needs_picker,
            account_cursor: 0,
            should_quit: false,
            pending_retry: None,
        };

        let requests = if app.picking_account {
            Vec::new()
        } else {
            app.start_level(1)
        };
        (app, requests)
    }

    /// Throw away the current session and fetch the new level's catalog.
    /// Everything in flight for the old level is superseded by the epoch
    /// bump and will be dropped on arrival.
    pub fn start_level(&mut self, level: u32) -> Vec<IoRequest> {
        self.level = level;
        self.epoch += 1;
        self.loading = true;
        self.load_failed = false;
        self.records.clear();
        self.session = None;
        self.selected = 0;
        self.pending_retry = None;
        vec![self.fetch_current()]
    }

    fn fetch_current(&self) -> IoRequest {
        IoRequest::FetchCatalog {
            epoch: self.epoch,
            range: range::full_range(&range::level_sheet(self.level)),
        }
    }

    /// The record the session currently points at.
    pub fn current_record(&self) -> Option<&ExerciseRecord> {
        let session = self.session.as_ref()?;
        self.records.get(session.current_row - 1)
    }

    /// One timer tick from the draw loop. The reducer ignores it unless
    /// the clock is running.
    pub fn on_tick(&mut self) {
        if self
            .session
            .as_ref()
            .is_some_and(|s| s.timer_running)
        {
            let millis = self.config.tick_millis;
            self.apply(Event::Tick { millis });
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Vec<IoRequest> {
        if self.picking_account {
            return self.on_picker_key(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Char('t') => {
                self.screen = Screen::Task;
                Vec::new()
            }
            KeyCode::Char('n') => {
                self.screen = Screen::News;
                Vec::new()
            }
            KeyCode::Char('p') => {
                self.screen = Screen::Profile;
                Vec::new()
            }
            KeyCode::Left if self.screen == Screen::Task => {
                if self.level > 1 {
                    self.start_level(self.level - 1)
                } else {
                    Vec::new()
                }
            }
            KeyCode::Right if self.screen == Screen::Task => {
                if self.level < self.config.levels {
                    self.start_level(self.level + 1)
                } else {
                    Vec::new()
                }
            }
            _ if self.screen == Screen::Task => self.on_task_key(key),
            _ => Vec::new(),
        }
    }

    fn on_picker_key(&mut self, key: KeyEvent) -> Vec<IoRequest> {
        let count = self.accounts.names().len();
        match key.code {
            KeyCode::Up => {
                if self.account_cursor > 0 {
                    self.account_cursor -= 1;
                }
                Vec::new()
            }
            KeyCode::Down => {
                if self.account_cursor < count.saturating_sub(1) {
                    self.account_cursor += 1;
                }
                Vec::new()
            }
            KeyCode::Enter if count > 0 => self.on_account_selected(),
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Account chosen: it parameterizes every call from here on. A request
    /// that bounced with `AuthRequired` gets its single retry now.
    fn on_account_selected(&mut self) -> Vec<IoRequest> {
        self.accounts.select(self.account_cursor);
        self.picking_account = false;

        match self.pending_retry.take() {
            Some(PendingRetry::Fetch) => {
                self.loading = true;
                vec![self.fetch_current()]
            }
            Some(PendingRetry::Record(outcome)) => vec![IoRequest::RecordOutcome {
                epoch: self.epoch,
                outcome,
            }],
            None => self.start_level(self.level),
        }
    }

    fn on_task_key(&mut self, key: KeyEvent) -> Vec<IoRequest> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };

        match session.phase {
            Phase::Prompt => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.apply(Event::Reveal),
                _ => Vec::new(),
            },
            Phase::Revealed if session.hint_visible => match key.code {
                KeyCode::Enter => self.apply(Event::DismissHint),
                _ => Vec::new(),
            },
            Phase::Revealed => match key.code {
                KeyCode::Up => {
                    if self.selected > 0 {
                        self.selected -= 1;
                    }
                    Vec::new()
                }
                KeyCode::Down => {
                    let count = self
                        .current_record()
                        .map(|r| r.candidates.len())
                        .unwrap_or(0);
                    if self.selected < count.saturating_sub(1) {
                        self.selected += 1;
                    }
                    Vec::new()
                }
                KeyCode::Enter => {
                    let index = self.selected;
                    self.apply(Event::Select { index })
                }
                _ => Vec::new(),
            },
            Phase::Correct => match key.code {
                KeyCode::Enter => {
                    self.selected = 0;
                    self.apply(Event::Advance)
                }
                _ => Vec::new(),
            },
            Phase::LevelComplete => Vec::new(),
        }
    }

    /// Run one event through the reducer and turn its effects into I/O
    /// requests stamped with the current epoch.
    fn apply(&mut self, event: Event) -> Vec<IoRequest> {
        let Some(state) = self.session.take() else {
            return Vec::new();
        };
        let step = session::reduce(state, &self.records, event);
        self.session = Some(step.state);

        step.effects
            .into_iter()
            .map(|effect| match effect {
                Effect::Record {
                    row,
                    chosen_index,
                    was_correct,
                    elapsed_millis,
                } => IoRequest::RecordOutcome {
                    epoch: self.epoch,
                    outcome: Outcome {
                        sheet: range::level_sheet(self.level),
                        row,
                        chosen_index,
                        was_correct,
                        elapsed_millis,
                    },
                },
            })
            .collect()
    }

    /// A worker response arrived. Responses for a superseded session are
    /// discarded here, before they can touch any state.
    pub fn on_response(&mut self, response: IoResponse) -> Vec<IoRequest> {
        if response.epoch() != self.epoch {
            logger::log(&format!(
                "app: dropping stale response (epoch {}, current {})",
                response.epoch(),
                self.epoch
            ));
            return Vec::new();
        }

        match response {
            IoResponse::Catalog { result, .. } => self.on_catalog(result),
            IoResponse::Recorded {
                outcome, result, ..
            } => self.on_recorded(outcome, result),
        }
    }

    fn on_catalog(&mut self, result: Result<crate::models::Grid, SourceError>) -> Vec<IoRequest> {
        match result {
            Ok(grid) => {
                self.records = catalog::parse(&grid, self.config.answers);
                self.loading = false;
                self.load_failed = false;
                if self.session.is_none() {
                    self.session = Some(SessionState::new(
                        self.level,
                        self.config.first_row,
                        self.records.len(),
                    ));
                    self.selected = 0;
                }
                Vec::new()
            }
            Err(SourceError::AuthRequired) => {
                self.loading = false;
                self.picking_account = true;
                self.pending_retry = Some(PendingRetry::Fetch);
                Vec::new()
            }
            Err(_) => {
                // Already logged by the worker; the screen just shows the
                // generic no-data state.
                self.loading = false;
                self.load_failed = true;
                Vec::new()
            }
        }
    }

    fn on_recorded(
        &mut self,
        outcome: Outcome,
        result: Result<crate::source::OutcomeEcho, SourceError>,
    ) -> Vec<IoRequest> {
        match result {
            Ok(echo) => {
                if let Some(record) = self
                    .records
                    .iter_mut()
                    .find(|r| r.sheet_row == echo.row)
                {
                    record.last_attempt = echo.attempt;
                }
                Vec::new()
            }
            Err(e) if e.write_outcome_unknown() => {
                // The write may or may not have landed; only now is a full
                // re-fetch worth the round trip.
                logger::log("app: write outcome unknown, re-fetching catalog");
                vec![self.fetch_current()]
            }
            Err(SourceError::AuthRequired) => {
                self.picking_account = true;
                self.pending_retry = Some(PendingRetry::Record(outcome));
                Vec::new()
            }
            Err(_) => Vec::new(),
        }
    }
}
