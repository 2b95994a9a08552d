use crate::models::ExerciseRecord;

/// Where the session is within the current row (or past the last one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Word shown, translations hidden.
    Prompt,
    /// Candidates visible, timer running (unless the hint is covering them).
    Revealed,
    /// The row is solved; only `Advance` leaves this phase.
    Correct,
    /// Past the last row. Terminal: level navigation is the only exit.
    LevelComplete,
}

/// Everything the exercise screen needs to render one level's session.
/// A plain value: the reducer consumes one and returns the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub level: u32,
    /// 1-based row within the level's worksheet, advances monotonically.
    pub current_row: usize,
    pub attempts: u32,
    pub hint_visible: bool,
    pub revealed: bool,
    pub timer_running: bool,
    pub elapsed_millis: u64,
    /// Accepted sub-answers so far (pair variant only).
    pub chosen_so_far: Vec<String>,
    pub phase: Phase,
}

impl SessionState {
    /// Fresh session for a level. `row_count` is how many exercises the
    /// catalog holds; a first row past the end lands directly in
    /// `LevelComplete`.
    pub fn new(level: u32, first_row: usize, row_count: usize) -> Self {
        let current_row = first_row.max(1);
        let phase = if current_row > row_count {
            Phase::LevelComplete
        } else {
            Phase::Prompt
        };
        Self {
            level,
            current_row,
            attempts: 0,
            hint_visible: false,
            revealed: false,
            timer_running: false,
            elapsed_millis: 0,
            chosen_so_far: Vec::new(),
            phase,
        }
    }
}

/// User and clock inputs to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Tap on the prompt word: show candidates and start the clock.
    Reveal,
    /// Pick the candidate at `index` (0-based).
    Select { index: usize },
    /// Hide the hint; the candidates show again, attempts intact.
    DismissHint,
    /// Leave a solved row for the next one.
    Advance,
    /// One timer tick while the clock runs.
    Tick { millis: u64 },
}

/// Side effects the reducer asks the caller to perform. The reducer itself
/// never touches I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Persist one outcome: `row` is the 1-based sheet row, `chosen_index`
    /// the 0-based candidate position.
    Record {
        row: usize,
        chosen_index: usize,
        was_correct: bool,
        elapsed_millis: u64,
    },
}

/// Result of one reduction: the next state plus requested effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Step {
    fn state_only(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// The session state machine. `records` is the current catalog for the
/// level; the reducer reads it to classify selections and to detect the end
/// of the level, and never mutates anything.
pub fn reduce(state: SessionState, records: &[ExerciseRecord], event: Event) -> Step {
    let mut next = state;
    match event {
        Event::Reveal => {
            if next.phase == Phase::Prompt {
                next.revealed = true;
                next.timer_running = true;
                next.phase = Phase::Revealed;
            }
            Step::state_only(next)
        }
        Event::Tick { millis } => {
            if next.timer_running {
                next.elapsed_millis += millis;
            }
            Step::state_only(next)
        }
        Event::DismissHint => {
            next.hint_visible = false;
            Step::state_only(next)
        }
        Event::Select { index } => {
            if next.phase != Phase::Revealed || next.hint_visible {
                return Step::state_only(next);
            }
            let Some(record) = records.get(next.current_row - 1) else {
                return Step::state_only(next);
            };
            if index >= record.candidates.len() {
                return Step::state_only(next);
            }

            let slot = next.chosen_so_far.len();
            let matched = record.key.expected(slot) == Some(index as i32);

            if matched {
                next.chosen_so_far.push(record.candidates[index].clone());
                if next.chosen_so_far.len() >= record.key.slots() {
                    next.phase = Phase::Correct;
                    next.timer_running = false;
                }
            } else {
                next.attempts += 1;
                if next.attempts >= 2 {
                    next.hint_visible = true;
                }
            }

            let effect = Effect::Record {
                row: record.sheet_row,
                chosen_index: index,
                was_correct: matched,
                elapsed_millis: next.elapsed_millis,
            };
            Step {
                state: next,
                effects: vec![effect],
            }
        }
        Event::Advance => {
            if next.phase != Phase::Correct {
                return Step::state_only(next);
            }
            next.current_row += 1;
            next.attempts = 0;
            next.hint_visible = false;
            next.revealed = false;
            next.timer_running = false;
            next.elapsed_millis = 0;
            next.chosen_so_far.clear();
            next.phase = if next.current_row > records.len() {
                Phase::LevelComplete
            } else {
                Phase::Prompt
            };
            Step::state_only(next)
        }
    }
}
