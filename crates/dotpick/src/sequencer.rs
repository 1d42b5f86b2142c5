//! Step-by-step reveal of the picked team member.
//!
//! The sequencer is a state machine ticked once per frame. It never touches
//! the field itself; it hands back [`Cue`]s for the app to act on. Every
//! timer and settle poll it schedules is tagged with the [`RunId`] of the
//! selection that created it, and anything carrying a stale id is dropped
//! when it comes due.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Pause after a name settles, before the question is shown.
const NAME_PAUSE_MS: u64 = 400;
/// Pause after the winner's name settles.
const WINNER_NAME_PAUSE_MS: u64 = 800;
/// How long the winner stays on screen with fireworks.
const CELEBRATION_MS: u64 = 2_000;
/// Firework bursts per celebration.
const FIREWORK_BURSTS: u64 = 10;
/// Delay between firework bursts.
const FIREWORK_SPACING_MS: u64 = 300;

/// Token identifying one selection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    fn next(self) -> Self {
        RunId(self.0 + 1)
    }
}

/// One step of the reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealEntry {
    pub name: String,
    pub is_winner: bool,
}

impl RevealEntry {
    /// Text shown after the name has settled.
    pub fn message(&self) -> String {
        if self.is_winner {
            format!("{} it's you!", self.name)
        } else {
            "Is it you?".to_string()
        }
    }
}

/// Something the app should do in response to a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// Switch the field to this text.
    Show { text: String, fast: bool },
    /// Launch one firework burst.
    Fireworks,
    /// The selection has run to completion.
    Finished,
}

/// Where the sequencer is in a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Idle,
    /// Showing a non-winning entry.
    Revealing(usize),
    /// Showing the winner's name and message.
    Announcing,
    /// Winner on screen, fireworks going off.
    Celebrating,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("please add team members first (press ?)")]
    NoNames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    /// Show the question for the current entry.
    ShowMessage,
    /// Move on to the next entry.
    Advance,
    Firework,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    run: RunId,
    due_ms: u64,
    wake: Wake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Name,
    Message,
}

#[derive(Debug, Clone, Copy)]
struct SettlePoll {
    run: RunId,
    since_ms: u64,
    awaiting: Awaiting,
}

/// Build the reveal order: every name once, then the winner.
pub fn build_sequence(names: &[String], winner: usize) -> Vec<RevealEntry> {
    names
        .iter()
        .map(|name| RevealEntry {
            name: name.clone(),
            is_winner: false,
        })
        .chain(names.get(winner).map(|name| RevealEntry {
            name: name.clone(),
            is_winner: true,
        }))
        .collect()
}

/// Drives a selection from first name to fireworks.
#[derive(Debug)]
pub struct Sequencer {
    run: RunId,
    phase: Phase,
    sequence: Vec<RevealEntry>,
    index: usize,
    poll: Option<SettlePoll>,
    timers: Vec<Timer>,
    settle_timeout_ms: u64,
    dropped: usize,
}

impl Sequencer {
    /// Create an idle sequencer.
    pub fn new(settle_timeout_ms: u64) -> Self {
        Self {
            run: RunId::default(),
            phase: Phase::Idle,
            sequence: Vec::new(),
            index: 0,
            poll: None,
            timers: Vec::new(),
            settle_timeout_ms,
            dropped: 0,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The reveal order of the current or last run.
    pub fn sequence(&self) -> &[RevealEntry] {
        &self.sequence
    }

    /// Callbacks discarded because their run had been superseded.
    pub fn dropped_stale(&self) -> usize {
        self.dropped
    }

    /// Begin a new selection, superseding any run in progress.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        names: &[String],
        now_ms: u64,
        rng: &mut R,
    ) -> Result<Vec<Cue>, SelectionError> {
        if names.is_empty() {
            return Err(SelectionError::NoNames);
        }

        self.cancel();
        let winner = rng.gen_range(0..names.len());
        self.sequence = build_sequence(names, winner);
        self.index = 0;
        info!(run = self.run.0, names = names.len(), "starting selection");

        let mut cues = Vec::new();
        self.enter_entry(now_ms, &mut cues);
        Ok(cues)
    }

    /// Abandon the current run. Its pending timers become stale.
    pub fn cancel(&mut self) {
        self.run = self.run.next();
        self.phase = Phase::Idle;
        self.poll = None;
    }

    /// Advance the state machine.
    ///
    /// `settled` is whether the field has visually come to rest this frame.
    pub fn tick(&mut self, now_ms: u64, settled: bool) -> Vec<Cue> {
        let mut cues = Vec::new();

        if let Some(poll) = self.poll {
            if poll.run != self.run {
                self.drop_stale("settle poll");
                self.poll = None;
            } else if settled || now_ms.saturating_sub(poll.since_ms) >= self.settle_timeout_ms {
                if !settled {
                    debug!(run = poll.run.0, "settle timed out");
                }
                self.poll = None;
                self.on_settled(poll.awaiting, now_ms);
            }
        }

        let mut due = Vec::new();
        self.timers.retain(|timer| {
            if timer.due_ms <= now_ms {
                due.push(*timer);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|timer| timer.due_ms);

        for timer in due {
            if timer.run != self.run {
                self.drop_stale("timer");
                continue;
            }
            self.on_wake(timer.wake, now_ms, &mut cues);
        }

        cues
    }

    fn drop_stale(&mut self, what: &str) {
        self.dropped += 1;
        trace!(what, run = self.run.0, "dropping stale callback");
    }

    fn schedule(&mut self, due_ms: u64, wake: Wake) {
        self.timers.push(Timer {
            run: self.run,
            due_ms,
            wake,
        });
    }

    fn await_settle(&mut self, now_ms: u64, awaiting: Awaiting) {
        self.poll = Some(SettlePoll {
            run: self.run,
            since_ms: now_ms,
            awaiting,
        });
    }

    fn current(&self) -> Option<&RevealEntry> {
        self.sequence.get(self.index)
    }

    /// Show the name of the current entry.
    fn enter_entry(&mut self, now_ms: u64, cues: &mut Vec<Cue>) {
        let Some(entry) = self.current() else {
            return;
        };
        let text = entry.name.clone();
        self.phase = if entry.is_winner {
            Phase::Announcing
        } else {
            Phase::Revealing(self.index)
        };
        cues.push(Cue::Show { text, fast: true });
        self.await_settle(now_ms, Awaiting::Name);
    }

    fn on_settled(&mut self, awaiting: Awaiting, now_ms: u64) {
        let Some(entry) = self.current() else {
            return;
        };
        let is_winner = entry.is_winner;

        match awaiting {
            Awaiting::Name => {
                let pause = if is_winner {
                    WINNER_NAME_PAUSE_MS
                } else {
                    NAME_PAUSE_MS
                };
                self.schedule(now_ms + pause, Wake::ShowMessage);
            }
            Awaiting::Message => {
                if is_winner {
                    self.phase = Phase::Celebrating;
                    for burst in 0..FIREWORK_BURSTS {
                        self.schedule(now_ms + burst * FIREWORK_SPACING_MS, Wake::Firework);
                    }
                }
                let delay = step_delay(self.index, self.sequence.len(), is_winner);
                self.schedule(now_ms + delay, Wake::Advance);
            }
        }
    }

    fn on_wake(&mut self, wake: Wake, now_ms: u64, cues: &mut Vec<Cue>) {
        match wake {
            Wake::ShowMessage => {
                if let Some(entry) = self.current() {
                    cues.push(Cue::Show {
                        text: entry.message(),
                        fast: true,
                    });
                    self.await_settle(now_ms, Awaiting::Message);
                }
            }
            Wake::Firework => cues.push(Cue::Fireworks),
            Wake::Advance => {
                self.index += 1;
                if self.index >= self.sequence.len() {
                    info!(run = self.run.0, "selection finished");
                    self.phase = Phase::Idle;
                    cues.push(Cue::Finished);
                } else {
                    self.enter_entry(now_ms, cues);
                }
            }
        }
    }
}

/// Time the message for entry `index` stays up before the next entry.
///
/// Entries speed up toward the end of the sequence.
fn step_delay(index: usize, len: usize, is_winner: bool) -> u64 {
    if is_winner {
        return CELEBRATION_MS;
    }
    let progress = index as f64 / len.max(1) as f64;
    if progress > 0.7 {
        300 + len.saturating_sub(index + 1) as u64 * 50
    } else {
        900u64.saturating_sub(index as u64 * 20).max(400)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const FRAME_MS: u64 = 16;
    const TIMEOUT_MS: u64 = 1550;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Tick until the run finishes, collecting every cue.
    fn run_to_end(seq: &mut Sequencer, mut now: u64, settled: bool) -> Vec<Cue> {
        let mut cues = Vec::new();
        for _ in 0..100_000 {
            now += FRAME_MS;
            let step = seq.tick(now, settled);
            let finished = step.contains(&Cue::Finished);
            cues.extend(step);
            if finished {
                break;
            }
        }
        cues
    }

    #[test]
    fn test_sequence_has_one_winner() {
        let team = names(&["A", "B", "C"]);
        for seed in 0..20 {
            let mut seq = Sequencer::new(TIMEOUT_MS);
            let mut rng = StdRng::seed_from_u64(seed);
            seq.start(&team, 0, &mut rng).unwrap();

            let sequence = seq.sequence();
            assert_eq!(sequence.len(), 4);
            assert!(sequence[..3].iter().all(|e| !e.is_winner));
            let winners: Vec<&RevealEntry> = sequence.iter().filter(|e| e.is_winner).collect();
            assert_eq!(winners.len(), 1);
            assert!(team.contains(&winners[0].name));
        }
    }

    #[test]
    fn test_build_sequence_order() {
        let sequence = build_sequence(&names(&["A", "B"]), 1);
        assert_eq!(
            sequence,
            vec![
                RevealEntry { name: "A".into(), is_winner: false },
                RevealEntry { name: "B".into(), is_winner: false },
                RevealEntry { name: "B".into(), is_winner: true },
            ]
        );
    }

    #[test]
    fn test_empty_team_is_rejected() {
        let mut seq = Sequencer::new(TIMEOUT_MS);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(seq.start(&[], 0, &mut rng), Err(SelectionError::NoNames));
        assert_eq!(seq.phase(), Phase::Idle);
    }

    #[test]
    fn test_full_run_cues() {
        let team = names(&["A", "B", "C"]);
        let mut seq = Sequencer::new(TIMEOUT_MS);
        let mut rng = StdRng::seed_from_u64(11);
        let first = seq.start(&team, 0, &mut rng).unwrap();
        assert_eq!(
            first,
            vec![Cue::Show { text: "A".into(), fast: true }]
        );
        assert_eq!(seq.phase(), Phase::Revealing(0));

        let winner = seq.sequence()[3].name.clone();
        let mut now = 0;
        let mut cues = Vec::new();
        while !cues.contains(&Cue::Finished) && now < 100_000 {
            now += FRAME_MS;
            cues.extend(seq.tick(now, true));
        }

        let shown: Vec<&str> = cues
            .iter()
            .filter_map(|c| match c {
                Cue::Show { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        let winner_message = format!("{winner} it's you!");
        assert_eq!(
            shown,
            vec![
                "Is it you?",
                "B",
                "Is it you?",
                "C",
                "Is it you?",
                winner.as_str(),
                winner_message.as_str(),
            ]
        );
        assert_eq!(cues.last(), Some(&Cue::Finished));
        assert_eq!(seq.phase(), Phase::Idle);

        // The celebration ends after 2000 ms; the bursts due later still land.
        assert_eq!(cues.iter().filter(|c| **c == Cue::Fireworks).count(), 7);
        let mut after = Vec::new();
        for _ in 0..100 {
            now += FRAME_MS;
            after.extend(seq.tick(now, true));
        }
        assert_eq!(after, vec![Cue::Fireworks; 3]);
    }

    #[test]
    fn test_phases_progress() {
        let team = names(&["A", "B"]);
        let mut seq = Sequencer::new(TIMEOUT_MS);
        let mut rng = StdRng::seed_from_u64(2);
        seq.start(&team, 0, &mut rng).unwrap();

        let mut seen = HashSet::new();
        let mut now = 0;
        while now < 60_000 {
            now += FRAME_MS;
            seq.tick(now, true);
            seen.insert(seq.phase());
            if seq.phase() == Phase::Idle {
                break;
            }
        }
        assert!(seen.contains(&Phase::Revealing(1)));
        assert!(seen.contains(&Phase::Announcing));
        assert!(seen.contains(&Phase::Celebrating));
        assert!(seen.contains(&Phase::Idle));
    }

    #[test]
    fn test_timeout_keeps_run_alive() {
        let team = names(&["A"]);
        let mut seq = Sequencer::new(TIMEOUT_MS);
        let mut rng = StdRng::seed_from_u64(4);
        seq.start(&team, 0, &mut rng).unwrap();
        let cues = run_to_end(&mut seq, 0, false);
        assert_eq!(cues.last(), Some(&Cue::Finished));
    }

    #[test]
    fn test_settle_waits_for_timeout() {
        let team = names(&["A"]);
        let mut seq = Sequencer::new(TIMEOUT_MS);
        let mut rng = StdRng::seed_from_u64(4);
        seq.start(&team, 0, &mut rng).unwrap();

        // Not settled: nothing happens before the timeout.
        assert!(seq.tick(TIMEOUT_MS - 1, false).is_empty());
        assert!(seq.tick(TIMEOUT_MS, false).is_empty());
        // Timed out: the question follows after the pause.
        assert_eq!(
            seq.tick(TIMEOUT_MS + NAME_PAUSE_MS, false),
            vec![Cue::Show { text: "Is it you?".into(), fast: true }]
        );
    }

    #[test]
    fn test_restart_invalidates_previous_run() {
        let mut seq = Sequencer::new(TIMEOUT_MS);
        let mut rng = StdRng::seed_from_u64(5);

        seq.start(&names(&["A", "B", "C"]), 0, &mut rng).unwrap();
        let first_run = seq.run_id();
        // Name settles; the question is now scheduled for run one.
        assert!(seq.tick(16, true).is_empty());

        let cues = seq.start(&names(&["X", "Y"]), 20, &mut rng).unwrap();
        assert_ne!(seq.run_id(), first_run);
        assert_eq!(cues, vec![Cue::Show { text: "X".into(), fast: true }]);

        // Run one's question comes due and must be discarded.
        assert!(seq.tick(16 + NAME_PAUSE_MS, false).is_empty());
        assert_eq!(seq.dropped_stale(), 1);

        // Run two carries on by itself.
        let rest = run_to_end(&mut seq, 16 + NAME_PAUSE_MS, true);
        for cue in &rest {
            if let Cue::Show { text, .. } = cue {
                assert!(!text.starts_with('A') && !text.starts_with('B') && !text.starts_with('C'));
            }
        }
        assert_eq!(rest.last(), Some(&Cue::Finished));
    }

    #[test]
    fn test_cancel_silences_pending_fireworks() {
        let team = names(&["A"]);
        let mut seq = Sequencer::new(TIMEOUT_MS);
        let mut rng = StdRng::seed_from_u64(6);
        seq.start(&team, 0, &mut rng).unwrap();

        let mut now = 0;
        let mut fired = 0;
        while seq.phase() != Phase::Celebrating {
            now += FRAME_MS;
            fired += seq.tick(now, true).iter().filter(|c| **c == Cue::Fireworks).count();
        }
        seq.cancel();
        assert_eq!(seq.phase(), Phase::Idle);

        let mut cues = Vec::new();
        for _ in 0..500 {
            now += FRAME_MS;
            cues.extend(seq.tick(now, true));
        }
        assert!(cues.is_empty());
        // Remaining bursts and the advance timer were all stale.
        assert_eq!(seq.dropped_stale(), 10 - fired + 1);
    }

    #[test]
    fn test_step_delay() {
        assert_eq!(step_delay(0, 10, true), CELEBRATION_MS);
        assert_eq!(step_delay(0, 10, false), 900);
        assert_eq!(step_delay(5, 10, false), 800);
        assert_eq!(step_delay(8, 10, false), 350);
        assert_eq!(step_delay(9, 10, false), 300);
        assert_eq!(step_delay(30, 50, false), 400);
        assert_eq!(step_delay(40, 50, false), 750);
    }
}
