// stream_reply — Incremental terminal rendering for streamed assistant replies
// Copyright (C) 2025  The stream-reply contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::time::Duration;

pub const DEFAULT_CHARS_PER_TICK: usize = 3;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(15);

/// Pacing knobs for the typing effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    /// Characters revealed per tick.
    pub chars_per_tick: usize,
    /// Wall-clock spacing between ticks, independent of reply length.
    pub tick_interval: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { chars_per_tick: DEFAULT_CHARS_PER_TICK, tick_interval: DEFAULT_TICK_INTERVAL }
    }
}

/// What an `advance` call did to the pacing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// New text extends the old; `delta` bytes were appended.
    Extended { delta: usize },
    /// New text did not extend the old; reveal restarted from empty.
    Reset,
}

/// Result of an `advance` call: the change plus the loop the caller must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceOutcome {
    pub advance: Advance,
    /// Set when a fresh ticking loop must be started with this generation.
    /// Any previously running loop for the session is stale from now on.
    pub start_loop: Option<u64>,
}

/// One step of a ticking loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belonged to a cancelled or superseded loop and was dropped.
    Stale,
    /// The revealed prefix grew; more text is still hidden.
    Revealed,
    /// The revealed prefix caught up with the accumulated text; the loop ended.
    CaughtUp,
}

/// Paces a monotonically advancing revealed-length pointer into the
/// accumulated reply text, independent of how chunks arrive.
///
/// The scheduler itself never sleeps. A ticking loop is identified by its
/// generation; the owner spawns a timer for each generation handed out by
/// [`RevealScheduler::advance`] and feeds its ticks back through
/// [`RevealScheduler::tick`]. Ticks from any other generation are ignored.
#[derive(Debug)]
pub struct RevealScheduler {
    config: RevealConfig,
    accumulated: String,
    /// Byte offset into `accumulated`, always on a char boundary.
    revealed: usize,
    active: Option<u64>,
    next_generation: u64,
}

impl RevealScheduler {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            accumulated: String::new(),
            revealed: 0,
            active: None,
            next_generation: 1,
        }
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    pub fn revealed_text(&self) -> &str {
        &self.accumulated[..self.revealed]
    }

    pub fn is_ticking(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active
    }

    pub fn is_caught_up(&self) -> bool {
        self.revealed == self.accumulated.len()
    }

    /// Take a new snapshot of the accumulated text.
    ///
    /// Text that does not extend the previous snapshot is a hard reset: the
    /// revealed pointer returns to zero and the running loop is invalidated.
    pub fn advance(&mut self, new_text: &str) -> AdvanceOutcome {
        let advance = if new_text.starts_with(self.accumulated.as_str()) {
            let old_len = self.accumulated.len();
            self.accumulated.push_str(&new_text[old_len..]);
            let delta = new_text.len() - old_len;
            Advance::Extended { delta }
        } else {
            tracing::debug!(
                previous_len = self.accumulated.len(),
                new_len = new_text.len(),
                "reply text replaced; restarting reveal"
            );
            self.active = None;
            self.revealed = 0;
            new_text.clone_into(&mut self.accumulated);
            Advance::Reset
        };

        let start_loop = if self.active.is_none() && !self.is_caught_up() {
            Some(self.start_generation())
        } else {
            None
        };

        AdvanceOutcome { advance, start_loop }
    }

    /// Apply one tick of `generation`.
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if self.active != Some(generation) {
            return TickOutcome::Stale;
        }

        let rest = &self.accumulated[self.revealed..];
        let step = rest
            .char_indices()
            .nth(self.config.chars_per_tick.max(1))
            .map_or(rest.len(), |(offset, _)| offset);
        self.revealed += step;

        if self.is_caught_up() {
            self.active = None;
            TickOutcome::CaughtUp
        } else {
            TickOutcome::Revealed
        }
    }

    /// Stop the active loop. Later ticks of its generation are stale.
    pub fn cancel(&mut self) {
        if let Some(generation) = self.active.take() {
            tracing::debug!(generation, revealed = self.revealed, "reveal loop cancelled");
        }
    }

    /// Cancel ticking and reveal everything at once.
    pub fn flush(&mut self) {
        self.cancel();
        self.revealed = self.accumulated.len();
    }

    /// Replace the accumulated text outright and reveal all of it.
    /// Used when the reply body is substituted at finalization.
    pub fn replace_revealed(&mut self, text: &str) {
        self.cancel();
        text.clone_into(&mut self.accumulated);
        self.revealed = self.accumulated.len();
    }

    fn start_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.active = Some(generation);
        generation
    }
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new(RevealConfig::default())
    }
}

#[cfg(test)]
mod tests {
    // =====
    // TESTS: 13
    // =====

    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(scheduler: &mut RevealScheduler, generation: u64) -> Vec<String> {
        let mut frames = Vec::new();
        loop {
            let outcome = scheduler.tick(generation);
            if outcome == TickOutcome::Stale {
                break;
            }
            frames.push(scheduler.revealed_text().to_owned());
            if outcome == TickOutcome::CaughtUp {
                break;
            }
        }
        frames
    }

    #[test]
    fn first_advance_starts_a_loop() {
        let mut scheduler = RevealScheduler::default();
        let outcome = scheduler.advance("Hello");
        assert_eq!(outcome.advance, Advance::Extended { delta: 5 });
        assert_eq!(outcome.start_loop, Some(1));
        assert!(scheduler.is_ticking());
        assert_eq!(scheduler.revealed_len(), 0);
    }

    #[test]
    fn empty_advance_does_not_start_a_loop() {
        let mut scheduler = RevealScheduler::default();
        let outcome = scheduler.advance("");
        assert_eq!(outcome.start_loop, None);
        assert!(!scheduler.is_ticking());
    }

    #[test]
    fn ticks_reveal_fixed_quantum() {
        let mut scheduler = RevealScheduler::default();
        let generation = scheduler.advance("abcdefgh").start_loop.unwrap();
        assert_eq!(drain(&mut scheduler, generation), vec!["abc", "abcdef", "abcdefgh"]);
        assert!(!scheduler.is_ticking());
    }

    #[test]
    fn quantum_respects_char_boundaries() {
        let mut scheduler = RevealScheduler::default();
        let generation = scheduler.advance("héllo wörld").start_loop.unwrap();
        let frames = drain(&mut scheduler, generation);
        assert_eq!(frames[0], "hél");
        assert_eq!(frames.last().map(String::as_str), Some("héllo wörld"));
    }

    #[test]
    fn burst_while_ticking_keeps_the_same_loop() {
        let mut scheduler = RevealScheduler::default();
        let generation = scheduler.advance("Hello ").start_loop.unwrap();
        assert_eq!(scheduler.tick(generation), TickOutcome::Revealed);
        let outcome = scheduler.advance("Hello world, this arrived at once");
        assert_eq!(outcome.advance, Advance::Extended { delta: 27 });
        assert_eq!(outcome.start_loop, None);
        assert_eq!(scheduler.active_generation(), Some(generation));
    }

    #[test]
    fn loop_resumes_after_catching_up() {
        let mut scheduler = RevealScheduler::default();
        let first = scheduler.advance("ab").start_loop.unwrap();
        assert_eq!(scheduler.tick(first), TickOutcome::CaughtUp);
        let second = scheduler.advance("abcd").start_loop.unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.tick(first), TickOutcome::Stale);
        assert_eq!(scheduler.tick(second), TickOutcome::CaughtUp);
        assert_eq!(scheduler.revealed_text(), "abcd");
    }

    #[test]
    fn revealed_length_is_monotonic_without_reset() {
        let mut scheduler = RevealScheduler::default();
        let chunks = ["Hel", "lo w", "orld\n```rs\n", "fn main() {}\n", "```\n"];
        let mut text = String::new();
        let mut generation = None;
        let mut last = 0;
        for chunk in chunks {
            text.push_str(chunk);
            if let Some(started) = scheduler.advance(&text).start_loop {
                generation = Some(started);
            }
            assert!(scheduler.revealed_len() >= last);
            last = scheduler.revealed_len();
            if let Some(generation) = generation {
                scheduler.tick(generation);
                assert!(scheduler.revealed_len() >= last);
                last = scheduler.revealed_len();
            }
        }
    }

    #[test]
    fn non_extending_text_resets_to_zero() {
        let mut scheduler = RevealScheduler::default();
        let first = scheduler.advance("Hello world").start_loop.unwrap();
        scheduler.tick(first);
        scheduler.tick(first);
        assert_eq!(scheduler.revealed_len(), 6);

        let outcome = scheduler.advance("Goodbye");
        assert_eq!(outcome.advance, Advance::Reset);
        assert_eq!(scheduler.revealed_len(), 0);
        let second = outcome.start_loop.unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.tick(first), TickOutcome::Stale);
        assert_eq!(drain(&mut scheduler, second), vec!["Goo", "Goodby", "Goodbye"]);
    }

    #[test]
    fn shrinking_text_is_a_reset() {
        let mut scheduler = RevealScheduler::default();
        scheduler.advance("Hello world");
        assert_eq!(scheduler.advance("Hello").advance, Advance::Reset);
        assert_eq!(scheduler.accumulated(), "Hello");
    }

    #[test]
    fn cancel_makes_pending_ticks_stale() {
        let mut scheduler = RevealScheduler::default();
        let generation = scheduler.advance("abcdef").start_loop.unwrap();
        scheduler.cancel();
        assert_eq!(scheduler.tick(generation), TickOutcome::Stale);
        assert_eq!(scheduler.revealed_len(), 0);
    }

    #[test]
    fn flush_reveals_everything() {
        let mut scheduler = RevealScheduler::default();
        scheduler.advance("abcdef");
        scheduler.flush();
        assert!(scheduler.is_caught_up());
        assert!(!scheduler.is_ticking());
    }

    #[test]
    fn replace_revealed_substitutes_body() {
        let mut scheduler = RevealScheduler::default();
        scheduler.advance("partial");
        scheduler.replace_revealed("Error: boom");
        assert_eq!(scheduler.revealed_text(), "Error: boom");
        assert!(!scheduler.is_ticking());
    }

    #[test]
    fn zero_quantum_still_progresses() {
        let config = RevealConfig { chars_per_tick: 0, ..RevealConfig::default() };
        let mut scheduler = RevealScheduler::new(config);
        let generation = scheduler.advance("ab").start_loop.unwrap();
        assert_eq!(scheduler.tick(generation), TickOutcome::Revealed);
        assert_eq!(scheduler.revealed_text(), "a");
    }
}
