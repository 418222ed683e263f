//! Backtracking search for disjoint chain covers.
//!
//! The search keeps one flat candidate queue instead of a recursion stack.
//! Accepting a chain start appends `(n - 2) * (n - 3)` sibling candidates to
//! the queue tail; backtracking truncates exactly that many again, so every
//! backtrack is O(1) apart from clearing one bitset. Committed starts are
//! remembered by queue position, and the scan after each accept resumes just
//! past that position, so each combination of positions is visited once.
//!
//! Key properties:
//! - `used` always equals the seed block plus the union of the coverage of
//!   every committed start, and those coverages are pairwise disjoint
//! - the queue length at depth `d` is `seed_len + d * level_width`
//! - nothing is allocated in the hot loop once the queue has grown

use std::fmt;
use std::ops::{ControlFlow, Range};
use std::str::FromStr;
use std::time::Instant;

use log::info;

use crate::bitset::GroupSet;
use crate::error::CheckpointError;
use crate::rotation::cycle_shift;
use crate::{PermIndex, Tables};

/// Which seed positions may be chosen as the first chain start.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SeedScope {
    /// Only the last seed; the other seeds remain available at deeper levels.
    #[default]
    Canonical,
    /// Every seed position.
    All,
    /// Seed positions in the given range, clamped to the seed length.
    Positions(Range<usize>),
}

/// Search configuration.
#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    pub seeds: SeedScope,
}

/// Receives complete solutions as the search finds them.
pub trait SolutionSink {
    /// Called with the accepted chain starts of one complete solution.
    /// Returning `Break` stops the search after this solution.
    fn emit(&mut self, solution: &[PermIndex]) -> ControlFlow<()>;

    /// Polled between search steps; returning `true` stops the search.
    fn should_stop(&mut self) -> bool {
        false
    }
}

impl<F> SolutionSink for F
where
    F: FnMut(&[PermIndex]) -> ControlFlow<()>,
{
    fn emit(&mut self, solution: &[PermIndex]) -> ControlFlow<()> {
        self(solution)
    }
}

/// Why a call to [`ChainSearch::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Every reachable solution has been emitted.
    Exhausted,
    /// The sink asked to stop; the search can be continued or checkpointed.
    Stopped,
}

/// Counters reported at the end of a run. Counts accumulate across runs of
/// the same search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSummary {
    pub solutions: u64,
    pub steps: u64,
    pub max_depth: usize,
    pub termination: Termination,
}

/// Resumable search position: the queue positions of the committed chain
/// starts and the read cursor.
///
/// Text form is `positions;cursor`, for example `23,24,26;27`. Without the
/// `;cursor` part the cursor defaults to just past the last position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    pub positions: Vec<usize>,
    pub cursor: Option<usize>,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, position) in self.positions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{position}")?;
        }
        if let Some(cursor) = self.cursor {
            write!(f, ";{cursor}")?;
        }
        Ok(())
    }
}

impl FromStr for Checkpoint {
    type Err = CheckpointError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parse = |entry: &str| {
            entry
                .trim()
                .parse::<usize>()
                .map_err(|_| CheckpointError::Parse(entry.to_string()))
        };
        let (list, cursor) = match text.split_once(';') {
            Some((list, cursor)) => (list, Some(parse(cursor)?)),
            None => (text, None),
        };
        let positions = list
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { positions, cursor })
    }
}

/// One depth-first search over chain covers, owning all mutable state.
pub struct ChainSearch<'t> {
    tables: &'t Tables,
    /// Seed block plus coverage of every committed start.
    used: GroupSet,
    queue: Vec<PermIndex>,
    read: usize,
    /// Queue positions of committed chain starts.
    inserts: Vec<usize>,
    seed_len: usize,
    seed_window: Range<usize>,
    /// Candidates appended per accept, `(n - 2) * (n - 3)`.
    level_width: usize,
    max_insert: usize,
    solution: Vec<PermIndex>,
    finished: bool,
    steps: u64,
    solutions: u64,
    max_depth: usize,
}

impl<'t> ChainSearch<'t> {
    /// Seeds a new search.
    ///
    /// The first `(n - 1) * (n - 2)` groups stand for one fixed starting
    /// chain and are marked used. Every index below `n * (n - 1) * (n - 2)`
    /// whose coverage avoids them becomes a seed candidate.
    pub fn new(tables: &'t Tables, options: SearchOptions) -> Self {
        let n = tables.symbols();
        let coverage = &tables.coverage;
        let used = GroupSet::with_prefix(coverage.group_count(), (n - 1) * (n - 2));

        let level_width = (n - 2) * (n - 3);
        let max_insert = tables.max_insert();
        let mut queue = Vec::with_capacity(n * (n - 1) * (n - 2) + level_width * max_insert);
        queue.extend((0..n * (n - 1) * (n - 2)).filter(|&i| !used.intersects(coverage.bits(i))));

        let seed_len = queue.len();
        let seed_window = match options.seeds {
            SeedScope::Canonical => seed_len.saturating_sub(1)..seed_len,
            SeedScope::All => 0..seed_len,
            SeedScope::Positions(range) => range.start.min(seed_len)..range.end.min(seed_len),
        };

        Self {
            tables,
            used,
            queue,
            read: seed_window.start,
            inserts: Vec::with_capacity(max_insert),
            seed_len,
            seed_window,
            level_width,
            max_insert,
            solution: Vec::with_capacity(max_insert),
            finished: false,
            steps: 0,
            solutions: 0,
            max_depth: 0,
        }
    }

    /// Rebuilds the state recorded in `checkpoint` on a fresh search.
    ///
    /// The options must match those of the run that produced the checkpoint.
    pub fn resume(
        tables: &'t Tables,
        options: SearchOptions,
        checkpoint: &Checkpoint,
    ) -> Result<Self, CheckpointError> {
        let mut search = Self::new(tables, options);
        let depth = checkpoint.positions.len();
        if depth > 0 && depth >= search.max_insert {
            return Err(CheckpointError::TooDeep {
                depth,
                max: search.max_insert,
            });
        }

        for &position in &checkpoint.positions {
            let window = search.read..search.scan_end();
            if !window.contains(&position) {
                return Err(CheckpointError::OutOfWindow {
                    position,
                    start: window.start,
                    end: window.end,
                });
            }
            let index = search.queue[position];
            if search.used.intersects(tables.coverage.bits(index)) {
                return Err(CheckpointError::Conflict { position, index });
            }
            search.commit(position);
        }

        if let Some(cursor) = checkpoint.cursor {
            // the cursor may sit at the window end, meaning the level is spent
            let end = search.scan_end();
            if cursor < search.read || cursor > end {
                return Err(CheckpointError::OutOfWindow {
                    position: cursor,
                    start: search.read,
                    end,
                });
            }
            search.read = cursor;
        }
        search.max_depth = search.inserts.len();

        Ok(search)
    }

    /// The depth-0 candidates, in queue order.
    pub fn seed(&self) -> &[PermIndex] {
        &self.queue[..self.seed_len]
    }

    /// Seed positions eligible as the first chain start.
    pub fn seed_window(&self) -> Range<usize> {
        self.seed_window.clone()
    }

    /// Number of committed chain starts.
    #[inline]
    pub fn depth(&self) -> usize {
        self.inserts.len()
    }

    /// Chain starts a complete solution commits.
    #[inline]
    pub fn max_insert(&self) -> usize {
        self.max_insert
    }

    /// Groups covered by the seed block and the committed chain starts.
    pub fn used(&self) -> &GroupSet {
        &self.used
    }

    /// The committed chain starts, shallowest first.
    pub fn committed(&self) -> impl Iterator<Item = PermIndex> + '_ {
        self.inserts.iter().map(|&position| self.queue[position])
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            positions: self.inserts.clone(),
            cursor: Some(self.read),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Runs until the search space is exhausted or the sink asks to stop.
    ///
    /// A stopped search may be run again to continue where it left off.
    pub fn run<S: SolutionSink + ?Sized>(&mut self, sink: &mut S) -> SearchSummary {
        info!(
            "Searching {}-symbol chain covers: {} seeds, first start from positions {:?}, {} starts per solution",
            self.tables.symbols(),
            self.seed_len,
            self.seed_window,
            self.max_insert
        );
        let start = Instant::now();

        let termination = self.drive(sink);

        info!(
            "Search {}: {} solutions in {} steps, max depth {}, {:.3}s",
            match termination {
                Termination::Exhausted => "exhausted",
                Termination::Stopped => "stopped",
            },
            self.solutions,
            self.steps,
            self.max_depth,
            start.elapsed().as_secs_f64()
        );
        self.summary(termination)
    }

    /// Collects up to `limit` solutions, or all of them.
    pub fn collect(&mut self, limit: Option<usize>) -> Vec<Vec<PermIndex>> {
        let mut solutions = Vec::new();
        if limit == Some(0) {
            return solutions;
        }
        self.run(&mut |solution: &[PermIndex]| {
            solutions.push(solution.to_vec());
            if limit.is_some_and(|limit| solutions.len() >= limit) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        solutions
    }

    fn summary(&self, termination: Termination) -> SearchSummary {
        SearchSummary {
            solutions: self.solutions,
            steps: self.steps,
            max_depth: self.max_depth,
            termination,
        }
    }

    fn drive<S: SolutionSink + ?Sized>(&mut self, sink: &mut S) -> Termination {
        if self.finished {
            return Termination::Exhausted;
        }

        if self.max_insert == 0 {
            // the starting chain alone already covers every group
            self.finished = true;
            self.solutions += 1;
            let _ = sink.emit(&[]);
            return Termination::Exhausted;
        }

        loop {
            if sink.should_stop() {
                return Termination::Stopped;
            }
            self.steps += 1;

            let accepted = self.advance();
            if self.inserts.is_empty() {
                self.finished = true;
                return Termination::Exhausted;
            }
            self.max_depth = self.max_depth.max(self.inserts.len());

            if self.inserts.len() == self.max_insert {
                self.solutions += 1;
                self.solution.clear();
                self.solution
                    .extend(self.inserts.iter().map(|&position| self.queue[position]));
                debug_assert!(self.used.is_full(), "complete solution left groups uncovered");

                let flow = sink.emit(&self.solution);
                self.backtrack();
                if flow.is_break() {
                    return Termination::Stopped;
                }
            } else if !accepted {
                self.backtrack();
            }
        }
    }

    /// Scans forward for the next candidate whose coverage is still free and
    /// commits it. Returns `false` if the scan window ran out.
    #[inline]
    fn advance(&mut self) -> bool {
        let tables = self.tables;
        let end = self.scan_end();

        while self.read < end {
            let position = self.read;
            self.read += 1;
            if self.used.intersects(tables.coverage.bits(self.queue[position])) {
                continue;
            }
            self.commit(position);
            return true;
        }

        false
    }

    /// Commits the candidate at `position` and appends the next level of
    /// candidates: for each of the `n - 2` values the chain visits, the
    /// in-group rotations two to `n - 2` steps along.
    fn commit(&mut self, position: usize) {
        let tables = self.tables;
        let n = tables.symbols();
        let start = self.queue[position];

        self.used.union_with(tables.coverage.bits(start));
        for value in tables.rotation.walk(start).take(n - 2) {
            self.queue
                .extend((2..n - 1).map(|shift| cycle_shift(value, shift, n)));
        }
        self.inserts.push(position);
        self.read = position + 1;

        debug_assert_eq!(
            self.queue.len(),
            self.seed_len + self.inserts.len() * self.level_width
        );
    }

    /// Undoes the deepest commit and moves the cursor just past it.
    /// Returns `false` at depth zero.
    fn backtrack(&mut self) -> bool {
        let Some(position) = self.inserts.pop() else {
            return false;
        };
        debug_assert!(self.queue.len() >= position + 1 + self.level_width);

        self.queue.truncate(self.queue.len() - self.level_width);
        self.read = position + 1;
        self.used
            .difference_with(self.tables.coverage.bits(self.queue[position]));

        debug_assert_eq!(
            self.queue.len(),
            self.seed_len + self.inserts.len() * self.level_width
        );
        true
    }

    /// End of the current scan window: the seed window at depth zero, the
    /// whole queue deeper down.
    #[inline(always)]
    fn scan_end(&self) -> usize {
        if self.inserts.is_empty() {
            self.seed_window.end
        } else {
            self.queue.len()
        }
    }
}
