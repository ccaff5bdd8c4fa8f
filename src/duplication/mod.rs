//! Near-duplicate block detection.
//!
//! Units are normalized into code lines and cut into fixed-size sliding
//! windows. Exact copies are found by bucketing window fingerprints. Near
//! copies are found with a prefix filter over each window's token multiset:
//! any pair whose ratio can reach the threshold shares a token among the
//! rarest few of both windows, so only those pairs are bounded and scored.
//! Matching window pairs that continue along the same diagonal are merged
//! into one block.
//!
//! The index is written by a single owner: every unit is inserted with
//! `&mut self` before [`DuplicationIndex::find_duplicates`] borrows it
//! immutably, so comparison only starts once accumulation is complete.

mod normalize;
mod similarity;

pub use normalize::{normalize_source, NormalizedLine};
pub use similarity::{length_bound, ratio_upper_bound, similarity_ratio, TokenBag};

use crate::config::DuplicationConfig;
use crate::core::{BlockLocation, DuplicateBlock, DuplicationReport};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use xxhash_rust::xxh64::Xxh64;

/// Slack for float thresholds so rounding never shortens a prefix.
const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Window {
    slot: usize,
    start: usize,
}

type WindowPair = (Window, Window);

/// The `n`-th occurrence of a token inside one window.
type Element<'a> = (&'a str, usize);

fn ordered(a: Window, b: Window) -> WindowPair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug)]
struct IndexedUnit {
    id: String,
    lines: Vec<NormalizedLine>,
}

/// Token data of one window, shared by candidate generation and scoring.
struct WindowTokens<'a> {
    window: Window,
    tokens: Vec<&'a str>,
    bag: TokenBag<'a>,
    /// Multiset elements, rarest across the index first
    elements: Vec<Element<'a>>,
    prefix: usize,
}

#[derive(Debug)]
pub struct DuplicationIndex {
    config: DuplicationConfig,
    units: Vec<IndexedUnit>,
}

impl DuplicationIndex {
    pub fn new(config: &DuplicationConfig) -> Self {
        Self {
            config: *config,
            units: Vec::new(),
        }
    }

    /// Add a unit's normalized lines. Returns the slot used to look up its
    /// report afterwards.
    pub fn insert(&mut self, unit_id: impl Into<String>, lines: Vec<NormalizedLine>) -> usize {
        self.units.push(IndexedUnit {
            id: unit_id.into(),
            lines,
        });
        self.units.len() - 1
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn find_duplicates(&self, parallel: bool) -> DuplicationFindings {
        let window = self.config.window_lines;
        if window == 0 {
            return self.findings(Vec::new());
        }

        let mut matches = self.exact_matches();
        let exact = matches.len();

        let mut candidates = 0;
        if self.config.similarity_threshold < 1.0 {
            let (considered, near) = self.near_matches(&matches, parallel);
            candidates = considered;
            matches.extend(near);
        }

        log::debug!(
            "duplication: {} units, {} exact window pairs, {} near candidates, {} matches",
            self.units.len(),
            exact,
            candidates,
            matches.len()
        );

        let kept = keep_best_partners(matches);
        let blocks = self.merge_runs(&kept);
        self.findings(blocks)
    }

    fn window_count(&self, slot: usize) -> usize {
        let lines = self.units[slot].lines.len();
        let window = self.config.window_lines;
        if lines >= window {
            lines - window + 1
        } else {
            0
        }
    }

    fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        (0..self.units.len())
            .flat_map(move |slot| (0..self.window_count(slot)).map(move |start| Window { slot, start }))
    }

    fn lines_of(&self, window: Window) -> &[NormalizedLine] {
        let end = window.start + self.config.window_lines;
        &self.units[window.slot].lines[window.start..end]
    }

    fn tokens_of(&self, window: Window) -> Vec<&str> {
        self.lines_of(window)
            .iter()
            .flat_map(NormalizedLine::tokens)
            .collect()
    }

    fn fingerprint(&self, window: Window) -> u64 {
        let mut hasher = Xxh64::new(0);
        for line in self.lines_of(window) {
            hasher.update(line.text.as_bytes());
            hasher.update(b"\n");
        }
        hasher.digest()
    }

    fn same_text(&self, a: Window, b: Window) -> bool {
        self.lines_of(a)
            .iter()
            .map(|line| &line.text)
            .eq(self.lines_of(b).iter().map(|line| &line.text))
    }

    /// Windows of one unit that share lines are never compared.
    fn overlapping(&self, a: Window, b: Window) -> bool {
        let window = self.config.window_lines;
        a.slot == b.slot && a.start < b.start + window && b.start < a.start + window
    }

    fn exact_matches(&self) -> BTreeMap<WindowPair, f64> {
        let mut buckets: HashMap<u64, Vec<Window>> = HashMap::new();
        for window in self.windows() {
            buckets.entry(self.fingerprint(window)).or_default().push(window);
        }

        let mut matches = BTreeMap::new();
        for group in buckets.values().filter(|group| group.len() > 1) {
            for (i, &a) in group.iter().enumerate() {
                for &b in &group[i + 1..] {
                    if !self.overlapping(a, b) && self.same_text(a, b) {
                        matches.insert(ordered(a, b), 1.0);
                    }
                }
            }
        }
        matches
    }

    /// Score every window pair that could reach the threshold and is not
    /// already an exact match. Returns the number of pairs scored as well.
    fn near_matches(&self, exact: &BTreeMap<WindowPair, f64>, parallel: bool) -> (usize, Vec<(WindowPair, f64)>) {
        let threshold = self.config.similarity_threshold;
        let mut prepared: Vec<WindowTokens<'_>> = self
            .windows()
            .map(|window| {
                let tokens = self.tokens_of(window);
                WindowTokens {
                    window,
                    bag: TokenBag::new(&tokens),
                    elements: multiset_elements(&tokens),
                    tokens,
                    prefix: 0,
                }
            })
            .collect();

        let mut frequency: HashMap<Element<'_>, usize> = HashMap::new();
        for window in &prepared {
            for element in &window.elements {
                *frequency.entry(*element).or_default() += 1;
            }
        }
        for window in &mut prepared {
            window
                .elements
                .sort_unstable_by_key(|element| (frequency.get(element).copied().unwrap_or(0), *element));
            window.prefix = prefix_length(window.elements.len(), threshold);
        }

        let mut postings: HashMap<Element<'_>, Vec<usize>> = HashMap::new();
        for (index, window) in prepared.iter().enumerate() {
            for element in &window.elements[..window.prefix] {
                postings.entry(*element).or_default().push(index);
            }
        }

        let scanned: Vec<(usize, Vec<(WindowPair, f64)>)> = if parallel {
            (0..prepared.len())
                .into_par_iter()
                .map(|index| self.scan_partners(&prepared, &postings, exact, index))
                .collect()
        } else {
            (0..prepared.len())
                .map(|index| self.scan_partners(&prepared, &postings, exact, index))
                .collect()
        };

        scanned
            .into_iter()
            .fold((0, Vec::new()), |(count, mut all), (considered, found)| {
                all.extend(found);
                (count + considered, all)
            })
    }

    /// Pairs of `prepared[index]` with later windows sharing a prefix element.
    fn scan_partners(
        &self,
        prepared: &[WindowTokens<'_>],
        postings: &HashMap<Element<'_>, Vec<usize>>,
        exact: &BTreeMap<WindowPair, f64>,
        index: usize,
    ) -> (usize, Vec<(WindowPair, f64)>) {
        let threshold = self.config.similarity_threshold;
        let current = &prepared[index];

        let mut partners: Vec<usize> = current.elements[..current.prefix]
            .iter()
            .filter_map(|element| postings.get(element))
            .flat_map(|list| list.iter().copied().filter(move |&other| other > index))
            .collect();
        partners.sort_unstable();
        partners.dedup();

        let mut considered = 0;
        let mut found = Vec::new();
        for other in partners.into_iter().map(|other| &prepared[other]) {
            let pair = ordered(current.window, other.window);
            if self.overlapping(current.window, other.window) || exact.contains_key(&pair) {
                continue;
            }
            considered += 1;
            if let Some(ratio) = score_pair(current, other, threshold) {
                found.push((pair, ratio));
            }
        }
        (considered, found)
    }

    /// Merge matching pairs that advance together one window at a time.
    fn merge_runs(&self, matches: &[(WindowPair, f64)]) -> Vec<IndexedBlock> {
        let mut by_diagonal: Vec<(RunKey, usize, f64)> = matches
            .iter()
            .map(|&((a, b), ratio)| {
                let key = RunKey {
                    slot_a: a.slot,
                    slot_b: b.slot,
                    diagonal: b.start as isize - a.start as isize,
                };
                (key, a.start, ratio)
            })
            .collect();
        by_diagonal.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));

        let mut runs: Vec<Run> = Vec::new();
        let mut current: Option<RunKey> = None;
        let mut steps: Vec<(usize, f64)> = Vec::new();
        for (key, start, ratio) in by_diagonal {
            let continues = current == Some(key) && steps.last().is_some_and(|&(last, _)| last + 1 == start);
            if !continues {
                if let Some(previous) = current {
                    self.split_run(previous, &steps, &mut runs);
                }
                steps.clear();
                current = Some(key);
            }
            steps.push((start, ratio));
        }
        if let Some(previous) = current {
            self.split_run(previous, &steps, &mut runs);
        }

        let mut blocks: Vec<IndexedBlock> = runs.iter().map(|run| self.block_from_run(run)).collect();
        blocks.sort_by(|x, y| {
            (x.first_slot, x.first_span.0, x.second_slot, x.second_span.0)
                .cmp(&(y.first_slot, y.first_span.0, y.second_slot, y.second_span.0))
        });
        blocks
    }

    /// Turn one contiguous stretch of a diagonal into runs.
    ///
    /// Evenly spaced copies inside one unit share a diagonal, so a stretch
    /// can chain copy A into B into C. When a stretch reaches into its own
    /// copy and holds both exact and near windows, the near windows are the
    /// ones straddling two copies and are dropped. What remains is cut into
    /// segments one diagonal apart, each covering at most one copy.
    fn split_run(&self, key: RunKey, steps: &[(usize, f64)], runs: &mut Vec<Run>) {
        if key.slot_a != key.slot_b {
            runs.extend(Run::over(key, steps));
            return;
        }

        let window = self.config.window_lines;
        let diagonal = key.diagonal.unsigned_abs().max(1);
        let covered = steps.len() - 1 + window;
        let exact = steps.iter().filter(|&&(_, ratio)| ratio >= 1.0).count();

        let pieces: Vec<&[(usize, f64)]> = if covered > diagonal && exact > 0 && exact < steps.len() {
            steps
                .split(|&(_, ratio)| ratio < 1.0)
                .filter(|piece| !piece.is_empty())
                .collect()
        } else {
            vec![steps]
        };

        let span = (diagonal + 1).saturating_sub(window).max(1);
        for piece in pieces {
            let origin = piece[0].0;
            for segment in piece.chunk_by(|x, y| (x.0 - origin) / diagonal == (y.0 - origin) / diagonal) {
                runs.extend(Run::over(key, &segment[..segment.len().min(span)]));
            }
        }
    }

    fn block_from_run(&self, run: &Run) -> IndexedBlock {
        let window = self.config.window_lines;
        let length = run.last_start - run.first_start + window;
        let first_span = (run.first_start, run.first_start + length);
        let second_start = (run.first_start as isize + run.key.diagonal) as usize;
        let second_span = (second_start, second_start + length);

        IndexedBlock {
            first_slot: run.key.slot_a,
            second_slot: run.key.slot_b,
            first_span,
            second_span,
            block: DuplicateBlock {
                first: self.location(run.key.slot_a, first_span),
                second: self.location(run.key.slot_b, second_span),
                lines: length,
                similarity: run.similarity,
            },
        }
    }

    fn location(&self, slot: usize, (start, end): (usize, usize)) -> BlockLocation {
        let unit = &self.units[slot];
        BlockLocation {
            unit: unit.id.clone(),
            start_line: unit.lines[start].line,
            end_line: unit.lines[end - 1].line,
        }
    }

    fn findings(&self, blocks: Vec<IndexedBlock>) -> DuplicationFindings {
        let mut covered: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); self.units.len()];
        for block in &blocks {
            covered[block.first_slot].extend(block.first_span.0..block.first_span.1);
            covered[block.second_slot].extend(block.second_span.0..block.second_span.1);
        }

        DuplicationFindings {
            duplicated_lines: covered.iter().map(BTreeSet::len).collect(),
            total_lines: self.units.iter().map(|unit| unit.lines.len()).collect(),
            blocks,
        }
    }
}

fn score_pair(a: &WindowTokens<'_>, b: &WindowTokens<'_>, threshold: f64) -> Option<f64> {
    if length_bound(a.tokens.len(), b.tokens.len()) < threshold || a.bag.upper_bound(&b.bag) < threshold {
        return None;
    }
    let ratio = similarity_ratio(&a.tokens, &b.tokens);
    (ratio >= threshold).then_some(ratio)
}

fn multiset_elements<'a>(tokens: &[&'a str]) -> Vec<Element<'a>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    tokens
        .iter()
        .map(|&token| {
            let count = seen.entry(token).or_insert(0);
            let element = (token, *count);
            *count += 1;
            element
        })
        .collect()
}

/// How many of a window's rarest elements a qualifying partner must touch.
///
/// A partner passing the length bound has at least `size * t / (2 - t)`
/// tokens, so the pair shares at least `t` times that many elements. Two
/// multisets sharing `k` elements meet within the first `size - k + 1`
/// elements of each under any fixed order.
fn prefix_length(size: usize, threshold: f64) -> usize {
    if size == 0 {
        return 0;
    }
    let smallest_partner = (size as f64 * threshold / (2.0 - threshold) - EPSILON).ceil().max(1.0);
    let shared = ((threshold * smallest_partner - EPSILON).ceil().max(1.0) as usize).min(size);
    size - shared + 1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RunKey {
    slot_a: usize,
    slot_b: usize,
    diagonal: isize,
}

#[derive(Debug)]
struct Run {
    key: RunKey,
    first_start: usize,
    last_start: usize,
    similarity: f64,
}

impl Run {
    /// The run covering `steps`, whose similarity is its weakest window.
    fn over(key: RunKey, steps: &[(usize, f64)]) -> Option<Run> {
        let (first, _) = *steps.first()?;
        let (last, _) = *steps.last()?;
        Some(Run {
            key,
            first_start: first,
            last_start: last,
            similarity: steps.iter().map(|&(_, ratio)| ratio).fold(1.0, f64::min),
        })
    }
}

/// Drop pairs where either window has a strictly better partner in the
/// other unit. Shifted alignments of a real copy score just under 1.0 and
/// would otherwise show up as extra blocks beside it.
fn keep_best_partners(matches: BTreeMap<WindowPair, f64>) -> Vec<(WindowPair, f64)> {
    let mut best: HashMap<(Window, usize), f64> = HashMap::new();
    for (&(a, b), &ratio) in &matches {
        for key in [(a, b.slot), (b, a.slot)] {
            let entry = best.entry(key).or_insert(ratio);
            *entry = f64::max(*entry, ratio);
        }
    }

    matches
        .into_iter()
        .filter(|&((a, b), ratio)| {
            let best_a = best.get(&(a, b.slot)).copied().unwrap_or(ratio);
            let best_b = best.get(&(b, a.slot)).copied().unwrap_or(ratio);
            ratio >= best_a && ratio >= best_b
        })
        .collect()
}

/// A merged block plus the normalized-line spans it covers on each side.
#[derive(Clone, Debug)]
pub struct IndexedBlock {
    pub first_slot: usize,
    pub second_slot: usize,
    first_span: (usize, usize),
    second_span: (usize, usize),
    pub block: DuplicateBlock,
}

impl IndexedBlock {
    pub fn involves_slot(&self, slot: usize) -> bool {
        self.first_slot == slot || self.second_slot == slot
    }
}

#[derive(Clone, Debug, Default)]
pub struct DuplicationFindings {
    blocks: Vec<IndexedBlock>,
    duplicated_lines: Vec<usize>,
    total_lines: Vec<usize>,
}

impl DuplicationFindings {
    pub fn blocks(&self) -> impl Iterator<Item = &DuplicateBlock> {
        self.blocks.iter().map(|indexed| &indexed.block)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn report_for(&self, slot: usize) -> DuplicationReport {
        let duplicated_lines = self.duplicated_lines.get(slot).copied().unwrap_or(0);
        let total_lines = self.total_lines.get(slot).copied().unwrap_or(0);

        DuplicationReport {
            blocks: self
                .blocks
                .iter()
                .filter(|indexed| indexed.involves_slot(slot))
                .map(|indexed| indexed.block.clone())
                .collect(),
            duplicated_lines,
            total_lines,
            percentage: duplication_percentage(duplicated_lines, total_lines),
        }
    }
}

pub fn duplication_percentage(duplicated: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (duplicated as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Duplication within a single unit.
pub fn detect_in_source(unit_id: &str, source: &str, config: &DuplicationConfig) -> DuplicationReport {
    let mut index = DuplicationIndex::new(config);
    let slot = index.insert(unit_id, normalize_source(source));
    index.find_duplicates(false).report_for(slot)
}
