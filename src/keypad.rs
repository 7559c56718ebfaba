//! Shortest key sequences through chains of keypad-operating robots.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use crate::heading::Heading;
use crate::location::Location;

/// The key that presses the button a robot arm points at.
pub const ACTIVATE: char = 'A';

/// Reasons a keypad computation may fail.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeypadError {
    /// The key does not exist on this keypad.
    #[error("key {0:?} is not on the keypad")]
    UnknownKey(char),
    /// The keypad offers no way between two keys.
    #[error("no route from {0:?} to {1:?}")]
    NoRoute(char, char),
    /// A door code must contain digits.
    #[error("code {0:?} has no numeric part")]
    NoNumericPart(String),
}

/// A rectangular pad of keys with gaps the pointing arm must never pass over.
#[derive(Clone, Debug)]
pub struct Keypad {
    keys: HashMap<char, Location>,
}

impl Keypad {
    /// Build a keypad from its rows; spaces are gaps.
    pub fn from_layout(rows: &[&str]) -> Self {
        let keys = rows.iter()
            .enumerate()
            .flat_map(|(y, row)| row.chars()
                .enumerate()
                .filter(|(_, key)| *key != ' ')
                .map(move |(x, key)| (key, Location(x as isize, y as isize))))
            .collect();

        Self { keys }
    }

    /// The door keypad.
    pub fn numeric() -> Self {
        Self::from_layout(&["789", "456", "123", " 0A"])
    }

    /// The keypad robots are steered with.
    pub fn directional() -> Self {
        Self::from_layout(&[" ^A", "<v>"])
    }

    fn position(&self, key: char) -> Result<Location, KeypadError> {
        self.keys.get(&key).copied().ok_or(KeypadError::UnknownKey(key))
    }

    fn is_key(&self, location: Location) -> bool {
        self.keys.values().contains(&location)
    }

    /// Every shortest move string taking the arm from `from` to `to` and pressing it, without crossing a gap.
    ///
    /// Moves only ever head toward the target; sequences are listed with up moves explored first, then down, left and right.
    pub fn move_sequences(&self, from: char, to: char) -> Result<Vec<String>, KeypadError> {
        let target = self.position(to)?;
        let mut sequences = Vec::new();
        let mut stack = vec![(self.position(from)?, String::new())];

        while let Some((location, moves)) = stack.pop() {
            if !self.is_key(location) {
                continue;
            }

            if location == target {
                sequences.push(format!("{moves}{ACTIVATE}"));
                continue;
            }

            let toward = [
                (Heading::North, location.1 > target.1),
                (Heading::South, location.1 < target.1),
                (Heading::West, location.0 > target.0),
                (Heading::East, location.0 < target.0),
            ];

            // reversed so the first direction is explored first
            for (heading, _) in toward.iter().rev().filter(|(_, useful)| *useful) {
                stack.push((heading.attempt_from(location), format!("{moves}{}", heading.marker())));
            }
        }

        Ok(sequences)
    }
}

/// Memoized shortest lengths keyed by `(from, to, layer)`.
///
/// A cache is only valid for the [`RobotChain`] that filled it; create one per top-level computation.
#[derive(Debug, Default)]
pub struct SequenceCache {
    lengths: HashMap<(char, char, usize), usize>,
}

impl SequenceCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Return the cached value for `key`, computing and storing it with `compute` on a miss.
    ///
    /// `compute` receives the cache so it can consult it recursively.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: (char, char, usize),
        compute: impl FnOnce(&mut Self) -> Result<usize, E>,
    ) -> Result<usize, E> {
        if let Some(length) = self.lengths.get(&key) {
            return Ok(*length);
        }

        let length = compute(self)?;
        self.lengths.insert(key, length);
        Ok(length)
    }
}

/// A numeric keypad operated by a robot, which is steered from a directional keypad by another robot, and so on.
///
/// Layer 0 types on the numeric keypad; layers `1..depth` type on directional keypads; layer `depth` is the human.
#[derive(Clone, Debug)]
pub struct RobotChain {
    numeric: Keypad,
    directional: Keypad,
    depth: usize,
}

impl RobotChain {
    /// A chain of `depth` keypads, the door keypad first.
    pub fn new(depth: usize) -> Self {
        Self {
            numeric: Keypad::numeric(),
            directional: Keypad::directional(),
            depth,
        }
    }

    /// Length of the shortest human key sequence that makes the chain type `code`.
    pub fn min_sequence_length(&self, code: &str, cache: &mut SequenceCache) -> Result<usize, KeypadError> {
        self.sequence_length(code, 0, cache)
    }

    // every layer starts with its arm on the activate key
    fn sequence_length(&self, sequence: &str, layer: usize, cache: &mut SequenceCache) -> Result<usize, KeypadError> {
        if layer == self.depth {
            return Ok(sequence.chars().count());
        }

        std::iter::once(ACTIVATE)
            .chain(sequence.chars())
            .tuple_windows()
            .map(|(from, to)| self.pair_length(from, to, layer, cache))
            .sum()
    }

    fn pair_length(&self, from: char, to: char, layer: usize, cache: &mut SequenceCache) -> Result<usize, KeypadError> {
        cache.get_or_try_insert_with((from, to, layer), |cache| {
            let keypad = if layer == 0 { &self.numeric } else { &self.directional };
            keypad.move_sequences(from, to)?
                .iter()
                .map(|sequence| self.sequence_length(sequence, layer + 1, cache))
                .fold_ok(None, |best: Option<usize>, length| Some(best.map_or(length, |best| best.min(length))))?
                .ok_or(KeypadError::NoRoute(from, to))
        })
    }

    /// Shortest sequence length times the numeric part of `code`.
    pub fn complexity(&self, code: &str, cache: &mut SequenceCache) -> Result<usize, KeypadError> {
        let number = code.chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse::<usize>()
            .map_err(|_| KeypadError::NoNumericPart(code.to_string()))?;

        Ok(number * self.min_sequence_length(code, cache)?)
    }

    /// Sum of the complexities of `codes`, sharing one cache across them.
    pub fn total_complexity<'a>(&self, codes: impl IntoIterator<Item=&'a str>) -> Result<usize, KeypadError> {
        let mut cache = SequenceCache::new();
        let total = codes.into_iter()
            .map(|code| self.complexity(code, &mut cache))
            .sum::<Result<usize, KeypadError>>()?;

        debug!("total complexity {} at depth {} with {} cached pairs", total, self.depth, cache.len());
        Ok(total)
    }
}
