use std::collections::BTreeMap;

use crate::config::HeadingPolicy;

/// Per-document heading level correction.
///
/// Observed depths get consecutive corrected levels in order of first
/// appearance, so skipped levels close up while relative nesting is kept.
#[derive(Debug, Clone)]
pub struct HeadingState {
    level_map: BTreeMap<usize, usize>,
    next_level: usize,
    level1_count: usize,
    policy: HeadingPolicy,
}

impl HeadingState {
    pub fn new(policy: HeadingPolicy) -> Self {
        Self {
            level_map: BTreeMap::from([(1, 1)]),
            next_level: 2,
            level1_count: 0,
            policy,
        }
    }

    /// Corrected level for a heading observed at `depth`
    pub fn corrected_level(&mut self, depth: usize) -> usize {
        if depth == 1 {
            self.level1_count += 1;
            match self.policy {
                // A second top-level heading implies an outer wrapper:
                // everything assigned so far moves down one level, once.
                HeadingPolicy::Shift if self.level1_count == 2 => {
                    for level in self.level_map.values_mut() {
                        *level += 1;
                    }
                    self.next_level += 1;
                }
                HeadingPolicy::Reset if self.level1_count > 1 => {
                    self.level_map = BTreeMap::from([(1, 1)]);
                    self.next_level = 2;
                }
                _ => {}
            }
        } else if !self.level_map.contains_key(&depth) {
            self.level_map.insert(depth, self.next_level);
            self.next_level += 1;
        }
        self.level_map[&depth]
    }

    pub fn level1_count(&self) -> usize {
        self.level1_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(policy: HeadingPolicy, depths: &[usize]) -> Vec<usize> {
        let mut state = HeadingState::new(policy);
        depths.iter().map(|d| state.corrected_level(*d)).collect()
    }

    #[test]
    fn test_second_top_level_shifts_once() {
        assert_eq!(
            run(HeadingPolicy::Shift, &[1, 3, 5, 1, 3, 1, 1, 3, 5, 7, 3]),
            vec![1, 2, 3, 2, 3, 2, 2, 3, 4, 5, 3]
        );
    }

    #[test]
    fn test_skipped_levels_close_up() {
        assert_eq!(run(HeadingPolicy::Shift, &[1, 5, 5, 2, 5]), vec![1, 2, 2, 3, 2]);
    }

    #[test]
    fn test_reset_policy() {
        assert_eq!(
            run(HeadingPolicy::Reset, &[1, 3, 5, 1, 5, 3, 1, 3]),
            vec![1, 2, 3, 1, 2, 3, 1, 2]
        );
    }
}
