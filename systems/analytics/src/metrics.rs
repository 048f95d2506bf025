use doubles_draw_core::TeamSchedule;

/// Counts how many pairs each slot appears in, indexed by zero-based slot.
///
/// Slots outside `1..=team_size` are ignored; the audit reports them separately.
pub fn appearance_counts(schedule: &TeamSchedule, team_size: u32) -> Vec<u32> {
    let mut counts = vec![0; team_size as usize];
    for pair in schedule.pairs() {
        for slot in pair.slots() {
            if slot.is_within(team_size) {
                counts[slot.index()] += 1;
            }
        }
    }
    counts
}

/// Longest run of consecutive waves each slot appears in, indexed by zero-based slot.
pub fn longest_runs(schedule: &TeamSchedule, team_size: u32) -> Vec<u32> {
    let size = team_size as usize;
    let mut current = vec![0u32; size];
    let mut longest = vec![0u32; size];
    let mut present = vec![false; size];

    for wave in schedule.waves() {
        present.fill(false);
        for pair in wave.iter() {
            for slot in pair.slots() {
                if slot.is_within(team_size) {
                    present[slot.index()] = true;
                }
            }
        }

        for index in 0..size {
            if present[index] {
                current[index] += 1;
                longest[index] = longest[index].max(current[index]);
            } else {
                current[index] = 0;
            }
        }
    }

    longest
}

/// Difference between the highest and lowest count.
pub fn spread(counts: &[u32]) -> u32 {
    let min = counts.iter().copied().min().unwrap_or(0);
    let max = counts.iter().copied().max().unwrap_or(0);
    max - min
}

#[cfg(test)]
mod tests {
    use super::*;
    use doubles_draw_core::{Pair, Wave};

    fn pair(a: u32, b: u32) -> Pair {
        Pair::from_positions(a, b).expect("distinct slots")
    }

    #[test]
    fn counts_and_runs_follow_waves() {
        let schedule = TeamSchedule::new(vec![
            Wave::new(vec![pair(1, 2)]),
            Wave::new(vec![pair(1, 3)]),
            Wave::new(vec![pair(2, 4)]),
            Wave::new(vec![pair(1, 4)]),
        ]);

        assert_eq!(appearance_counts(&schedule, 4), vec![3, 2, 1, 2]);
        assert_eq!(longest_runs(&schedule, 4), vec![2, 1, 1, 2]);
        assert_eq!(spread(&appearance_counts(&schedule, 4)), 2);
    }

    #[test]
    fn empty_inputs_have_no_spread() {
        assert_eq!(spread(&[]), 0);
        assert_eq!(appearance_counts(&TeamSchedule::default(), 3), vec![0, 0, 0]);
    }
}
