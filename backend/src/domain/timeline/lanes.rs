//! Greedy lane assignment for overlapping row intervals.

/// Half-open row interval `[row_start, row_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInterval {
    /// First occupied row, 1-based.
    pub row_start: usize,
    /// Row after the last occupied one.
    pub row_end: usize,
}

impl RowInterval {
    /// Number of rows covered.
    pub fn len(self) -> usize {
        self.row_end.saturating_sub(self.row_start)
    }

    /// True when the interval covers no rows.
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Whether two intervals share at least one row.
    pub fn overlaps(self, other: Self) -> bool {
        self.row_start < other.row_end && other.row_start < self.row_end
    }
}

/// Lane placed for one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanePlacement {
    /// Zero-based column.
    pub lane: usize,
    /// Columns needed by the cluster the interval overlaps.
    pub lane_count: usize,
}

/// Assign each interval the lowest lane free of every overlapping interval
/// placed before it.
///
/// Intervals are visited by start row, longest first on ties; the result is
/// returned in input order.
pub fn assign_lanes(intervals: &[RowInterval]) -> Vec<LanePlacement> {
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by(|&a, &b| {
        let (left, right) = (intervals[a], intervals[b]);
        left.row_start
            .cmp(&right.row_start)
            .then_with(|| right.len().cmp(&left.len()))
    });

    let mut lanes = vec![0_usize; intervals.len()];
    let mut active: Vec<usize> = Vec::new();
    for index in order {
        let current = intervals[index];
        active.retain(|&placed| intervals[placed].row_end > current.row_start);
        let lane = (0..)
            .find(|candidate| !active.iter().any(|&placed| lanes[placed] == *candidate))
            .unwrap_or_default();
        lanes[index] = lane;
        active.push(index);
    }

    intervals
        .iter()
        .enumerate()
        .map(|(index, interval)| {
            let widest = intervals
                .iter()
                .enumerate()
                .filter(|(_, other)| interval.overlaps(**other))
                .map(|(other, _)| lanes[other])
                .chain(std::iter::once(lanes[index]))
                .max()
                .unwrap_or_default();
            LanePlacement {
                lane: lanes[index],
                lane_count: widest + 1,
            }
        })
        .collect()
}
