pub const BOARD_SIZE: usize = 10;

/// Classic five-ship fleet.
pub const STANDARD_FLEET: [usize; 5] = [5, 4, 3, 3, 2];

/// Ten-ship fleet: one of six, two of four, three of three, four of two.
pub const EXTENDED_FLEET: [usize; 10] = [6, 4, 4, 3, 3, 3, 2, 2, 2, 2];

/// Pair-subset enumeration is exhaustive only up to this many slot pairs.
pub const MAX_EXACT_PAIRS: usize = 20;

/// Total number of ship segments in a fleet.
pub fn total_ship_cells(lengths: &[usize]) -> usize {
    lengths.iter().sum()
}

/// Limits that decide when counting stays exact.
///
/// Past the ship limit, conflicts between the other ships are folded into a
/// pairwise product estimate. Past the group limit only low-order subsets of
/// occupied groups are summed. Either way the map is flagged as approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Largest number of other ships counted with every pair subset.
    pub max_exact_ships: usize,
    /// Largest number of occupied groups expanded with every subset.
    pub max_exact_groups: usize,
    /// Highest group-subset order summed when truncating.
    pub group_order: usize,
    /// Threads sharing the outer placement loop (`std` only).
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_exact_ships: 4,
            max_exact_groups: 8,
            group_order: 3,
            workers: 1,
        }
    }
}

impl EngineConfig {
    /// Configuration that keeps every position of up to six other ships and
    /// sixteen occupied groups exact.
    pub fn exact() -> Self {
        Self {
            max_exact_ships: 6,
            max_exact_groups: 16,
            ..Self::default()
        }
    }

    pub fn with_max_exact_ships(mut self, ships: usize) -> Self {
        self.max_exact_ships = ships;
        self
    }

    pub fn with_max_exact_groups(mut self, groups: usize) -> Self {
        self.max_exact_groups = groups;
        self
    }

    pub fn with_group_order(mut self, order: usize) -> Self {
        self.group_order = order;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}
