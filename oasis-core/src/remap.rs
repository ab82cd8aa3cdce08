use std::collections::{BTreeMap, HashSet};

use crate::{CoreError, CoreResult, DemoTable};

/// Write-once lookup from a seed's 1-based ordinal to the identifier the
/// store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierMap {
    table: DemoTable,
    ids: BTreeMap<usize, i64>,
}

impl IdentifierMap {
    /// Pair the `k`-th seed with the `k`-th assigned identifier.
    ///
    /// `assigned` must be in insertion order (ascending identifiers) and hold
    /// exactly one identifier per seed.
    pub fn build(table: DemoTable, seeded: usize, assigned: &[i64]) -> CoreResult<Self> {
        if assigned.len() != seeded {
            return Err(CoreError::IdentifierCountMismatch {
                table,
                seeded,
                assigned: assigned.len(),
            });
        }

        let mut seen = HashSet::with_capacity(assigned.len());
        let mut ids = BTreeMap::new();
        for (idx, &id) in assigned.iter().enumerate() {
            if !seen.insert(id) {
                return Err(CoreError::DuplicateIdentifier { table, id });
            }
            ids.insert(idx + 1, id);
        }

        Ok(Self { table, ids })
    }

    pub fn resolve(&self, ordinal: usize) -> CoreResult<i64> {
        self.ids
            .get(&ordinal)
            .copied()
            .ok_or(CoreError::OrdinalOutOfRange {
                table: self.table,
                ordinal,
                len: self.ids.len(),
            })
    }

    pub fn table(&self) -> DemoTable {
        self.table
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
