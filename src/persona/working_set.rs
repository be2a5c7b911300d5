//! Working set — the session-scoped lifecycle of activated essence blocks.
//!
//! Enforces the composition invariants:
//!
//! - at most one main block, at most three supporters (four in total)
//! - main influence fixed at 0.70
//! - the remaining 0.30 split across supporters, equally unless a supporter
//!   carries an explicit override
//!
//! Every role change goes through [`WorkingSet::rebalance`], so influence is
//! always consistent with roles after any public mutation.

use std::collections::HashMap;

use super::block::{ActiveEssenceBlock, BlockRole, EssenceBlock};
use super::error::{EngineError, Result};
use super::vector::Axis;

/// Influence held by the main block.
pub const MAIN_INFLUENCE: f32 = 0.70;
/// Influence shared by all supporters.
pub const SUPPORTER_POOL: f32 = 0.30;
/// Maximum supporters alongside the main block.
pub const MAX_SUPPORTERS: usize = 3;
/// Maximum active blocks.
pub const MAX_ACTIVE_BLOCKS: usize = MAX_SUPPORTERS + 1;

/// Ordered set of active blocks for one composition.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    blocks: Vec<ActiveEssenceBlock>,
    overrides: HashMap<String, f32>,
}

impl WorkingSet {
    /// Create an empty working set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active blocks in insertion order.
    pub fn blocks(&self) -> &[ActiveEssenceBlock] {
        &self.blocks
    }

    /// Number of active blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block is active.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The main block, if any.
    pub fn main(&self) -> Option<&ActiveEssenceBlock> {
        self.blocks.iter().find(|b| b.is_main())
    }

    /// Look up an active block by catalog id.
    pub fn get(&self, id: &str) -> Option<&ActiveEssenceBlock> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    /// Activate a catalog block.
    ///
    /// The first block becomes main; later blocks join as supporters.
    pub fn add(&mut self, block: EssenceBlock) -> Result<&ActiveEssenceBlock> {
        block.validate()?;
        if self.get(&block.id).is_some() {
            return Err(EngineError::DuplicateBlock(block.id));
        }
        if self.blocks.len() >= MAX_ACTIVE_BLOCKS {
            return Err(EngineError::CapacityExceeded {
                current: self.blocks.len(),
                limit: MAX_ACTIVE_BLOCKS,
            });
        }
        let role = if self.main().is_some() {
            BlockRole::Supporter
        } else {
            BlockRole::Main
        };
        let id = block.id.clone();
        self.blocks
            .push(ActiveEssenceBlock::activate(block, role, 0.0));
        self.rebalance();
        tracing::debug!(block = %id, ?role, "essence block activated");
        self.get(&id)
            .ok_or_else(|| EngineError::BlockNotFound(id.clone()))
    }

    /// Deactivate a block.
    ///
    /// Removing the main block promotes the earliest remaining supporter.
    pub fn remove(&mut self, id: &str) -> Result<ActiveEssenceBlock> {
        let idx = self.index_of(id)?;
        let removed = self.blocks.remove(idx);
        self.overrides.remove(id);
        if removed.is_main() {
            if let Some(next) = self.blocks.first_mut() {
                next.role = BlockRole::Main;
                self.overrides.remove(&next.block.id);
            }
        }
        self.rebalance();
        Ok(removed)
    }

    /// Deactivate every block.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.overrides.clear();
    }

    /// Make `id` the main block; the previous main becomes a supporter.
    pub fn promote(&mut self, id: &str) -> Result<()> {
        let idx = self.index_of(id)?;
        for b in self.blocks.iter_mut() {
            if b.is_main() {
                b.role = BlockRole::Supporter;
            }
        }
        self.blocks[idx].role = BlockRole::Main;
        self.overrides.remove(id);
        self.rebalance();
        Ok(())
    }

    /// Turn the main block into a supporter and promote the earliest other
    /// block in its place.
    ///
    /// Demoting the only block is rejected: a non-empty set always has a main.
    pub fn demote(&mut self, id: &str) -> Result<()> {
        let idx = self.index_of(id)?;
        if !self.blocks[idx].is_main() {
            return Ok(());
        }
        let successor = self
            .blocks
            .iter()
            .position(|b| b.id() != id)
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "cannot demote '{}': it is the only active block",
                    id
                ))
            })?;
        self.blocks[idx].role = BlockRole::Supporter;
        self.blocks[successor].role = BlockRole::Main;
        let successor_id = self.blocks[successor].block.id.clone();
        self.overrides.remove(&successor_id);
        self.rebalance();
        Ok(())
    }

    /// Slider edit on one axis; the value is clamped into `[0, 1]`.
    pub fn set_axis(&mut self, id: &str, axis: Axis, value: f32) -> Result<()> {
        let idx = self.index_of(id)?;
        self.blocks[idx].vector.set(axis, value);
        Ok(())
    }

    /// Pin a supporter's influence, or release the pin with `None`.
    ///
    /// Pinned supporters keep their value (scaled down if pins exceed the
    /// supporter pool); unpinned supporters share what remains.
    pub fn set_influence_override(&mut self, id: &str, influence: Option<f32>) -> Result<()> {
        let idx = self.index_of(id)?;
        if self.blocks[idx].is_main() {
            return Err(EngineError::validation(format!(
                "'{}' is the main block; its influence is fixed at {:.2}",
                id, MAIN_INFLUENCE
            )));
        }
        match influence {
            Some(v) => {
                if !v.is_finite() || !(0.0..=SUPPORTER_POOL).contains(&v) {
                    return Err(EngineError::validation(format!(
                        "supporter influence {} is outside 0.0..{:.2}",
                        v, SUPPORTER_POOL
                    )));
                }
                self.overrides.insert(id.to_string(), v);
            }
            None => {
                self.overrides.remove(id);
            }
        }
        self.rebalance();
        Ok(())
    }

    /// Recompute influence from roles and overrides.
    pub fn rebalance(&mut self) {
        let pinned_total: f32 = self
            .blocks
            .iter()
            .filter(|b| !b.is_main())
            .filter_map(|b| self.overrides.get(b.id()))
            .sum();
        let scale = if pinned_total > SUPPORTER_POOL {
            SUPPORTER_POOL / pinned_total
        } else {
            1.0
        };
        let unpinned = self
            .blocks
            .iter()
            .filter(|b| !b.is_main() && !self.overrides.contains_key(b.id()))
            .count();
        let share = if unpinned > 0 {
            (SUPPORTER_POOL - pinned_total * scale).max(0.0) / unpinned as f32
        } else {
            0.0
        };

        for b in self.blocks.iter_mut() {
            b.influence = match b.role {
                BlockRole::Main => MAIN_INFLUENCE,
                BlockRole::Supporter => match self.overrides.get(&b.block.id) {
                    Some(v) => v * scale,
                    None => share,
                },
            };
        }
    }

    /// Consume the set, yielding its blocks.
    pub fn into_blocks(self) -> Vec<ActiveEssenceBlock> {
        self.blocks
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.blocks
            .iter()
            .position(|b| b.id() == id)
            .ok_or_else(|| EngineError::BlockNotFound(id.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::block::tests::sample_block;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn filled(n: usize) -> WorkingSet {
        let mut set = WorkingSet::new();
        for i in 0..n {
            set.add(sample_block(&format!("b{}", i))).unwrap();
        }
        set
    }

    #[test]
    fn test_first_block_is_main() {
        let set = filled(1);
        let main = set.main().unwrap();
        assert_eq!(main.id(), "b0");
        assert!(approx(main.influence, MAIN_INFLUENCE));
    }

    #[test]
    fn test_supporters_share_pool_equally() {
        let set = filled(4);
        let supporters: Vec<_> = set.blocks().iter().filter(|b| !b.is_main()).collect();
        assert_eq!(supporters.len(), 3);
        for s in supporters {
            assert!(approx(s.influence, 0.10));
        }
        let total: f32 = set.blocks().iter().map(|b| b.influence).sum();
        assert!(approx(total, 1.0));
    }

    #[test]
    fn test_capacity_is_four() {
        let mut set = filled(4);
        let err = set.add(sample_block("b9")).unwrap_err();
        assert_eq!(
            err,
            EngineError::CapacityExceeded {
                current: 4,
                limit: 4
            }
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut set = filled(1);
        assert!(matches!(
            set.add(sample_block("b0")),
            Err(EngineError::DuplicateBlock(_))
        ));
    }

    #[test]
    fn test_promote_swaps_roles_and_influence() {
        let mut set = filled(3);
        set.promote("b2").unwrap();
        assert_eq!(set.main().unwrap().id(), "b2");
        assert!(approx(set.get("b0").unwrap().influence, 0.15));
        assert!(approx(set.get("b2").unwrap().influence, MAIN_INFLUENCE));
        assert_eq!(set.blocks().iter().filter(|b| b.is_main()).count(), 1);
    }

    #[test]
    fn test_demote_promotes_successor() {
        let mut set = filled(2);
        set.demote("b0").unwrap();
        assert_eq!(set.main().unwrap().id(), "b1");
        assert!(approx(set.get("b0").unwrap().influence, SUPPORTER_POOL));
    }

    #[test]
    fn test_demote_only_block_rejected() {
        let mut set = filled(1);
        assert!(set.demote("b0").is_err());
    }

    #[test]
    fn test_remove_main_promotes_earliest_supporter() {
        let mut set = filled(3);
        set.remove("b0").unwrap();
        assert_eq!(set.main().unwrap().id(), "b1");
        assert!(approx(set.get("b2").unwrap().influence, SUPPORTER_POOL));
    }

    #[test]
    fn test_override_pins_supporter() {
        let mut set = filled(3);
        set.set_influence_override("b1", Some(0.2)).unwrap();
        assert!(approx(set.get("b1").unwrap().influence, 0.2));
        assert!(approx(set.get("b2").unwrap().influence, 0.1));

        set.set_influence_override("b1", None).unwrap();
        assert!(approx(set.get("b1").unwrap().influence, 0.15));
    }

    #[test]
    fn test_pins_over_pool_scaled_down() {
        let mut set = filled(4);
        for id in ["b1", "b2", "b3"] {
            set.set_influence_override(id, Some(0.30)).unwrap();
        }
        for id in ["b1", "b2", "b3"] {
            assert!(approx(set.get(id).unwrap().influence, 0.10));
        }
        let total: f32 = set.blocks().iter().map(|b| b.influence).sum();
        assert!(approx(total, 1.0));

        // two full pins leave nothing for the unpinned supporter
        set.set_influence_override("b3", None).unwrap();
        assert!(approx(set.get("b1").unwrap().influence, 0.15));
        assert!(approx(set.get("b2").unwrap().influence, 0.15));
        assert!(approx(set.get("b3").unwrap().influence, 0.0));
    }

    #[test]
    fn test_override_on_main_rejected() {
        let mut set = filled(2);
        assert!(set.set_influence_override("b0", Some(0.1)).is_err());
    }

    #[test]
    fn test_set_axis_clamps() {
        let mut set = filled(1);
        set.set_axis("b0", Axis::Y, 1.7).unwrap();
        assert_eq!(set.get("b0").unwrap().vector.y, 1.0);
        assert!(set.set_axis("missing", Axis::X, 0.1).is_err());
    }

    #[test]
    fn test_clear() {
        let mut set = filled(3);
        set.clear();
        assert!(set.is_empty());
        assert!(set.main().is_none());
    }
}
