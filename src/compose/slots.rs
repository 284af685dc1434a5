//! Build-wide state slot reservations.

use crate::error::CompositionError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub name: String,
    pub owner: String,
}

/// Tracks which component declared each state slot
///
/// A component may re-declare its own slot; a declaration of a slot already
/// held by another component is a conflict.
#[derive(Debug, Clone, Default)]
pub struct SlotAllocator {
    slots: BTreeMap<usize, Reservation>,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, index: usize, name: &str, owner: &str) -> Result<(), CompositionError> {
        if let Some(held) = self.slots.get(&index) {
            if held.owner != owner {
                return Err(CompositionError::SlotConflict {
                    index,
                    slot_name: held.name.clone(),
                    held_by: held.owner.clone(),
                    requested_by: owner.to_string(),
                });
            }
            return Ok(());
        }
        self.slots.insert(
            index,
            Reservation {
                name: name.to_string(),
                owner: owner.to_string(),
            },
        );
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Reservation> {
        self.slots.get(&index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reserved slots in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Reservation)> {
        self.slots.iter().map(|(i, r)| (*i, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_reservations() {
        let mut slots = SlotAllocator::new();
        slots.reserve(0, "grav", "gravity_constant").unwrap();
        slots.reserve(12, "rho", "atmosphere_constant").unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.get(12).unwrap().owner, "atmosphere_constant");
    }

    #[test]
    fn test_same_owner_may_redeclare() {
        let mut slots = SlotAllocator::new();
        slots.reserve(208, "STEL", "target_const_velocity").unwrap();
        slots.reserve(208, "STEL", "target_const_velocity").unwrap();
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_conflict_between_owners() {
        let mut slots = SlotAllocator::new();
        slots.reserve(14, "FSPA", "forces_3dof").unwrap();
        let err = slots.reserve(14, "FSPB", "drag_simple").unwrap_err();
        assert_eq!(
            err,
            CompositionError::SlotConflict {
                index: 14,
                slot_name: "FSPA".to_string(),
                held_by: "forces_3dof".to_string(),
                requested_by: "drag_simple".to_string(),
            }
        );
    }

    #[test]
    fn test_iter_in_index_order() {
        let mut slots = SlotAllocator::new();
        slots.reserve(21, "VBEL", "k").unwrap();
        slots.reserve(0, "grav", "g").unwrap();
        let order: Vec<usize> = slots.iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![0, 21]);
    }
}
