use hashbrown::HashMap;

use crate::mesh::TileMeshDefinition;
use crate::types::MeshIndex;

/// Indexed tile mesh definitions. Slot 0 is reserved for empty space and is
/// never populated.
#[derive(Clone, Debug)]
pub struct TileMeshRegistry {
    slots: Vec<Option<TileMeshDefinition>>,
    names: Vec<String>,
    by_name: HashMap<String, MeshIndex>,
}

impl Default for TileMeshRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TileMeshRegistry {
    pub fn new() -> Self {
        Self {
            slots: vec![None],
            names: vec![String::new()],
            by_name: HashMap::new(),
        }
    }

    /// Registers `def` under `name`, replacing an existing definition with the
    /// same name in place so tiles referencing it stay valid.
    pub fn insert(&mut self, name: impl Into<String>, def: TileMeshDefinition) -> MeshIndex {
        let name = name.into();
        if let Some(&index) = self.by_name.get(&name) {
            log::debug!("replacing tile mesh `{}` at slot {}", name, index.0);
            self.slots[index.0 as usize] = Some(def);
            return index;
        }
        assert!(self.slots.len() <= u16::MAX as usize, "tile mesh registry is full");
        let index = MeshIndex(self.slots.len() as u16);
        self.slots.push(Some(def));
        self.names.push(name.clone());
        self.by_name.insert(name, index);
        index
    }

    /// Places a definition at a fixed index, growing the table with unset
    /// slots as needed. A name already held by another slot moves here; that
    /// slot keeps its definition but is no longer reachable by name.
    pub fn set(&mut self, index: MeshIndex, name: impl Into<String>, def: TileMeshDefinition) {
        assert!(!index.is_empty(), "mesh index 0 is reserved for empty space");
        let i = index.0 as usize;
        if i >= self.slots.len() {
            self.slots.resize(i + 1, None);
            self.names.resize(i + 1, String::new());
        }
        let name = name.into();
        if let Some(&prev) = self.by_name.get(&name) {
            if prev != index {
                log::debug!("tile mesh `{}` moves from slot {} to {}", name, prev.0, index.0);
                self.names[prev.0 as usize].clear();
            }
        }
        let old = std::mem::replace(&mut self.names[i], name.clone());
        if !old.is_empty() && self.by_name.get(&old) == Some(&index) {
            self.by_name.remove(&old);
        }
        self.slots[i] = Some(def);
        self.by_name.insert(name, index);
    }

    #[inline]
    pub fn get(&self, index: MeshIndex) -> Option<&TileMeshDefinition> {
        self.slots.get(index.0 as usize).and_then(Option::as_ref)
    }

    pub fn index_of(&self, name: &str) -> Option<MeshIndex> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, index: MeshIndex) -> Option<&str> {
        self.get(index)?;
        self.names
            .get(index.0 as usize)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Slot count, including the reserved slot and any unset slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshIndex, &TileMeshDefinition)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|d| (MeshIndex(i as u16), d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{CubeStyle, MeshProperties};

    fn cube() -> TileMeshDefinition {
        TileMeshDefinition::cube(CubeStyle::default(), MeshProperties::default())
    }

    #[test]
    fn slot_zero_is_reserved() {
        let mut reg = TileMeshRegistry::new();
        assert!(reg.get(MeshIndex::EMPTY).is_none());
        let stone = reg.insert("stone", cube());
        assert_eq!(stone, MeshIndex(1));
        assert!(reg.get(MeshIndex::EMPTY).is_none());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn reinserting_name_keeps_index() {
        let mut reg = TileMeshRegistry::new();
        let a = reg.insert("a", cube());
        let b = reg.insert("b", cube());
        let glow = TileMeshDefinition::cube(
            CubeStyle::default(),
            MeshProperties { emission: 7, ..Default::default() },
        );
        assert_eq!(reg.insert("a", glow), a);
        assert_eq!(reg.get(a).unwrap().emission(), 7);
        assert_eq!(reg.index_of("b"), Some(b));
        assert_eq!(reg.name_of(a), Some("a"));
    }

    #[test]
    fn set_leaves_gaps_unset() {
        let mut reg = TileMeshRegistry::new();
        reg.set(MeshIndex(4), "lamp", cube());
        assert_eq!(reg.len(), 5);
        assert!(reg.get(MeshIndex(2)).is_none());
        assert_eq!(reg.name_of(MeshIndex(2)), None);
        assert_eq!(reg.index_of("lamp"), Some(MeshIndex(4)));
        assert_eq!(reg.iter().count(), 1);
    }

    #[test]
    fn set_moves_a_name_held_by_another_slot() {
        let mut reg = TileMeshRegistry::new();
        let stone = reg.insert("stone", cube());
        reg.set(MeshIndex(4), "stone", cube());
        assert_eq!(reg.index_of("stone"), Some(MeshIndex(4)));
        assert_eq!(reg.name_of(stone), None);
        assert!(reg.get(stone).is_some());

        // renaming the old slot must not drop the moved name
        reg.set(stone, "dirt", cube());
        assert_eq!(reg.index_of("stone"), Some(MeshIndex(4)));
        assert_eq!(reg.name_of(MeshIndex(4)), Some("stone"));
        assert_eq!(reg.index_of("dirt"), Some(stone));
        assert_eq!(reg.name_of(stone), Some("dirt"));
    }

    #[test]
    fn renaming_a_slot_frees_its_old_name() {
        let mut reg = TileMeshRegistry::new();
        let a = reg.insert("a", cube());
        reg.set(a, "b", cube());
        assert_eq!(reg.index_of("a"), None);
        assert_eq!(reg.index_of("b"), Some(a));
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn set_rejects_slot_zero() {
        let mut reg = TileMeshRegistry::new();
        reg.set(MeshIndex::EMPTY, "nope", cube());
    }
}
