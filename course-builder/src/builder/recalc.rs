//! Order recalculation
//!
//! Pure functions from a store and a proposed move to a new store whose
//! order indices are contiguous again. Three move kinds exist:
//! - reorder within one container (sections of the course, or materials of a section)
//! - cross-section move, inserting before a material in another section
//! - container drop, appending a material to a section
//!
//! Anything else classifies to `None` and must be treated as a no-op.

use serde::{Deserialize, Serialize};

use crate::api::models::{MaterialId, SectionId};

use super::drag::ItemRef;
use super::error::ContiguityError;
use super::store::EntityStore;

/// A classified move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    ReorderSections {
        moving: SectionId,
        target: SectionId,
    },
    ReorderMaterials {
        section: SectionId,
        moving: MaterialId,
        target: MaterialId,
    },
    CrossSection {
        moving: MaterialId,
        from: SectionId,
        to: SectionId,
        before: MaterialId,
    },
    ContainerDrop {
        moving: MaterialId,
        from: SectionId,
        to: SectionId,
    },
}

impl Move {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReorderSections { .. } | Self::ReorderMaterials { .. } => "reorder",
            Self::CrossSection { .. } => "cross_section",
            Self::ContainerDrop { .. } => "container_drop",
        }
    }

    pub fn moving(&self) -> ItemRef {
        match *self {
            Self::ReorderSections { moving, .. } => ItemRef::Section(moving),
            Self::ReorderMaterials { moving, .. }
            | Self::CrossSection { moving, .. }
            | Self::ContainerDrop { moving, .. } => ItemRef::Material(moving),
        }
    }
}

/// Work out which kind of move a drop describes, if any
pub fn classify(store: &EntityStore, moving: ItemRef, target: ItemRef) -> Option<Move> {
    if moving == target {
        return None;
    }

    match (moving, target) {
        (ItemRef::Section(moving), ItemRef::Section(target)) => {
            store.section(moving)?;
            store.section(target)?;
            Some(Move::ReorderSections { moving, target })
        }
        (ItemRef::Material(moving), ItemRef::Material(target)) => {
            let from = store.material(moving)?.section_id;
            let to = store.material(target)?.section_id;
            if from == to {
                Some(Move::ReorderMaterials {
                    section: from,
                    moving,
                    target,
                })
            } else {
                Some(Move::CrossSection {
                    moving,
                    from,
                    to,
                    before: target,
                })
            }
        }
        (ItemRef::Material(moving), ItemRef::Section(to)) => {
            let from = store.material(moving)?.section_id;
            store.section(to)?;
            Some(Move::ContainerDrop { moving, from, to })
        }
        (ItemRef::Section(_), ItemRef::Material(_)) => None,
    }
}

/// Produce the store that results from a classified move
pub fn apply(store: &EntityStore, mv: &Move) -> EntityStore {
    let mut next = store.clone();

    match *mv {
        Move::ReorderSections { moving, target } => {
            let mut ids: Vec<SectionId> = store.sections_of().iter().map(|s| s.id).collect();
            array_move(&mut ids, &moving, &target);
            renumber_sections(&mut next, &ids);
        }
        Move::ReorderMaterials {
            section,
            moving,
            target,
        } => {
            let mut ids = material_ids(store, section);
            array_move(&mut ids, &moving, &target);
            renumber_materials(&mut next, section, &ids);
        }
        Move::CrossSection {
            moving,
            from,
            to,
            before,
        } => {
            let remaining: Vec<MaterialId> = material_ids(store, from)
                .into_iter()
                .filter(|id| *id != moving)
                .collect();
            let mut destination = material_ids(store, to);
            let at = destination
                .iter()
                .position(|id| *id == before)
                .unwrap_or(destination.len());
            destination.insert(at, moving);

            renumber_materials(&mut next, from, &remaining);
            renumber_materials(&mut next, to, &destination);
        }
        Move::ContainerDrop { moving, from, to } => {
            let remaining: Vec<MaterialId> = material_ids(store, from)
                .into_iter()
                .filter(|id| *id != moving)
                .collect();
            renumber_materials(&mut next, from, &remaining);

            let append_at = next
                .materials_of(to)
                .iter()
                .filter(|m| m.id != moving)
                .map(|m| m.order)
                .max()
                .unwrap_or(0)
                + 1;
            if let Some(material) = next.material_mut(moving) {
                material.section_id = to;
                material.order = append_at;
            }
        }
    }

    next
}

/// Classify and apply in one step. `None` means the drop is a no-op.
pub fn recalculate(store: &EntityStore, moving: ItemRef, target: ItemRef) -> Option<(Move, EntityStore)> {
    let mv = classify(store, moving, target)?;
    let next = apply(store, &mv);
    Some((mv, next))
}

/// Renumber the course's sections 1..N keeping their relative order
pub fn close_section_gap(store: &EntityStore) -> EntityStore {
    let mut next = store.clone();
    let ids: Vec<SectionId> = store.sections_of().iter().map(|s| s.id).collect();
    renumber_sections(&mut next, &ids);
    next
}

/// Renumber one section's materials 1..M keeping their relative order
pub fn close_material_gap(store: &EntityStore, section: SectionId) -> EntityStore {
    let mut next = store.clone();
    let ids = material_ids(store, section);
    renumber_materials(&mut next, section, &ids);
    next
}

/// Verify that sections and each section's materials are numbered exactly 1..N
/// and that every material belongs to a known section.
pub fn check_contiguity(store: &EntityStore) -> Result<(), ContiguityError> {
    let section_orders: Vec<u32> = store.sections_of().iter().map(|s| s.order).collect();
    if !is_contiguous(&section_orders) {
        return Err(ContiguityError::Sections {
            course: store.course_id(),
            expected: section_orders.len(),
            found: section_orders,
        });
    }

    if let Some(orphan) = store.materials().find(|m| store.section(m.section_id).is_none()) {
        return Err(ContiguityError::Orphan {
            material: orphan.id,
            section: orphan.section_id,
        });
    }

    for section in store.sections_of() {
        let orders: Vec<u32> = store
            .materials_of(section.id)
            .iter()
            .map(|m| m.order)
            .collect();
        if !is_contiguous(&orders) {
            return Err(ContiguityError::Materials {
                section: section.id,
                expected: orders.len(),
                found: orders,
            });
        }
    }

    Ok(())
}

/// `orders` must already be sorted ascending
fn is_contiguous(orders: &[u32]) -> bool {
    orders
        .iter()
        .enumerate()
        .all(|(idx, order)| *order as usize == idx + 1)
}

fn material_ids(store: &EntityStore, section: SectionId) -> Vec<MaterialId> {
    store.materials_of(section).iter().map(|m| m.id).collect()
}

/// Remove `moving` and reinsert it at the index `target` held before removal
fn array_move<T: PartialEq>(ids: &mut Vec<T>, moving: &T, target: &T) {
    let (Some(from), Some(to)) = (
        ids.iter().position(|id| id == moving),
        ids.iter().position(|id| id == target),
    ) else {
        return;
    };
    let item = ids.remove(from);
    ids.insert(to, item);
}

fn renumber_sections(store: &mut EntityStore, ids: &[SectionId]) {
    for (idx, id) in ids.iter().enumerate() {
        if let Some(section) = store.section_mut(*id) {
            section.order = idx as u32 + 1;
        }
    }
}

fn renumber_materials(store: &mut EntityStore, section: SectionId, ids: &[MaterialId]) {
    for (idx, id) in ids.iter().enumerate() {
        if let Some(material) = store.material_mut(*id) {
            material.section_id = section;
            material.order = idx as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{COURSE, material, section};
    use proptest::prelude::*;

    fn orders_of(store: &EntityStore, section: i64) -> Vec<(i64, u32)> {
        store
            .materials_of(SectionId(section))
            .iter()
            .map(|m| (m.id.0, m.order))
            .collect()
    }

    fn mat(id: i64) -> ItemRef {
        ItemRef::Material(MaterialId(id))
    }

    fn sec(id: i64) -> ItemRef {
        ItemRef::Section(SectionId(id))
    }

    #[test]
    fn test_reorder_within_section() {
        // A=1, B=2, C=3; move A onto C
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1)],
            vec![material(1, 1, 1), material(2, 1, 2), material(3, 1, 3)],
        );

        let (mv, next) = recalculate(&store, mat(1), mat(3)).unwrap();

        assert_eq!(mv.kind(), "reorder");
        assert_eq!(orders_of(&next, 1), vec![(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn test_reorder_moving_up() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1)],
            vec![material(1, 1, 1), material(2, 1, 2), material(3, 1, 3)],
        );

        let (_, next) = recalculate(&store, mat(3), mat(2)).unwrap();

        assert_eq!(orders_of(&next, 1), vec![(1, 1), (3, 2), (2, 3)]);
    }

    #[test]
    fn test_cross_section_inserts_before_target() {
        // S1={A,B}, S2={X}; move B before X
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1), section(2, 2)],
            vec![material(1, 1, 1), material(2, 1, 2), material(9, 2, 1)],
        );

        let (mv, next) = recalculate(&store, mat(2), mat(9)).unwrap();

        assert_eq!(mv.kind(), "cross_section");
        assert_eq!(orders_of(&next, 1), vec![(1, 1)]);
        assert_eq!(orders_of(&next, 2), vec![(2, 1), (9, 2)]);
        assert_eq!(next.material(MaterialId(2)).unwrap().section_id, SectionId(2));
    }

    #[test]
    fn test_cross_section_closes_source_gap() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1), section(2, 2)],
            vec![
                material(1, 1, 1),
                material(2, 1, 2),
                material(3, 1, 3),
                material(9, 2, 1),
            ],
        );

        let (_, next) = recalculate(&store, mat(1), mat(9)).unwrap();

        assert_eq!(orders_of(&next, 1), vec![(2, 1), (3, 2)]);
        assert!(check_contiguity(&next).is_ok());
    }

    #[test]
    fn test_container_drop_into_empty_section() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1), section(2, 2)],
            vec![material(5, 1, 1)],
        );

        let (mv, next) = recalculate(&store, mat(5), sec(2)).unwrap();

        assert_eq!(mv.kind(), "container_drop");
        assert!(orders_of(&next, 1).is_empty());
        assert_eq!(orders_of(&next, 2), vec![(5, 1)]);
    }

    #[test]
    fn test_container_drop_appends_to_non_empty_section() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1), section(2, 2)],
            vec![
                material(1, 1, 1),
                material(2, 1, 2),
                material(8, 2, 1),
                material(9, 2, 2),
            ],
        );

        let (_, next) = recalculate(&store, mat(1), sec(2)).unwrap();

        assert_eq!(orders_of(&next, 1), vec![(2, 1)]);
        assert_eq!(orders_of(&next, 2), vec![(8, 1), (9, 2), (1, 3)]);
    }

    #[test]
    fn test_container_drop_onto_own_section_moves_to_end() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1)],
            vec![material(1, 1, 1), material(2, 1, 2), material(3, 1, 3)],
        );

        let (_, next) = recalculate(&store, mat(1), sec(1)).unwrap();

        assert_eq!(orders_of(&next, 1), vec![(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn test_reorder_sections() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1), section(2, 2), section(3, 3)],
            vec![],
        );

        let (_, next) = recalculate(&store, sec(3), sec(1)).unwrap();

        let order: Vec<(i64, u32)> = next.sections_of().iter().map(|s| (s.id.0, s.order)).collect();
        assert_eq!(order, vec![(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_unclassified_moves() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1), section(2, 2)],
            vec![material(1, 1, 1)],
        );

        assert!(classify(&store, sec(1), mat(1)).is_none());
        assert!(classify(&store, mat(1), mat(1)).is_none());
        assert!(classify(&store, sec(2), sec(2)).is_none());
        assert!(classify(&store, mat(1), sec(42)).is_none());
        assert!(classify(&store, mat(77), mat(1)).is_none());
    }

    #[test]
    fn test_close_gaps() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1), section(3, 3)],
            vec![material(1, 1, 2), material(2, 1, 5)],
        );

        let next = close_section_gap(&store);
        let next = close_material_gap(&next, SectionId(1));

        assert!(check_contiguity(&next).is_ok());
        assert_eq!(next.section(SectionId(3)).unwrap().order, 2);
        assert_eq!(orders_of(&next, 1), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_check_contiguity_reports_container() {
        let store = EntityStore::from_parts(
            COURSE,
            vec![section(1, 1)],
            vec![material(1, 1, 1), material(2, 1, 3)],
        );

        assert_eq!(
            check_contiguity(&store),
            Err(ContiguityError::Materials {
                section: SectionId(1),
                found: vec![1, 3],
                expected: 2,
            })
        );

        let orphaned = EntityStore::from_parts(COURSE, vec![section(1, 1)], vec![material(4, 9, 1)]);
        assert!(matches!(
            check_contiguity(&orphaned),
            Err(ContiguityError::Orphan { .. })
        ));
    }

    /// Build a contiguous store from per-section material counts.
    /// Section ids are 1..=n, material ids 100*section + position.
    fn build_store(counts: &[usize]) -> EntityStore {
        let sections = (0..counts.len())
            .map(|i| section(i as i64 + 1, i as u32 + 1))
            .collect();
        let materials = counts
            .iter()
            .enumerate()
            .flat_map(|(i, count)| {
                let sid = i as i64 + 1;
                (0..*count).map(move |j| material(sid * 100 + j as i64, sid, j as u32 + 1))
            })
            .collect();
        EntityStore::from_parts(COURSE, sections, materials)
    }

    fn pick(store: &EntityStore, seed: usize, section_bias: bool) -> ItemRef {
        let mut items: Vec<ItemRef> = store.sections().map(|s| ItemRef::Section(s.id)).collect();
        if !section_bias {
            items.extend(store.materials().map(|m| ItemRef::Material(m.id)));
        }
        items[seed % items.len()]
    }

    proptest! {
        #[test]
        fn prop_moves_preserve_contiguity(
            counts in prop::collection::vec(0usize..5, 1..5),
            steps in prop::collection::vec((any::<usize>(), any::<usize>(), any::<bool>()), 0..20),
        ) {
            let mut store = build_store(&counts);
            let total: usize = counts.iter().sum();

            for (a, b, sections_only) in steps {
                let moving = pick(&store, a, sections_only);
                let target = pick(&store, b, false);
                if let Some((_, next)) = recalculate(&store, moving, target) {
                    store = next;
                }
                prop_assert!(check_contiguity(&store).is_ok());
                prop_assert_eq!(store.materials().count(), total);
                prop_assert_eq!(store.section_count(), counts.len());
            }
        }

        #[test]
        fn prop_self_drop_is_identity(
            counts in prop::collection::vec(0usize..5, 1..5),
            seed in any::<usize>(),
        ) {
            let store = build_store(&counts);
            let item = pick(&store, seed, false);
            prop_assert!(recalculate(&store, item, item).is_none());
        }

        #[test]
        fn prop_cross_section_conserves_counts(
            counts in prop::collection::vec(1usize..5, 2..5),
            a in any::<usize>(),
            b in any::<usize>(),
        ) {
            let store = build_store(&counts);
            let materials: Vec<(MaterialId, SectionId)> =
                store.materials().map(|m| (m.id, m.section_id)).collect();
            let (moving, from) = materials[a % materials.len()];
            let (target, to) = materials[b % materials.len()];
            prop_assume!(from != to);

            let (_, next) = recalculate(&store, ItemRef::Material(moving), ItemRef::Material(target)).unwrap();

            prop_assert_eq!(next.material_count(from), store.material_count(from) - 1);
            prop_assert_eq!(next.material_count(to), store.material_count(to) + 1);
            prop_assert_eq!(next.material(moving).unwrap().section_id, to);
        }
    }
}
