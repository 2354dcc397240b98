//! Event hierarchy: events may be nested under a parent event.

use std::collections::HashSet;

use mintnet_proto::{Document, EntityId, EntityKind};

use crate::error::{Error, Result};
use crate::storage::{parent_of, StorageEngine};

/// Maximum number of parent links followed from any event.
pub const MAX_EVENT_DEPTH: usize = 32;

/// Navigation over the parent links of events.
pub struct EventHierarchy<'a> {
    storage: &'a StorageEngine,
}

impl<'a> EventHierarchy<'a> {
    /// Create a hierarchy view over the storage engine.
    pub fn new(storage: &'a StorageEngine) -> Self {
        Self { storage }
    }

    /// Parent of an event, if it has one.
    ///
    /// A dangling parent reference is treated as no parent.
    pub fn parent(&self, event: &Document) -> Result<Option<Document>> {
        match parent_of(event) {
            Some(parent_id) => Ok(self
                .storage
                .get_entity(parent_id)?
                .filter(|doc| doc.kind == EntityKind::Event)),
            None => Ok(None),
        }
    }

    /// Topmost ancestor of an event, or the event itself if it has no parent.
    pub fn root(&self, event: &Document) -> Result<Document> {
        let mut seen = HashSet::new();
        seen.insert(event.id);
        let mut current = event.clone();

        for _ in 0..=MAX_EVENT_DEPTH {
            match self.parent(&current)? {
                Some(parent) => {
                    if !seen.insert(parent.id) {
                        return Err(Error::HierarchyCycle(parent.id));
                    }
                    current = parent;
                }
                None => return Ok(current),
            }
        }
        Err(Error::HierarchyTooDeep {
            depth: MAX_EVENT_DEPTH,
        })
    }

    /// Direct children of an event.
    pub fn children(&self, event: EntityId) -> Result<Vec<Document>> {
        self.storage.event_children(event)
    }

    /// Check that `event` may be placed under `new_parent`.
    ///
    /// Fails with [`Error::HierarchyCycle`] if `new_parent` is the event
    /// itself or one of its descendants, and with
    /// [`Error::HierarchyTooDeep`] if the longest chain through the moved
    /// event, its descendants included, would exceed [`MAX_EVENT_DEPTH`].
    pub fn check_parent(&self, event: EntityId, new_parent: EntityId) -> Result<()> {
        if event == new_parent {
            return Err(Error::HierarchyCycle(event));
        }

        let mut ancestors = 0;
        let mut current = self.storage.fetch(EntityKind::Event, new_parent)?;
        while let Some(parent) = self.parent(&current)? {
            if parent.id == event {
                return Err(Error::HierarchyCycle(event));
            }
            ancestors += 1;
            if ancestors > MAX_EVENT_DEPTH {
                return Err(Error::HierarchyTooDeep {
                    depth: MAX_EVENT_DEPTH,
                });
            }
            current = parent;
        }

        if ancestors + 1 + self.height(event)? > MAX_EVENT_DEPTH {
            return Err(Error::HierarchyTooDeep {
                depth: MAX_EVENT_DEPTH,
            });
        }
        Ok(())
    }

    /// Number of parent links from the deepest descendant of `event` up to
    /// `event`. Stops counting once past [`MAX_EVENT_DEPTH`].
    fn height(&self, event: EntityId) -> Result<usize> {
        let mut seen = HashSet::from([event]);
        let mut level = vec![event];
        let mut height = 0;

        while height <= MAX_EVENT_DEPTH {
            let mut next = Vec::new();
            for id in &level {
                for child in self.storage.event_children(*id)? {
                    if seen.insert(child.id) {
                        next.push(child.id);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            height += 1;
            level = next;
        }
        Ok(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin;
    use crate::storage::StorageConfig;
    use crate::visibility::VisibilityRecord;
    use mintnet_proto::Value;

    fn engine() -> StorageEngine {
        StorageEngine::open(StorageConfig::temporary()).unwrap()
    }

    fn insert_event(engine: &StorageEngine, slug: &str, parent: Option<EntityId>) -> Document {
        let id = EntityId::generate();
        let mut doc = Document::new(id, EntityKind::Event)
            .with_field("slug", slug)
            .with_field("name", slug);
        if let Some(parent) = parent {
            doc.set("parent_event_id", *parent.as_bytes());
        }
        let vis = VisibilityRecord::defaults_for(&builtin::event(), id);
        engine.insert_entity(&doc, &vis, None).unwrap();
        doc
    }

    #[test]
    fn test_parent_root_children() {
        let engine = engine();
        let festival = insert_event(&engine, "festival", None);
        let day = insert_event(&engine, "day-one", Some(festival.id));
        let workshop = insert_event(&engine, "workshop", Some(day.id));

        let hierarchy = EventHierarchy::new(&engine);
        assert_eq!(hierarchy.parent(&workshop).unwrap().unwrap().id, day.id);
        assert!(hierarchy.parent(&festival).unwrap().is_none());
        assert_eq!(hierarchy.root(&workshop).unwrap().id, festival.id);
        assert_eq!(hierarchy.root(&festival).unwrap().id, festival.id);

        let children = hierarchy.children(festival.id).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, day.id);
    }

    #[test]
    fn test_check_parent_rejects_cycles() {
        let engine = engine();
        let festival = insert_event(&engine, "festival", None);
        let day = insert_event(&engine, "day-one", Some(festival.id));
        let workshop = insert_event(&engine, "workshop", Some(day.id));
        let other = insert_event(&engine, "other", None);

        let hierarchy = EventHierarchy::new(&engine);
        assert!(matches!(
            hierarchy.check_parent(festival.id, workshop.id),
            Err(Error::HierarchyCycle(_))
        ));
        assert!(matches!(
            hierarchy.check_parent(day.id, day.id),
            Err(Error::HierarchyCycle(_))
        ));
        hierarchy.check_parent(festival.id, other.id).unwrap();
    }

    #[test]
    fn test_check_parent_counts_moved_subtree() {
        let engine = engine();

        // Chain of MAX_EVENT_DEPTH links: top <- ... <- bottom
        let top = insert_event(&engine, "top", None);
        let mut bottom = top.id;
        for level in 1..=MAX_EVENT_DEPTH {
            bottom = insert_event(&engine, &format!("level-{}", level), Some(bottom)).id;
        }
        let hierarchy = EventHierarchy::new(&engine);
        let deepest = engine.fetch(EntityKind::Event, bottom).unwrap();
        assert_eq!(hierarchy.root(&deepest).unwrap().id, top.id);

        // A lone event fits under the root but not under the bottom
        let lone = insert_event(&engine, "lone", None);
        hierarchy.check_parent(lone.id, top.id).unwrap();
        assert!(matches!(
            hierarchy.check_parent(lone.id, bottom),
            Err(Error::HierarchyTooDeep { .. })
        ));

        // The chain's own top cannot go under another root: one link too many
        let other = insert_event(&engine, "other", None);
        assert!(matches!(
            hierarchy.check_parent(top.id, other.id),
            Err(Error::HierarchyTooDeep { .. })
        ));

        // A two-level subtree overflows under the second-to-last level and
        // fits exactly one level higher
        let branch = insert_event(&engine, "branch", None);
        insert_event(&engine, "leaf", Some(branch.id));
        let second_to_last = parent_of(&deepest).unwrap();
        assert!(matches!(
            hierarchy.check_parent(branch.id, second_to_last),
            Err(Error::HierarchyTooDeep { .. })
        ));
        let third_to_last =
            parent_of(&engine.fetch(EntityKind::Event, second_to_last).unwrap()).unwrap();
        hierarchy.check_parent(branch.id, third_to_last).unwrap();
    }

    #[test]
    fn test_root_detects_stored_cycle() {
        let engine = engine();
        let a = insert_event(&engine, "a", None);
        let b = insert_event(&engine, "b", Some(a.id));

        let mut looped = engine.fetch(EntityKind::Event, a.id).unwrap();
        looped.set("parent_event_id", *b.id.as_bytes());
        engine.update_entity(&looped).unwrap();

        let hierarchy = EventHierarchy::new(&engine);
        assert!(matches!(hierarchy.root(&looped), Err(Error::HierarchyCycle(_))));
    }

    #[test]
    fn test_dangling_parent_is_root() {
        let engine = engine();
        let mut orphan = insert_event(&engine, "orphan", None);
        orphan.set("parent_event_id", *EntityId::generate().as_bytes());
        engine.update_entity(&orphan).unwrap();

        let hierarchy = EventHierarchy::new(&engine);
        assert_eq!(hierarchy.root(&orphan).unwrap().id, orphan.id);

        orphan.set("parent_event_id", Value::Null);
        assert!(hierarchy.parent(&orphan).unwrap().is_none());
    }
}
