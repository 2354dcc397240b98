//! Page loaders.
//!
//! Every entity that leaves the core towards a viewer passes through a
//! [`Loader`]. It fetches the entity with its visibility record, resolves the
//! viewer's mode and filters when the mode requires it. Joined sub-entities
//! are filtered against their own visibility records and the viewer's mode
//! towards them.

use std::collections::{BTreeMap, BTreeSet};

use mintnet_proto::{Document, EntityId, EntityKind};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::hierarchy::EventHierarchy;
use crate::security::{
    FieldFilter, MemberRow, MemberView, ModeResolver, RelationFilter, Related, Viewer, ViewerMode,
};
use crate::storage::StorageEngine;
use crate::visibility::VisibilityRecord;

/// Relation holding the organizations a profile belongs to.
pub const ORGANIZATIONS: &str = "organizations";
/// Relation holding the events a profile belongs to.
pub const EVENTS: &str = "events";
/// Relation holding the projects a profile belongs to.
pub const PROJECTS: &str = "projects";
/// Relation holding an event's direct parent.
pub const PARENT_EVENT: &str = "parent_event";
/// Relation holding an event's topmost ancestor.
pub const ROOT_EVENT: &str = "root_event";
/// Relation holding an event's direct children.
pub const CHILD_EVENTS: &str = "child_events";

/// An entity as served to one viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// Mode of the viewer towards the entity.
    pub mode: ViewerMode,
    /// The entity, filtered if the mode requires it.
    pub entity: Document,
    /// Related entities by relation name, each filtered on its own.
    pub relations: BTreeMap<String, Vec<Document>>,
    /// Team members and admins with their profiles filtered.
    pub members: Vec<MemberView>,
}

impl Loaded {
    /// Documents of one relation, empty if the relation was not loaded.
    pub fn relation(&self, name: &str) -> &[Document] {
        self.relations.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Assembles filtered page data from storage.
pub struct Loader<'a> {
    storage: &'a StorageEngine,
    catalog: &'a Catalog,
}

impl<'a> Loader<'a> {
    /// Create a loader.
    pub fn new(storage: &'a StorageEngine, catalog: &'a Catalog) -> Self {
        Self { storage, catalog }
    }

    /// Load any kind of entity by slug.
    pub fn load(&self, kind: EntityKind, slug: &str, viewer: &Viewer) -> Result<Loaded> {
        match kind {
            EntityKind::Profile => self.load_profile(slug, viewer),
            EntityKind::Organization => self.load_organization(slug, viewer),
            EntityKind::Event => self.load_event(slug, viewer),
            EntityKind::Project => self.load_project(slug, viewer),
        }
    }

    /// Profile page: the profile and the organizations, events and projects
    /// it belongs to.
    pub fn load_profile(&self, slug: &str, viewer: &Viewer) -> Result<Loaded> {
        let id = self.resolve(EntityKind::Profile, slug)?;
        let mut loaded = self.serve_root(EntityKind::Profile, id, viewer)?;

        let mut groups: BTreeMap<EntityKind, Vec<Related>> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for membership in self.storage.memberships_of(id)? {
            if !seen.insert(membership.entity_id) {
                continue;
            }
            if let Some(related) = self.related(membership.entity_kind, membership.entity_id)? {
                groups.entry(membership.entity_kind).or_default().push(related);
            }
        }

        for (kind, name) in [
            (EntityKind::Organization, ORGANIZATIONS),
            (EntityKind::Event, EVENTS),
            (EntityKind::Project, PROJECTS),
        ] {
            let related = groups.remove(&kind).unwrap_or_default();
            loaded
                .relations
                .insert(name.to_string(), self.serve_related(&related, viewer)?);
        }

        debug!(slug, mode = %loaded.mode, "loaded profile");
        Ok(loaded)
    }

    /// Organization page: the organization with its team members and admins.
    pub fn load_organization(&self, slug: &str, viewer: &Viewer) -> Result<Loaded> {
        let loaded = self.load_with_members(EntityKind::Organization, slug, viewer)?;
        debug!(slug, mode = %loaded.mode, members = loaded.members.len(), "loaded organization");
        Ok(loaded)
    }

    /// Event page: the event with its team, parent, root and child events.
    pub fn load_event(&self, slug: &str, viewer: &Viewer) -> Result<Loaded> {
        let mut loaded = self.load_with_members(EntityKind::Event, slug, viewer)?;
        let event = self.storage.fetch(EntityKind::Event, loaded.entity.id)?;
        let hierarchy = EventHierarchy::new(self.storage);

        let mut parent = Vec::new();
        let mut root = Vec::new();
        if let Some(doc) = hierarchy.parent(&event)? {
            parent.extend(self.related(EntityKind::Event, doc.id)?);
            match hierarchy.root(&event) {
                Ok(doc) => root.extend(self.related(EntityKind::Event, doc.id)?),
                Err(e @ (Error::HierarchyCycle(_) | Error::HierarchyTooDeep { .. })) => {
                    warn!(slug, error = %e, "broken event hierarchy, omitting root");
                }
                Err(e) => return Err(e),
            }
        }

        let mut children = Vec::new();
        for child in hierarchy.children(event.id)? {
            children.extend(self.related(EntityKind::Event, child.id)?);
        }

        let relations = [
            (PARENT_EVENT, parent),
            (ROOT_EVENT, root),
            (CHILD_EVENTS, children),
        ];
        for (name, related) in relations {
            loaded
                .relations
                .insert(name.to_string(), self.serve_related(&related, viewer)?);
        }

        debug!(slug, mode = %loaded.mode, "loaded event");
        Ok(loaded)
    }

    /// Project page: the project with its team members.
    pub fn load_project(&self, slug: &str, viewer: &Viewer) -> Result<Loaded> {
        let loaded = self.load_with_members(EntityKind::Project, slug, viewer)?;
        debug!(slug, mode = %loaded.mode, members = loaded.members.len(), "loaded project");
        Ok(loaded)
    }

    /// Topmost ancestor of an event as served to the viewer.
    pub fn event_root(&self, slug: &str, viewer: &Viewer) -> Result<Document> {
        let id = self.resolve(EntityKind::Event, slug)?;
        let event = self.storage.fetch(EntityKind::Event, id)?;
        let root = EventHierarchy::new(self.storage).root(&event)?;
        Ok(self.serve_root(EntityKind::Event, root.id, viewer)?.entity)
    }

    /// Direct children of an event as served to the viewer.
    pub fn event_children(&self, slug: &str, viewer: &Viewer) -> Result<Vec<Document>> {
        let id = self.resolve(EntityKind::Event, slug)?;
        let mut related = Vec::new();
        for child in EventHierarchy::new(self.storage).children(id)? {
            related.extend(self.related(EntityKind::Event, child.id)?);
        }
        self.serve_related(&related, viewer)
    }

    fn load_with_members(&self, kind: EntityKind, slug: &str, viewer: &Viewer) -> Result<Loaded> {
        let id = self.resolve(kind, slug)?;
        let mut loaded = self.serve_root(kind, id, viewer)?;

        let mut rows = Vec::new();
        for member in self.storage.members_of(id)? {
            if let Some(profile) = self.related(EntityKind::Profile, member.profile_id)? {
                rows.push(MemberRow {
                    role: member.role,
                    joined_at: member.joined_at,
                    profile,
                });
            }
        }
        loaded.members = self.serve_members(&rows, viewer)?;
        Ok(loaded)
    }

    fn resolve(&self, kind: EntityKind, slug: &str) -> Result<EntityId> {
        self.storage
            .resolve_slug(kind, slug)?
            .ok_or_else(|| Error::NotFound {
                kind,
                key: slug.to_string(),
            })
    }

    /// Fetch the page's main entity and serve it in the viewer's mode.
    fn serve_root(&self, kind: EntityKind, id: EntityId, viewer: &Viewer) -> Result<Loaded> {
        let entity = self.storage.fetch(kind, id)?;
        let mode = ModeResolver::new(self.storage).resolve(viewer, kind, id)?;

        let entity = if !mode.requires_filtering() {
            entity
        } else {
            match self.storage.get_visibility(id)? {
                Some(visibility) => FieldFilter::filter_by_visibility(&entity, &visibility)?,
                None => {
                    warn!(
                        kind = %kind,
                        id = %id,
                        "visibility record missing, redacting all gated fields"
                    );
                    FieldFilter::redact_all(&entity, self.catalog.entity(kind)?)
                }
            }
        };

        Ok(Loaded {
            mode,
            entity,
            relations: BTreeMap::new(),
            members: Vec::new(),
        })
    }

    /// Fetch a sub-entity with its visibility record.
    ///
    /// Dangling references yield `None`. A missing record is replaced by one
    /// hiding every gated field.
    fn related(&self, kind: EntityKind, id: EntityId) -> Result<Option<Related>> {
        let Some(entity) = self.storage.get_entity(id)?.filter(|doc| doc.kind == kind) else {
            warn!(kind = %kind, id = %id, "dangling reference");
            return Ok(None);
        };
        let visibility = match self.storage.get_visibility(id)? {
            Some(visibility) => visibility,
            None => {
                warn!(
                    kind = %kind,
                    id = %id,
                    "visibility record missing, redacting all gated fields"
                );
                VisibilityRecord::all_hidden(self.catalog.entity(kind)?, id)
            }
        };
        Ok(Some(Related::new(entity, visibility)))
    }

    fn serve_related(&self, related: &[Related], viewer: &Viewer) -> Result<Vec<Document>> {
        if !viewer.is_authenticated() {
            return Ok(RelationFilter::filter_all(related)?);
        }

        let resolver = ModeResolver::new(self.storage);
        related
            .iter()
            .map(|r| -> Result<Document> {
                let mode = resolver.resolve(viewer, r.entity.kind, r.entity.id)?;
                if mode.requires_filtering() {
                    Ok(r.filtered()?)
                } else {
                    Ok(r.entity.clone())
                }
            })
            .collect()
    }

    fn serve_members(&self, rows: &[MemberRow], viewer: &Viewer) -> Result<Vec<MemberView>> {
        if !viewer.is_authenticated() {
            return Ok(RelationFilter::filter_members(rows)?);
        }

        rows.iter()
            .map(|row| -> Result<MemberView> {
                let profile = if viewer.is(row.profile.entity.id) {
                    row.profile.entity.clone()
                } else {
                    row.profile.filtered()?
                };
                Ok(MemberView {
                    role: row.role,
                    joined_at: row.joined_at,
                    profile,
                })
            })
            .collect()
    }
}
