//! Integration tests for the platform: creation, loaders, memberships.

use std::collections::BTreeMap;

use mintnet_core::loader::{CHILD_EVENTS, EVENTS, ORGANIZATIONS, PARENT_EVENT, ROOT_EVENT};
use mintnet_core::{
    Error, InviteStatus, Platform, Role, SecurityError, StorageConfig, Viewer, ViewerMode,
    VisibilityUpdate,
};
use mintnet_proto::{Document, EntityId, EntityKind, Value};

struct TestContext {
    platform: Platform,
    _dir: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::open(StorageConfig::new(dir.path())).unwrap();
        Self { platform, _dir: dir }
    }

    fn profile(&self, username: &str) -> Document {
        let fields = fields(&[
            ("first_name", Value::from(username)),
            ("last_name", Value::from("Tester")),
            ("email", Value::from(format!("{}@example.org", username))),
            ("bio", Value::from("Loves physics")),
            ("skills", Value::from(vec!["math", "robotics"])),
        ]);
        self.platform
            .create_entity(EntityKind::Profile, username, fields, &Viewer::anonymous())
            .unwrap()
    }

    fn create(&self, kind: EntityKind, name: &str, creator: &Document, extra: &[(&str, Value)]) -> Document {
        self.platform
            .create_entity(kind, name, fields(extra), &Viewer::signed_in(creator.id))
            .unwrap()
    }
}

fn fields(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn slug(doc: &Document) -> &str {
    doc.slug().unwrap()
}

#[test]
fn test_anonymous_profile_is_filtered() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let loader = ctx.platform.loader();

    let anon = loader.load_profile(slug(&ada), &Viewer::anonymous()).unwrap();
    assert_eq!(anon.mode, ViewerMode::Anonymous);
    assert_eq!(anon.entity.get("email"), Some(&Value::Null));
    assert_eq!(anon.entity.get_str("bio"), Some("Loves physics"));
    assert_eq!(anon.entity.get_str("username"), Some("ada"));

    let owner = loader.load_profile(slug(&ada), &Viewer::signed_in(ada.id)).unwrap();
    assert_eq!(owner.mode, ViewerMode::Admin);
    assert_eq!(owner.entity.get_str("email"), Some("ada@example.org"));
}

#[test]
fn test_hidden_array_becomes_empty() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let update = VisibilityUpdate::new().set("skills", false);
    ctx.platform
        .update_visibility(EntityKind::Profile, ada.id, &update, &Viewer::signed_in(ada.id))
        .unwrap();

    let bob = ctx.profile("bob");
    let loaded = ctx
        .platform
        .loader()
        .load_profile(slug(&ada), &Viewer::signed_in(bob.id))
        .unwrap();
    assert_eq!(loaded.mode, ViewerMode::Authenticated);
    assert_eq!(loaded.entity.get("skills"), Some(&Value::StringArray(vec![])));
}

#[test]
fn test_visibility_update_requires_owner() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let bob = ctx.profile("bob");

    let update = VisibilityUpdate::new().set("email", true);
    let err = ctx
        .platform
        .update_visibility(EntityKind::Profile, ada.id, &update, &Viewer::signed_in(bob.id))
        .unwrap_err();
    assert!(matches!(err, Error::Security(SecurityError::PermissionDenied(_))));

    ctx.platform
        .update_visibility(EntityKind::Profile, ada.id, &update, &Viewer::signed_in(ada.id))
        .unwrap();
    let anon = ctx
        .platform
        .loader()
        .load_profile(slug(&ada), &Viewer::anonymous())
        .unwrap();
    assert_eq!(anon.entity.get_str("email"), Some("ada@example.org"));
}

#[test]
fn test_unknown_visibility_field_rejected() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let update = VisibilityUpdate::new().set("username", false);
    let err = ctx
        .platform
        .update_visibility(EntityKind::Profile, ada.id, &update, &Viewer::signed_in(ada.id))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Security(SecurityError::UnknownVisibilityField { .. })
    ));
}

#[test]
fn test_organization_modes() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let bob = ctx.profile("bob");
    let org = ctx.create(
        EntityKind::Organization,
        "MINT Lab Köln",
        &ada,
        &[("email", Value::from("lab@example.org"))],
    );
    assert_eq!(slug(&org), "mint-lab-koeln");
    let loader = ctx.platform.loader();

    let stranger = loader.load_organization(slug(&org), &Viewer::signed_in(bob.id)).unwrap();
    assert_eq!(stranger.mode, ViewerMode::Authenticated);
    assert!(stranger.entity.get("email").unwrap().is_null());

    let admin = loader.load_organization(slug(&org), &Viewer::signed_in(ada.id)).unwrap();
    assert_eq!(admin.mode, ViewerMode::Admin);
    assert_eq!(admin.entity.get_str("email"), Some("lab@example.org"));

    // Team members see the unfiltered entity
    let invite = ctx
        .platform
        .invite(EntityKind::Organization, org.id, bob.id, Role::TeamMember, &Viewer::signed_in(ada.id))
        .unwrap();
    ctx.platform.accept(invite.id, &Viewer::signed_in(bob.id)).unwrap();

    let member = loader.load_organization(slug(&org), &Viewer::signed_in(bob.id)).unwrap();
    assert_eq!(member.mode, ViewerMode::TeamMember);
    assert_eq!(member.entity.get_str("email"), Some("lab@example.org"));
}

#[test]
fn test_members_filtered_by_own_visibility() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let bob = ctx.profile("bob");
    let org = ctx.create(EntityKind::Organization, "Robotics Club", &ada, &[]);

    ctx.platform
        .update_visibility(
            EntityKind::Profile,
            bob.id,
            &VisibilityUpdate::new().set("email", true),
            &Viewer::signed_in(bob.id),
        )
        .unwrap();
    let invite = ctx
        .platform
        .invite(EntityKind::Organization, org.id, bob.id, Role::TeamMember, &Viewer::signed_in(ada.id))
        .unwrap();
    ctx.platform.accept(invite.id, &Viewer::signed_in(bob.id)).unwrap();

    let anon = ctx
        .platform
        .loader()
        .load_organization(slug(&org), &Viewer::anonymous())
        .unwrap();
    assert_eq!(anon.members.len(), 2);

    let ada_row = anon.members.iter().find(|m| m.profile_id() == ada.id).unwrap();
    assert_eq!(ada_row.role, Role::Admin);
    assert!(ada_row.profile.get("email").unwrap().is_null());

    let bob_row = anon.members.iter().find(|m| m.profile_id() == bob.id).unwrap();
    assert_eq!(bob_row.role, Role::TeamMember);
    assert_eq!(bob_row.profile.get_str("email"), Some("bob@example.org"));

    // Team members see their own row unfiltered, other rows filtered
    let as_member = ctx
        .platform
        .loader()
        .load_organization(slug(&org), &Viewer::signed_in(bob.id))
        .unwrap();
    let own_row = as_member.members.iter().find(|m| m.profile_id() == bob.id).unwrap();
    assert_eq!(own_row.profile.get_str("email"), Some("bob@example.org"));
    let other_row = as_member.members.iter().find(|m| m.profile_id() == ada.id).unwrap();
    assert!(other_row.profile.get("email").unwrap().is_null());
}

#[test]
fn test_profile_relations() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let org = ctx.create(
        EntityKind::Organization,
        "Robotics Club",
        &ada,
        &[("phone", Value::from("0221 123"))],
    );
    ctx.create(EntityKind::Event, "Maker Days", &ada, &[]);

    let loaded = ctx
        .platform
        .loader()
        .load_profile(slug(&ada), &Viewer::anonymous())
        .unwrap();
    let orgs = loaded.relation(ORGANIZATIONS);
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].id, org.id);
    assert!(orgs[0].get("phone").unwrap().is_null());
    assert_eq!(loaded.relation(EVENTS).len(), 1);

    let own = ctx
        .platform
        .loader()
        .load_profile(slug(&ada), &Viewer::signed_in(ada.id))
        .unwrap();
    assert_eq!(own.relation(ORGANIZATIONS)[0].get_str("phone"), Some("0221 123"));
}

#[test]
fn test_slug_collision_gets_suffix() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let first = ctx.create(EntityKind::Project, "Solar Car", &ada, &[]);
    let second = ctx.create(EntityKind::Project, "Solar Car", &ada, &[]);
    assert_eq!(slug(&first), "solar-car");
    assert_eq!(slug(&second), "solar-car-2");

    let renamed = ctx
        .platform
        .update_entity(
            EntityKind::Project,
            first.id,
            fields(&[("name", Value::from("Solar Boat"))]),
            &Viewer::signed_in(ada.id),
        )
        .unwrap();
    assert_eq!(slug(&renamed), "solar-car");
}

#[test]
fn test_create_requires_signed_in_creator() {
    let ctx = TestContext::new();
    let err = ctx
        .platform
        .create_entity(EntityKind::Event, "Maker Days", BTreeMap::new(), &Viewer::anonymous())
        .unwrap_err();
    assert!(matches!(err, Error::Security(SecurityError::PermissionDenied(_))));
}

#[test]
fn test_create_validates_fields() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let viewer = Viewer::signed_in(ada.id);

    let err = ctx
        .platform
        .create_entity(
            EntityKind::Project,
            "Solar Car",
            fields(&[("shoe_size", Value::from(42i64))]),
            &viewer,
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnknownField { .. }));

    let err = ctx
        .platform
        .create_entity(
            EntityKind::Project,
            "Solar Car",
            fields(&[("slug", Value::from("mine"))]),
            &viewer,
        )
        .unwrap_err();
    assert!(matches!(err, Error::ReadOnlyField(_)));

    let err = ctx
        .platform
        .create_entity(EntityKind::Profile, "eve", BTreeMap::new(), &Viewer::anonymous())
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { .. }));
}

#[test]
fn test_request_flow() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let carol = ctx.profile("carol");
    let project = ctx.create(EntityKind::Project, "Solar Car", &ada, &[]);

    let request = ctx
        .platform
        .request_membership(EntityKind::Project, project.id, Role::TeamMember, &Viewer::signed_in(carol.id))
        .unwrap();

    // The requester cannot accept their own request
    let err = ctx.platform.accept(request.id, &Viewer::signed_in(carol.id)).unwrap_err();
    assert!(matches!(err, Error::Security(SecurityError::PermissionDenied(_))));

    let accepted = ctx.platform.accept(request.id, &Viewer::signed_in(ada.id)).unwrap();
    assert_eq!(accepted.status, InviteStatus::Accepted);
    assert_eq!(
        ctx.platform
            .mode_of(&Viewer::signed_in(carol.id), EntityKind::Project, project.id)
            .unwrap(),
        ViewerMode::TeamMember
    );

    let err = ctx.platform.cancel(request.id, &Viewer::signed_in(carol.id)).unwrap_err();
    assert!(matches!(
        err,
        Error::Security(SecurityError::InvalidTransition { .. })
    ));
}

#[test]
fn test_invite_authority() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let bob = ctx.profile("bob");
    let eve = ctx.profile("eve");
    let org = ctx.create(EntityKind::Organization, "Robotics Club", &ada, &[]);

    let err = ctx
        .platform
        .invite(EntityKind::Organization, org.id, eve.id, Role::Admin, &Viewer::signed_in(bob.id))
        .unwrap_err();
    assert!(matches!(err, Error::Security(SecurityError::PermissionDenied(_))));

    let invite = ctx
        .platform
        .invite(EntityKind::Organization, org.id, bob.id, Role::Admin, &Viewer::signed_in(ada.id))
        .unwrap();
    assert!(matches!(
        ctx.platform
            .invite(EntityKind::Organization, org.id, bob.id, Role::Admin, &Viewer::signed_in(ada.id)),
        Err(Error::DuplicateInvite { .. })
    ));

    // Only admins cancel invites, only the invitee answers them
    assert!(ctx.platform.cancel(invite.id, &Viewer::signed_in(bob.id)).is_err());
    assert!(ctx.platform.reject(invite.id, &Viewer::signed_in(eve.id)).is_err());
    let canceled = ctx.platform.cancel(invite.id, &Viewer::signed_in(ada.id)).unwrap();
    assert_eq!(canceled.status, InviteStatus::Canceled);

    assert!(ctx
        .platform
        .invites_for_viewer(&Viewer::signed_in(bob.id))
        .unwrap()
        .iter()
        .all(|inv| inv.status.is_final()));
    assert_eq!(
        ctx.platform
            .invites_for_entity(EntityKind::Organization, org.id, &Viewer::signed_in(ada.id))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_remove_member() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let bob = ctx.profile("bob");
    let org = ctx.create(EntityKind::Organization, "Robotics Club", &ada, &[]);
    let admin = Viewer::signed_in(ada.id);

    let err = ctx
        .platform
        .remove_member(EntityKind::Organization, org.id, ada.id, Role::Admin, &admin)
        .unwrap_err();
    assert!(matches!(err, Error::LastAdmin(_)));

    let err = ctx
        .platform
        .remove_member(EntityKind::Organization, org.id, bob.id, Role::TeamMember, &admin)
        .unwrap_err();
    assert!(matches!(err, Error::Security(SecurityError::NotAMember { .. })));

    let invite = ctx
        .platform
        .invite(EntityKind::Organization, org.id, bob.id, Role::TeamMember, &admin)
        .unwrap();
    ctx.platform.accept(invite.id, &Viewer::signed_in(bob.id)).unwrap();

    // Members may leave on their own
    let removed = ctx
        .platform
        .remove_member(EntityKind::Organization, org.id, bob.id, Role::TeamMember, &Viewer::signed_in(bob.id))
        .unwrap();
    assert_eq!(removed.profile_id, bob.id);
    assert_eq!(
        ctx.platform
            .mode_of(&Viewer::signed_in(bob.id), EntityKind::Organization, org.id)
            .unwrap(),
        ViewerMode::Authenticated
    );
}

#[test]
fn test_event_hierarchy_page() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let festival = ctx.create(EntityKind::Event, "Science Festival", &ada, &[]);
    let day = ctx.create(
        EntityKind::Event,
        "Day One",
        &ada,
        &[("parent_event_id", Value::from(*festival.id.as_bytes()))],
    );
    let workshop = ctx.create(
        EntityKind::Event,
        "Soldering Workshop",
        &ada,
        &[
            ("parent_event_id", Value::from(*day.id.as_bytes())),
            ("conference_link", Value::from("https://meet.example.org/x")),
        ],
    );

    let loader = ctx.platform.loader();
    let loaded = loader.load_event(slug(&day), &Viewer::anonymous()).unwrap();
    assert_eq!(loaded.relation(PARENT_EVENT)[0].id, festival.id);
    assert_eq!(loaded.relation(ROOT_EVENT)[0].id, festival.id);
    let children = loaded.relation(CHILD_EVENTS);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, workshop.id);
    assert!(children[0].get("conference_link").unwrap().is_null());

    assert_eq!(
        loader.event_root(slug(&workshop), &Viewer::anonymous()).unwrap().id,
        festival.id
    );
    assert_eq!(loader.event_children(slug(&festival), &Viewer::anonymous()).unwrap().len(), 1);

    // Moving the festival under its own grandchild is rejected
    let err = ctx
        .platform
        .update_entity(
            EntityKind::Event,
            festival.id,
            fields(&[("parent_event_id", Value::from(*workshop.id.as_bytes()))]),
            &Viewer::signed_in(ada.id),
        )
        .unwrap_err();
    assert!(matches!(err, Error::HierarchyCycle(_)));
}

#[test]
fn test_delete_entity() {
    let ctx = TestContext::new();
    let ada = ctx.profile("ada");
    let bob = ctx.profile("bob");
    let festival = ctx.create(EntityKind::Event, "Science Festival", &ada, &[]);
    let day = ctx.create(
        EntityKind::Event,
        "Day One",
        &ada,
        &[("parent_event_id", Value::from(*festival.id.as_bytes()))],
    );

    let err = ctx
        .platform
        .delete_entity(EntityKind::Event, festival.id, &Viewer::signed_in(bob.id))
        .unwrap_err();
    assert!(matches!(err, Error::Security(SecurityError::PermissionDenied(_))));

    let result = ctx
        .platform
        .delete_entity(EntityKind::Event, festival.id, &Viewer::signed_in(ada.id))
        .unwrap();
    assert_eq!(result.detached_children, vec![day.id]);
    assert_eq!(result.removed_memberships, 1);

    let err = ctx
        .platform
        .loader()
        .load_event(slug(&festival), &Viewer::anonymous())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    let orphan = ctx
        .platform
        .loader()
        .load_event(slug(&day), &Viewer::anonymous())
        .unwrap();
    assert!(orphan.relation(PARENT_EVENT).is_empty());
}

#[test]
fn test_unknown_slug() {
    let ctx = TestContext::new();
    let err = ctx
        .platform
        .loader()
        .load_project("nothing-here", &Viewer::anonymous())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound { kind: EntityKind::Project, ref key } if key == "nothing-here"
    ));

    let err = ctx
        .platform
        .mode_of(&Viewer::anonymous(), EntityKind::Project, EntityId::generate())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
