//! Entity definitions of the platform.
//!
//! Contact details (email, phone, postal address, conference access data)
//! start hidden; descriptive fields start visible. Identity fields such as
//! `name` and `slug` are never gated.

use super::entity::EntityDef;
use super::field::FieldDef;
use super::types::{FieldType, ScalarType};
use mintnet_proto::EntityKind;

fn required(name: &str, scalar: ScalarType) -> FieldDef {
    FieldDef::new(name, FieldType::Scalar(scalar))
}

fn text(name: &str) -> FieldDef {
    FieldDef::optional(name, ScalarType::String)
}

fn list(name: &str) -> FieldDef {
    FieldDef::array(name, ScalarType::String)
}

fn social_links() -> Vec<FieldDef> {
    ["website", "facebook", "linkedin", "twitter", "xing", "youtube", "instagram"]
        .into_iter()
        .map(|name| text(name).public())
        .collect()
}

fn postal_address(prefix: &str) -> Vec<FieldDef> {
    ["street", "street_number", "zip_code", "city"]
        .into_iter()
        .map(|part| text(&format!("{}{}", prefix, part)).private())
        .collect()
}

/// Profile of a person.
pub fn profile() -> EntityDef {
    EntityDef::new(EntityKind::Profile)
        .with_field(required("slug", ScalarType::String))
        .with_field(required("username", ScalarType::String))
        .with_field(required("first_name", ScalarType::String))
        .with_field(required("last_name", ScalarType::String))
        .with_field(text("academic_title").public())
        .with_field(text("position").public())
        .with_field(text("bio").public())
        .with_field(text("avatar").public())
        .with_field(text("email").private())
        .with_field(text("phone").private())
        .with_fields(social_links())
        .with_field(list("skills").public())
        .with_field(list("interests").public())
        .with_field(list("areas").public())
        .with_field(list("offers").public())
        .with_field(list("seekings").public())
}

/// Organization such as a school, company or association.
pub fn organization() -> EntityDef {
    EntityDef::new(EntityKind::Organization)
        .with_field(required("slug", ScalarType::String))
        .with_field(required("name", ScalarType::String))
        .with_field(text("logo"))
        .with_field(text("email").private())
        .with_field(text("phone").private())
        .with_fields(postal_address(""))
        .with_fields(social_links())
        .with_field(text("bio").public())
        .with_field(text("quote").public())
        .with_field(text("quote_author").public())
        .with_field(text("quote_author_information").public())
        .with_field(text("support_needs").public())
        .with_field(list("supported_by").public())
        .with_field(list("types").public())
        .with_field(list("focuses").public())
        .with_field(list("areas").public())
}

/// Event, optionally nested under a parent event.
pub fn event() -> EntityDef {
    EntityDef::new(EntityKind::Event)
        .with_field(required("slug", ScalarType::String))
        .with_field(required("name", ScalarType::String))
        .with_field(FieldDef::optional("start_time", ScalarType::Timestamp))
        .with_field(FieldDef::optional("end_time", ScalarType::Timestamp))
        .with_field(FieldDef::optional("published", ScalarType::Bool))
        .with_field(FieldDef::optional("canceled", ScalarType::Bool))
        .with_field(FieldDef::optional("parent_event_id", ScalarType::Uuid))
        .with_field(text("subline").public())
        .with_field(text("description").public())
        .with_field(FieldDef::optional("participation_until", ScalarType::Timestamp).public())
        .with_field(FieldDef::optional("participant_limit", ScalarType::Int64).public())
        .with_field(text("venue_name").public())
        .with_fields(postal_address("venue_"))
        .with_field(text("conference_link").private())
        .with_field(text("conference_code").private())
        .with_field(list("focuses").public())
        .with_field(list("target_groups").public())
        .with_field(list("tags").public())
        .with_field(list("areas").public())
}

/// Project run by a team.
pub fn project() -> EntityDef {
    EntityDef::new(EntityKind::Project)
        .with_field(required("slug", ScalarType::String))
        .with_field(required("name", ScalarType::String))
        .with_field(text("headline").public())
        .with_field(text("excerpt").public())
        .with_field(text("description").public())
        .with_field(text("email").private())
        .with_field(text("phone").private())
        .with_fields(postal_address(""))
        .with_fields(social_links())
        .with_field(list("target_groups").public())
        .with_field(list("disciplines").public())
        .with_field(list("awards").public())
}
