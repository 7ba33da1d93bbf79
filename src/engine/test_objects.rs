//! Set of functions used for unit testing instead of copying them everywhere

use super::metadata::{CatalogMetadata, ElementMeta};
use super::objects::{
    CommandContext, Constant, ElementRef, Expression, FromItem, GroupRef, Query, SqlType, Symbol,
};
use crate::constants::Nullable;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// A two table catalog: `g1(e1 integer, e2 integer, e3 string, e4 double)`
/// and `g2(e1 integer, e2 string)`, where `g2.e2` declares a default.
pub struct TestCatalog {
    pub metadata: CatalogMetadata,
    pub g1: Vec<ElementRef>,
    pub g2: Vec<ElementRef>,
}

pub fn get_catalog() -> TestCatalog {
    let mut metadata = CatalogMetadata::new();
    let g1 = metadata.add_group(
        "g1",
        vec![
            ElementMeta::new("e1", SqlType::Integer, Nullable::Null),
            ElementMeta::new("e2", SqlType::Integer, Nullable::Null),
            ElementMeta::new("e3", SqlType::Text, Nullable::Null),
            ElementMeta::new("e4", SqlType::Double, Nullable::Null),
        ],
    );
    let g2 = metadata.add_group(
        "g2",
        vec![
            ElementMeta::new("e1", SqlType::Integer, Nullable::NotNull),
            ElementMeta::new("e2", SqlType::Text, Nullable::Null)
                .with_default(Constant::text("none")),
        ],
    );
    TestCatalog { metadata, g1, g2 }
}

pub fn get_context() -> CommandContext {
    CommandContext::new(
        Uuid::from_u128(0x5eed),
        NaiveDateTime::parse_from_str("2021-10-01 12:00:00", "%Y-%m-%d %H:%M:%S")
            .expect("fixture timestamp"),
    )
    .with_property("org", "acme")
}

pub fn element(refs: &[ElementRef], index: usize) -> Expression {
    Expression::Element(refs[index].clone())
}

pub fn group(name: &str) -> GroupRef {
    GroupRef::new(
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
        name,
    )
}

/// SELECT <elements> FROM <group> with no other clauses.
pub fn select_elements(group_name: &str, refs: &[ElementRef], indexes: &[usize]) -> Query {
    Query::select_from(
        indexes
            .iter()
            .map(|i| Symbol::new(element(refs, *i)))
            .collect(),
        vec![FromItem::Group(group(group_name))],
    )
}
