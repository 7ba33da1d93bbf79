//! The rewriter's view of the metadata catalog: type, nullability and
//! default value lookup for resolved elements. The real catalog lives a
//! pipeline stage away; an in-memory implementation is provided for tests
//! and embedders.

use super::objects::{Constant, ElementRef, SqlType};
use crate::constants::Nullable;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// What the catalog declares about one element (column).
#[derive(Clone, Debug)]
pub struct ElementMeta {
    pub name: String,
    pub ty: SqlType,
    pub nullable: Nullable,
    pub default: Option<Constant>,
}

impl ElementMeta {
    pub fn new(name: &str, ty: SqlType, nullable: Nullable) -> ElementMeta {
        ElementMeta {
            name: name.to_string(),
            ty,
            nullable,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Constant) -> ElementMeta {
        self.default = Some(default);
        self
    }
}

pub trait Metadata {
    fn element(&self, id: &Uuid) -> Result<&ElementMeta, MetadataError>;
}

/// In-memory metadata catalog keyed by element id.
#[derive(Clone, Debug, Default)]
pub struct CatalogMetadata {
    elements: HashMap<Uuid, ElementMeta>,
}

impl CatalogMetadata {
    pub fn new() -> CatalogMetadata {
        CatalogMetadata {
            elements: HashMap::new(),
        }
    }

    /// Registers a group's columns and hands back resolved references for
    /// building commands against it.
    pub fn add_group(&mut self, group: &str, columns: Vec<ElementMeta>) -> Vec<ElementRef> {
        let mut refs = vec![];
        for column in columns {
            let id = Uuid::new_v5(
                &Uuid::NAMESPACE_OID,
                format!("{}.{}", group, column.name).as_bytes(),
            );
            refs.push(ElementRef::new(id, group, &column.name, column.ty));
            self.elements.insert(id, column);
        }
        refs
    }
}

impl Metadata for CatalogMetadata {
    fn element(&self, id: &Uuid) -> Result<&ElementMeta, MetadataError> {
        self.elements
            .get(id)
            .ok_or_else(|| MetadataError::UnknownElement(*id))
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("No element found for id {0}")]
    UnknownElement(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_registration() -> Result<(), Box<dyn std::error::Error>> {
        let mut catalog = CatalogMetadata::new();
        let refs = catalog.add_group(
            "g1",
            vec![
                ElementMeta::new("e1", SqlType::Integer, Nullable::Null),
                ElementMeta::new("e2", SqlType::Text, Nullable::NotNull)
                    .with_default(Constant::text("none")),
            ],
        );

        assert_eq!(refs.len(), 2);
        let meta = catalog.element(&refs[1].id)?;
        assert_eq!(meta.ty, SqlType::Text);
        assert_eq!(meta.default, Some(Constant::text("none")));
        assert!(catalog.element(&Uuid::nil()).is_err());
        Ok(())
    }
}
