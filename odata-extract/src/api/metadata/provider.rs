//! Read-only navigation over a parsed metadata graph
//!
//! Every lookup that finds nothing returns `Ok(None)`. Only a graph whose
//! cross references are broken (an entity set naming an unknown type, a
//! navigation property naming an unknown association or role) yields a
//! [`MetadataError`].

use log::debug;

use super::error::MetadataError;
use super::models::{
    Association, AssociationEnd, ComplexType, EntitySet, EntityType, Multiplicity, NavigationProperty, QualifiedName,
    ServiceMetadata,
};

/// Lookups over one [`ServiceMetadata`] for the duration of a run
#[derive(Debug, Clone, Copy)]
pub struct EntityProvider<'a> {
    metadata: &'a ServiceMetadata,
}

impl<'a> EntityProvider<'a> {
    pub fn new(metadata: &'a ServiceMetadata) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &'a ServiceMetadata {
        self.metadata
    }

    /// First entity set whose name matches exactly (case-sensitive)
    pub fn get_entity_set(&self, entity_name: &str) -> Option<&'a EntitySet> {
        if entity_name.is_empty() {
            return None;
        }
        self.metadata.entity_sets().find(|set| set.name == entity_name)
    }

    pub fn get_entity_type(&self, entity_name: &str) -> Result<Option<&'a EntityType>, MetadataError> {
        let Some(entity_set) = self.get_entity_set(entity_name) else {
            debug!("Could not find entity: {}", entity_name);
            return Ok(None);
        };
        self.entity_type_of(entity_set).map(Some)
    }

    /// Declared property names of `entity_type`, in declaration order
    pub fn get_entity_property_list(&self, entity_type: Option<&'a EntityType>) -> Option<Vec<&'a str>> {
        entity_type.map(EntityType::property_names)
    }

    /// Entity sets of the service's default container
    pub fn get_default_entity_set(&self) -> &'a [EntitySet] {
        self.metadata
            .default_container()
            .map(|c| c.entity_sets.as_slice())
            .unwrap_or_default()
    }

    /// Resolve a slash-separated expand path and return its last hop
    ///
    /// Each segment naming a navigation property of the current type moves
    /// the current type to that property's target. Segments that are not
    /// navigation properties of the current type are skipped without moving.
    /// Only the last resolved navigation property is returned; the earlier
    /// hops only establish the type context.
    pub fn get_navigation_property(
        &self,
        entity_name: &str,
        nav_path: &str,
    ) -> Result<Option<&'a NavigationProperty>, MetadataError> {
        if entity_name.is_empty() || nav_path.is_empty() {
            debug!(
                "Entity name: '{}' and expand path: '{}', navigation property not found (empty input)",
                entity_name, nav_path
            );
            return Ok(None);
        }

        let Some(mut current) = self.get_entity_type(entity_name)? else {
            debug!(
                "Entity name: '{}' and expand path: '{}', navigation property not found (unknown entity)",
                entity_name, nav_path
            );
            return Ok(None);
        };

        let mut association = None;
        for segment in nav_path.split('/') {
            let Some(nav) = current.navigation_property(segment) else {
                debug!("Skipping '{}': not a navigation property of {}", segment, current.name);
                continue;
            };
            current = self.navigation_target(nav)?;
            association = Some(nav);
        }

        Ok(association)
    }

    /// Target entity type at the `ToRole` end of `nav_property`
    pub fn extract_entity_set_from_navigation_property(
        &self,
        nav_property: Option<&'a NavigationProperty>,
    ) -> Result<Option<&'a EntityType>, MetadataError> {
        match nav_property {
            Some(nav) => self.navigation_target(nav).map(Some),
            None => {
                debug!("No navigation property given, no target entity type to extract");
                Ok(None)
            }
        }
    }

    /// Complex type declared as `namespace.property_name`
    pub fn get_complex_type(&self, namespace: &str, property_name: &str) -> Option<&'a ComplexType> {
        if namespace.is_empty() || property_name.is_empty() {
            debug!(
                "Namespace: '{}' and complex property name: '{}', nothing to look up",
                namespace, property_name
            );
            return None;
        }
        self.metadata
            .complex_type(&QualifiedName::new(namespace, property_name))
    }

    pub fn get_navigation_property_entity_type(
        &self,
        entity_name: &str,
        nav_path: &str,
    ) -> Result<Option<&'a EntityType>, MetadataError> {
        let nav = self.get_navigation_property(entity_name, nav_path)?;
        self.extract_entity_set_from_navigation_property(nav)
    }

    /// Multiplicity of the `ToRole` end of `nav_property`
    pub fn navigation_multiplicity(&self, nav_property: &NavigationProperty) -> Result<Multiplicity, MetadataError> {
        let (_, end) = self.navigation_end(nav_property)?;
        Ok(end.multiplicity)
    }

    fn entity_type_of(&self, entity_set: &'a EntitySet) -> Result<&'a EntityType, MetadataError> {
        self.metadata
            .entity_type(&entity_set.entity_type)
            .ok_or_else(|| MetadataError::UnresolvedEntityType {
                entity_set: entity_set.name.clone(),
                entity_type: entity_set.entity_type.to_string(),
            })
    }

    fn navigation_target(&self, nav_property: &NavigationProperty) -> Result<&'a EntityType, MetadataError> {
        let (association, end) = self.navigation_end(nav_property)?;

        self.metadata
            .entity_type(&end.entity_type)
            .ok_or_else(|| MetadataError::UnresolvedEndType {
                association: association.qualified_name().to_string(),
                entity_type: end.entity_type.to_string(),
            })
    }

    fn navigation_end(
        &self,
        nav_property: &NavigationProperty,
    ) -> Result<(&'a Association, &'a AssociationEnd), MetadataError> {
        let association = self
            .metadata
            .association(&nav_property.relationship)
            .ok_or_else(|| MetadataError::UnresolvedAssociation {
                navigation: nav_property.name.clone(),
                relationship: nav_property.relationship.to_string(),
            })?;

        let end = association
            .end(&nav_property.to_role)
            .ok_or_else(|| MetadataError::UnresolvedRole {
                association: association.qualified_name().to_string(),
                role: nav_property.to_role.clone(),
            })?;

        Ok((association, end))
    }
}
