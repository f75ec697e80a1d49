//! OData service metadata models
//!
//! The metadata graph is stored as an arena: every entity type, complex type
//! and association is owned by [`ServiceMetadata`] and keyed by its
//! [`QualifiedName`]. Cross references (entity set -> type, navigation
//! property -> association -> end type) are stored as names, never as
//! pointers, so cyclic relationships need no shared ownership.

use std::collections::HashMap;
use std::fmt;

/// `Namespace.Name` identifier of a schema element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub namespace: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split `SFOData.PerPerson` at the last dot
    pub fn parse(full: &str) -> Option<Self> {
        let (namespace, name) = full.rsplit_once('.')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Cardinality of an association end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    ZeroToOne,
    Many,
    One,
}

impl Multiplicity {
    /// Parse the EDM literal (`0..1`, `*`, `1`)
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "0..1" => Some(Multiplicity::ZeroToOne),
            "*" => Some(Multiplicity::Many),
            "1" => Some(Multiplicity::One),
            _ => None,
        }
    }

    /// Stable position of the variant, as carried by column metadata
    pub fn ordinal(self) -> u8 {
        match self {
            Multiplicity::ZeroToOne => 0,
            Multiplicity::Many => 1,
            Multiplicity::One => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Multiplicity::ZeroToOne => "0..1",
            Multiplicity::Many => "*",
            Multiplicity::One => "1",
        }
    }
}

/// SAP-specific `sap:*` attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SapAnnotations {
    pub label: Option<String>,
    pub display_format: Option<String>,
    pub filter_restrictions: Option<String>,
    pub required_in_filter: Option<bool>,
    pub filterable: Option<bool>,
    pub sortable: Option<bool>,
}

/// EDM property facets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub nullable: Option<bool>,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub fixed_length: Option<bool>,
    pub unicode: Option<bool>,
    pub collation: Option<String>,
    pub concurrency_mode: Option<String>,
    pub default_value: Option<String>,
}

/// A structural property of an entity or complex type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// `Edm.String`, `Edm.DateTime`, or the qualified name of a complex type
    pub type_name: String,
    pub facets: Facets,
    pub sap: SapAnnotations,
}

impl Property {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            facets: Facets::default(),
            sap: SapAnnotations::default(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.type_name.starts_with("Edm.")
    }

    /// Qualified name of the complex type this property holds, if any
    pub fn complex_type_name(&self) -> Option<QualifiedName> {
        if self.is_primitive() {
            return None;
        }
        QualifiedName::parse(&self.type_name)
    }
}

/// A named relationship from one entity type to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationProperty {
    pub name: String,
    pub relationship: QualifiedName,
    pub from_role: String,
    pub to_role: String,
    pub sap: SapAnnotations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    pub name: String,
    pub namespace: String,
    pub keys: Vec<String>,
    pub properties: Vec<Property>,
    pub navigation_properties: Vec<NavigationProperty>,
    pub sap: SapAnnotations,
}

impl EntityType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            keys: Vec::new(),
            properties: Vec::new(),
            navigation_properties: Vec::new(),
            sap: SapAnnotations::default(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    /// Declared property names in declaration order
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn navigation_property_names(&self) -> Vec<&str> {
        self.navigation_properties
            .iter()
            .map(|n| n.name.as_str())
            .collect()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties.iter().find(|n| n.name == name)
    }

    pub fn is_key(&self, property: &str) -> bool {
        self.keys.iter().any(|k| k == property)
    }
}

/// Keyless structured value type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    pub name: String,
    pub namespace: String,
    pub properties: Vec<Property>,
}

impl ComplexType {
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEnd {
    pub role: String,
    pub entity_type: QualifiedName,
    pub multiplicity: Multiplicity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub name: String,
    pub namespace: String,
    pub ends: Vec<AssociationEnd>,
}

impl Association {
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    pub fn end(&self, role: &str) -> Option<&AssociationEnd> {
        self.ends.iter().find(|e| e.role == role)
    }
}

/// Queryable collection of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: QualifiedName,
    pub sap: SapAnnotations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityContainer {
    pub name: String,
    pub is_default: bool,
    pub entity_sets: Vec<EntitySet>,
}

/// Parsed metadata document
#[derive(Debug, Clone, Default)]
pub struct ServiceMetadata {
    data_service_version: Option<String>,
    entity_types: HashMap<QualifiedName, EntityType>,
    complex_types: HashMap<QualifiedName, ComplexType>,
    associations: HashMap<QualifiedName, Association>,
    containers: Vec<EntityContainer>,
}

impl ServiceMetadata {
    pub fn new(data_service_version: Option<String>) -> Self {
        Self {
            data_service_version,
            ..Self::default()
        }
    }

    pub fn data_service_version(&self) -> Option<&str> {
        self.data_service_version.as_deref()
    }

    pub fn add_entity_type(&mut self, entity_type: EntityType) {
        self.entity_types
            .insert(entity_type.qualified_name(), entity_type);
    }

    pub fn add_complex_type(&mut self, complex_type: ComplexType) {
        self.complex_types
            .insert(complex_type.qualified_name(), complex_type);
    }

    pub fn add_association(&mut self, association: Association) {
        self.associations
            .insert(association.qualified_name(), association);
    }

    pub fn add_container(&mut self, container: EntityContainer) {
        self.containers.push(container);
    }

    pub fn entity_type(&self, name: &QualifiedName) -> Option<&EntityType> {
        self.entity_types.get(name)
    }

    pub fn complex_type(&self, name: &QualifiedName) -> Option<&ComplexType> {
        self.complex_types.get(name)
    }

    pub fn association(&self, name: &QualifiedName) -> Option<&Association> {
        self.associations.get(name)
    }

    pub fn containers(&self) -> &[EntityContainer] {
        &self.containers
    }

    /// Entity sets of every container, in document order
    pub fn entity_sets(&self) -> impl Iterator<Item = &EntitySet> {
        self.containers.iter().flat_map(|c| c.entity_sets.iter())
    }

    /// The container flagged `IsDefaultEntityContainer`, else the first one
    pub fn default_container(&self) -> Option<&EntityContainer> {
        self.containers
            .iter()
            .find(|c| c.is_default)
            .or_else(|| self.containers.first())
    }

    pub fn entity_type_count(&self) -> usize {
        self.entity_types.len()
    }
}
