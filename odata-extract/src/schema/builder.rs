//! Schema walk from service metadata to a column tree

use std::collections::HashSet;

use log::{debug, warn};

use super::column::{ColumnAttributes, ColumnKind, ColumnMetadata, ColumnMetadataBuilder};
use super::error::SchemaError;
use crate::api::metadata::{EntityProvider, EntityType, Property, QualifiedName};
use crate::api::query::{ExpandNode, ExpandTree};

/// Navigation hops allowed below the root entity
pub const DEFAULT_MAX_EXPAND_DEPTH: usize = 8;

/// Which properties of one level become columns
#[derive(Debug, Clone, Copy)]
enum Selection<'s> {
    All,
    Fields(&'s [String]),
}

impl Selection<'_> {
    fn includes(&self, name: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Fields(fields) => fields.iter().any(|f| f == "*" || f == name),
        }
    }

    fn names(&self, name: &str) -> bool {
        matches!(self, Selection::Fields(fields) if fields.iter().any(|f| f == name))
    }
}

/// Builds the finalized column tree of an entity set
///
/// Columns follow the declared property order of each type. Expanded
/// navigation properties are appended after the properties of their parent,
/// in the order the expand list first names them, and hold the columns of
/// the target type. Complex properties hold their members.
///
/// Without a select list every property at every level is included. With
/// one, each level includes the properties it names; `*` stands for all of
/// them, and naming an expanded navigation property includes all of its
/// target's properties.
#[derive(Debug, Clone, Copy)]
pub struct SchemaBuilder<'a> {
    provider: EntityProvider<'a>,
    max_expand_depth: usize,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(provider: EntityProvider<'a>) -> Self {
        Self {
            provider,
            max_expand_depth: DEFAULT_MAX_EXPAND_DEPTH,
        }
    }

    pub fn with_max_expand_depth(mut self, depth: usize) -> Self {
        self.max_expand_depth = depth;
        self
    }

    pub fn build(
        &self,
        entity: &str,
        select: Option<&str>,
        expand: Option<&str>,
    ) -> Result<ColumnMetadata, SchemaError> {
        let entity_type = self
            .provider
            .get_entity_type(entity)?
            .ok_or_else(|| SchemaError::EntityNotFound(entity.to_string()))?;

        let (tree, unmatched) = ExpandTree::parse(expand, select);
        if let Some(field) = unmatched.into_iter().next() {
            return Err(SchemaError::InvalidSelectField {
                entity: entity.to_string(),
                field,
            });
        }

        let label = self
            .provider
            .get_entity_set(entity)
            .and_then(|set| set.sap.label.clone());
        let mut root = ColumnMetadataBuilder::new(entity, entity_type.qualified_name().to_string()).with_attributes(
            ColumnAttributes {
                kind: Some(ColumnKind::Entity),
                label,
                ..ColumnAttributes::default()
            },
        );

        let selection = if tree.has_selection() {
            Selection::Fields(tree.root().selects())
        } else {
            Selection::All
        };

        let walk = Walk {
            builder: self,
            entity,
            has_selection: tree.has_selection(),
        };
        walk.fill(&mut root, entity_type, tree.root(), selection, "", 0)?;

        debug!(
            "Built schema for {} with {} top-level columns",
            entity,
            root.child_count()
        );
        Ok(root.finalize_children())
    }

    fn property_column(
        &self,
        property: &Property,
        visited: &mut HashSet<QualifiedName>,
    ) -> Result<ColumnMetadataBuilder, SchemaError> {
        let complex_type = property
            .complex_type_name()
            .and_then(|name| self.provider.get_complex_type(&name.namespace, &name.name));

        let Some(complex_type) = complex_type else {
            if !property.is_primitive() {
                warn!(
                    "Type {} of property {} is not a known complex type; treating it as simple",
                    property.type_name, property.name
                );
            }
            return Ok(ColumnMetadataBuilder::new(&property.name, &property.type_name)
                .with_attributes(ColumnAttributes::from_property(property, ColumnKind::Simple)));
        };

        let type_name = complex_type.qualified_name();
        if !visited.insert(type_name.clone()) {
            return Err(SchemaError::CyclicComplexType(type_name.to_string()));
        }

        let mut column = ColumnMetadataBuilder::new(&property.name, type_name.to_string())
            .with_attributes(ColumnAttributes::from_property(property, ColumnKind::Complex));
        for member in &complex_type.properties {
            column.append_child(self.property_column(member, visited)?);
        }

        visited.remove(&type_name);
        Ok(column)
    }
}

struct Walk<'b, 'a> {
    builder: &'b SchemaBuilder<'a>,
    entity: &'b str,
    has_selection: bool,
}

impl<'a> Walk<'_, 'a> {
    fn fill(
        &self,
        column: &mut ColumnMetadataBuilder,
        entity_type: &'a EntityType,
        node: &ExpandNode,
        selection: Selection<'_>,
        path: &str,
        depth: usize,
    ) -> Result<(), SchemaError> {
        if let Selection::Fields(fields) = selection {
            for field in fields {
                let known = field == "*"
                    || entity_type.property(field).is_some()
                    || (entity_type.navigation_property(field).is_some() && node.child(field).is_some());
                if !known {
                    return Err(SchemaError::InvalidSelectField {
                        entity: self.entity.to_string(),
                        field: join(path, field),
                    });
                }
            }
        }

        for property in &entity_type.properties {
            if selection.includes(&property.name) {
                let mut visited = HashSet::new();
                column.append_child(self.builder.property_column(property, &mut visited)?);
            }
        }

        for (name, child) in node.children() {
            let nav_path = join(path, name);
            let invalid = || SchemaError::InvalidExpandPath {
                entity: self.entity.to_string(),
                path: nav_path.clone(),
            };

            let nav = entity_type.navigation_property(name).ok_or_else(invalid)?;
            if depth + 1 > self.builder.max_expand_depth {
                return Err(SchemaError::ExpandTooDeep {
                    path: nav_path.clone(),
                    max: self.builder.max_expand_depth,
                });
            }

            let provider = self.builder.provider;
            let target = provider
                .extract_entity_set_from_navigation_property(Some(nav))?
                .ok_or_else(invalid)?;
            let multiplicity = provider.navigation_multiplicity(nav)?;

            let child_selection = match selection {
                _ if !self.has_selection => Selection::All,
                Selection::All if child.selects().is_empty() => Selection::All,
                _ if selection.names(name) => Selection::All,
                _ => Selection::Fields(child.selects()),
            };

            let mut nav_column = ColumnMetadataBuilder::new(name, target.qualified_name().to_string())
                .with_attributes(ColumnAttributes::from_navigation(nav, multiplicity));
            self.fill(&mut nav_column, target, child, child_selection, &nav_path, depth + 1)?;

            if nav_column.child_count() == 0 {
                debug!("Expanded {} contributes no columns; skipping it", nav_path);
                continue;
            }
            column.append_child(nav_column);
        }

        Ok(())
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::metadata::fixtures::sample_metadata;
    use crate::api::metadata::{
        ComplexType, EntityContainer, EntitySet, MetadataError, SapAnnotations, ServiceMetadata,
    };

    fn names(column: &ColumnMetadata) -> Vec<&str> {
        column.child_list().iter().map(ColumnMetadata::name).collect()
    }

    #[test]
    fn test_all_properties_in_declared_order() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder.build("User", None, None).unwrap();

        assert_eq!(root.kind(), Some(ColumnKind::Entity));
        assert_eq!(root.type_name(), "SFOData.User");
        assert_eq!(root.label(), Some("User"));
        assert_eq!(
            names(&root),
            vec!["userId", "firstName", "hireDate", "salary", "homeAddress"]
        );

        let user_id = root.child("userId").unwrap();
        assert!(!user_id.is_nullable());
        assert_eq!(user_id.max_length(), Some(100));
        assert!(user_id.is_required_in_filter());
        assert_eq!(user_id.filter_restrictions(), Some("single-value"));
        assert_eq!(root.child("hireDate").unwrap().display_format(), Some("Date"));
    }

    #[test]
    fn test_complex_properties_nest_members() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder.build("User", Some("homeAddress"), None).unwrap();

        let address = root.child("homeAddress").unwrap();
        assert_eq!(address.kind(), Some(ColumnKind::Complex));
        assert_eq!(names(address), vec!["street", "city", "geo"]);
        assert_eq!(names(address.child("geo").unwrap()), vec!["lat", "lon"]);
        assert_eq!(
            root.leaf_paths(),
            vec!["homeAddress/street", "homeAddress/city", "homeAddress/geo/lat", "homeAddress/geo/lon"]
        );
    }

    #[test]
    fn test_expanded_navigation_follows_properties() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder
            .build(
                "User",
                Some("userId,empInfo/startDate,empInfo/jobInfoNav/jobTitle"),
                Some("empInfo/jobInfoNav"),
            )
            .unwrap();

        assert_eq!(names(&root), vec!["userId", "empInfo"]);
        let emp_info = root.child("empInfo").unwrap();
        assert_eq!(emp_info.kind(), Some(ColumnKind::Navigation));
        assert_eq!(emp_info.type_name(), "SFOData.EmpEmployment");
        assert_eq!(emp_info.multiplicity_ordinal(), Some(0));
        assert_eq!(names(emp_info), vec!["startDate", "jobInfoNav"]);

        let job = emp_info.child("jobInfoNav").unwrap();
        assert_eq!(job.multiplicity_ordinal(), Some(1));
        assert_eq!(names(job), vec!["jobTitle"]);
    }

    #[test]
    fn test_expand_order_is_first_seen_order() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder
            .build("User", Some("userId,manager/userId,empInfo/userId"), Some("manager,empInfo"))
            .unwrap();

        assert_eq!(names(&root), vec!["userId", "manager", "empInfo"]);
    }

    #[test]
    fn test_selecting_navigation_includes_all_target_properties() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder.build("User", Some("userId,empInfo"), Some("empInfo")).unwrap();

        let emp_info = root.child("empInfo").unwrap();
        assert_eq!(names(emp_info), vec!["personIdExternal", "userId", "startDate"]);
    }

    #[test]
    fn test_expanded_navigation_without_selected_fields_is_omitted() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder.build("User", Some("userId"), Some("manager")).unwrap();

        assert_eq!(names(&root), vec!["userId"]);
    }

    #[test]
    fn test_star_selects_every_property_of_its_level() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder.build("EmpJob", Some("*"), None).unwrap();

        assert_eq!(names(&root), vec!["userId", "seqNumber", "jobTitle", "company"]);
        assert!(root.child("company").unwrap().is_fixed_length());
    }

    #[test]
    fn test_cyclic_navigation_is_walked_to_the_given_depth() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let root = builder
            .build("User", Some("userId,manager/manager/userId"), Some("manager/manager"))
            .unwrap();

        assert_eq!(root.leaf_paths(), vec!["userId", "manager/manager/userId"]);
    }

    #[test]
    fn test_unknown_entity() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let err = builder.build("Nobody", None, None).unwrap_err();
        assert!(matches!(err, SchemaError::EntityNotFound(e) if e == "Nobody"));
    }

    #[test]
    fn test_invalid_expand_segment() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let err = builder.build("User", None, Some("empInfo/bogus")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidExpandPath { path, .. } if path == "empInfo/bogus"));
    }

    #[test]
    fn test_invalid_select_field() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let err = builder.build("User", Some("userId,nickname"), None).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSelectField { field, .. } if field == "nickname"));

        let err = builder.build("User", Some("empInfo/startDate"), None).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSelectField { field, .. } if field == "empInfo/startDate"));

        let err = builder.build("User", Some("manager"), None).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSelectField { field, .. } if field == "manager"));
    }

    #[test]
    fn test_expand_depth_is_bounded() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata)).with_max_expand_depth(2);

        let err = builder.build("User", None, Some("manager/manager/manager")).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ExpandTooDeep { path, max: 2 } if path == "manager/manager/manager"
        ));
    }

    #[test]
    fn test_broken_metadata_propagates() {
        let metadata = sample_metadata();
        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));

        let err = builder.build("Orphan", None, None).unwrap_err();
        assert!(matches!(err, SchemaError::Metadata(MetadataError::UnresolvedEntityType { .. })));

        let err = builder.build("EmpJob", None, Some("costCenterNav")).unwrap_err();
        assert!(matches!(err, SchemaError::Metadata(MetadataError::UnresolvedAssociation { .. })));
    }

    #[test]
    fn test_cyclic_complex_type_is_rejected() {
        let mut metadata = ServiceMetadata::new(Some("2.0".to_string()));
        metadata.add_complex_type(ComplexType {
            name: "Node".to_string(),
            namespace: "Test".to_string(),
            properties: vec![Property::new("value", "Edm.String"), Property::new("next", "Test.Node")],
        });
        let mut entity_type = EntityType::new("Test", "Graph");
        entity_type.properties = vec![Property::new("head", "Test.Node")];
        metadata.add_entity_type(entity_type);
        metadata.add_container(EntityContainer {
            name: "Container".to_string(),
            is_default: true,
            entity_sets: vec![EntitySet {
                name: "Graph".to_string(),
                entity_type: QualifiedName::new("Test", "Graph"),
                sap: SapAnnotations::default(),
            }],
        });

        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));
        let err = builder.build("Graph", None, None).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicComplexType(t) if t == "Test.Node"));
    }

    #[test]
    fn test_same_complex_type_twice_is_not_a_cycle() {
        let mut metadata = ServiceMetadata::new(None);
        metadata.add_complex_type(ComplexType {
            name: "Point".to_string(),
            namespace: "Test".to_string(),
            properties: vec![Property::new("x", "Edm.Double")],
        });
        let mut entity_type = EntityType::new("Test", "Segment");
        entity_type.properties = vec![Property::new("from", "Test.Point"), Property::new("to", "Test.Point")];
        metadata.add_entity_type(entity_type);
        metadata.add_container(EntityContainer {
            name: "Container".to_string(),
            is_default: true,
            entity_sets: vec![EntitySet {
                name: "Segment".to_string(),
                entity_type: QualifiedName::new("Test", "Segment"),
                sap: SapAnnotations::default(),
            }],
        });

        let builder = SchemaBuilder::new(EntityProvider::new(&metadata));
        let root = builder.build("Segment", None, None).unwrap();
        assert_eq!(root.leaf_paths(), vec!["from/x", "to/x"]);
    }
}
