//! EDMX metadata document parser
//!
//! Turns the `$metadata` XML (OData V2 CSDL with SAP annotations) into a
//! [`ServiceMetadata`] arena. Elements are matched by local name so the
//! different CSDL namespace revisions are all accepted.

use log::debug;
use roxmltree::{Document, Node};
use std::collections::HashMap;

use super::error::MetadataError;
use super::models::{
    Association, AssociationEnd, ComplexType, EntityContainer, EntitySet, EntityType, Facets,
    Multiplicity, NavigationProperty, Property, QualifiedName, SapAnnotations, ServiceMetadata,
};

const METADATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";
const SAP_NS: &str = "http://www.sap.com/Protocols/SAPData";

/// Parse a metadata document from raw response bytes
pub fn parse_metadata(bytes: &[u8]) -> Result<ServiceMetadata, MetadataError> {
    let text = std::str::from_utf8(bytes)?;
    parse_metadata_str(text)
}

pub fn parse_metadata_str(xml: &str) -> Result<ServiceMetadata, MetadataError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "Edmx" {
        return Err(MetadataError::Malformed(format!(
            "expected an Edmx root element, found '{}'",
            root.tag_name().name()
        )));
    }

    let data_services = child_elements(root, "DataServices")
        .next()
        .ok_or_else(|| MetadataError::Malformed("missing DataServices element".to_string()))?;

    let version = data_services
        .attribute((METADATA_NS, "DataServiceVersion"))
        .map(str::to_string);
    let mut metadata = ServiceMetadata::new(version);

    let schemas: Vec<Node> = child_elements(data_services, "Schema").collect();

    // Aliases may be used before the aliased schema appears
    let mut aliases = HashMap::new();
    for schema in &schemas {
        let namespace = required_attribute(*schema, "Namespace")?;
        if let Some(alias) = schema.attribute("Alias") {
            aliases.insert(alias.to_string(), namespace.to_string());
        }
    }
    let resolver = NameResolver { aliases };

    for schema in &schemas {
        let namespace = required_attribute(*schema, "Namespace")?;

        for node in schema.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "EntityType" => metadata.add_entity_type(parse_entity_type(node, namespace, &resolver)?),
                "ComplexType" => metadata.add_complex_type(ComplexType {
                    name: required_attribute(node, "Name")?.to_string(),
                    namespace: namespace.to_string(),
                    properties: parse_properties(node, &resolver)?,
                }),
                "Association" => metadata.add_association(parse_association(node, namespace, &resolver)?),
                "EntityContainer" => metadata.add_container(parse_container(node, &resolver)?),
                _ => {}
            }
        }
    }

    debug!(
        "Parsed metadata with {} entity types and {} entity sets",
        metadata.entity_type_count(),
        metadata.entity_sets().count()
    );

    Ok(metadata)
}

/// Rewrites alias-qualified references to their full namespace
struct NameResolver {
    aliases: HashMap<String, String>,
}

impl NameResolver {
    fn qualified(&self, node: Node, raw: &str) -> Result<QualifiedName, MetadataError> {
        let mut name = QualifiedName::parse(raw).ok_or_else(|| {
            MetadataError::Malformed(format!(
                "'{}' on {} is not a qualified name",
                raw,
                node.tag_name().name()
            ))
        })?;

        if let Some(namespace) = self.aliases.get(&name.namespace) {
            name.namespace = namespace.clone();
        }
        Ok(name)
    }

    fn type_name(&self, raw: &str) -> String {
        if raw.starts_with("Edm.") {
            return raw.to_string();
        }
        match QualifiedName::parse(raw) {
            Some(mut name) => {
                if let Some(namespace) = self.aliases.get(&name.namespace) {
                    name.namespace = namespace.clone();
                }
                name.to_string()
            }
            None => raw.to_string(),
        }
    }
}

fn parse_entity_type(
    node: Node,
    namespace: &str,
    resolver: &NameResolver,
) -> Result<EntityType, MetadataError> {
    let mut entity_type = EntityType::new(namespace, required_attribute(node, "Name")?);
    entity_type.sap = sap_annotations(node);

    if let Some(key) = child_elements(node, "Key").next() {
        for property_ref in child_elements(key, "PropertyRef") {
            entity_type
                .keys
                .push(required_attribute(property_ref, "Name")?.to_string());
        }
    }

    entity_type.properties = parse_properties(node, resolver)?;

    for nav in child_elements(node, "NavigationProperty") {
        entity_type.navigation_properties.push(NavigationProperty {
            name: required_attribute(nav, "Name")?.to_string(),
            relationship: resolver.qualified(nav, required_attribute(nav, "Relationship")?)?,
            from_role: required_attribute(nav, "FromRole")?.to_string(),
            to_role: required_attribute(nav, "ToRole")?.to_string(),
            sap: sap_annotations(nav),
        });
    }

    Ok(entity_type)
}

fn parse_properties(node: Node, resolver: &NameResolver) -> Result<Vec<Property>, MetadataError> {
    child_elements(node, "Property")
        .map(|p| {
            Ok(Property {
                name: required_attribute(p, "Name")?.to_string(),
                type_name: resolver.type_name(required_attribute(p, "Type")?),
                facets: Facets {
                    nullable: bool_attribute(p.attribute("Nullable")),
                    max_length: number_attribute(p.attribute("MaxLength")),
                    precision: number_attribute(p.attribute("Precision")),
                    scale: number_attribute(p.attribute("Scale")),
                    fixed_length: bool_attribute(p.attribute("FixedLength")),
                    unicode: bool_attribute(p.attribute("Unicode")),
                    collation: p.attribute("Collation").map(str::to_string),
                    concurrency_mode: p.attribute("ConcurrencyMode").map(str::to_string),
                    default_value: p.attribute("DefaultValue").map(str::to_string),
                },
                sap: sap_annotations(p),
            })
        })
        .collect()
}

fn parse_association(
    node: Node,
    namespace: &str,
    resolver: &NameResolver,
) -> Result<Association, MetadataError> {
    let name = required_attribute(node, "Name")?;
    let mut ends = Vec::new();

    for end in child_elements(node, "End") {
        let literal = required_attribute(end, "Multiplicity")?;
        let multiplicity = Multiplicity::parse(literal).ok_or_else(|| {
            MetadataError::Malformed(format!(
                "association '{}' has an invalid multiplicity '{}'",
                name, literal
            ))
        })?;

        ends.push(AssociationEnd {
            role: required_attribute(end, "Role")?.to_string(),
            entity_type: resolver.qualified(end, required_attribute(end, "Type")?)?,
            multiplicity,
        });
    }

    Ok(Association {
        name: name.to_string(),
        namespace: namespace.to_string(),
        ends,
    })
}

fn parse_container(node: Node, resolver: &NameResolver) -> Result<EntityContainer, MetadataError> {
    let mut entity_sets = Vec::new();
    for set in child_elements(node, "EntitySet") {
        entity_sets.push(EntitySet {
            name: required_attribute(set, "Name")?.to_string(),
            entity_type: resolver.qualified(set, required_attribute(set, "EntityType")?)?,
            sap: sap_annotations(set),
        });
    }

    Ok(EntityContainer {
        name: required_attribute(node, "Name")?.to_string(),
        is_default: bool_attribute(node.attribute((METADATA_NS, "IsDefaultEntityContainer")))
            .unwrap_or(false),
        entity_sets,
    })
}

fn sap_annotations(node: Node) -> SapAnnotations {
    SapAnnotations {
        label: node.attribute((SAP_NS, "label")).map(str::to_string),
        display_format: node.attribute((SAP_NS, "display-format")).map(str::to_string),
        filter_restrictions: node
            .attribute((SAP_NS, "filter-restrictions"))
            .map(str::to_string),
        required_in_filter: bool_attribute(node.attribute((SAP_NS, "required-in-filter"))),
        filterable: bool_attribute(node.attribute((SAP_NS, "filterable"))),
        sortable: bool_attribute(node.attribute((SAP_NS, "sortable"))),
    }
}

fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn required_attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, MetadataError> {
    node.attribute(name).ok_or_else(|| {
        MetadataError::Malformed(format!(
            "{} element is missing the '{}' attribute",
            node.tag_name().name(),
            name
        ))
    })
}

fn bool_attribute(value: Option<&str>) -> Option<bool> {
    match value? {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// `MaxLength="Max"` and other non-numeric values read as absent
fn number_attribute(value: Option<&str>) -> Option<u32> {
    value?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::metadata::fixtures::SAMPLE_EDMX;

    #[test]
    fn test_parses_sample_document() {
        let metadata = parse_metadata(SAMPLE_EDMX.as_bytes()).unwrap();

        assert_eq!(metadata.data_service_version(), Some("2.0"));
        assert_eq!(metadata.containers().len(), 2);
        assert_eq!(metadata.default_container().unwrap().name, "EntityContainer");

        let user = metadata
            .entity_type(&QualifiedName::new("SFOData", "User"))
            .unwrap();
        assert_eq!(user.keys, vec!["userId"]);
        assert_eq!(
            user.property_names(),
            vec!["userId", "firstName", "hireDate", "salary", "homeAddress"]
        );
        assert_eq!(user.navigation_property_names(), vec!["manager", "empInfo"]);
    }

    #[test]
    fn test_reads_facets_and_sap_annotations() {
        let metadata = parse_metadata_str(SAMPLE_EDMX).unwrap();
        let user = metadata
            .entity_type(&QualifiedName::new("SFOData", "User"))
            .unwrap();

        let user_id = user.property("userId").unwrap();
        assert_eq!(user_id.facets.nullable, Some(false));
        assert_eq!(user_id.facets.max_length, Some(100));
        assert_eq!(user_id.sap.label.as_deref(), Some("User ID"));
        assert_eq!(user_id.sap.required_in_filter, Some(true));
        assert_eq!(user_id.sap.filter_restrictions.as_deref(), Some("single-value"));

        let salary = user.property("salary").unwrap();
        assert_eq!(salary.facets.precision, Some(18));
        assert_eq!(salary.facets.scale, Some(2));

        let hire_date = user.property("hireDate").unwrap();
        assert_eq!(hire_date.sap.display_format.as_deref(), Some("Date"));
    }

    #[test]
    fn test_resolves_aliases_in_references() {
        let metadata = parse_metadata_str(SAMPLE_EDMX).unwrap();
        let user = metadata
            .entity_type(&QualifiedName::new("SFOData", "User"))
            .unwrap();

        // homeAddress is declared as "sf.Address" using the schema alias
        assert_eq!(user.property("homeAddress").unwrap().type_name, "SFOData.Address");
        assert_eq!(
            user.navigation_property("manager").unwrap().relationship,
            QualifiedName::new("SFOData", "user_manager")
        );
    }

    #[test]
    fn test_reads_association_ends() {
        let metadata = parse_metadata_str(SAMPLE_EDMX).unwrap();
        let association = metadata
            .association(&QualifiedName::new("SFOData", "employment_jobInfoNav"))
            .unwrap();

        let end = association.end("jobInfoNav").unwrap();
        assert_eq!(end.entity_type, QualifiedName::new("SFOData", "EmpJob"));
        assert_eq!(end.multiplicity, Multiplicity::Many);
    }

    #[test]
    fn test_max_length_max_reads_as_absent() {
        let metadata = parse_metadata_str(SAMPLE_EDMX).unwrap();
        let job = metadata
            .entity_type(&QualifiedName::new("SFOData", "EmpJob"))
            .unwrap();
        assert_eq!(job.property("jobTitle").unwrap().facets.max_length, None);
    }

    #[test]
    fn test_rejects_non_edmx_root() {
        let err = parse_metadata_str("<feed/>").unwrap_err();
        assert!(matches!(err, MetadataError::Malformed(_)));
    }

    #[test]
    fn test_rejects_invalid_xml() {
        let err = parse_metadata_str("<edmx:Edmx").unwrap_err();
        assert!(matches!(err, MetadataError::Xml(_)));
    }

    #[test]
    fn test_rejects_missing_name() {
        let xml = r#"<edmx:Edmx xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
            <edmx:DataServices><Schema Namespace="X"><EntityType/></Schema></edmx:DataServices>
        </edmx:Edmx>"#;

        let err = parse_metadata_str(xml).unwrap_err();
        assert!(err.to_string().contains("'Name'"));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let err = parse_metadata(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, MetadataError::Encoding(_)));
    }
}
