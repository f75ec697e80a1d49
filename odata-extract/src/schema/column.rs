//! Column metadata tree
//!
//! Columns are assembled in two phases. A [`ColumnMetadataBuilder`] collects
//! children while the schema walk discovers them, then
//! [`ColumnMetadataBuilder::finalize_children`] consumes it and yields an
//! immutable [`ColumnMetadata`] for the whole subtree. Because finalizing
//! takes the builder by value, appending to a finished column or finalizing
//! it twice does not compile:
//!
//! ```compile_fail
//! use odata_extract::schema::ColumnMetadataBuilder;
//!
//! let mut builder = ColumnMetadataBuilder::new("userId", "Edm.String");
//! let column = builder.finalize_children();
//! builder.append_child(ColumnMetadataBuilder::new("firstName", "Edm.String"));
//! ```
//!
//! ```compile_fail
//! use odata_extract::schema::ColumnMetadataBuilder;
//!
//! let builder = ColumnMetadataBuilder::new("userId", "Edm.String");
//! let first = builder.finalize_children();
//! let second = builder.finalize_children();
//! ```
//!
//! ```compile_fail
//! use odata_extract::schema::ColumnMetadataBuilder;
//!
//! let mut column = ColumnMetadataBuilder::new("userId", "Edm.String").finalize_children();
//! column.append_child(ColumnMetadataBuilder::new("firstName", "Edm.String"));
//! ```

use std::fmt;

use crate::api::metadata::{Multiplicity, NavigationProperty, Property};

/// What a column stands for in the source graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// A primitive property
    Simple,
    /// A complex-typed property; children are its members
    Complex,
    /// The root of a tree; children are the entity's columns
    Entity,
    /// An expanded navigation property; children are the target's columns
    Navigation,
}

impl ColumnKind {
    pub fn name(self) -> &'static str {
        match self {
            ColumnKind::Simple => "Simple",
            ColumnKind::Complex => "Complex",
            ColumnKind::Entity => "Entity",
            ColumnKind::Navigation => "Navigation",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional column attributes; anything left `None` takes its default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAttributes {
    pub collation: Option<String>,
    pub concurrency_mode: Option<String>,
    pub default_value: Option<String>,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: Option<bool>,
    pub fixed_length: Option<bool>,
    pub unicode: Option<bool>,
    pub kind: Option<ColumnKind>,
    pub multiplicity: Option<Multiplicity>,
    pub display_format: Option<String>,
    pub filter_restrictions: Option<String>,
    pub required_in_filter: Option<bool>,
    pub label: Option<String>,
}

impl ColumnAttributes {
    /// Facets and SAP annotations of a declared property
    pub fn from_property(property: &Property, kind: ColumnKind) -> Self {
        let facets = &property.facets;
        let sap = &property.sap;
        Self {
            collation: facets.collation.clone(),
            concurrency_mode: facets.concurrency_mode.clone(),
            default_value: facets.default_value.clone(),
            max_length: facets.max_length,
            precision: facets.precision,
            scale: facets.scale,
            nullable: facets.nullable,
            fixed_length: facets.fixed_length,
            unicode: facets.unicode,
            kind: Some(kind),
            multiplicity: None,
            display_format: sap.display_format.clone(),
            filter_restrictions: sap.filter_restrictions.clone(),
            required_in_filter: sap.required_in_filter,
            label: sap.label.clone(),
        }
    }

    pub fn from_navigation(nav: &NavigationProperty, multiplicity: Multiplicity) -> Self {
        Self {
            kind: Some(ColumnKind::Navigation),
            multiplicity: Some(multiplicity),
            label: nav.sap.label.clone(),
            ..Self::default()
        }
    }
}

/// A column whose children are still being discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadataBuilder {
    name: String,
    type_name: String,
    attributes: ColumnAttributes,
    children: Vec<ColumnMetadataBuilder>,
}

impl ColumnMetadataBuilder {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            attributes: ColumnAttributes::default(),
            children: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: ColumnAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a child after those already present
    pub fn append_child(&mut self, child: ColumnMetadataBuilder) {
        self.children.push(child);
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Freeze this column and every descendant
    pub fn finalize_children(self) -> ColumnMetadata {
        ColumnMetadata {
            name: self.name,
            type_name: self.type_name,
            attributes: self.attributes,
            children: self
                .children
                .into_iter()
                .map(ColumnMetadataBuilder::finalize_children)
                .collect(),
        }
    }
}

/// A finished column; its subtree can no longer change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    name: String,
    type_name: String,
    attributes: ColumnAttributes,
    children: Vec<ColumnMetadata>,
}

impl ColumnMetadata {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attributes(&self) -> &ColumnAttributes {
        &self.attributes
    }

    pub fn collation(&self) -> Option<&str> {
        self.attributes.collation.as_deref()
    }

    pub fn concurrency_mode(&self) -> Option<&str> {
        self.attributes.concurrency_mode.as_deref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.attributes.default_value.as_deref()
    }

    pub fn max_length(&self) -> Option<u32> {
        self.attributes.max_length
    }

    pub fn precision(&self) -> Option<u32> {
        self.attributes.precision
    }

    pub fn scale(&self) -> Option<u32> {
        self.attributes.scale
    }

    pub fn is_nullable(&self) -> bool {
        self.attributes.nullable.unwrap_or(true)
    }

    pub fn is_fixed_length(&self) -> bool {
        self.attributes.fixed_length.unwrap_or(false)
    }

    pub fn is_unicode(&self) -> bool {
        self.attributes.unicode.unwrap_or(false)
    }

    pub fn kind(&self) -> Option<ColumnKind> {
        self.attributes.kind
    }

    pub fn kind_name(&self) -> Option<&'static str> {
        self.attributes.kind.map(ColumnKind::name)
    }

    pub fn multiplicity_ordinal(&self) -> Option<u8> {
        self.attributes.multiplicity.map(Multiplicity::ordinal)
    }

    pub fn display_format(&self) -> Option<&str> {
        self.attributes.display_format.as_deref()
    }

    pub fn filter_restrictions(&self) -> Option<&str> {
        self.attributes.filter_restrictions.as_deref()
    }

    pub fn is_required_in_filter(&self) -> bool {
        self.attributes.required_in_filter.unwrap_or(false)
    }

    pub fn label(&self) -> Option<&str> {
        self.attributes.label.as_deref()
    }

    /// Children in the order they were appended
    pub fn child_list(&self) -> &[ColumnMetadata] {
        &self.children
    }

    pub fn contains_child(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&ColumnMetadata> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Slash-joined paths of every leaf column, depth first
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for child in &self.children {
            child.collect_leaf_paths("", &mut out);
        }
        out
    }

    fn collect_leaf_paths(&self, prefix: &str, out: &mut Vec<String>) {
        let path = if prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", prefix, self.name)
        };

        if self.children.is_empty() {
            out.push(path);
        } else {
            for child in &self.children {
                child.collect_leaf_paths(&path, out);
            }
        }
    }
}
