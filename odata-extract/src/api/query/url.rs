//! Resource URLs with system query options

use crate::api::constants::{COUNT_PATH, METADATA_PATH};

/// Data request for one entity set
///
/// Option values are percent-encoded; the separators between selected or
/// expanded names are kept literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataQuery {
    base_url: String,
    entity: String,
    select: Vec<String>,
    expand: Vec<String>,
    filter: Option<String>,
    top: Option<u32>,
    skip: Option<u32>,
}

impl DataQuery {
    pub fn new(base_url: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            entity: entity.into(),
            ..Self::default()
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn expand<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn filter(mut self, filter: Option<impl Into<String>>) -> Self {
        self.filter = filter.map(Into::into).filter(|f: &String| !f.trim().is_empty());
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn filter_expression(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn page_size(&self) -> Option<u32> {
        self.top
    }

    pub fn offset(&self) -> u32 {
        self.skip.unwrap_or(0)
    }

    /// Full request URL
    pub fn url(&self) -> String {
        let mut params = Vec::new();

        if !self.select.is_empty() {
            params.push(format!("$select={}", encode_list(&self.select)));
        }
        if !self.expand.is_empty() {
            params.push(format!("$expand={}", encode_list(&self.expand)));
        }
        if let Some(filter) = &self.filter {
            params.push(format!("$filter={}", urlencoding::encode(filter)));
        }
        if let Some(top) = self.top {
            params.push(format!("$top={}", top));
        }
        if let Some(skip) = self.skip.filter(|s| *s > 0) {
            params.push(format!("$skip={}", skip));
        }

        let mut url = resource_url(&self.base_url, &self.entity);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }
}

/// `<base>/$metadata`
pub fn metadata_url(base_url: &str) -> String {
    resource_url(base_url, METADATA_PATH)
}

/// `<base>/<entity>/$count`, with the filter applied when given
pub fn count_url(base_url: &str, entity: &str, filter: Option<&str>) -> String {
    let mut url = format!("{}/{}", resource_url(base_url, entity), COUNT_PATH);
    if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
        url.push_str("?$filter=");
        url.push_str(&urlencoding::encode(filter));
    }
    url
}

fn resource_url(base_url: &str, segment: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), segment)
}

fn encode_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| {
            item.split('/')
                .map(|part| urlencoding::encode(part.trim()).into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect::<Vec<_>>()
        .join(",")
}
