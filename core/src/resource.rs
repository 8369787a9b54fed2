//! Resource collections and pagination documents.

use crate::data::{JsonResource, merge_missing};
use serde_json::{Map, Value, json};

/// Page position of a paginated collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// Current page, starting at 1.
    pub current_page: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total items across all pages.
    pub total: u64,
    /// Base URL of the listing (page links append `?page=N`).
    pub path: String,
}

impl Pagination {
    /// Create a pagination descriptor.
    #[must_use]
    pub fn new(current_page: u64, per_page: u64, total: u64, path: impl Into<String>) -> Self {
        Self {
            current_page: current_page.max(1),
            per_page: per_page.max(1),
            total,
            path: path.into(),
        }
    }

    /// Index of the last page (at least 1).
    #[must_use]
    pub const fn last_page(&self) -> u64 {
        let pages = self.total.div_ceil(self.per_page);
        if pages == 0 { 1 } else { pages }
    }

    fn page_url(&self, page: u64) -> String {
        format!("{}?page={page}", self.path)
    }

    fn links(&self) -> Value {
        let last = self.last_page();
        json!({
            "first": self.page_url(1),
            "last": self.page_url(last),
            "prev": (self.current_page > 1).then(|| self.page_url(self.current_page - 1)),
            "next": (self.current_page < last).then(|| self.page_url(self.current_page + 1)),
        })
    }

    fn meta(&self, count: usize) -> Value {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        // Page numbers come from clients; saturate rather than overflow.
        let from = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.per_page)
            .saturating_add(1);
        let (from, to) = if count == 0 {
            (Value::Null, Value::Null)
        } else {
            (json!(from), json!(from.saturating_add(count - 1)))
        };
        json!({
            "current_page": self.current_page,
            "from": from,
            "last_page": self.last_page(),
            "path": self.path,
            "per_page": self.per_page,
            "to": to,
            "total": self.total,
        })
    }
}

/// A list of resources rendered as one document.
///
/// ```
/// use api_envelope_core::resource::{Pagination, ResourceCollection};
/// use serde_json::json;
///
/// let items = vec![json!({"id": 1}).as_object().cloned().unwrap()];
/// let doc = ResourceCollection::new(items)
///     .with_pagination(Pagination::new(1, 15, 1, "/users"))
///     .document();
///
/// assert_eq!(doc["data"], json!([{"id": 1}]));
/// assert_eq!(doc["meta"]["last_page"], json!(1));
/// assert_eq!(doc["links"]["next"], json!(null));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceCollection {
    items: Vec<Map<String, Value>>,
    wrapper: Option<String>,
    with: Map<String, Value>,
    additional: Map<String, Value>,
    pagination: Option<Pagination>,
}

impl ResourceCollection {
    /// A collection wrapped under `data`.
    #[must_use]
    pub fn new(items: Vec<Map<String, Value>>) -> Self {
        Self {
            items,
            wrapper: Some("data".to_string()),
            ..Self::default()
        }
    }

    /// Build from resources.
    #[must_use]
    pub fn from_resources<R: JsonResource>(resources: &[R]) -> Self {
        Self::new(resources.iter().map(JsonResource::resolve).collect())
    }

    /// Change (or remove) the key the items are nested under.
    ///
    /// Paginated collections always nest their items; without a wrapper they
    /// fall back to `data`.
    #[must_use]
    pub fn with_wrapper(mut self, wrapper: Option<&str>) -> Self {
        self.wrapper = wrapper.map(str::to_string);
        self
    }

    /// Attach top-level fields contributed by the collection.
    #[must_use]
    pub fn with_extra(mut self, with: Map<String, Value>) -> Self {
        self.with = with;
        self
    }

    /// Attach caller-supplied top-level fields.
    #[must_use]
    pub fn with_additional(mut self, additional: Map<String, Value>) -> Self {
        self.additional = additional;
        self
    }

    /// Attach pagination; adds `links` and `meta` to the document.
    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// The resolved items.
    #[must_use]
    pub fn items(&self) -> &[Map<String, Value>] {
        &self.items
    }

    /// Whether the document carries `with` or `additional` fields.
    #[must_use]
    pub fn has_extras(&self) -> bool {
        !self.with.is_empty() || !self.additional.is_empty()
    }

    /// Render the collection document.
    ///
    /// An unwrapped, unpaginated collection renders as a bare array.
    #[must_use]
    pub fn document(&self) -> Value {
        let items = Value::Array(self.items.iter().cloned().map(Value::Object).collect());

        let wrapper = match (&self.wrapper, &self.pagination) {
            (Some(key), _) => key.clone(),
            (None, Some(_)) => "data".to_string(),
            (None, None) if !self.has_extras() => return items,
            (None, None) => "data".to_string(),
        };

        let mut document = Map::new();
        document.insert(wrapper, items);
        if let Some(pagination) = &self.pagination {
            document.insert("links".to_string(), pagination.links());
            document.insert("meta".to_string(), pagination.meta(self.items.len()));
        }
        merge_missing(&mut document, self.with.clone());
        merge_missing(&mut document, self.additional.clone());
        Value::Object(document)
    }
}
