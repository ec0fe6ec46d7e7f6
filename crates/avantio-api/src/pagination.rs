// Generic pagination descriptors
//
// Every AJAX endpoint on the portal is the same POST to `index.php`
// with a different `module`/`functionName` pair and a different spot
// in the response JSON where the item array lives. A request is fully
// described by this descriptor; the fetch loop itself never knows
// which endpoint it is driving.

use serde_json::{Map, Value};

/// Items-per-page used when the descriptor's params carry no `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Descriptor for one paginated AJAX endpoint.
///
/// `params` is sent as a JSON-encoded string form field; the fetch loop
/// mutates its `offset` and `limit` keys between pages and leaves every
/// other key untouched.
#[derive(Debug, Clone)]
pub struct PaginationRequest {
    /// Portal module handling the call (e.g. `Compromisos`).
    pub module: String,
    /// Always `Ajax` for these endpoints.
    pub action: String,
    /// Server-side function dispatched within the module.
    pub function_name: String,
    /// Structured call parameters, JSON-encoded into the form.
    pub params: Map<String, Value>,
    /// Dot-path to the item array in the response body.
    pub data_path: String,
    /// Items per page when `params` has no `limit`.
    pub page_size: u32,
}

impl PaginationRequest {
    /// Create a descriptor with the common `action=Ajax` fixed field
    /// and the default page size.
    pub fn new(
        module: impl Into<String>,
        function_name: impl Into<String>,
        data_path: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            action: "Ajax".to_string(),
            function_name: function_name.into(),
            params: Map::new(),
            data_path: data_path.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Replace the structured call parameters.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }
}

/// Walk a dot-path (`"list"`, `"data.accommodations"`, ...) through a
/// JSON value. An empty path names the value itself. Returns `None`
/// instead of failing when any segment is missing or the current node
/// is not an object.
pub(crate) fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
