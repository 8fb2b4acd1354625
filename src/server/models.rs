/// Raw caption parameters. A repeated key keeps its first value; unknown keys
/// are ignored.
#[derive(Debug, Default)]
pub(crate) struct CaptionQuery {
    pub(crate) top_text: Option<String>,
    pub(crate) bottom_text: Option<String>,
}

impl CaptionQuery {
    pub(crate) fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "top_text" => &mut query.top_text,
                "bottom_text" => &mut query.bottom_text,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Caption texts exactly as they will be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CaptionRequest {
    pub(crate) top_text: String,
    pub(crate) bottom_text: String,
}

impl From<CaptionQuery> for CaptionRequest {
    fn from(query: CaptionQuery) -> Self {
        Self {
            top_text: normalize_caption(query.top_text.as_deref().unwrap_or_default()),
            bottom_text: normalize_caption(query.bottom_text.as_deref().unwrap_or_default()),
        }
    }
}

/// Underscores become spaces and everything is upper-cased.
pub fn normalize_caption(value: &str) -> String {
    value.replace('_', " ").to_uppercase()
}
