//! Where application records live in the host store.

/// Identifies the records the exporter searches.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(default))]
pub struct Settings {
    /// Content type of application records.
    pub post_type: String,
    /// Metadata key holding the serialized application form. Searched by
    /// substring because an address can appear anywhere inside it.
    pub catch_all_key: String,
}

impl Settings {
    pub const DEFAULT_POST_TYPE: &'static str = "wordcamp";
    pub const DEFAULT_CATCH_ALL_KEY: &'static str = "_application_data";
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            post_type: Self::DEFAULT_POST_TYPE.to_string(),
            catch_all_key: Self::DEFAULT_CATCH_ALL_KEY.to_string(),
        }
    }
}
