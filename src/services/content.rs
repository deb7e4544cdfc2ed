//! Dashboard content.

pub trait ContentProvider: Send + Sync + 'static {
    fn get(&self) -> String;
}

/// Fixed content string.
#[derive(Debug, Clone)]
pub struct StaticContent(String);

impl StaticContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }
}

impl Default for StaticContent {
    fn default() -> Self {
        Self::new("Hello Dashboard!")
    }
}

impl ContentProvider for StaticContent {
    fn get(&self) -> String {
        self.0.clone()
    }
}
