//! Build version reporting.

pub trait VersionSource: Send + Sync + 'static {
    fn version(&self) -> String;
}

/// Version of this package at compile time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageVersion;

impl VersionSource for PackageVersion {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Operator-supplied version string.
#[derive(Debug, Clone)]
pub struct FixedVersion(String);

impl FixedVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }
}

impl VersionSource for FixedVersion {
    fn version(&self) -> String {
        self.0.clone()
    }
}
