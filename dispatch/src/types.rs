use std::fmt;
use std::time::Duration;

/// Stable identity of the caller an operation runs on behalf of.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        SubjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Granularity at which cached reads are invalidated. Writes mark a
/// (subject, class) pair stale; reads of the same pair bypass caches
/// until one of them completes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceClass(String);

impl ResourceClass {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ResourceClass(name.into())
    }

    /// Tasks, projects and areas share one class: they live in the same
    /// workbook and a write to any of them stales the combined snapshot.
    pub fn tasks() -> Self {
        ResourceClass("tasks".to_string())
    }

    pub fn drive_files() -> Self {
        ResourceClass("drive-files".to_string())
    }

    pub fn project_files(project_id: &str) -> Self {
        ResourceClass(format!("project-files:{project_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Primary,
    Legacy,
}

impl Backend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Backend::Primary => "primary",
            Backend::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Write => "write",
        }
    }
}

/// Cache directive forwarded to backend executors. `Bypass` is set for
/// reads of an invalidated (subject, class) pair and for all writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Allow,
    Bypass,
}

/// Successful outcome of a dispatched operation. `duration` covers only
/// the attempt that produced the response, not earlier failed attempts.
#[derive(Debug)]
pub struct Dispatched<O> {
    pub output: O,
    pub served_by: Backend,
    pub duration: Duration,
}
