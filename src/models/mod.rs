pub mod access;
pub mod project;
pub mod user;
pub mod vehicle;

pub use access::{AccessAction, AccessEvent, ResourceKind};
pub use project::{Location, Project, ProjectStatus};
pub use user::{Role, User, UserSummary};
pub use vehicle::{AssignedProject, Vehicle, VehicleStatus};

/// A closed set of string-tagged values accepted from clients.
pub trait Enumerated: Sized + Copy + 'static {
    /// Every accepted wire value, in declaration order.
    const VALUES: &'static [&'static str];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self>;
}
