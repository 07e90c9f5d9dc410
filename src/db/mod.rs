pub mod access;
pub mod projects;
pub mod users;
pub mod vehicles;

pub use access::PgAccessStore;
