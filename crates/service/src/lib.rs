//! Service layer for the back office: generic CRUD orchestration on top of
//! the `models` entities.
//! - `Resource` declares an entity once; repository, service and controller
//!   are generic over it.
//! - Every operation answers with a `ResponseEnvelope`.
//! - Terminal transitions raise `DomainEvent`s on the event bus.

pub mod errors;
pub mod envelope;
pub mod pagination;
pub mod filter;
pub mod policy;
pub mod resource;
pub mod repository;
pub mod repo;
pub mod relation;
pub mod events;
pub mod crud;
pub mod modules;
pub mod dashboard;
pub mod app;
#[cfg(test)]
pub mod test_support;

pub use app::{Repositories, Services};
pub use crud::{CrudService, Hydrated, Lifecycle, Operation};
pub use envelope::ResponseEnvelope;
pub use errors::{ErrorCode, ServiceError};
pub use policy::Principal;
pub use resource::Resource;
#[cfg(test)]
mod tests;
