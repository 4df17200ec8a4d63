pub mod auth;
pub mod controller;
pub mod errors;
pub mod extensions;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;
pub mod transformers;

pub use startup::run;
