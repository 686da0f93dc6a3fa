//! Fleetpulse API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! report assembler) so integration tests and the binary entrypoint can both
//! access them.

pub mod config;
pub mod error;
pub mod reports;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
