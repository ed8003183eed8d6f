//! Command table, clap tree, and dispatch

pub mod handlers;
pub mod registry;
pub mod schema;

pub use handlers::dispatch;
pub use registry::{params_from_matches, CommandRegistry, GlobalOpts, RegistryError};
pub use schema::{CommandSpec, Namespace, ParamKind, ParamSpec};
