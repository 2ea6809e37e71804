//! Source emitters.
//!
//! - `routes`: Zod validators and Hono route descriptors
//! - `hooks`: fetch wrappers, cache keys and query/mutation hooks
//! - `profile`: the client-hook library records `hooks` is driven by
//! - `typing`: schema IR -> TypeScript types, shared by both emitters

pub mod hooks;
pub mod profile;
pub mod routes;
pub mod typing;

pub use profile::EmitterProfile;
