//! Configuration loading and resolution.
//!
//! `load` layers default files, explicit `--config` files, `ATS__` environment
//! variables and finally command-line flags, then validates the result into a
//! [`ResolvedConfig`].

mod loader;
mod raw;
mod resolved;
mod sources;

pub(crate) use loader::load;
pub(crate) use resolved::ResolvedConfig;
