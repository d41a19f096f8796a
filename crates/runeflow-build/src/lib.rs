//! RuneFlow Docker plugin
//!
//! Resolves image descriptors into build groups and drives the docker CLI:
//!
//! - [`descriptor`]: descriptor grammar and document parsing
//! - [`defaults`]: default image name, tags and registry
//! - [`builder`]: one `docker build` per build file, fail-fast
//! - [`pusher`]: tag and push, best-effort
//! - [`auth`]: registry login and logout

pub mod auth;
pub mod builder;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod pusher;

pub use auth::{LoginRequest, RegistryAuth};
pub use builder::{BuildOptions, BuiltGroup, ImageBuilder, build_command, parse_build_arg};
pub use defaults::DefaultsResolver;
pub use descriptor::{
    BuildGroup, DescriptorSource, ImageDescriptor, ImageTarget, ResolvedDescriptor, parse,
    parse_string_grammar, resolve, try_parse_document,
};
pub use error::*;
pub use pusher::{ImagePusher, PushOptions, PushReport};
