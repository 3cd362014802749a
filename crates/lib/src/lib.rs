//! buildjdk-lib: derivation and orchestration logic for building a JDK from source
//!
//! A run takes a [`request::BuildRequest`] and drives it through:
//! - `deps`: OS toolchain and library installation
//! - `bootjdk`: boot JDK version derivation and acquisition
//! - `configure`: archive naming and configure flags
//! - `invoke`: fetching and running the external build tool
//! - `verify`: smoke-testing the compiled binary and publishing its location
//!
//! Every side effect goes through the [`host::Host`] trait.

pub mod archive;
pub mod bootjdk;
pub mod configure;
pub mod consts;
pub mod context;
pub mod deps;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod git;
pub mod host;
pub mod invoke;
pub mod pipeline;
pub mod platform;
pub mod request;
pub mod util;
pub mod verify;

pub use error::{BuildError, StepError};
pub use pipeline::{BuildOutcome, ResolvedConfig, RunPlan, build_jdk, plan_run};
pub use request::{BuildRequest, JdkTarget, Variant};
