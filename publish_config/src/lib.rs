//! This library contains the platform table and the settings of a publish run.
//!
//! The settings are assembled once from the command line, an optional
//! configuration file and a snapshot of the environment.
//! Nothing in here reads the process environment on its own.

mod platform;
pub use platform::Platform;

mod settings;
pub use settings::{
    CI_JOB_VARIABLE, DefinesError, EXTRA_DEFINES_VARIABLE, Environment, Project, Settings,
    merge_defines, validate_defines,
};
