//! Command implementations.

mod info;
mod run;
mod serve;
mod validate;

pub use info::run_info;
pub use run::run_stdin;
pub use serve::run_serve;
pub use validate::run_validate;
