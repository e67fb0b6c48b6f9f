//! Console output helpers shared by the commands
//!
//! Symbols fall back to bracketed ASCII labels when stdout is not a
//! terminal or a CI environment is detected.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    intro, key_value, remark, section, status_styled, step_error_detail, step_info, step_ok,
    step_ok_detail, step_warn_hint,
};
