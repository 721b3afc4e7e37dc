//! Terminal output for camara commands
//!
//! Uses `cliclack` for styled steps and prompts in interactive terminals and
//! falls back to plain, prefix-tagged lines in CI or when piped.
//!
//! ```rust,ignore
//! use camara::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Opening back camera...");
//! spinner.stop("Photo captured");
//!
//! if ui::confirm(&ctx, "Delete all photos?", false).await? {
//!     ui::step_ok(&ctx, "Deleted");
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    key_value, key_value_status, remark, step_info, step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::{InstallProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, CamaraTheme};
