//! Step and key/value output

use super::context::UiContext;
use console::{style, Style};

fn plain_step(tag: console::StyledObject<&str>, message: &str) {
    println!("  {} {}", tag, message);
}

/// Completed step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        plain_step(style("[OK]").green(), message);
    }
}

/// Completed step with a dimmed detail (a path, a name)
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        plain_step(style("[OK]").green(), &format!("{} ({})", message, detail));
    }
}

/// Something worth knowing that is not a failure
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        plain_step(style("[WARN]").yellow(), &format!("{} - {}", message, hint));
    }
}

/// Informational step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        plain_step(style("[INFO]").cyan(), message);
    }
}

/// Dimmed follow-up hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// `key: value` line
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// `key: value` line colored by whether the value is the desired one
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.use_fancy_output() {
        let value_style = if ok {
            Style::new().green()
        } else {
            Style::new().yellow()
        };
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else {
        let tag = if ok { "[OK]" } else { "[WARN]" };
        println!("  {} {}: {}", tag, key, value);
    }
}
