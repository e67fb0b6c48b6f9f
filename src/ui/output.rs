//! Output functions for consistent CLI formatting

use super::context::UiContext;
use crate::workspace::RootStatus;
use console::{style, Emoji, StyledObject};

static CHECK: Emoji<'_, '_> = Emoji("✓", "[OK]");
static CROSS: Emoji<'_, '_> = Emoji("✗", "[FAIL]");
static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");
static INFO: Emoji<'_, '_> = Emoji("•", "[INFO]");

/// Display a title banner
pub fn intro(_ctx: &UiContext, title: &str) {
    println!("{}", style(title).cyan().bold());
    println!();
}

/// Display a section header
pub fn section(_ctx: &UiContext, title: &str) {
    println!();
    println!("{}", style(title).bold());
}

fn symbol(ctx: &UiContext, emoji: &Emoji<'_, '_>) -> String {
    if ctx.use_fancy_output() {
        emoji.to_string()
    } else {
        emoji.1.to_string()
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    println!("  {} {}", style(symbol(ctx, &CHECK)).green(), message);
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    println!(
        "  {} {} ({})",
        style(symbol(ctx, &CHECK)).green(),
        message,
        style(detail).dim()
    );
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    println!(
        "  {} {} - {}",
        style(symbol(ctx, &WARN)).yellow(),
        message,
        style(hint).dim()
    );
}

/// Display an error step with detail
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    println!(
        "  {} {}: {}",
        style(symbol(ctx, &CROSS)).red(),
        message,
        style(detail).red()
    );
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    println!("  {} {}", style(symbol(ctx, &INFO)).cyan(), message);
}

/// Display a remark/hint
pub fn remark(_ctx: &UiContext, message: &str) {
    println!("  {}", style(message).dim());
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Root status colored by severity
pub fn status_styled(status: RootStatus) -> StyledObject<String> {
    let text = style(status.to_string());
    match status {
        RootStatus::Loaded => text.green(),
        RootStatus::Loading | RootStatus::Unloaded => text.yellow(),
        RootStatus::Disabled => text.dim(),
        RootStatus::Missing => text.yellow(),
        RootStatus::Error => text.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_non_interactive() {
        let ctx = UiContext::non_interactive();
        intro(&ctx, "Test");
        step_ok(&ctx, "Step completed");
        step_warn_hint(&ctx, "Warning", "hint");
        step_error_detail(&ctx, "Error", "detail");
        assert_eq!(symbol(&ctx, &CHECK), "[OK]");
    }

    #[test]
    fn status_text_is_preserved() {
        let styled = status_styled(RootStatus::Missing).force_styling(false);
        assert_eq!(styled.to_string(), "missing");
    }
}
