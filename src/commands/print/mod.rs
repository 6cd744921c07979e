// src/commands/print/mod.rs
use crate::commands::{Command, CommandContext, CommandResult};

/// `print args...` / `output args...`
///
/// With piped or redirected input the input is copied through unchanged;
/// otherwise the arguments are echoed, joined by a space.
pub struct PrintCommand {
    pub name: &'static str,
}

impl Command for PrintCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if ctx.stdin.is_redirected() {
            let content = ctx.stdin.read_all()?;
            return ctx.emit(String::from_utf8_lossy(&content).into_owned());
        }

        let text = format!("{}\n", ctx.args.join(" "));
        ctx.emit(text)
    }
}
