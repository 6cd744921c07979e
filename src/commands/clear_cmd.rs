use crate::commands::{Command, CommandContext, CommandResult};

/// ANSI sequence: clear the screen, move the cursor top-left.
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        ctx.emit(CLEAR_SCREEN.to_string())?;
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;

    #[test]
    fn test_clear_outputs_ansi_sequence() {
        let mut h = Harness::new();
        assert_eq!(h.run(&ClearCommand, &[]).unwrap(), "");
        assert_eq!(h.output(), "\x1B[2J\x1B[H");
    }
}
