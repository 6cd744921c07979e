use crate::commands::{Command, CommandContext, CommandResult};

pub struct WhoamiCommand;

impl Command for WhoamiCommand {
    fn name(&self) -> &'static str {
        "whoami"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let user = ctx.fs.current_user()?;
        ctx.emit_line(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::fs::InMemoryFs;

    #[test]
    fn test_whoami() {
        let mut h = Harness::new();
        assert_eq!(h.run(&WhoamiCommand, &[]).unwrap(), "user");
        assert_eq!(h.output(), "user\n");
    }

    #[test]
    fn test_whoami_configured_user() {
        let mut h = Harness::with_fs(InMemoryFs::with_user("raven", "/home/raven"));
        assert_eq!(h.run(&WhoamiCommand, &[]).unwrap(), "raven");
    }
}
