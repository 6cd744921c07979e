use crate::commands::{Command, CommandContext, CommandError, CommandResult};

/// `show file...`: prints file contents back to back.
pub struct ShowCommand;

impl Command for ShowCommand {
    fn name(&self) -> &'static str {
        "show"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if ctx.args.is_empty() {
            return Err(CommandError::MissingFileArgument);
        }

        let mut output = Vec::new();
        for arg in &ctx.args {
            let path = ctx.resolve(arg);
            output.extend(ctx.fs.read_file(&path)?);
        }

        ctx.emit(String::from_utf8_lossy(&output).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;

    #[test]
    fn test_show_concatenates_files() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/a.txt", b"first\n");
        h.fs.write_file_sync("/tmp/b.txt", b"second\n");
        assert_eq!(h.run(&ShowCommand, &["a.txt", "/tmp/b.txt"]).unwrap(), "first\nsecond\n");
        assert_eq!(h.output(), "first\nsecond\n");
    }

    #[test]
    fn test_show_missing_argument() {
        let mut h = Harness::new();
        let err = h.run(&ShowCommand, &[]).unwrap_err();
        assert_eq!(err.to_string(), "missing file argument");
    }

    #[test]
    fn test_show_directory_fails() {
        let mut h = Harness::new();
        assert!(h.run(&ShowCommand, &["/home"]).is_err());
        assert_eq!(h.output(), "");
    }
}
