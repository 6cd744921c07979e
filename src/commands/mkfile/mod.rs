// src/commands/mkfile/mod.rs
use crate::commands::{Command, CommandContext, CommandError, CommandResult};

/// `mkfile file...`: creates empty files, truncating existing ones.
pub struct MkfileCommand;

impl Command for MkfileCommand {
    fn name(&self) -> &'static str {
        "mkfile"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if ctx.args.is_empty() {
            return Err(CommandError::MissingOperand);
        }

        for arg in &ctx.args {
            let path = ctx.resolve(arg);
            ctx.fs.create_empty_file(&path)?;
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::fs::FileSystem;

    #[test]
    fn test_mkfile_creates_and_truncates() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/old.txt", b"stale");
        h.run(&MkfileCommand, &["new.txt", "old.txt"]).unwrap();
        assert_eq!(h.fs.read_file("/home/user/new.txt").unwrap(), b"");
        assert_eq!(h.fs.read_file("/home/user/old.txt").unwrap(), b"");
    }

    #[test]
    fn test_mkfile_missing_parent() {
        let mut h = Harness::new();
        assert!(h.run(&MkfileCommand, &["no/such/dir.txt"]).is_err());
    }

    #[test]
    fn test_mkfile_missing_operand() {
        let mut h = Harness::new();
        assert_eq!(h.run(&MkfileCommand, &[]), Err(CommandError::MissingOperand));
    }
}
