// src/commands/mkdir/mod.rs
use crate::commands::{Command, CommandContext, CommandError, CommandResult};

/// `mkdir dir...`: creates each directory along with missing parents.
pub struct MkdirCommand;

impl Command for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if ctx.args.is_empty() {
            return Err(CommandError::MissingOperand);
        }

        for arg in &ctx.args {
            let path = ctx.resolve(arg);
            ctx.fs.create_directory(&path, true)?;
        }
        Ok(String::new())
    }
}

/// `rmdir dir...`: removes empty directories only.
pub struct RmdirCommand;

impl Command for RmdirCommand {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if ctx.args.is_empty() {
            return Err(CommandError::MissingOperand);
        }

        for arg in &ctx.args {
            let path = ctx.resolve(arg);
            ctx.fs.remove_empty_directory(&path)?;
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::fs::{FileSystem, FsError};

    #[test]
    fn test_mkdir_creates_parents() {
        let mut h = Harness::new();
        h.run(&MkdirCommand, &["a/b/c", "/top"]).unwrap();
        assert!(h.fs.stat("/home/user/a/b/c").unwrap().is_directory);
        assert!(h.fs.stat("/top").unwrap().is_directory);
    }

    #[test]
    fn test_mkdir_existing_is_ok() {
        let mut h = Harness::new();
        h.fs.mkdir_sync("/home/user/a");
        assert!(h.run(&MkdirCommand, &["a"]).is_ok());
    }

    #[test]
    fn test_mkdir_missing_operand() {
        let mut h = Harness::new();
        assert_eq!(h.run(&MkdirCommand, &[]), Err(CommandError::MissingOperand));
    }

    #[test]
    fn test_rmdir_empty_only() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/full/file", b"x");
        h.fs.mkdir_sync("/home/user/empty");

        h.run(&RmdirCommand, &["empty"]).unwrap();
        assert!(!h.fs.exists("/home/user/empty"));

        let err = h.run(&RmdirCommand, &["full"]).unwrap_err();
        assert!(matches!(err, CommandError::Fs(FsError::NotEmpty { .. })));
        assert!(h.fs.exists("/home/user/full/file"));
    }

    #[test]
    fn test_rmdir_missing_operand() {
        let mut h = Harness::new();
        assert_eq!(h.run(&RmdirCommand, &[]), Err(CommandError::MissingOperand));
    }
}
