// src/commands/rm/mod.rs
use crate::commands::{Command, CommandContext, CommandError, CommandResult};

/// `rm path...`: files are unlinked, directories removed recursively.
/// Paths that do not exist are skipped silently.
pub struct RmCommand;

impl Command for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        if ctx.args.is_empty() {
            return Err(CommandError::MissingOperand);
        }

        for arg in &ctx.args {
            let path = ctx.resolve(arg);
            let stat = match ctx.fs.stat(&path) {
                Ok(stat) => stat,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            };
            if stat.is_directory {
                ctx.fs.remove_directory_recursive(&path)?;
            } else {
                ctx.fs.remove_file(&path)?;
            }
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
    fn test_rm_files() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/file1", b"1");
        h.fs.write_file_sync("/home/user/file2", b"2");
        h.run(&RmCommand, &["file1", "file2"]).unwrap();
        assert!(!h.fs.exists("/home/user/file1"));
        assert!(!h.fs.exists("/home/user/file2"));
    }

    #[test]
    fn test_rm_directory_recursive() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/dir/sub/file.txt", b"x");
        h.run(&RmCommand, &["dir"]).unwrap();
        assert!(!h.fs.exists("/home/user/dir"));
    }

    #[test]
    fn test_rm_missing_path_is_ignored() {
        let mut h = Harness::new();
        assert_eq!(h.run(&RmCommand, &["ghost"]), Ok(String::new()));
    }

    #[test]
    fn test_rm_missing_operand() {
        let mut h = Harness::new();
        assert_eq!(h.run(&RmCommand, &[]), Err(CommandError::MissingOperand));
    }
}
