// src/commands/cd/mod.rs
use crate::commands::{Command, CommandContext, CommandError, CommandResult};

/// `cd [dir]`: changes the working directory; no argument means home.
pub struct CdCommand;

impl Command for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let target = match ctx.args.first() {
            None => ctx.fs.home_directory()?,
            Some(arg) => {
                let target = ctx.resolve(arg);
                if !ctx.fs.stat(&target)?.is_directory {
                    return Err(CommandError::NotADirectory(arg.clone()));
                }
                target
            }
        };

        *ctx.cwd = target;
        Ok(String::new())
    }
}

/// `cwd`: prints the working directory.
pub struct CwdCommand;

impl Command for CwdCommand {
    fn name(&self) -> &'static str {
        "cwd"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let cwd = ctx.cwd.clone();
        ctx.emit_line(cwd)
    }
}

/// `~`: prints the home directory.
pub struct HomeCommand;

impl Command for HomeCommand {
    fn name(&self) -> &'static str {
        "home"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let home = ctx.fs.home_directory()?;
        ctx.emit_line(home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;

    #[test]
    fn test_cd_relative_and_parent() {
        let mut h = Harness::new();
        h.fs.mkdir_sync("/home/user/projects/raven");
        h.run(&CdCommand, &["projects/raven"]).unwrap();
        assert_eq!(h.cwd, "/home/user/projects/raven");
        h.run(&CdCommand, &[".."]).unwrap();
        assert_eq!(h.cwd, "/home/user/projects");
    }

    #[test]
    fn test_cd_without_args_goes_home() {
        let mut h = Harness::new();
        h.cwd = "/".to_string();
        h.run(&CdCommand, &[]).unwrap();
        assert_eq!(h.cwd, "/home/user");
    }

    #[test]
    fn test_cd_into_file_fails() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/notes.txt", b"");
        let err = h.run(&CdCommand, &["notes.txt"]).unwrap_err();
        assert_eq!(err.to_string(), "notes.txt: not a directory");
        assert_eq!(h.cwd, "/home/user");
    }

    #[test]
    fn test_cd_missing_directory() {
        let mut h = Harness::new();
        assert!(h.run(&CdCommand, &["nowhere"]).is_err());
        assert_eq!(h.cwd, "/home/user");
    }

    #[test]
    fn test_cwd_prints_with_newline() {
        let mut h = Harness::new();
        assert_eq!(h.run(&CwdCommand, &[]).unwrap(), "/home/user");
        assert_eq!(h.output(), "/home/user\n");
    }

    #[test]
    fn test_home() {
        let mut h = Harness::new();
        assert_eq!(h.run(&HomeCommand, &[]).unwrap(), "/home/user");
        assert_eq!(h.output(), "/home/user\n");
    }
}
