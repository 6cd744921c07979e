// src/commands/ls/mod.rs
use crate::commands::{Command, CommandContext, CommandResult};

/// `ls [dir]`: one entry per line, directories marked with a trailing `/`.
pub struct LsCommand;

impl Command for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        let dir = match ctx.args.first() {
            Some(arg) => ctx.resolve(arg),
            None => ctx.cwd.clone(),
        };

        let mut output = String::new();
        for entry in ctx.fs.list_directory(&dir)? {
            output.push_str(&entry.name);
            if entry.is_directory {
                output.push('/');
            }
            output.push('\n');
        }

        ctx.emit(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use crate::commands::CommandError;

    #[test]
    fn test_ls_current_directory() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/b.txt", b"");
        h.fs.mkdir_sync("/home/user/a");
        let result = h.run(&LsCommand, &[]).unwrap();
        assert_eq!(result, "a/\nb.txt\n");
        assert_eq!(h.output(), "a/\nb.txt\n");
    }

    #[test]
    fn test_ls_relative_argument() {
        let mut h = Harness::new();
        h.fs.write_file_sync("/home/user/src/main.rs", b"fn main() {}");
        assert_eq!(h.run(&LsCommand, &["src"]).unwrap(), "main.rs\n");
        assert_eq!(h.run(&LsCommand, &["~/src"]).unwrap(), "main.rs\n");
    }

    #[test]
    fn test_ls_empty_directory() {
        let mut h = Harness::new();
        assert_eq!(h.run(&LsCommand, &[]).unwrap(), "");
    }

    #[test]
    fn test_ls_nonexistent() {
        let mut h = Harness::new();
        let err = h.run(&LsCommand, &["/nope"]).unwrap_err();
        assert!(matches!(err, CommandError::Fs(ref e) if e.is_not_found()));
    }
}
