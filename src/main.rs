use std::io::{self, IsTerminal, Read};
use std::process;
use std::sync::Arc;

use clap::Parser;
use raven_shell::fs::OsFs;
use raven_shell::parser::parse;
use raven_shell::shell::{resolve_start_dir, Shell, ShellError, ShellOptions};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raven")]
#[command(about = "Raven shell: a small scripting shell")]
#[command(version)]
struct Cli {
    /// Execute the script from command line argument
    #[arg(short = 'c')]
    command: Option<String>,

    /// Working directory
    #[arg(long = "cwd")]
    cwd: Option<String>,

    /// Output results as JSON (stdout, stderr, exitCode)
    #[arg(long = "json")]
    json: bool,

    /// Print the parsed program instead of running it
    #[arg(long = "ast")]
    ast: bool,

    /// Skip ~/.ravenrc in interactive mode
    #[arg(long = "no-rc")]
    no_rc: bool,

    /// Script file to execute
    #[arg()]
    script_file: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let fs = Arc::new(OsFs::new());
    let cwd = match cli.cwd.as_deref() {
        Some(dir) => match resolve_start_dir(fs.as_ref(), dir) {
            Ok(path) => Some(path),
            Err(e) => {
                eprintln!("raven: invalid --cwd {}: {}", dir, e);
                process::exit(2);
            }
        },
        None => None,
    };

    let mut shell = Shell::new(ShellOptions {
        cwd,
        fs: Some(fs),
        ..Default::default()
    });

    // Determine script source: -c, file, piped stdin, or interactive
    let script = if let Some(s) = cli.command.clone() {
        s
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("raven: cannot read script file {}: {}", file, e);
                process::exit(2);
            }
        }
    } else if io::stdin().is_terminal() {
        process::exit(interactive(&mut shell, cli.no_rc));
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("raven: cannot read stdin: {}", e);
            process::exit(2);
        }
        buf
    };

    if cli.ast {
        process::exit(print_ast(&script));
    }

    if cli.json {
        let result = shell.run_captured(&script);
        println!("{}", serde_json::to_string(&result).unwrap_or_default());
        process::exit(result.exit_code);
    }

    let code = match shell.exec(&script) {
        Ok(()) => 0,
        Err(err) => report(&err),
    };
    process::exit(code);
}

fn interactive(shell: &mut Shell, no_rc: bool) -> i32 {
    if !no_rc {
        if let Err(e) = shell.load_rc_file(&mut io::stderr()) {
            eprintln!("raven: {}", e);
        }
    }
    match shell.repl(io::stdin().lock(), io::stdout()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("raven: {}", e);
            1
        }
    }
}

fn print_ast(script: &str) -> i32 {
    match parse(script) {
        Ok(program) => {
            println!("{}", program);
            0
        }
        Err(errors) => report(&ShellError::Parse(errors)),
    }
}

fn report(err: &ShellError) -> i32 {
    eprintln!("{}", err);
    1
}
