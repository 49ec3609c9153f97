//! Vex Checker CLI
//!
//! Ownership, borrow, and lifetime checking for resolved Vex modules.

use vexc::commands::{check_file, explain_error, CheckCommand, OutputFormat};

fn main() {
    vexc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "check" => {
            let command = match CheckCommand::parse(&args[2..]) {
                Ok(command) => command,
                Err(err) => {
                    eprintln!("error: {err}");
                    eprintln!();
                    print_check_usage();
                    std::process::exit(1);
                }
            };

            match check_file(&command) {
                Ok(summary) if summary.accepted() => {
                    if command.options.format == OutputFormat::Human {
                        println!(
                            "OK: {} ({} functions, {} references, {} closures)",
                            command.input.display(),
                            summary.functions,
                            summary.references,
                            summary.closures
                        );
                    }
                }
                Ok(_) => std::process::exit(1),
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: vexc explain <error-code>");
                eprintln!("Example: vexc explain E2001");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("vexc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Vex Ownership Checker");
    println!();
    println!("Usage: vexc <command> [options]");
    println!();
    println!("Commands:");
    println!("  check <input>         Check a resolved module (bincode checker input)");
    println!("  explain <code>        Explain an error code (e.g., vexc explain E2001)");
    println!("  help                  Show this help message");
    println!("  version               Show version information");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=<filter>     Enable tracing (e.g., RUST_LOG=vex_borrowck=debug)");
    println!("  VEX_LOG_TREE=1        Render tracing output as an indented tree");
}

fn print_check_usage() {
    eprintln!("Usage: vexc check <input> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --format=<fmt>            Diagnostic format: human (default), json");
    eprintln!("  --color=<when>            Colors: auto (default), always, never");
    eprintln!("  --no-parallel             Check functions on a single thread");
    eprintln!("  --error-limit=<n>         Stop reporting after n errors (0 = unlimited)");
    eprintln!("  --emit-annotations=<path> Write the annotated module when accepted");
}
