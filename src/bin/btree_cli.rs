//! Simple CLI for exercising the B-tree.
//!
//! Usage:
//!   btree_cli demo
//!   btree_cli run <script> [capacity] [--json]
//!
//! Scripts hold one `<action> <key>` command per line, with actions
//! `i` (insert), `d` (delete) and `s` (search).

use btree_memory::script::join_keys;
use btree_memory::{demo, BTree, Outcome, Script, DEFAULT_KEY_CAPACITY};
use std::env;
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage();
        exit(1);
    }

    match args[1].as_str() {
        "demo" => match demo::run() {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                exit(1);
            }
        },

        "run" => {
            let json = args.iter().any(|a| a == "--json");
            let positional: Vec<&String> = args[2..].iter().filter(|a| *a != "--json").collect();

            let Some(path) = positional.first() else {
                eprintln!("Usage: btree_cli run <script> [capacity] [--json]");
                exit(1);
            };

            let capacity = match positional.get(1) {
                Some(raw) => match raw.parse::<usize>() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("ERROR: Invalid capacity '{}'", raw);
                        exit(1);
                    }
                },
                None => DEFAULT_KEY_CAPACITY,
            };

            let mut tree = match BTree::with_capacity(capacity) {
                Ok(tree) => tree,
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    exit(1);
                }
            };

            let script = match Script::from_path(path.as_str()) {
                Ok(script) => script,
                Err(e) => {
                    eprintln!("ERROR: Failed to load script: {}", e);
                    exit(1);
                }
            };

            let report = match script.run(&mut tree) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("ERROR: {}", e);
                    exit(1);
                }
            };

            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("ERROR: {}", e);
                        exit(1);
                    }
                }
                return;
            }

            for step in &report.steps {
                match step.outcome {
                    Outcome::NotFound => println!(
                        "{} -> NOT_FOUND (key {} is not in the tree)",
                        step.command,
                        step.command.key()
                    ),
                    outcome => println!("{} -> {}", step.command, outcome),
                }
            }
            println!("COUNT: {}", report.keys.len());
            println!("TRAVERSAL: {}", join_keys(&report.keys));
        }

        other => {
            eprintln!("Unknown command: {}", other);
            usage();
            exit(1);
        }
    }
}

fn usage() {
    eprintln!("Usage: btree_cli <command> [args...]");
    eprintln!("Commands:");
    eprintln!("  demo                              - Run the scripted walkthrough");
    eprintln!("  run <script> [capacity] [--json]  - Apply a command script to a tree");
}
