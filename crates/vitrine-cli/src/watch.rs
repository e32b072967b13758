//! Watch command: re-evaluate the snippet on every file change.

use std::fs;

use crate::colors;
use crate::session::{Outcome, Session, SnippetArgs};
use crate::watcher::{FileEvent, FileWatcher};

pub async fn execute(args: &SnippetArgs) -> anyhow::Result<()> {
    if !args.file.exists() {
        anyhow::bail!("Snippet not found: {}", args.file.display());
    }
    let abs_path = args.file.canonicalize()?;
    let snippet_name = abs_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    // Print header
    println!(
        "\n{}Vitrine Watch{} - {}{}{}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        snippet_name,
        colors::RESET
    );
    println!("{}", "─".repeat(50));

    // Initial evaluation
    let session = Session::start(args).await?;
    print_outcome(&session, args);

    let mut watcher = FileWatcher::new(&abs_path)
        .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {}", e))?;

    println!(
        "\n{}Watching for changes... (Ctrl+C to stop){}",
        colors::DIM,
        colors::RESET
    );

    // Watch loop
    loop {
        match watcher.recv().await {
            Some(FileEvent::Modified(path)) => {
                println!(
                    "\n{}File changed, re-evaluating...{}",
                    colors::YELLOW,
                    colors::RESET
                );
                match fs::read_to_string(&path) {
                    Ok(code) => {
                        session.refresh(code).await;
                        print_outcome(&session, args);
                    }
                    Err(e) => eprintln!(
                        "{}Error:{} cannot read {}: {}",
                        colors::RED,
                        colors::RESET,
                        path.display(),
                        e
                    ),
                }
            }
            Some(FileEvent::Removed(path)) => {
                eprintln!(
                    "\n{}Warning:{} Snippet file removed: {}",
                    colors::YELLOW,
                    colors::RESET,
                    path.display()
                );
            }
            None => break,
        }
    }

    Ok(())
}

fn print_outcome(session: &Session, args: &SnippetArgs) {
    match session.outcome() {
        Outcome::Unit(node) => {
            if args.html {
                println!("{}", node.to_html());
            } else {
                println!("{}", node.to_text());
            }
        }
        Outcome::Error(descriptor) => {
            eprintln!("{}Error:{} {}", colors::RED, colors::RESET, descriptor);
        }
        Outcome::Pending => {
            println!(
                "{}(waiting for the program to call render){}",
                colors::DIM,
                colors::RESET
            );
        }
    }
}
