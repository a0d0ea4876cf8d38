mod console;
mod dialog;
mod domains;
mod paths;
mod render;
mod text;

use std::fs::File;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use crossterm::tty::IsTty;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::console::{Console, ConsoleError, Io};
use crate::render::RenderOptions;

#[derive(Parser)]
#[command(name = "tablekit-demo", about = "Browse and edit tables in the terminal")]
struct Args {
    /// Log level written to the log file
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Disable colored markers
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    table: TableKind,
}

#[derive(Subcommand)]
enum TableKind {
    /// Address book with an e-mail action
    People,
    /// Listing of a folder
    Files {
        /// Folder to list; `~` expands to the home directory
        #[arg(default_value = "~/Downloads")]
        folder: String,
    },
}

/// Log to the cache directory, or the working directory without a home.
fn init_logging(level: LevelFilter) {
    paths::rotate_logs();

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let log_file = paths::log_file()
        .and_then(|path| {
            let dir = path.parent()?;
            std::fs::create_dir_all(dir).ok()?;
            File::create(&path).ok()
        })
        .or_else(|| File::create(paths::FALLBACK_LOG).ok());

    if let Some(log_file) = log_file {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

fn run<T: Clone + 'static>(console: Console<T>) -> Result<(), ConsoleError> {
    console.run()?;
    log::info!("exiting with {} rows", console.container().table().len());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level);

    let options = RenderOptions {
        color: !args.no_color && std::io::stdout().is_tty(),
    };
    let io = Io::stdio().shared();

    let result = match &args.table {
        TableKind::People => {
            log::info!("tablekit-demo starting: people");
            run(domains::people::console(io, options))
        }
        TableKind::Files { folder } => {
            log::info!("tablekit-demo starting: files in {folder}");
            match domains::files::console(folder, io, options) {
                Ok(console) => run(console),
                Err(e) => {
                    log::error!("{e}");
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
