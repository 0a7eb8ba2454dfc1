use clap::{CommandFactory, Parser};
use dcmwl::cli::Args;
use dcmwl::logger;
use dcmwl::process::process_file;

fn main() {
    let args = Args::parse();

    if args.files.is_empty() {
        let _ = Args::command().print_help();
        println!();
        return;
    }

    if args.output.is_some() && args.files.len() > 1 {
        eprintln!("Error: --output takes a single input file");
        std::process::exit(2);
    }

    logger::init();

    let multiple_files = args.files.len() > 1;
    let mut any_failed = false;

    for (idx, file_path) in args.files.iter().enumerate() {
        if multiple_files {
            println!("{}", file_path.display());
        }

        if let Err(e) = process_file(file_path, &args) {
            println!("Error: {e}");
            any_failed = true;
        }

        if multiple_files && idx < args.files.len() - 1 {
            println!();
        }
    }

    if any_failed {
        std::process::exit(1);
    }
}
