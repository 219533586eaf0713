// mtdprobe - Serial and WebSocket probe for the pin controller
use clap::Parser;
use mtdprobe::cli::{execute_command, Args, ConsoleWriter, OutputWriter};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let format = args.output;

    if let Err(e) = execute_command(args).await {
        let writer = ConsoleWriter::new(format);
        if writer.write_error(&e.to_string()).is_err() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(e.exit_code());
    }
}
