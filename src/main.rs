use postboard::app;
use postboard::source::DataSource;
use std::env;

/// Main entry point for the dashboard server
///
/// Selects the data source from the command line (`--demo` for randomized
/// data, `--fixed` for the embedded snapshot, live spreadsheet exports
/// otherwise) and an optional bind address, then starts the web application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut source = DataSource::sheets_from_env();
    let mut bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--demo" => source = DataSource::Demo,
            "--fixed" => source = DataSource::Fixed,
            "--bind" => {
                if let Some(addr) = iter.next() {
                    bind_addr = addr.clone();
                }
            }
            other => {
                eprintln!("unknown argument: {}", other);
                eprintln!("usage: postboard [--demo | --fixed] [--bind ADDR]");
                std::process::exit(2);
            }
        }
    }

    app::run(source, &bind_addr).await
}
