use blog_harvest::Harvest;
use blog_harvest::sink::JsonLinesSink;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("Harvest failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> blog_harvest::Result<()> {
    let config = args.to_config()?;
    ::log::info!(
        "Harvesting {} listing pages (lookBackWindow={}, paginationLimit={})",
        config.urls.len(),
        config.look_back_window,
        config.pagination_limit
    );

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    let mut sink = JsonLinesSink::new(writer);

    let start_time = std::time::Instant::now();
    let mut rx = Harvest::new(config).start().await?;

    while let Some(record) = rx.recv().await {
        ::log::debug!("Writing record: {}", record.url);
        sink.push(&record)?;
    }

    let written = sink.written();
    sink.finish()?;

    ::log::info!(
        "Harvest complete - wrote {} articles in {:.2} seconds",
        written,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
