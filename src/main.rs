use clap::Parser;

mod cli;

const WORKER_THREADS: usize = 2;

fn main() {
    bootstrap_lib::init_tracing();
    let args = cli::Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: cannot start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(cli::run(args));
    std::process::exit(code);
}
