mod allocate;
mod args;
mod console_driver;
mod input;

use anyhow::bail;
use clap::Parser;
use lira_backend::{emit, Config};
use lira_common::lir::Prettier;
use log::LevelFilter;

use args::{Arguments, Command};
use console_driver::ConsoleDriver;

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    let opts = args.options();

    init_logger(opts.verbose);

    let source = input::read_file(&opts.path)?;
    let mut driver = ConsoleDriver::new(opts.path.display().to_string(), source.clone());

    let methods = match lira_frontend::parse(&source) {
        Ok(methods) => methods,
        Err(errors) => {
            driver.report_parse(&errors)?;
            bail!("could not parse `{}`", opts.path.display());
        }
    };

    let config = Config::new(opts.strategy.into(), opts.registers);
    let results = allocate::allocate_all(&methods, &config, opts.jobs)?;

    let mut failed = 0;
    for (method, result) in methods.iter().zip(results) {
        let allocation = match result {
            Ok(allocation) => allocation,
            Err(error) => {
                driver.report_alloc(&method.name, &error)?;
                failed += 1;
                continue;
            }
        };

        match args.command {
            Command::Alloc(_) => {
                let prettier = Prettier::new(&allocation.method);
                println!("{}", prettier.pretty_method());
                println!("# frame: {} bytes", allocation.frame_size);
                println!();
            }

            Command::Asm(_) => print!("{}", emit(&allocation)),
            Command::Check(_) => {}
        }

        driver.report_done(&allocation)?;
    }

    if failed > 0 {
        driver.report_failures(failed)?;
        bail!("allocation failed");
    }

    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
