#![forbid(unsafe_code)]

//! Binds the demo object to the headless adapter.

mod cli;
mod error;
mod model;
mod script;
mod worker;

use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use bindery_harness::HeadlessAdapter;
use bindery_runtime::adapter::{BindingAdapter, Closing};
use bindery_runtime::config::BinderyConfig;
use bindery_runtime::logging;
use clap::Parser;

use crate::cli::Cli;
use crate::error::DemoError;
use crate::model::Demo;

const WORKER_PAUSE: Duration = Duration::from_millis(5);

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bindery-demo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DemoError> {
    let mut config = match &cli.config {
        Some(path) => BinderyConfig::load(path)?,
        None => BinderyConfig::from_env()?,
    };
    if let Some(filter) = cli.log_filter {
        config.log.filter = filter;
    }
    config.log.json |= cli.json_logs;
    logging::init(&config.log);

    let demo = Rc::new(Demo::default());
    model::install(&demo);

    let mut adapter = Closing::new(HeadlessAdapter::new(config));
    let widget = adapter.obj_widget(&demo)?;

    if let Some(path) = &cli.script {
        let steps = script::load(path)?;
        script::replay(&steps, &widget)?;
    }

    let handle = adapter.handle();
    let worker = worker::spawn(handle.clone(), cli.worker_ticks, WORKER_PAUSE).map_err(|err| {
        handle.close();
        DemoError::Spawn(err)
    })?;
    adapter.display_widgets(vec![widget])?;
    worker.join().map_err(|_| DemoError::Worker)?;

    for panel in adapter.shown() {
        print!("{}", panel.render_text());
    }
    Ok(())
}
