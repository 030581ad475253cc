mod app;
mod catalog;
mod cli;
mod corpus;
mod error;
mod figure;
mod labels;
mod log;
mod logging;
mod session;
mod workflow;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use app::InspectorApp;
use cli::Cli;
use corpus::Corpus;
use workflow::{Command, Workflow};

fn main() -> Result<()> {
    logging::init_logger();
    let args = Cli::parse();

    let scheme = args.label_scheme().context("Invalid label configuration")?;
    for p in &args.inputs {
        if !p.exists() {
            warn!("Input does not exist: {}", p.display());
        }
    }
    let corpus = Corpus::from_inputs(&args.inputs, &args.extensions);
    let mut workflow = Workflow::new(corpus, args.user_name());
    workflow.autosave = args.autosave;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let fixed_box = args.width.zip(args.height);
    let mut app = InspectorApp::new(workflow, scheme, rng, args.compare_dir.clone(), fixed_box);

    // start-up commands fail like their buttons would: reported, window still opens
    if let Some(cat) = args.catalog.clone() {
        app.dispatch(Command::SelectCatalog(cat));
    }
    if let Some(log) = args.log.clone() {
        app.dispatch(Command::OpenLog(log));
    } else if let Some(log) = args.new_log.clone() {
        app.dispatch(Command::NewLog(log));
    }

    info!("Starting window as user {}", args.user_name());
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Figure Inspector",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {}", e))?;

    Ok(())
}
