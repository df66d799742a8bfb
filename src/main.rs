use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use edge_anim::host::memory::RecordedWrite;
use edge_config::EdgeConfig;

mod scenario;

use scenario::{Report, Scenario};

fn init_logging(config: &EdgeConfig) {
    let filter = config.logging.filter.as_deref().unwrap_or("info");
    let env = env_logger::Env::default().default_filter_or(filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn scenario_path(config: &EdgeConfig) -> Result<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(PathBuf::from(arg));
    }
    match &config.runner.scenario {
        Some(path) => Ok(path.clone()),
        None => bail!("usage: edge <scenario.json> (or set runner.scenario / EDGE_SCENARIO)"),
    }
}

fn print_report(report: &Report, print_stylesheet: bool) -> Result<()> {
    println!("animation {}", report.name);
    for step in &report.steps {
        println!(
            "  t={:<8} {:<14} {}",
            step.at,
            format!("{:?}", step.action).to_lowercase(),
            serde_json::to_string(&step.sample)?
        );
    }
    println!("final {}", serde_json::to_string(&report.final_sample)?);

    println!("style writes:");
    for write in &report.writes {
        match write {
            RecordedWrite::Set(name, value) => println!("  {name}: {value}"),
            RecordedWrite::Remove(name) => println!("  {name}: <removed>"),
            RecordedWrite::Reflow => println!("  <reflow>"),
        }
    }

    println!("events:");
    for event in &report.events {
        println!("  {}", serde_json::to_string(event)?);
    }

    if print_stylesheet {
        println!("stylesheet:");
        println!("{}", report.stylesheet);
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut config = EdgeConfig::load_or_default_from(edge_config::CONFIG_FILE)
        .context("failed to load edge.toml")?;
    config.merge_with_env();
    init_logging(&config);

    let path = scenario_path(&config)?;
    log::info!("running scenario {}", path.display());
    let scenario = Scenario::load(&path)?;
    let report = scenario::run(&scenario, &config)?;
    print_report(&report, config.runner.print_stylesheet)
}
