mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use collab_graph::insights::{Insight, evaluate_team, personal_insights};
use collab_graph::metrics::{MemberSummary, TeamSnapshot};
use collab_graph::{EngineConfig, load_config, load_items};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of work items for the current period.
    items: PathBuf,

    /// Work items for the prior period, enabling period-over-period insights.
    #[arg(long)]
    previous: Option<PathBuf>,

    /// JSON file overriding layout and camera tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Member to preselect in the viewer or to report on.
    #[arg(long)]
    member: Option<String>,

    /// Print the team snapshot as JSON and exit without opening a window.
    #[arg(long)]
    report: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    team: &'a TeamSnapshot,
    insights: Vec<Insight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    member: Option<MemberReport>,
}

#[derive(Serialize)]
struct MemberReport {
    summary: MemberSummary,
    insights: Vec<Insight>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "collab_graph=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    if args.report {
        return print_report(&args);
    }
    run_viewer(args, config)
}

fn print_report(args: &Args) -> Result<()> {
    let items = load_items(&args.items)
        .with_context(|| format!("failed to load work items from {}", args.items.display()))?;
    let previous = args
        .previous
        .as_deref()
        .map(|path| {
            load_items(path)
                .with_context(|| format!("failed to load previous period from {}", path.display()))
        })
        .transpose()?;

    let team = TeamSnapshot::compute(&items);
    let member = match args.member.as_deref() {
        Some(name) => {
            let summary = team
                .summary(name)
                .cloned()
                .ok_or_else(|| anyhow!("member {name:?} does not appear in the work items"))?;
            Some(MemberReport {
                summary,
                insights: personal_insights(&items, name, previous.as_deref()),
            })
        }
        None => None,
    };

    let report = Report {
        team: &team,
        insights: evaluate_team(&team),
        member,
    };
    let rendered = serde_json::to_string_pretty(&report).context("failed to encode report")?;
    println!("{rendered}");
    Ok(())
}

fn run_viewer(args: Args, config: EngineConfig) -> Result<()> {
    info!(items = %args.items.display(), "opening viewer");
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let source = app::DataSource {
        items: args.items,
        previous: args.previous,
    };
    eframe::run_native(
        "collab-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::DashboardApp::new(
                cc,
                source,
                config,
                args.member,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
