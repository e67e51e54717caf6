use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use vulkanseeds::catalog::{CatalogClient, CatalogHttpClient};
use vulkanseeds::config::{ConfigLoader, ResolvedConfig};
use vulkanseeds::controller::ViewController;
use vulkanseeds::detail::SystemClipboard;
use vulkanseeds::domain::{SeedId, SortMode, Theme};
use vulkanseeds::error::SeedsError;
use vulkanseeds::list::ListView;
use vulkanseeds::output::{JsonOutput, ListResult, OutputMode, ShowResult, ThemeResult};
use vulkanseeds::publish::copy_static_files;
use vulkanseeds::seo::{HtmlHead, seed_descriptor, site_default_descriptor, sync_head};
use vulkanseeds::theme::{FileThemeStore, ThemeStore, load_or_default};
use vulkanseeds::tui::Tui;

#[derive(Parser)]
#[command(name = "vulkanseeds")]
#[command(about = "Browse, search and copy Minecraft seeds from the VulkanSeeds catalog")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List seeds as JSON")]
    List(ListArgs),
    #[command(about = "Open a seed: records a view and prints it with its page head")]
    Show(ShowArgs),
    #[command(about = "Print the page head for the site or for one seed")]
    Head(HeadArgs),
    #[command(about = "Show or change the saved color theme")]
    Theme(ThemeArgs),
    #[command(about = "Copy static root files into the publish directory")]
    Publish(PublishArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, value_enum, default_value_t = SortMode::Popular)]
    sort: SortMode,

    #[arg(long, default_value = "")]
    query: String,
}

#[derive(Args)]
struct ShowArgs {
    id: String,
}

#[derive(Args)]
struct HeadArgs {
    id: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

#[derive(Args)]
struct ThemeArgs {
    #[arg(value_enum)]
    action: Option<ThemeAction>,
}

#[derive(Args)]
struct PublishArgs {
    #[arg(long, default_value = ".")]
    source: Utf8PathBuf,

    #[arg(long, default_value = "dist")]
    out: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<SeedsError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SeedsError) -> u8 {
    match error {
        SeedsError::SeedNotFound(_) => 2,
        SeedsError::MissingConfig => 2,
        err if err.is_transport() => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::List(args)) => run_list(args, config_path),
        Some(Commands::Show(args)) => run_show(args, config_path),
        Some(Commands::Head(args)) => run_head(args, config_path),
        Some(Commands::Theme(args)) => run_theme(args),
        Some(Commands::Publish(args)) => run_publish(args, config_path),
        None => match output_mode {
            OutputMode::Interactive => run_tui(config_path),
            OutputMode::NonInteractive => Err(miette::Report::msg(
                "command required (try `vulkanseeds --help`)",
            )),
        },
    }
}

fn run_tui(config_path: Option<&str>) -> miette::Result<()> {
    let config = ConfigLoader::resolve(config_path)?;
    let client = CatalogHttpClient::new(&config)?;
    let themes = FileThemeStore::new()?;
    let mut controller =
        ViewController::new(HtmlHead::new(), themes, &config.site_url, config.reconcile);
    controller.mount();
    let mut tui = Tui::new(controller, client, Box::new(SystemClipboard::new()));
    tui.run()
}

fn run_list(args: ListArgs, config_path: Option<&str>) -> miette::Result<()> {
    let config = ConfigLoader::resolve(config_path)?;
    let client = CatalogHttpClient::new(&config)?;

    let mut list = ListView::new(args.sort);
    let ticket = list.begin_fetch();
    let records = client.fetch_all(args.sort, true)?;
    list.finish_fetch(ticket, Ok(records));
    list.set_query(&args.query);

    let seeds = list.visible();
    JsonOutput::print_list(&ListResult {
        sort: list.sort_mode(),
        query: list.query(),
        count: seeds.len(),
        seeds,
    })
    .into_diagnostic()
}

fn run_show(args: ShowArgs, config_path: Option<&str>) -> miette::Result<()> {
    let config = ConfigLoader::resolve(config_path)?;
    let client = CatalogHttpClient::new(&config)?;
    let id: SeedId = args.id.parse()?;
    let seed = client
        .fetch_all(SortMode::Popular, true)?
        .into_iter()
        .find(|seed| seed.id == id)
        .ok_or_else(|| SeedsError::SeedNotFound(id.to_string()))?;

    let themes = FileThemeStore::new()?;
    let mut controller =
        ViewController::new(HtmlHead::new(), themes, &config.site_url, config.reconcile);
    controller.select(&seed);
    controller.run_effects(&client);

    let Some(detail) = controller.detail() else {
        return Err(miette::Report::msg("seed detail not open"));
    };
    JsonOutput::print_show(&ShowResult::new(detail, controller.head())).into_diagnostic()
}

fn run_head(args: HeadArgs, config_path: Option<&str>) -> miette::Result<()> {
    let config = ConfigLoader::resolve(config_path)?;
    let mut head = HtmlHead::new();
    sync_head(&mut head, &site_default_descriptor(&config.site_url));

    if let Some(raw) = args.id {
        let id: SeedId = raw.parse()?;
        let client = CatalogHttpClient::new(&config)?;
        let seed = client
            .fetch_all(SortMode::Popular, true)?
            .into_iter()
            .find(|seed| seed.id == id)
            .ok_or_else(|| SeedsError::SeedNotFound(id.to_string()))?;
        sync_head(&mut head, &seed_descriptor(&seed, &config.site_url));
    }

    println!("{}", head.render());
    Ok(())
}

fn run_theme(args: ThemeArgs) -> miette::Result<()> {
    let themes = FileThemeStore::new()?;
    let current = load_or_default(&themes);
    let theme = match args.action {
        None => current,
        Some(ThemeAction::Light) => Theme::Light,
        Some(ThemeAction::Dark) => Theme::Dark,
        Some(ThemeAction::Toggle) => current.toggled(),
    };
    if args.action.is_some() {
        themes.save(theme)?;
    }
    JsonOutput::print_theme(&ThemeResult { theme }).into_diagnostic()
}

fn run_publish(args: PublishArgs, config_path: Option<&str>) -> miette::Result<()> {
    let files = resolve_static_files(config_path)?;
    let result = copy_static_files(&args.source, &args.out, &files)?;
    JsonOutput::print_publish(&result).into_diagnostic()
}

fn resolve_static_files(config_path: Option<&str>) -> miette::Result<Vec<String>> {
    match ConfigLoader::resolve(config_path) {
        Ok(ResolvedConfig { static_files, .. }) => Ok(static_files),
        Err(SeedsError::MissingConfig) => Ok(vulkanseeds::config::default_static_files()),
        Err(err) => Err(err.into()),
    }
}
