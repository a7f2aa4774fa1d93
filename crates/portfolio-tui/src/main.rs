use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;

use portfolio_core::{system_context, CompletionClient, Config, Conversation, InsightCache};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, TICK_RATE};

#[derive(Parser)]
#[command(name = "portfolio", version)]
#[command(about = "Terminal portfolio with an AI assistant that knows the resume")]
struct Cli {
    /// Log debug output to the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive portfolio (default)
    Tui,
    /// Ask the AI assistant one question
    Ask {
        /// Your question
        question: String,
    },
    /// Generate the AI insight for one project
    Insight {
        /// Project number as listed by `portfolio profile`
        project: usize,
    },
    /// Print the profile
    Profile {
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration, API keys masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    logging::init(cli.verbose, interactive);

    let config = Config::load()?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(config).await?,
        Commands::Ask { question } => ask(&config, &question).await?,
        Commands::Insight { project } => insight(&config, project).await?,
        Commands::Profile { json } => print_profile(&config, json)?,
        Commands::Config => print_config(&config)?,
    }

    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    let mut app = App::new(config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(config: &Config, question: &str) -> Result<()> {
    let profile = config.load_profile()?;
    let context = system_context(&profile)?;
    let client = CompletionClient::from_config(config);
    let mut conversation = Conversation::new(client.replies().greeting.clone());

    if !conversation.submit(question, &client, &context).await {
        bail!("Question is empty");
    }

    if client.is_degraded() {
        println!("{}", "(no API key configured)".yellow());
    }
    println!("{}", "You:".bold().cyan());
    println!("{}\n", question);
    println!("{}", "AI:".bold().green());
    if let Some(reply) = conversation.last() {
        println!("{}", reply.text);
    }

    Ok(())
}

async fn insight(config: &Config, project: usize) -> Result<()> {
    let profile = config.load_profile()?;
    let Some(idx) = project.checked_sub(1).filter(|&i| i < profile.projects.len()) else {
        bail!("No project {} (there are {})", project, profile.projects.len());
    };

    let client = CompletionClient::from_config(config);
    let mut insights = InsightCache::new();
    let text = insights.fetch(idx, &profile, &client).await.unwrap_or_default();

    println!("{}", profile.projects[idx].title.bold().green());
    println!("✦ {}", text.italic());
    Ok(())
}

fn print_profile(config: &Config, json: bool) -> Result<()> {
    let profile = config.load_profile()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let personal = &profile.personal;
    println!("\n{}", personal.name.bold().green());
    println!("{}", personal.title);
    println!("{}", personal.subtitle.dimmed());
    println!("{} · {}", personal.email, personal.location);

    println!("\n{}", "Education".bold().blue());
    for edu in &personal.education {
        println!("  • {} - {} {}", edu.school, edu.degree, edu.year.dimmed());
    }

    println!("\n{}", "Skills".bold().blue());
    println!("  {}", profile.skills.join(", "));

    println!("\n{}", "Projects".bold().blue());
    for (i, project) in profile.projects.iter().enumerate() {
        println!("  {}. {}", (i + 1).to_string().bold(), project.title.yellow());
        println!("     {}", project.role.dimmed());
    }

    println!("\n{}", "Awards".bold().blue());
    for award in &profile.awards {
        println!("  • {}", award);
    }

    Ok(())
}

fn print_config(config: &Config) -> Result<()> {
    println!("{}", Config::get_config_path()?.display().to_string().dimmed());
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    match config.resolve_provider() {
        Some((provider, _)) => println!(
            "Using {} with model {}",
            provider.display_name().green(),
            config.model_for(provider).bold()
        ),
        None => println!(
            "{} (degraded mode: {:?})",
            "No API key configured".yellow(),
            config.degraded
        ),
    }

    Ok(())
}
