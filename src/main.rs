use clap::Parser;
use scout_scan::config::Command;
use scout_scan::core::ConfigProvider;
use scout_scan::domain::model::Metric;
use scout_scan::utils::error::ErrorSeverity;
use scout_scan::utils::logger::{self, LogFormat};
use scout_scan::utils::validation::Validate;
use scout_scan::{
    CliConfig, Dashboard, HttpBackend, MatchKey, MatchRosterAggregator, RecordRemoval,
    ScanWorkflow, ScoutConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let log_format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(log_format, cli.verbose);

    tracing::info!("Starting scout-scan");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Effective config: {:?}", config);

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> scout_scan::Result<ScoutConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            ScoutConfig::from_file(path)?
        }
        None => ScoutConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(command: Command, config: &ScoutConfig) -> scout_scan::Result<()> {
    command.validate_competition()?;
    let backend = HttpBackend::new(config);

    match command {
        Command::Matches { competition } => {
            let aggregator = MatchRosterAggregator::new(backend)
                .with_policy(config.failure_policy())
                .with_concurrency(config.concurrent_requests());
            let summaries = aggregator.load(&competition).await?;

            println!("{:>6}  {:<20}  {:<20}  Scanned", "Match", "Red Alliance", "Blue Alliance");
            for summary in &summaries {
                let scanned = match &summary.count_error {
                    Some(_) => "?".to_string(),
                    None => format!("{}/6", summary.scanned_count),
                };
                println!(
                    "{:>6}  {:<20}  {:<20}  {}{}",
                    summary.key.match_number,
                    join_teams(summary.roster.red()),
                    join_teams(summary.roster.blue()),
                    scanned,
                    if summary.is_complete() { " ✅" } else { "" }
                );
            }
        }
        Command::Scan {
            competition,
            match_number,
        } => scan_loop(backend, MatchKey::new(competition, match_number)).await?,
        Command::Records {
            competition,
            match_number,
        } => {
            let mut removal = RecordRemoval::new(backend);
            let records = removal.search(&competition, match_number).await?;
            if records.is_empty() {
                println!("No records for match {}", match_number);
            }
            for record in records {
                println!(
                    "match {:>3}  team {:>5}  scouter {:<12}  speaker {:>2}  amp {:>2}  defense {}  {}",
                    record.match_number(),
                    record.team_number,
                    record.scouter_name,
                    record.teleop_speaker_notes,
                    record.teleop_amp_notes,
                    record.defense_rating,
                    record.comments
                );
            }
        }
        Command::Remove {
            competition,
            team_number,
            match_number,
        } => {
            let mut removal = RecordRemoval::new(backend);
            removal.search(&competition, match_number).await?;
            let result = removal.delete(team_number, match_number).await;
            if let Some(status) = removal.status() {
                println!("{}", status);
            }
            result?;
            println!("{} records left in match {}", removal.records().len(), match_number);
        }
        Command::Dashboard {
            competition,
            metric,
            teams,
        } => {
            let competition = competition.unwrap_or_else(|| config.default_competition().to_string());
            let metric = Metric::from(metric);
            let mut dashboard = Dashboard::new(backend);
            dashboard.load(&competition).await?;

            println!("Team Rankings ({})", metric.label());
            for team in dashboard.view(metric, &teams) {
                println!("{:>6}  {:.2}", team.team_number, team.value(metric));
            }
        }
    }

    Ok(())
}

/// Reads scan tokens from stdin. `next` moves to the following match,
/// `retry` reloads a failed match and `quit` ends the loop.
async fn scan_loop(backend: HttpBackend, key: MatchKey) -> scout_scan::Result<()> {
    let mut workflow = ScanWorkflow::new(backend);
    if workflow.start(key).await.is_ok() {
        print_match(&workflow);
    } else if let Some(status) = workflow.status() {
        println!("{}", status);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "next" => match workflow.next_match().await {
                Ok(_) => print_match(&workflow),
                Err(_) => println!("{}", workflow.status().unwrap_or_default()),
            },
            "retry" => match workflow.retry().await {
                Ok(()) => print_match(&workflow),
                Err(_) => println!("{}", workflow.status().unwrap_or_default()),
            },
            raw => {
                let outcome = workflow.submit_input(raw).await;
                let marker = if outcome.is_error() { "✗" } else { "✓" };
                println!("{} {}", marker, outcome.message());
                print_match(&workflow);
            }
        }
    }

    Ok(())
}

fn print_match<B: scout_scan::ScoutingBackend>(workflow: &ScanWorkflow<B>) {
    let Some(session) = workflow.session() else {
        return;
    };
    println!("Qualification Match {}", session.key().match_number);
    for status in session.team_status() {
        println!(
            "  {:<14} {:>6}  {}",
            status.alliance.to_string(),
            status.team_number,
            if status.scanned { "Scanned" } else { "Not Scanned" }
        );
    }
}

fn join_teams(teams: &[u32]) -> String {
    teams
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
