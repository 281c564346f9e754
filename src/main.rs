use clap::{Arg, Command};
use log::LevelFilter;
use std::path::Path;
use std::process;
use std::sync::Arc;
use verifyx::analyzer::{Analyzer, InputKind};
use verifyx::ruleset::RuleSet;
use verifyx::server::{self, AppState};
use verifyx::store::ReportStore;

#[tokio::main]
async fn main() {
    let matches = Command::new("verifyx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic detector for job/payment scam text with a JSON API")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Ruleset YAML file (uses the built-in ruleset when omitted)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default ruleset to FILE and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the ruleset and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("analyze")
                .long("analyze")
                .value_name("TEXT")
                .help("Analyze TEXT and print the verdict as JSON")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Start the REST API server")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("API server port")
                .default_value("4000"),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .value_name("FILE")
                .help("SQLite database for submitted reports")
                .default_value("verifyx.db"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        match RuleSet::default().write_yaml(Path::new(path)) {
            Ok(()) => println!("Default ruleset written to {path}"),
            Err(e) => {
                eprintln!("Error writing ruleset: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let ruleset = match matches.get_one::<String>("config") {
        Some(path) => match RuleSet::load_from_file(Path::new(path)) {
            Ok(ruleset) => {
                log::info!("loaded ruleset version {} from {path}", ruleset.version);
                ruleset
            }
            Err(e) => {
                eprintln!("Error loading ruleset: {e}");
                process::exit(1);
            }
        },
        None => RuleSet::default(),
    };

    if matches.get_flag("test-config") {
        println!(
            "Ruleset OK: {} payment keywords, {} scam phrases, {} action phrases, {} suspicious TLDs",
            ruleset.payment_keywords.len(),
            ruleset.scam_phrases.len(),
            ruleset.action_phrases.len(),
            ruleset.suspicious_tlds.len()
        );
        return;
    }

    let analyzer = match Analyzer::new(ruleset) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error building analyzer: {e}");
            process::exit(1);
        }
    };

    if let Some(text) = matches.get_one::<String>("analyze") {
        let verdict = analyzer.analyze(InputKind::Text, text);
        match serde_json::to_string_pretty(&verdict) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("Error rendering verdict: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("serve") {
        let port: u16 = match matches.get_one::<String>("port").and_then(|p| p.parse().ok()) {
            Some(port) => port,
            None => {
                eprintln!("Invalid port");
                process::exit(1);
            }
        };
        let db_path = matches
            .get_one::<String>("database")
            .map(String::as_str)
            .unwrap_or("verifyx.db");
        let store = match ReportStore::open(Path::new(db_path)) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Error opening report database: {e}");
                process::exit(1);
            }
        };

        let state = Arc::new(AppState { analyzer, store });
        if let Err(e) = server::serve(state, port).await {
            eprintln!("Server error: {e}");
            process::exit(1);
        }
        return;
    }

    eprintln!("Nothing to do. Use --analyze, --serve, --generate-config or --test-config.");
    process::exit(2);
}
