use std::path::PathBuf;
use std::process::ExitCode;

use actionable::{ConnectionConfig, ExpressionPolicy, FileRuleStore};
use clap::Parser;

/// Run a rule's test pipeline and then its success or failed pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the rule to run (a file stem inside the rules directory)
    rule: String,

    /// User identifier substituted for #userId# in every expression
    user_id: String,

    /// Connection config file (JSON)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory holding <rule>.json files
    #[arg(short, long, default_value = "actions")]
    rules_dir: PathBuf,

    /// Fail on expressions that are not JSON objects instead of running them as empty stages
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let policy = if args.strict {
        ExpressionPolicy::Strict
    } else {
        ExpressionPolicy::Lenient
    };

    let result = ConnectionConfig::from_file(&args.config).and_then(|config| {
        let store = FileRuleStore::new(&args.rules_dir);
        actionable::run(&config, &store, &args.rule, &args.user_id, policy)
    });

    match result {
        Ok(outcome) => {
            println!(
                "Rule '{}' ran the {} branch: {} document(s)",
                args.rule,
                outcome.branch,
                outcome.results.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Rule '{}' failed: {}", args.rule, e);
            ExitCode::FAILURE
        }
    }
}
