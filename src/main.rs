use clap::Parser;
use record_desk_rust::configs::logging::set_global_logging_config;
use record_desk_rust::configs::{load_config, load_dotenv};
use record_desk_rust::shell::Console;
use record_desk_rust::{run_desk, Settings, Variant};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

/// Record desk - interactive record keeping for students and library books
#[derive(Parser, Debug)]
#[command(name = "record-desk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Which records to manage
    #[arg(value_enum)]
    variant: Variant,

    /// Snapshot file (default depends on the variant)
    #[arg(short = 'd', long = "data")]
    data: Option<String>,

    /// Report file written by the export command
    #[arg(short = 'e', long = "export")]
    export: Option<String>,

    /// Loan period in days for library checkouts
    #[arg(long = "loan-days", value_parser = clap::value_parser!(u32).range(1..))]
    loan_days: Option<u32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    load_dotenv();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let _guard = match set_global_logging_config(config.logger()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let settings = Settings {
        variant: cli.variant,
        data_path: cli.data
            .or_else(|| config.store().path().map(str::to_owned))
            .unwrap_or_else(|| cli.variant.default_snapshot_path().to_owned()),
        export_path: cli.export
            .or_else(|| config.store().export_path().map(str::to_owned))
            .unwrap_or_else(|| cli.variant.default_export_path().to_owned()),
        loan_days: cli.loan_days.unwrap_or(config.loan().days()),
    };
    info!(variant = %settings.variant, data = %settings.data_path, loan_days = settings.loan_days, "프로그램을 시작합니다.");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let mut console = Console::new(&mut input, &mut output);

    match run_desk(&settings, &mut console) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "프로그램이 비정상 종료 되었습니다.");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
