use anyhow::Context;
use perpkeeper::{
    arguments::{
        get_config_path, get_job_name, get_output_override, patterns, print_debug_info, print_help,
    },
    config::{load_config_from_path, ResultEncoding},
    keeper::{output_encoding, run_job, JobKind},
    logger::{self, LogTag},
};

/// One keeper invocation: price + candidates -> decisions -> actions.
///
/// The encoded result is the only thing written to stdout. Exit codes:
/// 0 success, 1 run failure, 2 usage error.
#[tokio::main]
async fn main() {
    logger::init();

    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    print_debug_info();

    let kind = match get_job_name().map(|name| name.parse::<JobKind>()) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => usage_error(&e),
        None => usage_error("missing --job <close-positions|execute-orders>"),
    };

    let encoding_override = match get_output_override().map(|v| v.parse::<ResultEncoding>()) {
        Some(Ok(encoding)) => Some(encoding),
        Some(Err(e)) => usage_error(&e),
        None => None,
    };

    let code = match run(kind, encoding_override).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            logger::error(LogTag::System, &format!("❌ Run failed: {:#}", e));
            1
        }
    };

    logger::flush();
    std::process::exit(code);
}

async fn run(kind: JobKind, encoding_override: Option<ResultEncoding>) -> anyhow::Result<String> {
    let config_path = get_config_path();
    let config = load_config_from_path(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    let encoding = encoding_override.unwrap_or_else(|| output_encoding(&config, kind));
    logger::info(
        LogTag::System,
        &format!("🚀 Starting {} (output: {})", kind, encoding),
    );

    let report = run_job(&config, kind)
        .await
        .with_context(|| format!("{} run aborted", kind))?;

    Ok(report.result().render(encoding))
}

fn usage_error(message: &str) -> ! {
    logger::error(LogTag::System, message);
    eprintln!("Run with --help for usage.");
    logger::flush();
    std::process::exit(2);
}
