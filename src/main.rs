use std::process::ExitCode;

use gtrans::cli::CliArgs;
use gtrans::mt::{MarkerStrategy, MockMode, MockTranslator};
use gtrans::{Config, MachineTranslator, MtResult, Query, logging};
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    let _log = logging::init(args.debug);

    match run(args).await {
        Ok(translated) => {
            println!("{}", translated);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> MtResult<String> {
    let mut config = Config::load(args.config.as_deref())?;
    if args.numbered_markers {
        config.masking.numbered = true;
    }
    let pipeline = config.pipeline()?;
    let query = Query::new(args.query, args.source, args.target);

    debug!(
        source = %query.source,
        target = %query.target,
        numbered = matches!(pipeline.strategy(), MarkerStrategy::Numbered),
        "translating"
    );

    let translator: Box<dyn MachineTranslator> = if args.dry_run {
        Box::new(MockTranslator::new(MockMode::NoOp))
    } else {
        Box::new(config.google_provider()?)
    };

    pipeline.run(translator.as_ref(), &query).await
}
