use anyhow::Result;
use mahasiswa_sync::harness::ModuleRunner;
use mahasiswa_sync::library::communication::implementation::kafka::KafkaCommunicationFactory;
use mahasiswa_sync::module::producer::{Emitter, Producer};
use mahasiswa_sync::module::replicator::Replicator;
use options::{Command, LogFormat};
use structopt::StructOpt;
use tracing::info;

mod options;

#[tokio::main]
async fn main() -> Result<()> {
    let (command, runner) = init()?;

    let termination_reason = match command {
        Command::Consume(options) => {
            let factory =
                KafkaCommunicationFactory::new(&options.broker.brokers, &options.group.group_id);
            runner.run(Replicator::new(options, factory)).await
        }
        Command::Produce(options) => {
            let factory =
                KafkaCommunicationFactory::new(&options.broker.brokers, &options.producer.app_name)
                    .with_delivery_timeout(options.producer.delivery_timeout);
            runner.run(Producer::new(options, factory)).await
        }
        Command::Emit(options) => {
            let factory =
                KafkaCommunicationFactory::new(&options.broker.brokers, &options.producer.app_name)
                    .with_delivery_timeout(options.producer.delivery_timeout);
            runner.run(Emitter::new(options, factory)).await
        }
    };

    info!(reason = %termination_reason, "Terminated");
    std::process::exit(termination_reason.exit_code());
}

fn init() -> Result<(Command, ModuleRunner)> {
    let options = options::MainOptions::from_args();

    let formatter = tracing_subscriber::fmt().with_env_filter(options.log);

    match options.log_format {
        LogFormat::Text => formatter.try_init(),
        LogFormat::Compact => formatter.compact().try_init(),
        LogFormat::Json => formatter.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!(e))?;

    info!("mahasiswa-sync {}", env!("CARGO_PKG_VERSION"));

    Ok((options.command, ModuleRunner::default()))
}
