use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = liftlog_api::Args::parse();

	liftlog_api::run(args).await
}
