use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = trellis_api::Args::parse();

	trellis_api::run(args).await
}
