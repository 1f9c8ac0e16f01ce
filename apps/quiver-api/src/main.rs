use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = quiver_api::Args::parse();
	quiver_api::run(args).await
}
