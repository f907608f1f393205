use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	geosearch_worker::run(geosearch_worker::Args::parse()).await
}
