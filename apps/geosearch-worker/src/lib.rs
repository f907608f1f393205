pub mod feeds;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use geosearch_service::{ExpandRequest, SearchService};
use geosearch_storage::db::Db;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Load or update terminology from a JSON feed and rebuild the
	/// in-memory dictionary.
	LoadMesh {
		#[arg(value_name = "FILE")]
		feed: PathBuf,
	},
	/// Load or update catalog records from a JSON feed.
	LoadRecords {
		#[arg(value_name = "FILE")]
		feed: PathBuf,
	},
	/// Tag untagged records with terminology. With --force, retag the
	/// whole catalog.
	TagAll {
		#[arg(long)]
		force: bool,
		/// Override the confidence threshold for this pass.
		#[arg(long, value_name = "SCORE")]
		threshold: Option<f32>,
	},
	/// Retag a single record.
	Tag {
		#[arg(value_name = "ACCESSION")]
		accession: String,
	},
	/// Print the expansion hybrid search would use for a query.
	Expand {
		#[arg(value_name = "QUERY")]
		query: String,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = geosearch_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = SearchService::new(config, db);

	match args.command {
		Command::LoadMesh { feed } => {
			let terms = feeds::read_mesh_feed(&feed)?;
			let written = service.backends.store.upsert_mesh_terms(&terms).await?;
			let loaded = service.refresh_dictionary().await?;

			info!(written, loaded, "Terminology feed applied.");
		},
		Command::LoadRecords { feed } => {
			let records = feeds::read_record_feed(&feed)?;
			let written = service.backends.store.upsert_records(&records).await?;

			info!(written, "Record feed applied.");
		},
		Command::TagAll { force, threshold } => {
			service.refresh_dictionary().await?;

			let report = service.tag_all_records(force, threshold).await?;

			info!(
				records_tagged = report.records_tagged,
				associations_written = report.associations_written,
				records_skipped = report.records_skipped,
				"Tagging complete."
			);
		},
		Command::Tag { accession } => {
			service.refresh_dictionary().await?;

			let written = service.tag_record(&accession).await?;

			info!(accession = accession.as_str(), written, "Record tagged.");
		},
		Command::Expand { query } => {
			service.refresh_dictionary().await?;

			let response = service.expand_query(ExpandRequest { query })?;

			println!("{}", serde_json::to_string_pretty(&response.expansion)?);
		},
	}

	Ok(())
}
