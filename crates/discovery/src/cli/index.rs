use clap::{Args, Subcommand};
use storefront_discovery::{
    context::AppContext,
    domain::{
        catalog::models::ProductId,
        search::sync::{SchemaStatus, SyncAction},
    },
};

#[derive(Debug, Args)]
pub(crate) struct IndexCommand {
    #[command(subcommand)]
    command: IndexSubcommand,
}

#[derive(Debug, Subcommand)]
enum IndexSubcommand {
    /// Create the product index and its mappings if missing
    EnsureSchema,
    /// Re-project every active product into the index
    Resync,
    /// Re-project one product, removing it when no longer active
    Upsert(ProductArgs),
    /// Remove one product's document
    Delete(ProductArgs),
    /// Report the number of indexed documents
    Status,
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Product identifier
    #[arg(long)]
    product_id: i64,
}

pub(crate) async fn run(ctx: &AppContext, command: IndexCommand) -> Result<(), String> {
    let sync = &ctx.index_sync;

    match command.command {
        IndexSubcommand::EnsureSchema => {
            let status = sync
                .ensure_schema()
                .await
                .map_err(|error| format!("failed to ensure index schema: {error}"))?;

            match status {
                SchemaStatus::Created => println!("index created"),
                SchemaStatus::AlreadyExists => println!("index already exists"),
            }
        }
        IndexSubcommand::Resync => {
            let report = sync
                .resync_all()
                .await
                .map_err(|error| format!("failed to resync index: {error}"))?;

            println!("products: {}", report.total);
            println!("indexed: {}", report.indexed);
            println!("failed: {}", report.failed.len());
            println!("removed: {}", report.removed);

            for failure in report.failed {
                println!("  {}: {}", failure.product_id, failure.reason);
            }
        }
        IndexSubcommand::Upsert(args) => {
            let action = sync
                .upsert_one(ProductId::from_i64(args.product_id))
                .await
                .map_err(|error| format!("failed to upsert product: {error}"))?;

            match action {
                SyncAction::Indexed => println!("product {} indexed", args.product_id),
                SyncAction::Deleted => println!("product {} removed", args.product_id),
            }
        }
        IndexSubcommand::Delete(args) => {
            let removed = sync
                .delete_one(ProductId::from_i64(args.product_id))
                .await
                .map_err(|error| format!("failed to delete product: {error}"))?;

            if removed {
                println!("product {} removed", args.product_id);
            } else {
                println!("product {} was not indexed", args.product_id);
            }
        }
        IndexSubcommand::Status => {
            let documents = sync
                .document_count()
                .await
                .map_err(|error| format!("failed to count documents: {error}"))?;

            println!("documents: {documents}");
        }
    }

    Ok(())
}
