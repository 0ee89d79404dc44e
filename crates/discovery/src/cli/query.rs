use clap::Args;
use jiff::Timestamp;
use rust_decimal::Decimal;
use storefront_discovery::{
    context::AppContext,
    domain::{
        catalog::models::{CategoryId, ProductId},
        search::query::{SearchRequest, SortDirection, SortField, SuggestRequest},
        views::models::UserId,
    },
    envelope::Envelope,
};

use super::print_json;

#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    /// Search text
    query: String,

    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    page_size: Option<u32>,

    #[arg(long)]
    category_id: Option<i64>,

    #[arg(long)]
    min_price: Option<Decimal>,

    #[arg(long)]
    max_price: Option<Decimal>,

    #[arg(long)]
    min_rating: Option<Decimal>,

    /// in_stock, out_of_stock or discontinued
    #[arg(long)]
    status: Option<String>,

    /// relevance, name, price, createdAt, views, rating or discount
    #[arg(long)]
    sort: Option<SortField>,

    /// asc or desc
    #[arg(long)]
    direction: Option<SortDirection>,
}

#[derive(Debug, Args)]
pub(crate) struct SuggestArgs {
    /// Partial product name
    query: String,

    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
pub(crate) struct SimilarArgs {
    #[arg(long)]
    product_id: i64,

    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
pub(crate) struct StatsArgs {
    /// Restrict statistics to one user; all views when omitted
    #[arg(long)]
    user_id: Option<i64>,

    /// Window length in days
    #[arg(long)]
    days: Option<u32>,
}

pub(crate) async fn search(ctx: &AppContext, args: SearchArgs) -> Result<(), String> {
    let request = SearchRequest {
        query: args.query,
        page: args.page,
        page_size: args.page_size,
        category_id: args.category_id.map(CategoryId::from_i64),
        min_price: args.min_price,
        max_price: args.max_price,
        min_rating: args.min_rating,
        status: args.status,
        sort: args.sort,
        direction: args.direction,
    };

    print_json(&Envelope::from_result(ctx.search.search(request).await))
}

pub(crate) async fn suggest(ctx: &AppContext, args: SuggestArgs) -> Result<(), String> {
    let request = SuggestRequest {
        query: args.query,
        limit: args.limit,
    };

    print_json(&Envelope::from_result(ctx.search.suggest(request).await))
}

pub(crate) async fn similar(ctx: &AppContext, args: SimilarArgs) -> Result<(), String> {
    let result = ctx
        .recommendations
        .similar_products(ProductId::from_i64(args.product_id), args.limit)
        .await;

    print_json(&Envelope::from_result(result))
}

pub(crate) async fn stats(ctx: &AppContext, args: StatsArgs) -> Result<(), String> {
    let now = Timestamp::now();

    let result = match args.user_id {
        Some(user) => {
            ctx.views
                .user_stats(UserId::from_i64(user), args.days, now)
                .await
        }
        None => ctx.views.global_stats(args.days, now).await,
    };

    print_json(&Envelope::from_result(result))
}
