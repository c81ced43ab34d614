use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hinghwa::catalog::{self, BookInfo};
use hinghwa::{
    DataConfig, HinghwaError, Layout, Library, LoadReport, PageId, RenderMode, SearchResults,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

type ApiError = (StatusCode, Json<ErrorResponse>);

// === Request/Response types ===

#[derive(Deserialize)]
struct ChapterQuery {
    book: String,
    chapter: u32,
    mode: Option<RenderMode>,
    foreword: Option<bool>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Deserialize)]
struct ResolveQuery {
    book: String,
    chapter: u32,
    verse: Option<u32>,
}

#[derive(Deserialize)]
struct NeighborsQuery {
    page: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    books: usize,
    chapters: usize,
    verses: usize,
    ocr_index: bool,
    chapter_index: bool,
    load_report: Option<LoadReport>,
}

#[derive(Serialize)]
struct BookSummary {
    name_han: String,
    name_rom: String,
    name_eng: String,
    first_page: Option<u32>,
    chapters: Vec<u32>,
}

#[derive(Serialize)]
struct ChapterResponse {
    book: String,
    chapter: u32,
    title_han: String,
    title_rom: String,
    start_page: Option<PageId>,
    layout: Layout,
}

#[derive(Serialize)]
struct ResolveResponse {
    page: Option<PageId>,
}

#[derive(Serialize)]
struct NeighborsResponse {
    page: PageId,
    prev: Option<PageId>,
    next: Option<PageId>,
    book: Option<BookInfo>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn api_error(status: StatusCode, err: HinghwaError) -> ApiError {
    (status, Json(ErrorResponse { error: err.to_string() }))
}

// === Handlers ===

async fn health(State(library): State<Arc<Library>>) -> Json<HealthResponse> {
    let stats = library.corpus.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        books: stats.books,
        chapters: stats.chapters,
        verses: stats.verses,
        ocr_index: library.ocr_index.is_some(),
        chapter_index: library.chapter_index.is_some(),
        load_report: library.report.clone(),
    })
}

async fn get_books(State(library): State<Arc<Library>>) -> Json<Vec<BookSummary>> {
    let books = library
        .corpus
        .books
        .iter()
        .map(|book| {
            let info = catalog::book_by_han(&book.name_han);
            let name_eng = match (book.name_eng.is_empty(), info) {
                (true, Some(info)) => info.name_eng.to_string(),
                _ => book.name_eng.clone(),
            };
            BookSummary {
                name_han: book.name_han.clone(),
                name_rom: book.name_rom.clone(),
                name_eng,
                first_page: info.map(|i| i.first_page),
                chapters: book.chapters.iter().map(|c| c.chapter).collect(),
            }
        })
        .collect();
    Json(books)
}

async fn get_chapter(
    State(library): State<Arc<Library>>,
    Query(params): Query<ChapterQuery>,
) -> Result<Json<ChapterResponse>, ApiError> {
    let (_, chapter) = library
        .corpus
        .book(&params.book)
        .and_then(|(_, book)| book.chapter(params.chapter))
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                HinghwaError::NotFound(format!("{} {}", params.book, params.chapter)),
            )
        })?;

    let mode = params.mode.unwrap_or_default();
    let foreword = params.foreword.unwrap_or(false);
    Ok(Json(ChapterResponse {
        book: params.book.clone(),
        chapter: chapter.chapter,
        title_han: chapter.chapter_title_han.clone(),
        title_rom: chapter.chapter_title_rom.clone(),
        start_page: library.chapter_start_page(&params.book, params.chapter),
        layout: library.render_chapter(&params.book, params.chapter, mode, foreword),
    }))
}

async fn search(
    State(library): State<Arc<Library>>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResults> {
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);
    Json(library.search_page(&params.q, limit, offset))
}

async fn resolve_page(
    State(library): State<Arc<Library>>,
    Query(params): Query<ResolveQuery>,
) -> Json<ResolveResponse> {
    let page = match params.verse {
        Some(verse) => library.resolve_page(&params.book, params.chapter, verse),
        None => library.chapter_start_page(&params.book, params.chapter),
    };
    Json(ResolveResponse { page })
}

async fn page_neighbors(Query(params): Query<NeighborsQuery>) -> Result<Json<NeighborsResponse>, ApiError> {
    let page = PageId::parse(&params.page).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            HinghwaError::Other(format!("invalid page id: {}", params.page)),
        )
    })?;
    Ok(Json(NeighborsResponse {
        prev: page.prev(),
        next: page.next(),
        book: catalog::book_for_page(page.number()).copied(),
        page,
    }))
}

fn app(library: Arc<Library>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/books", get(get_books))
        .route("/chapter", get(get_chapter))
        .route("/search", get(search))
        .route("/page/resolve", get(resolve_page))
        .route("/page/neighbors", get(page_neighbors))
        .layer(cors)
        .with_state(library)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = DataConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "Loading library");
    let library = Arc::new(Library::load(&config).await?);

    let addr = std::env::var("HINGHWA_API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app(library)).await?;

    Ok(())
}
