use hinghwa::config::{CHAPTER_INDEX_FILE, CORPUS_FILE, OCR_INDEX_FILE};
use hinghwa::tokens::{flatten, strip_breaks};
use hinghwa::{
    Block, DataConfig, Library, LoadState, PageId, RenderMode, Script, Segment, Source, VerseBody,
};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

async fn library() -> Library {
    let config = DataConfig::in_dir(fixtures());
    Library::load(&config).await.unwrap()
}

fn verse_body(layout: &hinghwa::Layout, number: u32) -> &VerseBody {
    layout
        .blocks
        .iter()
        .find_map(|b| match b {
            Block::Verse { number: n, body, .. } if *n == number => Some(body),
            _ => None,
        })
        .unwrap()
}

fn inline(body: &VerseBody) -> &[Segment] {
    match body {
        VerseBody::Inline { segments } => segments,
        other => panic!("expected inline body, got {:?}", other),
    }
}

#[tokio::test]
async fn loads_all_three_documents() {
    let library = library().await;
    let report = library.report.as_ref().unwrap();
    assert_eq!(report.corpus.state, LoadState::Loaded);
    assert_eq!(report.ocr_index.state, LoadState::Loaded);
    assert_eq!(report.ocr_index.entries, 4);
    assert_eq!(report.chapter_index.state, LoadState::Loaded);
    assert!(library.has_page_links());
}

#[tokio::test]
async fn token_streams_match_stored_strings() {
    let library = library().await;
    for r in library.corpus.verses() {
        for script in [Script::Han, Script::Rom] {
            assert_eq!(
                flatten(&r.verse.tokens, script),
                strip_breaks(r.verse.stored(script)),
                "{} {}:{}",
                r.book.name_han,
                r.chapter.chapter,
                r.verse.verse
            );
        }
    }
    assert!(library.corpus.divergences().is_empty());
}

#[tokio::test]
async fn resolve_page_is_monotonic_per_book() {
    let library = library().await;
    for book in &library.corpus.books {
        let pages: Vec<Option<PageId>> = book
            .chapters
            .iter()
            .flat_map(|c| c.verses().map(move |v| (c.chapter, v.verse)))
            .map(|(c, v)| library.resolve_page(&book.name_han, c, v))
            .collect();
        assert!(pages.windows(2).all(|w| w[0] <= w[1]), "{}: {:?}", book.name_han, pages);
    }
}

#[tokio::test]
async fn alignment_scenarios() {
    let library = library().await;
    let page = |c, v| library.resolve_page("創世記", c, v).map(|p| p.as_str().to_string());

    assert_eq!(page(1, 2).as_deref(), Some("0005"));
    assert_eq!(page(1, 3).as_deref(), Some("0006"));
    assert_eq!(page(1, 4).as_deref(), Some("0006"));
    assert_eq!(page(2, 1).as_deref(), Some("0007"));
    assert_eq!(page(2, 2).as_deref(), Some("0008"));

    // Only the chapter table knows Matthew
    let matthew = |v| library.resolve_page("馬太福音", 1, v).map(|p| p.as_str().to_string());
    assert_eq!(matthew(1).as_deref(), Some("1178"));
    assert_eq!(matthew(3).as_deref(), Some("1179"));

    // Ruth has no index entries and fallback is off
    assert_eq!(library.resolve_page("路得記", 1, 1), None);
    assert_eq!(library.chapter_start_page("路得記", 1), None);
}

#[tokio::test]
async fn search_properties() {
    let library = library().await;
    assert!(library.search("").is_empty());
    assert!(library.search_page(" ", 10, 0).blank_query);

    let hits = library.search("neq");
    assert_eq!(hits.len(), 1);
    let span = hits[0].rom_span.unwrap();
    assert_eq!((span.offset, span.length), (0, 3));
    assert!(hits[0].han_span.is_none());

    // 上帝 occurs in 1:1 and 1:3; corpus order, repeatable
    let first = library.search("上帝");
    let verses: Vec<u32> = first.iter().map(|h| h.verse).collect();
    assert_eq!(verses, vec![1, 3]);
    assert_eq!(*first, library.search_engine.search("上帝"));

    let none = library.search_page("耶路撒冷", 10, 0);
    assert!(!none.blank_query);
    assert_eq!(none.total_hits, 0);
}

#[tokio::test]
async fn projections_reproduce_flattened_text() {
    let library = library().await;
    let chapter = library.corpus.book("創世記").unwrap().1.chapter(1).unwrap().1;

    let dual = library.render_chapter("創世記", 1, RenderMode::Dual, false);
    let rom_only = library.render_chapter("創世記", 1, RenderMode::RomOnly, false);
    let han_only = library.render_chapter("創世記", 1, RenderMode::HanOnly, false);

    for verse in chapter.verses() {
        let VerseBody::Dual { rom, han } = verse_body(&dual, verse.verse) else {
            panic!("expected dual body");
        };
        assert_eq!(hinghwa::render::segments_text(rom), verse.rom);
        assert_eq!(hinghwa::render::segments_text(han), verse.han);

        let rom_single = inline(verse_body(&rom_only, verse.verse));
        let han_single = inline(verse_body(&han_only, verse.verse));
        assert_eq!(hinghwa::render::segments_text(rom_single), verse.rom);
        assert_eq!(hinghwa::render::segments_text(han_single), verse.han);
    }
}

#[tokio::test]
async fn multi_line_verse_scenario() {
    let library = library().await;

    let ruby = library.render_chapter("創世記", 2, RenderMode::Ruby, false);
    let segments = inline(verse_body(&ruby, 1));
    assert!(matches!(&segments[0], Segment::Ruby { base, .. } if base == "我"));
    assert_eq!(segments[1], Segment::Break);
    assert!(matches!(&segments[2], Segment::Ruby { base, annotation, .. } if base == "唱" && annotation == "chiong"));
    assert_eq!(segments[3], Segment::Break);
    assert_eq!(segments.len(), 4);

    let rom = library.render_chapter("創世記", 2, RenderMode::RomOnly, false);
    let segments = inline(verse_body(&rom, 1));
    assert_eq!(segments.iter().filter(|s| **s == Segment::Break).count(), 1);
    assert!(!segments.contains(&Segment::Separator));
}

#[tokio::test]
async fn missing_page_indexes_still_render_and_search() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixtures().join(CORPUS_FILE), dir.path().join(CORPUS_FILE)).unwrap();
    let mut config = DataConfig::in_dir(dir.path().to_path_buf());
    config.chapter_index = Source::Path(fixtures().join(CHAPTER_INDEX_FILE));
    config.ocr_index = Source::Path(dir.path().join(OCR_INDEX_FILE));

    let library = Library::load(&config).await.unwrap();
    let report = library.report.as_ref().unwrap();
    assert_eq!(report.ocr_index.state, LoadState::Failed);
    assert_eq!(report.chapter_index.state, LoadState::Loaded);

    assert_eq!(library.resolve_page("創世記", 1, 1), None);
    assert_eq!(library.search("gong").len(), 1);
    let layout = library.render_chapter("創世記", 1, RenderMode::HanOnly, false);
    assert!(layout.blocks.iter().all(|b| matches!(b, Block::Verse { page: None, .. })));
}
