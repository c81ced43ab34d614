//! Canonical book list of the Hinghwa Bible scan, and chapter title helpers

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookInfo {
    pub name_rom: &'static str,
    pub name_han: &'static str,
    pub name_eng: &'static str,
    /// First scanned page of the book
    pub first_page: u32,
}

const fn book(
    name_rom: &'static str,
    name_han: &'static str,
    name_eng: &'static str,
    first_page: u32,
) -> BookInfo {
    BookInfo { name_rom, name_han, name_eng, first_page }
}

/// Old Testament then New Testament, in scan order
pub const BOOKS: [BookInfo; 66] = [
    book("Cho̤̍ng-sa̤-gi̍", "創世記", "Genesis", 9),
    book("Cheoh-Ai-gi̍h", "出伊及", "Exodus", 72),
    book("Lī-bī Gi̍", "利未記", "Leviticus", 124),
    book("Míng-so̍ Gi̍", "民數記", "Numbers", 161),
    book("Sing-mīng Gi̍", "申命記", "Deuteronomy", 214),
    book("Io̤h-sṳ-a̍ Cṳ", "約書亞書", "Joshua", 262),
    book("Seō-seo Gi̍", "士師記", "Judges", 294),
    book("Lō-deh Gi̍", "路得記", "Ruth", 327),
    book("Sah-bâ̤u-cî Céng-cṳ", "撒母耳前書", "1 Samuel", 332),
    book("Sah-bâ̤u-cî Hā̤u-cṳ", "撒母耳後書", "2 Samuel", 375),
    book("Le̍h-ó̤ng Siō̤ng-ge̤̍ng", "列王上卷", "1 Kings", 412),
    book("Le̍h-ó̤ng Hā-ge̤̍ng", "列王下卷", "2 Kings", 454),
    book("Le̍h-dāi Siō̤ng-ge̤̍ng", "歷代上卷", "1 Chronicles", 494),
    book("Le̍h-dāi Hā-ge̤̍ng", "歷代下卷", "2 Chronicles", 534),
    book("Î-seō-la̍h Cṳ", "以斯拉書", "Ezra", 580),
    book("Ní-hi-bî Gi̍", "尼希米記", "Nehemiah", 593),
    book("Î-seō-tiah Cṳ", "以斯帖書", "Esther", 612),
    book("Io̤h-beh Gi̍", "約伯記", "Job", 622),
    book("Si-peng", "詩篇", "Psalms", 669),
    book("Cing-ngé̤ng", "箴言", "Proverbs", 786),
    book("Dé̤ng-dō̤ Cṳ", "傳道書", "Ecclesiastes", 826),
    book("Sê̤-ló̤-meóng Ē Ngâ-go̤", "所羅門兮雅歌", "Song of Solomon", 837),
    book("Î-se̤̍-a̍ Cṳ", "以賽亞書", "Isaiah", 845),
    book("Á̤-lī-bî Cṳ", "耶利米書", "Jeremiah", 914),
    book("Á̤-lī-bî Ai-go̤ Cṳ", "耶利米哀歌書", "Lamentations", 989),
    book("Î-sa̤-geh Cṳ", "以西結書", "Ezekiel", 998),
    book("Dāng-î-lî Cṳ", "但以理書", "Daniel", 1063),
    book("Hó̤-sa̤ Cṳ", "何西書", "Hosea", 1083),
    book("Io̤h-cî Cṳ", "約珥書", "Joel", 1094),
    book("A̍-mó̤-seo Cṳ", "亞摩斯書", "Amos", 1098),
    book("O̤-ba-dâ̤ Cṳ", "阿巴底書", "Obadiah", 1107),
    book("Io̤h-ná Cṳ", "約拿書", "Jonah", 1109),
    book("Bî-gia Cṳ", "彌迦書", "Micah", 1112),
    book("Ná-o̤ng Cṳ", "那翁書", "Nahum", 1119),
    book("Ha̍h-ba-go̤h Cṳ", "哈巴谷書", "Habakkuk", 1122),
    book("Sa̤-huang-ngâ Cṳ", "西番雅書", "Zephaniah", 1126),
    book("Ha̍h-gi Cṳ", "哈基書", "Haggai", 1130),
    book("Sah-ga-lī-a̍ Cṳ", "撒迦利亞書", "Zechariah", 1133),
    book("Mâ-la̍h-gi Cṳ", "瑪拉基書", "Malachi", 1145),
    book("Mâ-ta̍i", "馬太", "Gospel of Matthew", 1153),
    book("Mâ-kô̤", "馬可", "Gospel of Mark", 1193),
    book("Lō-ga", "路加", "Gospel of Luke", 1218),
    book("Io̤h-hāng", "約翰", "Gospel of John", 1261),
    book("Seo̍-dó Hēng-dē̤ng", "使徒行傳", "Acts of the Apostles", 1294),
    book("Bô̤-ló̤ Gio̤̍ Ló̤-mâ Náng Cṳ", "保羅寄羅馬儂書", "Romans", 1336),
    book("Bô̤-ló̤ Gio̤̍ Go̤-líng-do̤ Céng-cṳ", "保羅寄哥林多前書", "1 Corinthians", 1355),
    book("Bô̤-ló̤ Gio̤̍ Go̤-líng-do̤ Hā̤u-cṳ", "保羅寄哥林多後書", "2 Corinthians", 1374),
    book("Bô̤-ló̤ Gio̤̍ Ga-la̍h-ta̍i Cṳ", "保羅寄加拉太書", "Galatians", 1386),
    book("Bô̤-ló̤ Gio̤̍ Î-heo̍h-sê̤ Cṳ", "保羅寄以弗所書", "Ephesians", 1392),
    book("Bô̤-ló̤ Gio̤̍ Hi-li̍h-bî Náng Cṳ", "保羅寄腓立比儂書", "Philippians", 1398),
    book("Bô̤-ló̤ Gio̤̍ Go̤-ló̤-sa̤ Náng Cṳ", "保羅寄歌羅西儂書", "Colossians", 1403),
    book("Bô̤-ló̤ Gio̤̍ Tiah-sah-ló̤-ní-gia Náng Céng-cṳ", "保羅寄帖撒羅尼迦儂前書", "1 Thessalonians", 1408),
    book("Bô̤-ló̤ Gio̤̍ Tiah-sah-ló̤-ní-gia Náng Hā̤u-cṳ", "保羅寄帖撒羅尼迦儂後書", "2 Thessalonians", 1412),
    book("Bô̤-ló̤ Gio̤̍ Dá̤-mó̤-ta̍i Céng-cṳ", "保羅寄提摩太前書", "1 Timothy", 1415),
    book("Bô̤-ló̤ Gio̤̍ Dá̤-mó̤-ta̍i Hā̤u-cṳ", "保羅寄提摩太後書", "2 Timothy", 1420),
    book("Bô̤-ló̤ Gio̤̍ Dá̤-do̤ Cṳ", "保羅寄提多書", "Titus", 1424),
    book("Bô̤-ló̤ Gio̤̍ Hi-lī-meóng Cṳ", "保羅寄腓利門書", "Philemon", 1427),
    book("Hi-beh-lái Náng Cṳ", "希伯來儂書", "Hebrews", 1428),
    book("Seo̍-dó Ngâ-go̤h Cṳ", "使徒雅各書", "James", 1442),
    book("Bî-deh Céng-cṳ", "彼得前書", "1 Peter", 1447),
    book("Bî-deh Hā̤u-cṳ", "彼得後書", "2 Peter", 1453),
    book("Io̤h-hāng Ih Cṳ", "約翰一書", "1 John", 1456),
    book("Io̤h-hāng Cī Cṳ", "約翰二書", "2 John", 1461),
    book("Iók-hâng So̤ⁿ Cṳ", "約翰三書", "3 John", 1462),
    book("Seo̍-dó Iú-dāi Cṳ", "使徒猶大書", "Jude", 1463),
    book("Seo̍-dó Io̤h-hāng Be̍h-sī-le̤̍h", "使徒約翰默示錄", "Revelation", 1465),
];

pub fn book_by_han(name_han: &str) -> Option<&'static BookInfo> {
    BOOKS.iter().find(|b| b.name_han == name_han)
}

pub fn book_by_rom(name_rom: &str) -> Option<&'static BookInfo> {
    BOOKS.iter().find(|b| b.name_rom == name_rom)
}

/// Book whose scan starts at the greatest first page <= `page`.
/// Pages before Genesis are front matter and belong to no book.
pub fn book_for_page(page: u32) -> Option<&'static BookInfo> {
    BOOKS.iter().take_while(|b| b.first_page <= page).last()
}

/// Han chapter title, e.g. `第二十三章`
pub fn chapter_title_han(chapter: u32) -> String {
    format!("第{}章", number_to_chinese(chapter))
}

/// Romanized chapter title, e.g. `Dā̤ 23 Ca̤uⁿ`
pub fn chapter_title_rom(chapter: u32) -> String {
    format!("Dā̤ {} Ca̤uⁿ", chapter)
}

/// Chinese numeral for `n`; Arabic digits from 1000 up.
pub fn number_to_chinese(n: u32) -> String {
    const DIGITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
    let digit = |d: u32| DIGITS[d as usize];

    match n {
        0 => "零".to_string(),
        1..=9 => digit(n).to_string(),
        10..=19 => format!("十{}", digit(n - 10)),
        20..=99 => format!("{}十{}", digit(n / 10), digit(n % 10)),
        100..=999 => {
            let mut out = format!("{}百", digit(n / 100));
            match n % 100 {
                0 => {}
                r @ 1..=9 => {
                    out.push('零');
                    out.push_str(digit(r));
                }
                r => out.push_str(&number_to_chinese(r)),
            }
            out
        }
        _ => n.to_string(),
    }
}
