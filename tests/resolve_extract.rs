//! Resolution and extraction fixtures over real XML/XHTML documents,
//! exercising ordinal descent, ID recovery, subtree filters, and the
//! resolve/extract round-trip.

use epub_cfi::{
    from_range, parse, to_element, to_range, FilterAction, Location, NodeFilter, NodeLike, Range,
};
use roxmltree::{Document, Node};

fn by_id<'a, 'i>(doc: &'a Document<'i>, id: &str) -> Node<'a, 'i> {
    doc.descendants()
        .find(|n| n.attribute("id") == Some(id))
        .expect("element by id")
}

fn class_filter(node: &Node) -> FilterAction {
    if !node.is_element() {
        return FilterAction::Accept;
    }
    match node.attribute("class") {
        Some("reject") => FilterAction::RejectSubtree,
        Some("skip") => FilterAction::SkipSelf,
        _ => FilterAction::Accept,
    }
}

const OPF: &str = r#"<?xml version="1.0"?>
<package version="2.0"
         unique-identifier="bookid"
         xmlns="http://www.idpf.org/2007/opf"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:opf="http://www.idpf.org/2007/opf">
    <metadata>
        <dc:title>…</dc:title>
        <dc:identifier id="bookid">…</dc:identifier>
        <dc:creator>…</dc:creator>
        <dc:language>en</dc:language>
    </metadata>
    <manifest>
        <item id="toc" properties="nav" href="toc.xhtml" media-type="application/xhtml+xml"/>
        <item id="titlepage" href="titlepage.xhtml" media-type="application/xhtml+xml"/>
        <item id="chapter01" href="chapter01.xhtml" media-type="application/xhtml+xml"/>
        <item id="chapter02" href="chapter02.xhtml" media-type="application/xhtml+xml"/>
        <item id="chapter03" href="chapter03.xhtml" media-type="application/xhtml+xml"/>
        <item id="chapter04" href="chapter04.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine>
        <itemref id="titleref"  idref="titlepage"/>
        <itemref id="chap01ref" idref="chapter01"/>
        <itemref id="chap02ref" idref="chapter02"/>
        <itemref id="chap03ref" idref="chapter03"/>
        <itemref id="chap04ref" idref="chapter04"/>
    </spine>
</package>"#;

#[test]
fn spine_step_resolves_by_ordinal_and_by_id() {
    let doc = Document::parse(OPF).unwrap();
    let root = doc.root_element();
    let expected = by_id(&doc, "chap01ref");

    let with_id = parse("/6/4[chap01ref]").unwrap();
    let b = to_element(&root, &with_id.segments[0], None).unwrap();
    assert!(b.is_same(&expected));

    let without_id = parse("/6/4").unwrap();
    let c = to_element(&root, &without_id.segments[0], None).unwrap();
    assert!(c.is_same(&expected));
}

// The page from the EPUB CFI spec example
const PAGE: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml">
    <head>
        <title>…</title>
    </head>
    <body id="body01">
        <p>…</p>
        <p>…</p>
        <p>…</p>
        <p>…</p>
        <p id="para05">xxx<em>yyy</em>0123456789</p>
        <p>…</p>
        <p>…</p>
        <img id="svgimg" src="foo.svg" alt="…"/>
        <p>…</p>
        <p>…</p>
    </body>
</html>"#;

// The exact same page with some text nodes removed, CDATA and comments
// added, and characters changed to entities
const PAGE2: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml">
    <head>
        <title>…</title>
    </head>
    <body id="body01">
        <p>…</p><p>…</p><p>…</p><p>…</p>
        <p id="para05">xxx<em>yyy</em><![CDATA[]]><!--comment1--><![CDATA[0123]]>4<!--comment2-->5<![CDATA[67]]>&#56;&#57;</p>
        <p>…</p>
        <p>…</p>
        <img id="svgimg" src="foo.svg" alt="…"/>
        <p>…</p>
        <p>…</p>
    </body>
</html>"#;

// The exact same page wrapped in nodes that are to be filtered out
const PAGE3: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml">
    <head>
        <title>…</title>
    </head>
    <body id="body01">
        <h1 class="reject">This is ignored!</h1>
        <section class="skip">
            <p class="reject">Also ignored</p>
            <p>…</p><p>…</p><p>…</p><p>…</p>
            <p id="para05">xxx<em>yyy</em><span class="reject">ignored text</span><span class="skip">0<span class="skip"><span class="reject"><![CDATA[]]></span>123</span></span>45<span class="reject"><img src="icon.svg"/></span>6789</p>
            <p>…</p>
            <p>…</p>
            <img id="svgimg" src="foo.svg" alt="…"/>
            <p>…</p>
            <p>…</p>
        </section>
    </body>
</html>"#;

fn check_page<'a, 'i>(root: Node<'a, 'i>, filter: Option<NodeFilter<'_, Node<'a, 'i>>>) {
    for cfi in [
        "/4[body01]/10[para05]/3:10",
        "/4[body01]/16[svgimg]",
        "/4[body01]/10[para05]/1:0",
        "/4[body01]/10[para05]/2/1:0",
        "/4[body01]/10[para05]/2/1:3",
    ] {
        let parsed = parse(cfi).unwrap();
        let range = to_range(&root, &parsed, filter).unwrap();
        let rebuilt = from_range(&range, filter).to_string();
        assert_eq!(rebuilt, format!("epubcfi({cfi})"));
    }

    for i in 0..10u32 {
        let cfi = parse(&format!("/4/10,/3:{},/3:{}", i, i + 1)).unwrap();
        let range = to_range(&root, &cfi, filter).unwrap();
        assert_eq!(range.text(filter), i.to_string());
    }
}

#[test]
fn page_roundtrips_without_filter() {
    for xml in [PAGE, PAGE2] {
        let doc = Document::parse(xml).unwrap();
        check_page(doc.root_element(), None);
    }
}

#[test]
fn page_roundtrips_with_filter() {
    for xml in [PAGE, PAGE2, PAGE3] {
        let doc = Document::parse(xml).unwrap();
        let filter: NodeFilter<Node> = &class_filter;
        check_page(doc.root_element(), Some(filter));
    }
}

// Selections inside skipped wrappers must preserve visible offsets
const SKIP_PAGE: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml">
    <head></head>
    <body>
        <p id="test-skip-1">Hello, World</p>
        <p id="test-skip-2"><span class="SKIP">H</span>e<span class="SKIP">ll</span>o, World</p>
    </body>
</html>"#;

fn skip_filter(node: &Node) -> FilterAction {
    if node.is_element() && node.attribute("class") == Some("SKIP") {
        FilterAction::SkipSelf
    } else {
        FilterAction::Accept
    }
}

#[test]
fn skipped_wrappers_leave_offsets_untouched() {
    let doc = Document::parse(SKIP_PAGE).unwrap();
    let root = doc.root_element();
    let filter: NodeFilter<Node> = &skip_filter;

    // plain paragraph: characters 3..8
    let para1 = by_id(&doc, "test-skip-1");
    let text1 = para1.first_child().unwrap();
    let range1 = Range {
        start: Location::Text {
            node: text1,
            offset: 3,
        },
        end: Location::Text {
            node: text1,
            offset: 8,
        },
    };
    let cfi1 = from_range(&range1, Some(filter));
    assert_eq!(cfi1.to_string(), "epubcfi(/4/2[test-skip-1],/1:3,/1:8)");

    // equivalent paragraph with skipped wrappers: the same visible span
    let para2 = by_id(&doc, "test-skip-2");
    let skips: Vec<Node> = para2
        .children()
        .filter(|n| n.attribute("class") == Some("SKIP"))
        .collect();
    let inner = skips[1].first_child().unwrap();
    let tail = para2.children().last().unwrap();
    let range2 = Range {
        start: Location::Text {
            node: inner,
            offset: 1,
        },
        end: Location::Text {
            node: tail,
            offset: 4,
        },
    };
    let cfi2 = from_range(&range2, Some(filter));
    assert_eq!(cfi2.to_string(), "epubcfi(/4/4[test-skip-2],/1:3,/1:8)");

    // resolving that string under the same filter spans the same text
    let rebuilt = to_range(
        &root,
        &parse("/4/4[test-skip-2],/1:3,/1:8").unwrap(),
        Some(filter),
    )
    .unwrap();
    assert_eq!(rebuilt.text(Some(filter)), "lo, W");

    // extract/resolve inverse
    let roundtrip = from_range(&rebuilt, Some(filter));
    assert_eq!(roundtrip.to_string(), "epubcfi(/4/4[test-skip-2],/1:3,/1:8)");
}

// Special characters in ID assertions
const OPF_SPECIAL: &str = r#"<?xml version="1.0"?>
<package version="2.0"
         unique-identifier="bookid"
         xmlns="http://www.idpf.org/2007/opf"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:opf="http://www.idpf.org/2007/opf">
    <metadata></metadata>
    <manifest></manifest>
    <spine>
        <itemref id="titleref"  idref="titlepage"/>
        <itemref id="chap0]!/1ref^" idref="chapter01"/>
        <itemref id="chap02ref" idref="chapter02"/>
        <itemref id="chap03ref" idref="chapter03"/>
        <itemref id="chap04ref" idref="chapter04"/>
    </spine>
</package>"#;

const PAGE_SPECIAL: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml">
    <head>
        <title>…</title>
    </head>
    <body id="body0]!/1^">
        <p>…</p>
        <p>…</p>
        <p>…</p>
        <p>…</p>
        <p id="para]/0,/5">xxx<em>yyy</em>0123456789</p>
        <p>…</p>
        <p>…</p>
        <img id="s][vgimg" src="foo.svg" alt="…"/>
        <p>…</p>
        <p>…</p>
    </body>
</html>"#;

#[test]
fn special_characters_in_id_assertions() {
    let doc = Document::parse(OPF_SPECIAL).unwrap();
    let root = doc.root_element();
    let expected = by_id(&doc, "chap0]!/1ref^");
    let cfi = parse("/6/4[chap0^]!/1ref^^]").unwrap();
    let resolved = to_element(&root, &cfi.segments[0], None).unwrap();
    assert!(resolved.is_same(&expected));
}

#[test]
fn special_characters_roundtrip_through_extraction() {
    let doc = Document::parse(PAGE_SPECIAL).unwrap();
    let root = doc.root_element();

    for cfi in [
        "/4[body0^]!/1^^]/10[para^]/0^,/5]/3:10",
        "/4[body0^]!/1^^]/16[s^]^[vgimg]",
        "/4[body0^]!/1^^]/10[para^]/0^,/5]/1:0",
        "/4[body0^]!/1^^]/10[para^]/0^,/5]/2/1:0",
        "/4[body0^]!/1^^]/10[para^]/0^,/5]/2/1:3",
    ] {
        let parsed = parse(cfi).unwrap();
        let range = to_range(&root, &parsed, None).unwrap();
        let rebuilt = from_range(&range, None).to_string();
        assert_eq!(rebuilt, format!("epubcfi({cfi})"));
    }

    for i in 0..10u32 {
        let raw = format!("/4[body0^]!/1^^]/10[para^]/0^,^/5],/3:{},/3:{}", i, i + 1);
        let cfi = parse(&raw).unwrap();
        let range = to_range(&root, &cfi, None).unwrap();
        assert_eq!(range.text(None), i.to_string());
    }
}

#[test]
fn partial_resolution_carries_ordinal_result() {
    let doc = Document::parse(OPF).unwrap();
    let root = doc.root_element();
    let cfi = parse("/6/4[gone]").unwrap();
    match to_element(&root, &cfi.segments[0], None) {
        Err(epub_cfi::ResolveError::PartiallyResolved { resolved, expected }) => {
            assert_eq!(resolved.attribute("id"), Some("chap01ref"));
            assert_eq!(expected, "gone");
        }
        other => panic!("expected partial resolution, got {other:?}"),
    }
}

#[test]
fn missing_location_is_not_found() {
    let doc = Document::parse(OPF).unwrap();
    let root = doc.root_element();
    let cfi = parse("/6/40").unwrap();
    assert!(matches!(
        to_element(&root, &cfi.segments[0], None),
        Err(epub_cfi::ResolveError::NotFound { index: 40 })
    ));
}
