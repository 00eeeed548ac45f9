use anyhow::Result;
use nestext::parse::ParseError;
use nestext::pos::Pos;
use nestext::read::{load, read_all, read_all_with, read_file, read_named,
                    write_all, write_file, ReadError, ReadErrorWithLocation,
                    WriteError};
use nestext::settings::{Settings, DEFAULT_SETTINGS, WITH_COMMENTS};
use nestext::value::{Unwritable, Value};
use kstring::KString;
use pretty_assertions::assert_eq;

fn read_err(input: &str) -> (ReadError, Pos) {
    let e = read_all(input.as_bytes()).unwrap_err();
    (e.err, e.pos)
}

fn pos(line: u32, col: u32) -> Pos {
    Pos { line, col }
}

fn dict(entries: Vec<(&str, Value)>) -> Value {
    Value::Dict(entries.into_iter().map(|(k, v)| (KString::from_ref(k), v)).collect())
}

fn write_err(v: &Value) -> Unwritable {
    let mut out = Vec::<u8>::new();
    match write_all(&mut out, v) {
        Err(WriteError::Unwritable(e)) => {
            assert!(out.is_empty(), "nothing is written for unwritable trees");
            e
        }
        other => panic!("expected Unwritable, got {:?}", other),
    }
}

#[test]
fn empty_documents() -> Result<()> {
    assert_eq!(read_all(b"")?, None);
    assert_eq!(read_all(b"\n   \n# nothing here\n")?, None);
    Ok(())
}

#[test]
fn top_level_string() -> Result<()> {
    assert_eq!(read_all(b"> a\n>\n> b\n")?, Some(Value::string("a\n\nb")));
    Ok(())
}

#[test]
fn top_level_list() -> Result<()> {
    let v = read_all(b"- 1\n-\n  - 2\n-\n")?;
    assert_eq!(v, Some(Value::List(vec![
        Value::string("1"),
        Value::List(vec![Value::string("2")]),
        Value::empty_string(),
    ])));
    Ok(())
}

#[test]
fn comments_never_reach_the_tree() -> Result<()> {
    let settings = Settings { modes: &WITH_COMMENTS, ..DEFAULT_SETTINGS };
    let v = read_all_with(b"# c\na:\n  # c\n  b: 1\n", &settings)?;
    assert_eq!(v, Some(Value::Dict(vec![
        (KString::from_static("a"), Value::Dict(vec![
            (KString::from_static("b"), Value::string("1")),
        ])),
    ])));
    Ok(())
}

#[test]
fn mixed_items() {
    let (e, p) = read_err("a: 1\n- x\n");
    assert!(matches!(e, ReadError::MixedItems { expected: "dict key", got: "list item" }));
    assert_eq!(p, pos(1, 0));
    assert_eq!(e.to_string(), "expected dict key, got list item");

    let (e, _) = read_err("- x\n> s\n");
    assert!(matches!(e, ReadError::MixedItems { expected: "list item", got: "string" }));
}

#[test]
fn unexpected_indent() {
    let (e, p) = read_err("a: 1\n  b: 2\n");
    assert!(matches!(e, ReadError::UnexpectedIndent));
    assert_eq!(p, pos(1, 2));

    let (e, p) = read_err("  a: 1\n");
    assert!(matches!(e, ReadError::UnexpectedIndent));
    assert_eq!(p, pos(0, 2));
}

#[test]
fn duplicate_key() {
    let (e, p) = read_err("a: 1\nb:\n  x: 1\na: 2\n");
    assert!(matches!(&e, ReadError::DuplicateKey(k) if k.as_str() == "a"));
    assert_eq!(p, pos(3, 0));
}

#[test]
fn nesting_limit() -> Result<()> {
    let input = b"a:\n  b:\n    c: 1\n";
    let shallow = Settings { max_depth: 1, ..DEFAULT_SETTINGS };
    let e = read_all_with(input, &shallow).unwrap_err();
    assert!(matches!(e.err, ReadError::NestingTooDeep));
    assert_eq!(e.pos, pos(2, 4));

    let enough = Settings { max_depth: 2, ..DEFAULT_SETTINGS };
    assert!(read_all_with(input, &enough)?.is_some());
    Ok(())
}

#[test]
fn scanner_errors_pass_through() {
    let (e, p) = read_err("a:\n  -x\n");
    assert!(matches!(e, ReadError::PE(ParseError::MissingSpaceAfterMarker { .. })));
    assert_eq!(p, pos(1, 3));
}

#[test]
fn errors_name_their_source() {
    let e = read_named(b"abc\n", "stdin").unwrap_err();
    assert_eq!(e.to_string(), "missing ':' after dict key in (stdin)@1.3");
    match e {
        ReadErrorWithLocation::PC(e) => assert_eq!(e.err_with_pos().pos, pos(0, 3)),
        ReadErrorWithLocation::IO(_) => panic!("expected a parse error"),
    }
}

#[test]
fn load_from_reader() -> Result<()> {
    let buf = load(&b"a: 1\n"[..], "memory")?;
    assert_eq!(buf, b"a: 1\n");
    Ok(())
}

#[test]
fn file_round_trip() -> Result<()> {
    let path = std::env::temp_dir().join(format!("nestext-read-{}.nt", std::process::id()));
    let v = Value::Dict(vec![
        (KString::from_static("k"), Value::List(vec![Value::string("x"), Value::string("y\nz")])),
    ]);
    write_file(&path, &v)?;
    let back = read_file(&path);
    std::fs::remove_file(&path)?;
    assert_eq!(back?, Some(v));
    Ok(())
}

#[test]
fn missing_file() {
    let path = std::path::Path::new("/nonexistent/nestext/doc.nt");
    let e = read_file(path).unwrap_err();
    assert!(matches!(e, ReadErrorWithLocation::IO(_)));
    assert!(e.to_string().starts_with("\"/nonexistent/nestext/doc.nt\": "));
}

#[test]
fn double_dedent_is_refused() -> Result<()> {
    let v = dict(vec![
        ("a", dict(vec![("b", dict(vec![("c", Value::string("1"))]))])),
        ("d", Value::string("2")),
    ]);
    // what Display gives puts d inside a
    let back = read_all(v.to_string().as_bytes())?;
    assert_eq!(back, Some(dict(vec![
        ("a", dict(vec![
            ("b", dict(vec![("c", Value::string("1"))])),
            ("d", Value::string("2")),
        ])),
    ])));
    assert_eq!(write_err(&v), Unwritable::DeepDedent(2));

    // one level is fine
    let v = dict(vec![
        ("a", dict(vec![("b", Value::string("1"))])),
        ("d", Value::string("2")),
    ]);
    let mut out = Vec::<u8>::new();
    write_all(&mut out, &v)?;
    assert_eq!(read_all(&out)?, Some(v));
    Ok(())
}

#[test]
fn keys_that_cannot_be_written() {
    for k in ["a:b", "- x", "#c", "[x", " lead"] {
        let v = dict(vec![(k, Value::string("1"))]);
        assert_eq!(write_err(&v), Unwritable::BadKey(KString::from_ref(k)));
        assert_ne!(read_all(v.to_string().as_bytes()).ok(), Some(Some(v)), "{:?}", k);
    }
}

#[test]
fn carriage_return_in_string() {
    let v = dict(vec![("k", Value::string("a\rb"))]);
    assert_eq!(write_err(&v), Unwritable::CarriageReturn);
    let v = Value::List(vec![Value::string("x\ny\r")]);
    assert_eq!(write_err(&v), Unwritable::CarriageReturn);
}

#[test]
fn empty_containers_and_duplicates() {
    assert_eq!(write_err(&dict(vec![("k", Value::List(vec![]))])),
               Unwritable::EmptyContainer);
    assert_eq!(write_err(&dict(vec![("k", Value::string("1")), ("k", Value::string("2"))])),
               Unwritable::DuplicateKey(KString::from_static("k")));
}

#[test]
fn unwritable_tree_creates_no_file() {
    let path = std::env::temp_dir().join(format!("nestext-unwritable-{}.nt", std::process::id()));
    let v = dict(vec![("a:b", Value::string("1"))]);
    assert!(matches!(write_file(&path, &v), Err(WriteError::Unwritable(_))));
    assert!(!path.exists());
}
