//! End-to-end parsing behavior through the public `OptionParser` surface.

use optspec_core::{
    ArgumentErrorKind, Item, OptionFlags, OptionParser, ParseError, ParserFlags, SpecErrorKind,
    SpecToken, Value, decl,
};

fn parser(argv: &[&str], declarations: Vec<Vec<SpecToken>>) -> OptionParser {
    parser_with(argv, ParserFlags::EMPTY, declarations)
}

fn parser_with(
    argv: &[&str],
    flags: ParserFlags,
    declarations: Vec<Vec<SpecToken>>,
) -> OptionParser {
    let mut parser = OptionParser::new(argv.iter().copied(), flags);
    parser
        .declare_all(declarations)
        .expect("declarations should be valid");
    parser
}

fn error_kind(parser: &OptionParser) -> ArgumentErrorKind {
    parser
        .parsed()
        .expect_err("parse should fail")
        .invalid_argument()
        .expect("failure should point at an argument")
        .kind
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn list(items: &[&str]) -> Value {
    Value::List(items.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_matching_by_initial_or_name_sets_present() {
    let p = parser(&["-a", "--bee"], vec![decl!["a"], decl!["bee"], decl!["c", "sea"]]);
    assert!(p.is_present("a").unwrap());
    assert!(p.is_present("bee").unwrap());
    assert!(!p.is_present("c").unwrap());
    assert!(!p.is_present("sea").unwrap());
}

#[test]
fn test_switch_without_value_is_true() {
    let p = parser(&["-a", "-b", "x"], vec![decl!["a"], decl!["b"]]);
    assert_eq!(p.get("a").unwrap(), Some(&Value::Bool(true)));
    assert_eq!(p.get("b").unwrap(), Some(&text("x")));
}

#[test]
fn test_negation_requires_allow_false() {
    let p = parser(&["--no-foo"], vec![decl!["foo", OptionFlags::ALLOW_FALSE]]);
    assert_eq!(p.get("foo").unwrap(), Some(&Value::Bool(false)));

    let p = parser(&["--no-foo"], vec![decl!["foo"]]);
    assert_eq!(error_kind(&p), ArgumentErrorKind::CannotNegate);
}

#[test]
fn test_cluster_with_inline_value() {
    let p = parser(&["-xf=bar"], vec![decl!["x"], decl!["f"]]);
    assert_eq!(p.count().unwrap(), 2);
    assert_eq!(p.get("x").unwrap(), Some(&Value::Bool(true)));
    assert_eq!(p.get("f").unwrap(), Some(&text("bar")));
}

#[test]
fn test_value_spellings_are_equivalent() {
    for argv in [
        &["--foo=bar"][..],
        &["-f=bar"][..],
        &["--foo", "bar"][..],
        &["-f", "bar"][..],
    ] {
        let p = parser(argv, vec![decl!["f", "foo"]]);
        assert_eq!(p.get("foo").unwrap(), Some(&text("bar")), "argv {argv:?}");
        assert_eq!(p.get("f").unwrap(), Some(&text("bar")), "argv {argv:?}");
    }
}

#[test]
fn test_interleaved_multiple_values_accumulate() {
    let flags = OptionFlags::REQUIRE_VALUE | OptionFlags::MULTIPLE_VALUES;
    let p = parser(
        &["--bar", "x", "--foo", "a", "--bar", "y", "--foo", "b", "c"],
        vec![decl!["foo", flags], decl!["bar", flags]],
    );
    assert_eq!(p.get("foo").unwrap(), Some(&list(&["a", "b", "c"])));
    assert_eq!(p.get("bar").unwrap(), Some(&list(&["x", "y"])));
    assert!(p.arguments().unwrap().is_empty());
}

#[test]
fn test_list_values_append_to_declared_default() {
    let declare = || vec![decl!["tag", "=d", OptionFlags::MULTIPLE_VALUES]];

    let p = parser(&["--tag", "a", "--tag=b"], declare());
    assert_eq!(p.get("tag").unwrap(), Some(&list(&["d", "a", "b"])));

    let p = parser(&[], declare());
    assert_eq!(p.get("tag").unwrap(), Some(&list(&["d"])));
    assert!(!p.is_present("tag").unwrap());
}

#[test]
fn test_negated_list_drops_collected_values() {
    let declare =
        || vec![decl!["tag", "=d", OptionFlags::MULTIPLE_VALUES | OptionFlags::ALLOW_FALSE]];

    // The negated token stays open, so a following bare token is collected.
    let p = parser(&["--tag", "a", "--no-tag", "b"], declare());
    assert_eq!(p.get("tag").unwrap(), Some(&list(&["b"])));

    let p = parser(&["--no-tag"], declare());
    assert_eq!(p.get("tag").unwrap(), Some(&list(&[])));
    assert!(p.is_present("tag").unwrap());
}

#[test]
fn test_boolean_default_and_overrides() {
    let declare = || vec![decl!["foo", "=0", OptionFlags::ALLOW_FALSE | OptionFlags::FORBID_VALUE]];

    let absent = parser(&[], declare());
    assert_eq!(absent.get("foo").unwrap(), Some(&Value::Bool(false)));
    assert!(!absent.is_present("foo").unwrap());

    let on = parser(&["--foo"], declare());
    assert_eq!(on.get("foo").unwrap(), Some(&Value::Bool(true)));

    let off = parser(&["--no-foo"], declare());
    assert_eq!(off.get("foo").unwrap(), Some(&Value::Bool(false)));
    assert!(off.is_present("foo").unwrap());
}

#[test]
fn test_text_default_used_when_absent() {
    let p = parser(&[], vec![decl!["l", "level", "=3"]]);
    assert_eq!(p.get("level").unwrap(), Some(&text("3")));
    assert_eq!(p.count().unwrap(), 0);
}

#[test]
fn test_single_valued_option_twice_fails() {
    let p = parser(&["--foo", "a", "--foo", "b"], vec![decl!["foo"]]);
    assert_eq!(error_kind(&p), ArgumentErrorKind::SpecifiedMoreThanOnce);
}

#[test]
fn test_positional_arguments_keep_order() {
    let p = parser(&["-a", "file1", "file2"], vec![decl!["a", OptionFlags::FORBID_VALUE]]);
    assert_eq!(p.arguments().unwrap(), vec!["file1", "file2"]);
    assert_eq!(p.count().unwrap(), 1);

    // Without FORBID_VALUE the first bare token becomes the value.
    let p = parser(&["-a", "file1", "file2"], vec![decl!["a"]]);
    assert_eq!(p.get("a").unwrap(), Some(&text("file1")));
    assert_eq!(p.arguments().unwrap(), vec!["file2"]);
}

#[test]
fn test_ordered_items_interleave_options_and_arguments() {
    let p = parser(&["first", "-q", "second"], vec![decl!["q", OptionFlags::FORBID_VALUE]]);
    assert_eq!(p.item(0).unwrap(), Some(Item::Argument("first")));
    assert!(matches!(p.item(1).unwrap(), Some(Item::Option(opt)) if opt.initial() == Some('q')));
    assert_eq!(p.item(2).unwrap(), Some(Item::Argument("second")));
    assert_eq!(p.item(3).unwrap(), None);
}

#[test]
fn test_undeclared_options() {
    let p = parser(&["--zz"], vec![decl!["a"]]);
    assert_eq!(error_kind(&p), ArgumentErrorKind::UnknownOption);

    let p = parser_with(&["--zz", "-q"], ParserFlags::ALLOW_UNDECLARED, vec![decl!["a"]]);
    assert_eq!(p.get("zz").unwrap(), Some(&Value::Bool(true)));
    assert_eq!(p.get("q").unwrap(), Some(&Value::Bool(true)));
    assert!(!p.is_present("a").unwrap());
    assert_eq!(p.count().unwrap(), 2);
}

#[test]
fn test_required_value_missing_at_end_of_argv() {
    let p = parser(&["-f"], vec![decl!["f", "foo", OptionFlags::REQUIRE_VALUE]]);
    let err = p.parsed().unwrap_err();
    let invalid = err.invalid_argument().unwrap();
    assert_eq!(invalid.kind, ArgumentErrorKind::RequiresValue);
    assert_eq!(invalid.arg, "-f");
}

#[test]
fn test_required_option_absent() {
    let p = parser(&[], vec![decl!["o", "output", OptionFlags::REQUIRED]]);
    assert_eq!(
        p.get("output").unwrap_err(),
        ParseError::MissingRequired {
            option: "--output".to_string()
        }
    );
}

#[test]
fn test_double_dash_terminator_when_enabled() {
    let declarations = || vec![decl!["a", OptionFlags::FORBID_VALUE]];

    let p = parser_with(&["--", "-a"], ParserFlags::STOP_AT_DOUBLE_DASH, declarations());
    assert_eq!(p.arguments().unwrap(), vec!["-a"]);
    assert!(!p.is_present("a").unwrap());

    let p = parser(&["--", "-a"], declarations());
    assert_eq!(p.arguments().unwrap(), vec!["--"]);
    assert!(p.is_present("a").unwrap());
}

#[test]
fn test_spec_error_leaves_parser_usable() {
    let mut p = OptionParser::new(["-g"], ParserFlags::EMPTY);
    let err = p
        .declare(decl!["f", OptionFlags::FORBID_VALUE | OptionFlags::REQUIRE_VALUE])
        .unwrap_err();
    assert_eq!(err.kind, SpecErrorKind::ConflictingFlags("REQUIRE_VALUE"));

    p.declare(decl!["g"]).unwrap();
    assert_eq!(p.get("g").unwrap(), Some(&Value::Bool(true)));
}

#[test]
fn test_error_reports_expanded_argv() {
    let p = parser(&["-ab", "-cz"], vec![decl!["a"], decl!["b"], decl!["c"]]);
    let err = p.parsed().unwrap_err();
    let invalid = err.invalid_argument().unwrap();
    assert_eq!(invalid.args, vec!["-a", "-b", "-c", "-z"]);
    assert_eq!(invalid.index, 3);
    assert_eq!(err.to_string(), "unknown option: '-z' (argument 3)");
}
