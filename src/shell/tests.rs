use crate::backend::shapefile::fixtures::write_shapefile;
use crate::shell::context::ShellContext;
use crate::shell::error::ShellError;
use crate::shell::history::History;
use crate::shell::output::{Capture, SharedWriter};
use crate::shell::run_line;
use crate::shell::value::{LiteralKind, Value};
use std::fs;

fn shell() -> (ShellContext, Capture) {
    let capture = Capture::new();
    let ctx = ShellContext::new().with_output(SharedWriter::new(Box::new(capture.clone())));
    (ctx, capture)
}

fn shell_error(err: &anyhow::Error) -> Option<&ShellError> {
    err.downcast_ref::<ShellError>()
}

#[test]
fn test_assign_quoted_and_print() {
    let (mut ctx, out) = shell();
    run_line("a = \"f.shp\"", &mut ctx).unwrap();
    run_line("print a", &mut ctx).unwrap();

    assert_eq!(ctx.lookup("a").unwrap(), &Value::Literal(LiteralKind::Name, "f.shp".to_string()));
    assert_eq!(out.contents(), "f.shp\n");
}

#[test]
fn test_for_over_literal_list() {
    let (mut ctx, out) = shell();
    let result = run_line("for i in [1,2,3] { print i }", &mut ctx).unwrap();
    assert!(result.is_truthy());
    assert_eq!(out.lines(), vec!["1", "2", "3"]);
}

#[test]
fn test_multiline_for_block() {
    let (mut ctx, out) = shell();
    let src = "for i in ['a.shp', 'b.shp']\n{\n  print i\n  print done\n}";
    let err = run_line(src, &mut ctx).unwrap_err();
    // "done" is not defined: the first iteration prints its file then stops
    assert_eq!(shell_error(&err), Some(&ShellError::UndefinedVariable("done".to_string())));
    assert_eq!(out.lines(), vec!["a.shp"]);
}

#[test]
fn test_open_missing_file_error_has_no_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let (ctx, _) = shell();
    let mut ctx = ctx.with_cwd(dir.path().to_path_buf());

    run_line("b = \"missing.shp\"", &mut ctx).unwrap();
    let err = run_line("open b", &mut ctx).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("Could not open "), "{}", msg);
    assert!(msg.ends_with("missing.shp"), "{}", msg);
    assert!(!msg.contains('"') && !msg.contains('\''), "{}", msg);
    // Backend errors are not part of the shell taxonomy
    assert!(shell_error(&err).is_none());
}

#[test]
fn test_open_with_single_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let err = {
        let (mut ctx, _) = shell();
        let path = dir.path().join("missing.shp");
        run_line(&format!("open '{}'", path.display()), &mut ctx).unwrap_err()
    };
    assert!(!err.to_string().contains('\''));
}

#[test]
fn test_print_undefined_outputs_nothing() {
    let (mut ctx, out) = shell();
    run_line("a = x.shp", &mut ctx).unwrap();
    let err = run_line("print a undeclaredName", &mut ctx).unwrap_err();
    assert_eq!(shell_error(&err), Some(&ShellError::UndefinedVariable("undeclaredName".to_string())));
    assert!(out.contents().is_empty());
}

#[test]
fn test_history_recall_overwrites_slot() {
    let (mut ctx, out) = shell();
    run_line("print 7", &mut ctx).unwrap();
    let before = ctx.history.len();

    run_line("!!", &mut ctx).unwrap();

    assert_eq!(ctx.history.len(), before + 1);
    assert_eq!(ctx.history.get(before + 1).as_deref(), Some("print 7"));
    assert_eq!(out.lines(), vec!["7", "7"]);
}

#[test]
fn test_history_recall_by_index() {
    let (mut ctx, out) = shell();
    run_line("print 1", &mut ctx).unwrap();
    run_line("print 2", &mut ctx).unwrap();
    run_line("!1", &mut ctx).unwrap();
    assert_eq!(out.lines(), vec!["1", "2", "1"]);
    assert_eq!(ctx.history.get(3).as_deref(), Some("print 1"));
}

#[test]
fn test_history_index_out_of_range() {
    let (mut ctx, _) = shell();
    run_line("print 1", &mut ctx).unwrap();
    run_line("print 2", &mut ctx).unwrap();
    let err = run_line("!5", &mut ctx).unwrap_err();
    assert_eq!(shell_error(&err), Some(&ShellError::HistoryEntryMissing("5".to_string())));
}

#[test]
fn test_repeat_with_empty_history() {
    let (mut ctx, _) = shell();
    let err = run_line("!!", &mut ctx).unwrap_err();
    assert_eq!(shell_error(&err), Some(&ShellError::NoHistoryAvailable));
}

#[test]
fn test_history_command_skips_current_line() {
    let (mut ctx, out) = shell();
    run_line("print a_b.shp", &mut ctx).unwrap();
    run_line("history", &mut ctx).unwrap();
    assert_eq!(out.lines(), vec!["a_b.shp", "1: print a_b.shp"]);
}

#[test]
fn test_parse_error_is_reported() {
    let (mut ctx, _) = shell();
    let err = run_line("print \"unterminated", &mut ctx).unwrap_err();
    match shell_error(&err) {
        Some(ShellError::Parse { line, column, .. }) => assert_eq!((*line, *column), (1, 7)),
        other => panic!("Expected parse error, got {:?}", other),
    }
}

#[test]
fn test_open_list_info_save_session() {
    let dir = tempfile::tempdir().unwrap();
    write_shapefile(dir.path(), "states", 49, &[("NAME", b'C', 24, 0), ("POP", b'N', 10, 0)]);
    let (ctx, out) = shell();
    let mut ctx = ctx.with_cwd(dir.path().to_path_buf());

    let src = "open states.shp\nlist\ninfo states full\nsave copy.shp states";
    let result = run_line(src, &mut ctx).unwrap();
    assert!(result.is_truthy());

    let text = out.contents();
    assert!(text.contains("1 layers"));
    assert!(text.contains("Name: states"));
    assert!(text.contains("Number of features in states: 49"));
    assert!(text.contains("BBox: (-10.000000 30.000000), (20.000000 40.000000)"));
    assert!(text.contains("POP - Integer 10 0"));
    assert!(dir.path().join("copy.shp").exists());
    assert!(dir.path().join("copy.dbf").exists());
}

#[test]
fn test_open_result_can_be_assigned() {
    let dir = tempfile::tempdir().unwrap();
    write_shapefile(dir.path(), "states", 1, &[]);
    let (ctx, _) = shell();
    let mut ctx = ctx.with_cwd(dir.path().to_path_buf());

    run_line("src = open \"states.shp\"", &mut ctx).unwrap();
    let expected = dir.path().join("states.shp").canonicalize().unwrap();
    match ctx.lookup("src").unwrap() {
        Value::CommandResult(outcome) => {
            assert!(outcome.is_truthy());
            assert_eq!(outcome.value, Some(Value::filename(expected.to_string_lossy())));
        }
        other => panic!("Expected a command result, got {:?}", other),
    }
    assert!(ctx.backend.current().is_some());
}

#[test]
fn test_save_unknown_driver_is_falsy() {
    let dir = tempfile::tempdir().unwrap();
    write_shapefile(dir.path(), "states", 1, &[]);
    let (ctx, out) = shell();
    let mut ctx = ctx.with_cwd(dir.path().to_path_buf());

    run_line("open states.shp", &mut ctx).unwrap();
    let result = run_line("save out.xyz", &mut ctx).unwrap();
    assert!(!result.is_truthy());
    assert!(out.contents().contains("'xyz'"));
}

#[test]
fn test_save_onto_open_file_leaves_it_intact() {
    let dir = tempfile::tempdir().unwrap();
    write_shapefile(dir.path(), "states", 7, &[("NAME", b'C', 24, 0)]);
    let (ctx, out) = shell();
    let mut ctx = ctx.with_cwd(dir.path().to_path_buf());

    run_line("open states.shp", &mut ctx).unwrap();
    let err = run_line("save states.shp", &mut ctx).unwrap_err();
    assert!(err.to_string().contains("onto itself"), "{}", err);

    for ext in ["shp", "dbf", "shx"] {
        assert!(dir.path().join(format!("states.{}", ext)).exists(), "states.{} was removed", ext);
    }
    // The open data source is still readable
    assert!(run_line("info states", &mut ctx).unwrap().is_truthy());
    assert!(out.contents().contains("Number of features in states: 7"));
}

#[test]
fn test_list_without_open() {
    let (mut ctx, _) = shell();
    let err = run_line("list", &mut ctx).unwrap_err();
    assert_eq!(shell_error(&err), Some(&ShellError::NoDataSource));
}

#[test]
fn test_for_over_files_opens_each() {
    let dir = tempfile::tempdir().unwrap();
    write_shapefile(dir.path(), "a", 1, &[]);
    write_shapefile(dir.path(), "b", 2, &[]);
    fs::write(dir.path().join("notes.txt"), "x").unwrap();
    let (ctx, out) = shell();
    let mut ctx = ctx.with_cwd(dir.path().to_path_buf());

    let result = run_line("for f in *.shp { open f; list }", &mut ctx).unwrap();
    assert!(result.is_truthy());
    assert_eq!(out.lines().iter().filter(|l| l.starts_with("Name: ")).count(), 2);
}

#[test]
fn test_errors_do_not_roll_back_history_or_vars() {
    let (mut ctx, _) = shell();
    assert!(run_line("a = 1; print nope", &mut ctx).is_err());
    assert_eq!(ctx.lookup("a").unwrap(), &Value::name("1"));
    assert_eq!(ctx.history.len(), 1);
}
