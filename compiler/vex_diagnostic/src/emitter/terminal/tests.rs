use super::*;
use crate::ErrorCode;
use vex_ir::Span;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message("cannot assign twice to immutable binding `x`")
        .with_label(Span::new(11, 18), "cannot assign twice to immutable binding")
        .with_secondary_label(Span::new(4, 5), "first assignment to `x`")
        .with_note("`x` is declared immutable")
        .with_hint("consider making this binding mutable: `let! x`")
}

fn render(emitter: TerminalEmitter<Vec<u8>>, diag: &Diagnostic) -> String {
    let mut emitter = emitter;
    emitter.emit(diag);
    emitter.flush();
    String::from_utf8(emitter.into_inner()).unwrap()
}

#[test]
fn plain_output_has_all_parts() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, true);
    let text = render(emitter, &sample_diagnostic());
    assert!(text.starts_with("error[E1001]: cannot assign twice"));
    assert!(text.contains("--> 11..18"));
    assert!(text.contains("note: `x` is declared immutable"));
    assert!(text.contains("help: consider making this binding mutable"));
    assert!(!text.contains("\x1b["));
}

#[test]
fn always_mode_colors_without_tty() {
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Always, false);
    let text = render(emitter, &sample_diagnostic());
    assert!(text.contains("\x1b["));
}

#[test]
fn source_renders_line_col_and_snippet() {
    let source = "let x = 42\nx = 100\n";
    let emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false)
        .with_source(source)
        .with_file_path("main.vx");
    let text = render(emitter, &sample_diagnostic());

    assert!(text.contains("--> main.vx:2:1"), "got:\n{text}");
    assert!(text.contains("main.vx:1:5"), "got:\n{text}");
    assert!(text.contains("   2 | x = 100"), "got:\n{text}");
    assert!(text.contains("^^^^^^^"), "got:\n{text}");
    assert!(text.contains("    -"), "got:\n{text}");
}

#[test]
fn summary_pluralizes() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(2);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.contains("aborting due to 2 previous errors"));

    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(1);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.contains("aborting due to previous error"));
}

#[test]
fn summary_silent_without_errors() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(0);
    assert!(emitter.into_inner().is_empty());
}

#[test]
fn color_mode_parsing() {
    assert_eq!(ColorMode::parse("never"), Some(ColorMode::Never));
    assert_eq!(ColorMode::parse("always"), Some(ColorMode::Always));
    assert_eq!(ColorMode::parse("auto"), Some(ColorMode::Auto));
    assert_eq!(ColorMode::parse("sometimes"), None);
    assert!(ColorMode::Auto.enabled(true));
    assert!(!ColorMode::Auto.enabled(false));
}
