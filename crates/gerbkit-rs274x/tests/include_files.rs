use gerbkit_core::{MessageLevel, Units};
use gerbkit_rs274x::scanner::read_command_code;
use gerbkit_rs274x::{
    CommandError, CommandOutcome, InterpreterConfig, LineCursor, MemoryIncludeResolver,
    Rs274xInterpreter,
};
use std::fs;

/// f1 includes f2, f2 includes f3, ... each file has a marker line after
/// its include command.
fn include_chain(len: usize) -> MemoryIncludeResolver {
    let mut resolver = MemoryIncludeResolver::new();
    for k in 1..=len {
        resolver.add(
            format!("f{}.gbr", k),
            format!("IFf{}.gbr*\nMARKER{}*\n", k + 1, k),
        );
    }
    resolver
}

#[test]
fn test_include_depth_limit() {
    let mut interp = Rs274xInterpreter::new().with_resolver(include_chain(11));
    let mut cursor = LineCursor::from_text("IFf1.gbr*\n");
    cursor.refill().unwrap();

    for depth in 1..=10 {
        let code = read_command_code(&mut cursor);
        let outcome = interp.execute_command(code, &mut cursor).unwrap();
        assert_eq!(outcome, CommandOutcome::Applied);
        assert_eq!(cursor.include_depth(), depth);
        // next line comes from the file just opened
        assert!(cursor.refill().unwrap());
    }

    assert_eq!(cursor.remaining(), b"IFf11.gbr*\n");
    let code = read_command_code(&mut cursor);
    let outcome = interp.execute_command(code, &mut cursor).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Failed(CommandError::IncludeDepthExceeded { max: 10 })
    );
    assert_eq!(cursor.include_depth(), 10);

    // still reading the tenth file
    assert!(cursor.refill().unwrap());
    assert_eq!(cursor.remaining(), b"MARKER10*\n");
}

#[test]
fn test_nested_includes_in_a_layer() {
    let mut resolver = MemoryIncludeResolver::new();
    for k in 1..=10 {
        resolver.add(format!("f{}.gbr", k), format!("%IFf{}.gbr*%\n", k + 1));
    }
    resolver.add("f11.gbr", "%MOMM*%\n");

    let mut interp = Rs274xInterpreter::new().with_resolver(resolver);
    let summary = interp.parse_str("%IFf1.gbr*%\n").unwrap();

    assert_eq!(summary.extended_blocks, 11);
    assert_eq!(summary.failed_commands, 1);
    // f11 was never opened
    assert_eq!(interp.image().units, Units::Inch);
    let errors: Vec<_> = interp
        .messages()
        .at_least(MessageLevel::Error)
        .map(|m| m.text.clone())
        .collect();
    assert_eq!(errors, vec!["Too many include files (maximum 10)".to_string()]);
}

#[test]
fn test_included_commands_apply_then_parent_resumes() {
    let resolver =
        MemoryIncludeResolver::new().with_file("apertures.gbr", "%ADD10C,0.010*%\n%MOMM*%\n");
    let mut interp = Rs274xInterpreter::new().with_resolver(resolver);
    interp
        .parse_str("%IFapertures.gbr*%\n%ADD11C,0.254*%\n")
        .unwrap();

    assert!(interp.apertures().get(10).unwrap().defined);
    // D11 was read after the include switched units to mm
    assert_eq!(interp.apertures().get(11).unwrap().size.x, 100);
}

#[test]
fn test_missing_include_keeps_current_stream() {
    let mut interp = Rs274xInterpreter::new().with_resolver(MemoryIncludeResolver::new());
    let summary = interp.parse_str("%IFnope.gbr*%\n%MOMM*%\n").unwrap();

    assert_eq!(summary.failed_commands, 1);
    assert_eq!(interp.image().units, Units::Millimeter);
    assert!(interp.messages().has_errors());
    assert_eq!(
        interp.messages().messages()[0].text,
        "Include file <nope.gbr> not found"
    );
}

#[test]
fn test_filesystem_include_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("PADS.GBR"), "%ADD12R,0.05X0.03*%\n").unwrap();
    let main = dir.path().join("top.gbr");
    fs::write(&main, "%IFpads.gbr*%\nM02*\n").unwrap();

    let config = InterpreterConfig {
        include_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let mut interp = Rs274xInterpreter::with_config(config).unwrap();
    let summary = interp.parse_file(&main).unwrap();

    assert_eq!(summary.failed_commands, 0);
    assert_eq!(summary.data_blocks, 1);
    let d12 = interp.apertures().get(12).unwrap();
    assert!(d12.defined);
    assert_eq!(d12.size.y, 300);
}

#[test]
fn test_nested_include_names_resolve_against_include_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("outer.gbr"), "%IFinner.gbr*%\n").unwrap();
    fs::write(dir.path().join("inner.gbr"), "%MOMM*%\n").unwrap();

    let config = InterpreterConfig {
        include_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let mut interp = Rs274xInterpreter::with_config(config).unwrap();
    let summary = interp.parse_str("%IFsub/outer.gbr*%\n").unwrap();

    assert_eq!(summary.failed_commands, 0);
    assert_eq!(summary.extended_blocks, 3);
    assert_eq!(interp.image().units, Units::Millimeter);
}

#[test]
fn test_config_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interp.json");
    let config = InterpreterConfig {
        max_include_depth: 2,
        ..Default::default()
    };
    config.save_to_file(&path).unwrap();
    let loaded = InterpreterConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}
