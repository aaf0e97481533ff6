extern crate rpeg;
use indexmap::IndexMap;
use rpeg::{
    codegen::js, compile, convert_passes, default_passes, generate, pass, CompileError, Expression,
    Format, Grammar, Options, PassSet, Rule,
};
use boa_engine::{Context, Module, Script, Source};
use rpegrt::{ClassPart, Expectation, SyntaxError};

// Log needs to be initialized once in the async mess that is cargo test
use std::sync::Once;
static LOGGER_INIT: Once = Once::new();

fn ensure_log_init() {
    LOGGER_INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init()
    });
}

// start = greeting " " name / name
// greeting = "hello"i
// name "name" = [a-z] [a-z]
// alias = name
fn greeting_grammar() -> Grammar {
    let letter = || Expression::class(vec![ClassPart::Range('a', 'z')], false, false);
    Grammar::new(vec![
        Rule::new(
            "start",
            Expression::Choice(vec![
                Expression::Sequence(vec![
                    Expression::rule_ref("greeting"),
                    Expression::literal(" "),
                    Expression::rule_ref("name"),
                ]),
                Expression::rule_ref("name"),
            ]),
        ),
        Rule::new("greeting", Expression::literal_i("hello")),
        Rule::new(
            "name",
            Expression::named("name", Expression::Sequence(vec![letter(), letter()])),
        ),
        Rule::new("alias", Expression::rule_ref("name")),
    ])
}

fn compile_safe(options: &Options) -> String {
    ensure_log_init();
    match generate(greeting_grammar(), options) {
        Ok(code) => code,
        Err(e) => {
            println!("{}", e);
            panic!("grammar failed to compile");
        }
    }
}

/// Parse the module with a real javascript parser: as a module for the Es
/// format, as a script for everything else
fn parse_js(code: &str, format: &Format) -> Result<(), String> {
    let mut context = Context::default();
    let parsed = match format {
        Format::Es => Module::parse(Source::from_bytes(code), None, &mut context).map(|_| ()),
        _ => Script::parse(Source::from_bytes(code), None, &mut context).map(|_| ()),
    };
    parsed.map_err(|err| err.to_string())
}

/// Load the generated parser into a fresh engine as the global `Parser`,
/// then evaluate `driver` against it. Whatever the driver evaluates to comes
/// back as a string. The engine has no console, so a parser that tries to
/// print anything fails here
fn run_parser(grammar: Grammar, options: Options, driver: &str) -> String {
    ensure_log_init();
    let code = match generate(grammar, &options.format(Format::Globals("Parser".to_string()))) {
        Ok(code) => code,
        Err(e) => {
            println!("{}", e);
            panic!("grammar failed to compile");
        }
    };
    let mut context = Context::default();
    if let Err(err) = context.eval(Source::from_bytes(&code)) {
        panic!("parser failed to load: {}\n{}", err, code);
    }
    match context.eval(Source::from_bytes(driver)) {
        Ok(value) => match value.to_string(&mut context) {
            Ok(text) => text.to_std_string_escaped(),
            Err(err) => panic!("driver result has no string form: {}", err),
        },
        Err(err) => panic!("driver failed: {}\n{}", err, driver),
    }
}

/// The message and expected set of the error from parsing `input`
const ERROR_DRIVER: &str = r#"(function() {
  try {
    Parser.parse(INPUT);
    return "parsed";
  } catch (e) {
    return e.message + "\n" + JSON.stringify(e.expected);
  }
})()"#;

fn parse_error(grammar: Grammar, input: &str) -> (String, String) {
    let driver = ERROR_DRIVER.replace("INPUT", &js::string_literal(input));
    let out = run_parser(grammar, Options::new(), &driver);
    let mut parts = out.splitn(2, '\n');
    let message = parts.next().unwrap_or_default().to_string();
    let expected = parts.next().unwrap_or_default().to_string();
    (message, expected)
}

#[test]
fn the_parser_checks_its_input() {
    assert!(parse_js("const a = 1;", &Format::Bare).is_ok());
    assert!(parse_js("s0 = ;", &Format::Bare).is_err());
    assert!(parse_js("if (a) { b(]; }", &Format::Bare).is_err());
    assert!(parse_js("const a = 1;\nexport { a };", &Format::CommonJs).is_err());
    assert!(parse_js("const a = 1;\nexport { a };", &Format::Es).is_ok());
}

#[test]
fn every_format_parses() {
    let formats = vec![
        Format::Bare,
        Format::CommonJs,
        Format::Es,
        Format::Globals("Parser".to_string()),
    ];
    for format in formats {
        for trace in &[false, true] {
            let code = compile_safe(&Options::new().format(format.clone()).trace(*trace));
            if let Err(problem) = parse_js(&code, &format) {
                panic!("{:?} (trace {}): {}\n{}", format, trace, problem, code);
            }
        }
    }
}

#[test]
fn parses_greetings() {
    let driver = r#"JSON.stringify([Parser.parse("ab"), Parser.parse("HeLLo xy")])"#;
    let out = run_parser(greeting_grammar(), Options::new(), driver);
    assert_eq!(out, r#"[["a","b"],["HeLLo"," ",["x","y"]]]"#);
}

#[test]
fn no_tracer_no_tracing() {
    // left out, null and undefined all mean off, and nothing gets printed
    let driver = r#"JSON.stringify([
  Parser.parse("ab"),
  Parser.parse("hello ab", { tracer: null }),
  Parser.parse("cd", { tracer: undefined })
])"#;
    let out = run_parser(greeting_grammar(), Options::new().trace(true), driver);
    assert_eq!(out, r#"[["a","b"],["hello"," ",["a","b"]],["c","d"]]"#);
}

#[test]
fn default_tracer_writes_to_its_sink() {
    let driver = r#"(function() {
  const lines = [];
  Parser.parse("ab", { tracer: new Parser.DefaultTracer(function(line) { lines.push(line); }) });
  return lines.join("\n");
})()"#;
    let out = run_parser(greeting_grammar(), Options::new().trace(true), driver);
    // same lines the rust DefaultTracer writes for the same events
    let expected = vec![
        "1:1-1:1 rule.enter start",
        "1:1-1:1 rule.enter   greeting",
        "1:1-1:1 rule.fail    greeting",
        "1:1-1:1 rule.enter   name",
        "1:1-1:3 rule.match   name",
        "1:1-1:3 rule.match start",
    ];
    assert_eq!(out, expected.join("\n"));

    let driver = r#"(function() {
  try {
    new Parser.DefaultTracer();
    return "constructed";
  } catch (e) {
    return e.message;
  }
})()"#;
    let out = run_parser(greeting_grammar(), Options::new().trace(true), driver);
    assert_eq!(out, "peg$DefaultTracer needs a sink to write lines to.");
}

#[test]
fn custom_tracers_see_every_event() {
    let driver = r#"(function() {
  const events = [];
  Parser.parse("ab", { tracer: { trace: function(event) { events.push(event.type + " " + event.rule); } } });
  return events.join(",");
})()"#;
    let out = run_parser(greeting_grammar(), Options::new().trace(true), driver);
    assert_eq!(
        out,
        "rule.enter start,rule.enter greeting,rule.fail greeting,rule.enter name,rule.match name,rule.match start"
    );
}

// start = "a" "b" / "a" "c" / "a"
fn repeated_literal_grammar() -> Grammar {
    Grammar::new(vec![Rule::new(
        "start",
        Expression::Choice(vec![
            Expression::Sequence(vec![Expression::literal("a"), Expression::literal("b")]),
            Expression::Sequence(vec![Expression::literal("a"), Expression::literal("c")]),
            Expression::literal("a"),
        ]),
    )])
}

#[test]
fn repeated_expectations_merge() {
    let (message, expected) = parse_error(repeated_literal_grammar(), "x");
    assert_eq!(message, "Expected \"a\" but \"x\" found.");
    assert_eq!(expected, r#"[{"type":"literal","text":"a","ignoreCase":false}]"#);
    assert_eq!(
        message,
        SyntaxError::build_message(&[Expectation::literal("a", false)], Some("x"))
    );

    let (message, expected) = parse_error(repeated_literal_grammar(), "ad");
    assert_eq!(message, "Expected \"b\", \"c\", or end of input but \"d\" found.");
    assert_eq!(
        expected,
        r#"[{"type":"literal","text":"b","ignoreCase":false},{"type":"literal","text":"c","ignoreCase":false},{"type":"end"}]"#
    );
}

#[test]
fn messages_match_the_rust_runtime() {
    let tricky_class = vec![ClassPart::Char(']'), ClassPart::Char('^'), ClassPart::Char('-')];
    let control_range = vec![ClassPart::Range('\u{7f}', '\u{85}')];
    let grammar = Grammar::new(vec![Rule::new(
        "start",
        Expression::Choice(vec![
            Expression::literal("\u{1}a"),
            Expression::class(tricky_class.clone(), false, false),
            Expression::class(control_range.clone(), true, false),
            Expression::literal("q\"\\"),
        ]),
    )]);
    let expectations = vec![
        Expectation::literal("\u{1}a", false),
        Expectation::class(tricky_class, false, false),
        Expectation::class(control_range, true, false),
        Expectation::literal("q\"\\", false),
    ];

    let (message, _) = parse_error(grammar.clone(), "\u{80}");
    assert_eq!(message, SyntaxError::build_message(&expectations, Some("\u{80}")));
    assert!(message.contains("\"\\x01a\""));
    assert!(message.contains("[\\]\\^\\-]"));
    assert!(message.contains("[^\\x7F-\\x85]"));
    assert!(message.ends_with("but \"\\x80\" found."));

    let (message, _) = parse_error(grammar, "");
    assert_eq!(message, SyntaxError::build_message(&expectations, None));
}

#[test]
fn format_wrappers() {
    let bare = compile_safe(&Options::new());
    assert!(bare.contains("\n(function() {\n  \"use strict\";\n"));
    assert!(bare.contains(
        "  return { StartRules: peg$allowedStartRules, SyntaxError: peg$SyntaxError, parse: peg$parse };\n"
    ));
    assert!(bare.ends_with("})()\n"));

    let commonjs = compile_safe(&Options::new().format(Format::CommonJs));
    assert!(commonjs.contains("\n\"use strict\";\n"));
    assert!(commonjs.ends_with(
        "module.exports = { StartRules: peg$allowedStartRules, SyntaxError: peg$SyntaxError, parse: peg$parse };\n"
    ));

    let es = compile_safe(&Options::new().format(Format::Es));
    assert!(!es.contains("use strict"));
    assert!(es.ends_with(
        "export { peg$allowedStartRules as StartRules, peg$SyntaxError as SyntaxError, peg$parse as parse };\n"
    ));

    let globals = compile_safe(&Options::new().format(Format::Globals("Greeter".to_string())));
    assert!(globals.contains("\n(function(root) {\n"));
    assert!(globals.contains("  root.Greeter = { StartRules: peg$allowedStartRules,"));
    assert!(globals.ends_with("})(this);\n"));
}

#[test]
fn headers() {
    let code = compile_safe(&Options::new());
    assert!(code.starts_with(&format!("// Generated by rpeg {}.\n\n", env!("CARGO_PKG_VERSION"))));
    let code = compile_safe(&Options::new().header("/* greeter */\n/* v2 */"));
    assert!(code.starts_with("/* greeter */\n/* v2 */\n\n"));
}

#[test]
fn expectation_constants() {
    let code = compile_safe(&Options::new());
    let constants = vec![
        "const peg$e0 = peg$literalExpectation(\" \", false);",
        "const peg$e1 = peg$literalExpectation(\"hello\", true);",
        "const peg$e2 = peg$otherExpectation(\"name\");",
        "const peg$e3 = peg$classExpectation([[\"a\", \"z\"]], false, false);",
        "const peg$e4 = peg$endExpectation();",
    ];
    for constant in constants {
        assert!(code.contains(constant), "missing {}", constant);
    }
    assert!(!code.contains("peg$e5"));
    for used in &["peg$fail(peg$e0)", "peg$fail(peg$e1)", "peg$fail(peg$e2)", "peg$fail(peg$e4)"] {
        assert!(code.contains(used), "missing {}", used);
    }
    assert!(code.contains("peg$matchesClass(input.charAt(peg$currPos), peg$e3)"));
}

#[test]
fn declarations_match_the_pool() {
    ensure_log_init();
    let mut grammar = greeting_grammar();
    let code = compile(&mut grammar, &convert_passes(default_passes()), &Options::new()).unwrap();
    assert_eq!(grammar.expectations.len(), 5);
    for (index, expected) in grammar.expectations.iter().enumerate() {
        let declaration = format!(
            "const peg$e{} = {};",
            index,
            js::expectation_declaration(expected)
        );
        assert!(code.contains(&declaration), "missing {}", declaration);
    }
    assert_eq!(grammar.code, Some(code));
}

#[test]
fn rule_functions() {
    let code = compile_safe(&Options::new());
    assert!(code.contains("function peg$parsestart() {"));
    assert!(code.contains("function peg$parsegreeting() {"));
    assert!(code.contains("function peg$parsename() {"));
    // proxy, and not a start rule
    assert!(!code.contains("peg$parsealias"));
    assert!(code.contains("if (input.substr(peg$currPos, 5).toLowerCase() === \"hello\") {"));
    assert!(code.contains("if (s0 === peg$FAILED) {"));
    assert!(code.contains("peg$silentFails++;"));
    assert!(code.contains("peg$silentFails--;"));
}

#[test]
fn start_rules() {
    let code = compile_safe(&Options::new());
    assert!(code.contains("const peg$allowedStartRules = [\"start\"];"));
    assert!(code.contains("const peg$startRuleFunctions = { \"start\": peg$parsestart };"));
    assert!(code.contains("let peg$startRuleFunction = peg$parsestart;"));
    assert!(code.contains("throw new Error(\"Can't start parsing from rule \\\"\" + options.startRule + \"\\\".\");"));

    let code = compile_safe(&Options::new().start_rules(&["*"]));
    assert!(code.contains("const peg$allowedStartRules = [\"start\", \"greeting\", \"name\", \"alias\"];"));
    // kept as an entry point this time
    assert!(code.contains("function peg$parsealias() {"));

    let code = compile_safe(&Options::new().start_rules(&["name", "greeting"]));
    assert!(code.contains("let peg$startRuleFunction = peg$parsename;"));
}

#[test]
fn tracing_only_when_asked() {
    let code = compile_safe(&Options::new());
    assert!(!code.contains("peg$tracer"));
    assert!(!code.contains("DefaultTracer"));
    assert!(!code.contains("startPos = peg$currPos"));

    let code = compile_safe(&Options::new().trace(true));
    assert!(code.contains("const peg$tracer = options.tracer ? options.tracer : null;"));
    assert!(code.contains("if (null !== peg$tracer) {"));
    assert!(!code.contains("console"));
    assert!(code.contains(
        "peg$tracer.trace({ type: \"rule.enter\", rule: \"start\", location: peg$computeLocation(startPos, startPos) });"
    ));
    assert!(code.contains(
        "peg$tracer.trace({ type: \"rule.match\", rule: \"name\", result: s0, location: peg$computeLocation(startPos, peg$currPos) });"
    ));
    assert!(code.contains(
        "peg$tracer.trace({ type: \"rule.fail\", rule: \"greeting\", location: peg$computeLocation(startPos, startPos) });"
    ));
    assert!(code.contains("case \"rule.enter\":"));
    assert!(code.contains("throw new Error(\"Invalid event type: \" + event.type + \".\");"));
    assert!(code.contains("DefaultTracer: peg$DefaultTracer }"));
}

#[test]
fn grammar_errors() {
    ensure_log_init();
    let grammar = Grammar::new(vec![
        Rule::new("a", Expression::rule_ref("nowhere")),
        Rule::new("a", Expression::Any),
    ]);
    match generate(grammar, &Options::new()) {
        Err(CompileError::Grammar(err)) => {
            assert_eq!(err.stage, "check");
            let messages: Vec<&str> = err.diagnostics.iter().map(|d| d.message.as_str()).collect();
            assert_eq!(
                messages,
                vec![
                    "Rule \"a\" is already defined at 1:1",
                    "Rule \"nowhere\" is not defined",
                ]
            );
        }
        other => panic!("expected a grammar error, got {:?}", other),
    }
}

#[test]
fn option_errors() {
    ensure_log_init();
    assert_eq!(
        generate(greeting_grammar(), &Options::new().start_rules(&["start", "nope"])),
        Err(CompileError::UnknownStartRule("nope".to_string()))
    );
    assert_eq!(
        generate(Grammar::default(), &Options::new()),
        Err(CompileError::EmptyGrammar)
    );
}

#[test]
fn custom_stages() {
    ensure_log_init();
    let mut stages = IndexMap::new();
    for (name, passes) in default_passes() {
        let after_transform = name == "transform";
        stages.insert(name, passes);
        if after_transform {
            let inspect = pass(|grammar, _, session| {
                // transform has run, generate hasn't
                assert!(grammar.rule("alias").is_none());
                assert!(grammar.code.is_none());
                session.warning(format!("{} rules left", grammar.rules.len()), None);
                Ok(())
            });
            stages.insert("inspect".to_string(), PassSet::from(vec![inspect]));
        }
    }
    let code = compile(&mut greeting_grammar(), &convert_passes(stages), &Options::new()).unwrap();
    assert!(code.contains("function peg$parsestart() {"));
}

#[test]
fn replacing_passes_by_name() {
    ensure_log_init();
    let mut stages = default_passes();
    if let Some(PassSet::Named(transform)) = stages.get_mut("transform") {
        transform.insert("remove_proxy_rules".to_string(), pass(|_, _, _| Ok(())));
    }
    let code = compile(&mut greeting_grammar(), &convert_passes(stages), &Options::new()).unwrap();
    assert!(code.contains("function peg$parsealias() {"));

    let mut stages = default_passes();
    if let Some(PassSet::Named(generate)) = stages.get_mut("generate") {
        generate.insert(
            "generate_js".to_string(),
            pass(|grammar, _, _| {
                grammar.code = Some("// nothing to see".to_string());
                Ok(())
            }),
        );
    }
    let code = compile(&mut greeting_grammar(), &convert_passes(stages), &Options::new());
    assert_eq!(code, Ok("// nothing to see".to_string()));

    let mut stages = default_passes();
    stages.remove("generate");
    assert_eq!(
        compile(&mut greeting_grammar(), &convert_passes(stages), &Options::new()),
        Err(CompileError::NoOutput)
    );
}
