// The generate stage: gather up every expectation the parser will refer to,
// then write the parser out as a javascript module

use indexmap::IndexSet;
use rpegrt::{EventKind, Expectation};

use crate::{
    codegen::{const_decl, js, let_decl, Code, Ref},
    intermediates::{Expression, Grammar, Rule},
    CompileError, Format, Options, Session,
};

/// Fill [Grammar::expectations] with every expectation a failure site of
/// the grammar can report, each exactly once, plus end of input for the
/// entry point
pub fn collect_expectations(
    grammar: &mut Grammar,
    _options: &Options,
    _session: &mut Session,
) -> Result<(), CompileError> {
    let mut expectations = IndexSet::new();
    for rule in &grammar.rules {
        rule.expression.walk(&mut |expression| {
            if let Some(expected) = expression.expectation() {
                expectations.insert(expected);
            }
        });
    }
    expectations.insert(Expectation::end());
    debug!("{} expectation constants", expectations.len());
    grammar.expectations = expectations;
    Ok(())
}

// Names the generated code is written in terms of
fn input() -> Ref {
    Ref::new("input")
}
fn curr_pos() -> Ref {
    Ref::new("peg$currPos")
}
fn failed() -> Ref {
    Ref::new("peg$FAILED")
}
fn silent_fails() -> Ref {
    Ref::new("peg$silentFails")
}
fn tracer() -> Ref {
    Ref::new("peg$tracer")
}
fn char_at(pos: &Ref) -> Ref {
    Ref::new("input.charAt").call(&[pos])
}
fn rule_function(name: &str) -> Ref {
    Ref::new(format!("peg$parse{}", name))
}
fn expectation_constant(index: usize) -> Ref {
    Ref::new(format!("peg$e{}", index))
}

/// Field names of each expectation's javascript object, besides `type`.
/// Same fields as the rust variants, in the same order
fn expectation_fields(expected: &Expectation) -> &'static [&'static str] {
    match expected {
        Expectation::Literal { .. } => &["text", "ignoreCase"],
        Expectation::Class { .. } => &["parts", "inverted", "ignoreCase"],
        Expectation::Any | Expectation::End => &[],
        Expectation::Other { .. } => &["description"],
    }
}

/// One constructor per expectation tag, producing `{ type: tag, ...fields }`
fn expectation_constructors(code: &mut Code) {
    let samples = vec![
        Expectation::literal("", false),
        Expectation::class(vec![], false, false),
        Expectation::any(),
        Expectation::end(),
        Expectation::other(""),
    ];
    for sample in &samples {
        let fields = expectation_fields(sample);
        let mut object = vec![format!("type: {}", js::string_literal(sample.tag()))];
        object.extend(fields.iter().map(|field| format!("{}: {}", field, field)));
        code.open(format!(
            "function {}({})",
            js::expectation_constructor(sample.tag()),
            fields.join(", ")
        ));
        code.line(format!("return {{ {} }};", object.join(", ")));
        code.close();
        code.line("");
    }
}

const SYNTAX_ERROR: &str = r#"class peg$SyntaxError extends Error {
  constructor(message, expected, found, location) {
    super(message);
    this.expected = expected;
    this.found = found;
    this.location = location;
    this.name = "SyntaxError";
  }

  static buildMessage(expected, found) {
    function escapeControl(ch) {
      switch (ch) {
        case "\0":
          return "\\0";
        case "\t":
          return "\\t";
        case "\n":
          return "\\n";
        case "\r":
          return "\\r";
      }
      const code = ch.charCodeAt(0);
      if (code <= 0x1F || (code >= 0x7F && code <= 0x9F)) {
        return "\\x" + (code < 16 ? "0" : "") + code.toString(16).toUpperCase();
      }
      return ch;
    }

    function escapeWith(text, special) {
      let out = "";
      for (const ch of text) {
        out += special.indexOf(ch) !== -1 ? "\\" + ch : escapeControl(ch);
      }
      return out;
    }

    function literalEscape(text) {
      return escapeWith(text, "\\\"");
    }

    function classEscape(text) {
      return escapeWith(text, "\\]^-");
    }

    function describeExpectation(expectation) {
      switch (expectation.type) {
        case "%LITERAL%":
          return "\"" + literalEscape(expectation.text) + "\"";
        case "%CLASS%":
          return "[" + (expectation.inverted ? "^" : "") + expectation.parts.map(function(part) {
            return Array.isArray(part) ? classEscape(part[0]) + "-" + classEscape(part[1]) : classEscape(part);
          }).join("") + "]";
        case "%ANY%":
          return "any character";
        case "%END%":
          return "end of input";
        default:
          return expectation.description;
      }
    }

    const descriptions = expected.map(describeExpectation).sort().filter(function(description, i, all) {
      return i === 0 || description !== all[i - 1];
    });
    let described;
    if (descriptions.length === 0) {
      described = "nothing";
    } else if (descriptions.length <= 2) {
      described = descriptions.join(" or ");
    } else {
      described = descriptions.slice(0, -1).join(", ") + ", or " + descriptions[descriptions.length - 1];
    }
    return "Expected " + described + " but " + (found !== null ? "\"" + literalEscape(found) + "\"" : "end of input") + " found.";
  }
}"#;

const DEFAULT_TRACER: &str = r#"class peg$DefaultTracer {
  constructor(sink) {
    if (typeof sink !== "function") {
      throw new Error("peg$DefaultTracer needs a sink to write lines to.");
    }
    this.sink = sink;
    this.indentLevel = 0;
  }

  log(event) {
    const location = event.location.start.line + ":" + event.location.start.column + "-"
      + event.location.end.line + ":" + event.location.end.column;
    this.sink(location + " " + event.type.padEnd(10, " ") + " " + "  ".repeat(this.indentLevel) + event.rule);
  }

  trace(event) {
    switch (event.type) {
      case "%ENTER%":
        this.log(event);
        this.indentLevel++;
        break;
      case "%MATCH%":
      case "%FAIL%":
        if (this.indentLevel === 0) {
          throw new Error("Unbalanced " + event.type + " for rule " + event.rule + ".");
        }
        this.indentLevel--;
        this.log(event);
        break;
      default:
        throw new Error("Invalid event type: " + event.type + ".");
    }
  }
}"#;

const PARSE_HELPERS: &str = r#"function peg$computePosDetails(pos) {
  let details = peg$posDetailsCache[pos];
  let p;
  if (details) {
    return details;
  }
  if (pos >= peg$posDetailsCache.length) {
    p = peg$posDetailsCache.length - 1;
  } else {
    p = pos;
    while (!peg$posDetailsCache[--p]) {}
  }
  details = peg$posDetailsCache[p];
  details = { line: details.line, column: details.column };
  while (p < pos) {
    if (input.charCodeAt(p) === 10) {
      details.line++;
      details.column = 1;
    } else {
      details.column++;
    }
    p++;
  }
  peg$posDetailsCache[pos] = details;
  return details;
}

function peg$computeLocation(startPos, endPos) {
  const startPosDetails = peg$computePosDetails(startPos);
  const endPosDetails = peg$computePosDetails(endPos);
  return {
    start: { offset: startPos, line: startPosDetails.line, column: startPosDetails.column },
    end: { offset: endPos, line: endPosDetails.line, column: endPosDetails.column }
  };
}

function peg$fail(expected) {
  if (peg$currPos < peg$maxFailPos) {
    return;
  }
  if (peg$currPos > peg$maxFailPos) {
    peg$maxFailPos = peg$currPos;
    peg$maxFailExpected = [];
  }
  if (peg$maxFailExpected.indexOf(expected) === -1) {
    peg$maxFailExpected.push(expected);
  }
}

function peg$matchesClass(ch, expectation) {
  if (ch === "") {
    return false;
  }
  const candidates = expectation.ignoreCase ? [ch, ch.toLowerCase(), ch.toUpperCase()] : [ch];
  const inClass = expectation.parts.some(function(part) {
    return candidates.some(function(c) {
      return Array.isArray(part) ? part[0] <= c && c <= part[1] : part === c;
    });
  });
  return inClass !== expectation.inverted;
}

function peg$buildStructuredError(expected, found, location) {
  return new peg$SyntaxError(peg$SyntaxError.buildMessage(expected, found), expected, found, location);
}"#;

const THROW_FURTHEST_FAILURE: &str = r#"throw peg$buildStructuredError(
  peg$maxFailExpected,
  peg$maxFailPos < input.length ? input.charAt(peg$maxFailPos) : null,
  peg$maxFailPos < input.length
    ? peg$computeLocation(peg$maxFailPos, peg$maxFailPos + 1)
    : peg$computeLocation(peg$maxFailPos, peg$maxFailPos)
);"#;

fn syntax_error_class() -> String {
    SYNTAX_ERROR
        .replace("%LITERAL%", Expectation::literal("", false).tag())
        .replace("%CLASS%", Expectation::class(vec![], false, false).tag())
        .replace("%ANY%", Expectation::any().tag())
        .replace("%END%", Expectation::end().tag())
}

fn default_tracer_class() -> String {
    DEFAULT_TRACER
        .replace("%ENTER%", EventKind::Enter.as_str())
        .replace("%MATCH%", EventKind::Match.as_str())
        .replace("%FAIL%", EventKind::Fail.as_str())
}

/// `peg$tracer.trace({ type: ..., rule: ..., location: ... });`
fn trace_call(kind: EventKind, rule: &str, start: &Ref, end: &Ref, result: Option<&Ref>) -> String {
    let mut fields = vec![
        format!("type: {}", js::string_literal(kind.as_str())),
        format!("rule: {}", js::string_literal(rule)),
    ];
    if let Some(result) = result {
        fields.push(format!("result: {}", result));
    }
    let location = Ref::new("peg$computeLocation").call(&[start, end]);
    fields.push(format!("location: {}", location));
    let event = format!("{{ {} }}", fields.join(", "));
    format!("{};", Ref::new(format!("{}.trace", tracer())).call(&[&event]))
}

struct Generator<'g> {
    expectations: &'g IndexSet<Expectation>,
    trace: bool,
    /// registers (s0, s1, ...) used so far by the rule being generated
    registers: usize,
}

impl<'g> Generator<'g> {
    fn register(&mut self) -> Ref {
        let register = Ref::new(format!("s{}", self.registers));
        self.registers += 1;
        register
    }

    fn constant(&self, expected: &Expectation) -> Result<Ref, CompileError> {
        match self.expectations.get_full(expected) {
            Some((index, _)) => Ok(expectation_constant(index)),
            None => Err(CompileError::Pass(format!(
                "expectation {} was never collected (collect_expectations has to run before generate_js)",
                expected.describe()
            ))),
        }
    }

    /// Record a failure, unless failures are being silenced
    fn fail(&self, expected: &Expectation, code: &mut Code) -> Result<(), CompileError> {
        let constant = self.constant(expected)?;
        code.open(format!("if ({})", silent_fails().equal(0)));
        code.line(format!("{};", Ref::new("peg$fail").call(&[&constant])));
        code.close();
        Ok(())
    }

    /// The else branch of a leaf match that's already been opened
    fn or_fail(&self, expected: &Expectation, target: &Ref, code: &mut Code) -> Result<(), CompileError> {
        code.else_();
        code.line(target.set(failed()));
        self.fail(expected, code)?;
        code.close();
        Ok(())
    }

    /// Code that leaves the result of `expression` (or peg$FAILED) in
    /// `target`. On failure peg$currPos is back where it started
    fn expression(
        &mut self,
        expression: &Expression,
        target: &Ref,
        code: &mut Code,
    ) -> Result<(), CompileError> {
        let pos = curr_pos();
        match expression {
            Expression::Literal { value, ignore_case } => {
                // javascript lengths are in utf-16 units
                let len = value.encode_utf16().count();
                let slice = input().substr(&pos, len);
                let (test, matched) = if *ignore_case {
                    let lower = js::string_literal(&value.to_lowercase());
                    (slice.to_lower_case().equal(lower), slice.to_string())
                } else {
                    (slice.equal(js::string_literal(value)), js::string_literal(value))
                };
                code.open(format!("if ({})", test));
                code.line(target.set(matched));
                code.line(pos.set(format!("{} + {}", pos, len)));
                self.or_fail(&Expectation::literal(value.as_str(), *ignore_case), target, code)?;
            }
            Expression::Class {
                parts,
                inverted,
                ignore_case,
            } => {
                let expected = Expectation::class(parts.clone(), *inverted, *ignore_case);
                let constant = self.constant(&expected)?;
                let test = Ref::new("peg$matchesClass").call(&[&char_at(&pos), &constant]);
                code.open(format!("if ({})", test));
                code.line(target.set(char_at(&pos)));
                code.line(format!("{};", pos.inc()));
                self.or_fail(&expected, target, code)?;
            }
            Expression::Any => {
                code.open(format!("if ({} > {})", input().length(), pos));
                code.line(target.set(char_at(&pos)));
                code.line(format!("{};", pos.inc()));
                self.or_fail(&Expectation::any(), target, code)?;
            }
            Expression::RuleRef { name, .. } => {
                code.line(target.set(rule_function(name).call(&[])));
            }
            Expression::Sequence(elements) => {
                if elements.is_empty() {
                    code.line(target.set("[]"));
                    return Ok(());
                }
                let saved = self.register();
                code.line(saved.set(&pos));
                let mut results = vec![];
                for element in elements {
                    let result = self.register();
                    self.expression(element, &result, code)?;
                    code.open(format!("if ({})", failed().not_equal(&result)));
                    results.push(result.to_string());
                }
                code.line(target.set(format!("[{}]", results.join(", "))));
                for _ in elements {
                    code.else_();
                    code.line(pos.set(&saved));
                    code.line(target.set(failed()));
                    code.close();
                }
            }
            Expression::Choice(alternatives) => {
                let (first, rest) = match alternatives.split_first() {
                    Some(split) => split,
                    None => {
                        code.line(target.set(failed()));
                        return Ok(());
                    }
                };
                self.expression(first, target, code)?;
                for alternative in rest {
                    code.open(format!("if ({})", target.equal(failed())));
                    self.expression(alternative, target, code)?;
                }
                for _ in rest {
                    code.close();
                }
            }
            Expression::Named { name, expression } => {
                code.line(format!("{};", silent_fails().inc()));
                self.expression(expression, target, code)?;
                code.line(format!("{};", silent_fails().dec()));
                code.open(format!("if ({})", target.equal(failed())));
                self.fail(&Expectation::other(name.as_str()), code)?;
                code.close();
            }
        }
        Ok(())
    }

    fn rule(&mut self, rule: &Rule) -> Result<Code, CompileError> {
        self.registers = 0;
        let result = self.register();
        let start = Ref::new("startPos");
        let mut body = Code::new();
        // tracing is compiled in but stays off unless the caller passes a tracer
        let tracing = format!("if ({})", tracer().not_equal("null"));
        if self.trace {
            body.line(const_decl(&start, curr_pos()));
            body.open(&tracing);
            body.line(trace_call(EventKind::Enter, &rule.name, &start, &start, None));
            body.close();
            body.line("");
        }
        self.expression(&rule.expression, &result, &mut body)?;
        if self.trace {
            body.line("");
            body.open(&tracing);
            body.open(format!("if ({})", failed().not_equal(&result)));
            body.line(trace_call(EventKind::Match, &rule.name, &start, &curr_pos(), Some(&result)));
            body.else_();
            body.line(trace_call(EventKind::Fail, &rule.name, &start, &start, None));
            body.close();
            body.close();
        }
        body.line(format!("return {};", result));

        let registers: Vec<String> = (0..self.registers).map(|n| format!("s{}", n)).collect();
        let mut function = Code::new();
        function.open(format!("function {}()", rule_function(&rule.name)));
        function.line(let_decl(registers.join(", "), None));
        function.line("");
        function.lines(&body.finish());
        function.close();
        Ok(function)
    }
}

/// Write the whole parser module into [Grammar::code]
pub fn generate_js(
    grammar: &mut Grammar,
    options: &Options,
    _session: &mut Session,
) -> Result<(), CompileError> {
    let default_rule = match options.allowed_start_rules.first() {
        Some(rule) => rule,
        None => {
            return Err(CompileError::Pass(
                "no start rules, options have to be resolved against the grammar first".to_string(),
            ))
        }
    };
    let mut generator = Generator {
        expectations: &grammar.expectations,
        trace: options.trace,
        registers: 0,
    };
    let mut functions = vec![];
    for rule in &grammar.rules {
        functions.push(generator.rule(rule)?);
    }
    let end = generator.constant(&Expectation::end())?;

    let mut code = Code::new();
    match &options.header {
        Some(header) => code.lines(header),
        None => code.line(format!("// Generated by rpeg {}.", env!("CARGO_PKG_VERSION"))),
    }
    code.line("");
    match &options.format {
        Format::Bare => code.open("(function()"),
        Format::Globals(_) => code.open("(function(root)"),
        Format::CommonJs | Format::Es => {}
    }
    if options.format != Format::Es {
        code.line("\"use strict\";");
        code.line("");
    }

    code.lines(&syntax_error_class());
    code.line("");
    expectation_constructors(&mut code);
    if options.trace {
        code.lines(&default_tracer_class());
        code.line("");
    }
    let allowed: Vec<String> = options
        .allowed_start_rules
        .iter()
        .map(|rule| js::string_literal(rule))
        .collect();
    code.line(const_decl("peg$allowedStartRules", format!("[{}]", allowed.join(", "))));
    code.line("");

    code.open("function peg$parse(input, options)");
    code.line(Ref::new("options").set("options !== undefined ? options : {}"));
    code.line("");
    code.line(const_decl(failed(), "{}"));
    let table: Vec<String> = options
        .allowed_start_rules
        .iter()
        .map(|rule| format!("{}: {}", js::string_literal(rule), rule_function(rule)))
        .collect();
    code.line(const_decl("peg$startRuleFunctions", format!("{{ {} }}", table.join(", "))));
    code.line(let_decl("peg$startRuleFunction", Some(&rule_function(default_rule))));
    code.line("");
    for (index, expected) in grammar.expectations.iter().enumerate() {
        code.line(const_decl(
            expectation_constant(index),
            js::expectation_declaration(expected),
        ));
    }
    code.line("");
    code.line(let_decl(curr_pos(), Some(&0)));
    code.line(let_decl("peg$posDetailsCache", Some(&"[{ line: 1, column: 1 }]")));
    code.line(let_decl("peg$maxFailPos", Some(&0)));
    code.line(let_decl("peg$maxFailExpected", Some(&"[]")));
    code.line(let_decl(silent_fails(), Some(&0)));
    if options.trace {
        code.line(const_decl(tracer(), "options.tracer ? options.tracer : null"));
    }
    code.line("");
    code.line(let_decl("peg$result", None));
    code.line("");
    code.open("if (\"startRule\" in options)");
    code.open("if (!(options.startRule in peg$startRuleFunctions))");
    code.line("throw new Error(\"Can't start parsing from rule \\\"\" + options.startRule + \"\\\".\");");
    code.close();
    code.line(
        Ref::new("peg$startRuleFunction").set(Ref::new("peg$startRuleFunctions").get("options.startRule")),
    );
    code.close();
    code.line("");
    code.lines(PARSE_HELPERS);
    for function in functions {
        code.line("");
        code.lines(&function.finish());
    }
    code.line("");

    let result = Ref::new("peg$result");
    code.line(result.set(Ref::new("peg$startRuleFunction").call(&[])));
    code.line("");
    let matched = failed().not_equal(&result);
    code.open(format!("if ({} && {})", matched, curr_pos().equal(input().length())));
    code.line(format!("return {};", result));
    code.close();
    code.open(format!("if ({} && {} < {})", matched, curr_pos(), input().length()));
    code.line(format!("{};", Ref::new("peg$fail").call(&[&end])));
    code.close();
    code.line("");
    code.lines(THROW_FURTHEST_FAILURE);
    code.close();
    code.line("");

    let mut exports = vec![
        ("StartRules", "peg$allowedStartRules"),
        ("SyntaxError", "peg$SyntaxError"),
        ("parse", "peg$parse"),
    ];
    if options.trace {
        exports.push(("DefaultTracer", "peg$DefaultTracer"));
    }
    let object: Vec<String> = exports
        .iter()
        .map(|(name, local)| format!("{}: {}", name, local))
        .collect();
    let object = format!("{{ {} }}", object.join(", "));
    match &options.format {
        Format::Bare => {
            code.line(format!("return {};", object));
            code.close_with("})()");
        }
        Format::Globals(var) => {
            code.line(Ref::new(format!("root.{}", var)).set(&object));
            code.close_with("})(this);");
        }
        Format::CommonJs => code.line(Ref::new("module.exports").set(&object)),
        Format::Es => {
            let names: Vec<String> = exports
                .iter()
                .map(|(name, local)| format!("{} as {}", local, name))
                .collect();
            code.line(format!("export {{ {} }};", names.join(", ")));
        }
    }

    debug!(
        "generated {} rule functions, {} expectation constants",
        grammar.rules.len(),
        grammar.expectations.len()
    );
    grammar.code = Some(code.finish());
    Ok(())
}
