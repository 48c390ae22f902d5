//! End-to-end pipeline tests.
//!
//! Each test follows the same pattern: build an obfuscated input (compressing
//! string tables with the reference encoder where needed), run the full
//! pipeline, and assert on the exact shape of the output source.

mod common;

use clearscript::{deobfuscate, DeobfuscationEngine, EngineConfig};
use common::{compress_to_utf16, escape_payload};

/// Builds a script that decodes `table` through a decoder function `D` sitting
/// next to the call site, plus the given body.
fn table_script(table: &str, body: &str) -> String {
    let payload = escape_payload(&compress_to_utf16(table));
    format!(
        "var payload = \"{payload}\";\n\
         var TBL = codec.decompressFromUTF16(payload).split(\"|\");\n\
         D = function (i) {{ return TBL[i]; }};\n\
         {body}\n"
    )
}

#[test]
fn array_access_inlined_and_array_kept() {
    let source = "const A = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]; x = A[0x3];";
    let output = deobfuscate(source).unwrap();
    assert!(output.contains("x = 3"));
    assert!(output.contains("const A = ["));
}

#[test]
fn string_chain_merged() {
    let output = deobfuscate(r#"s = "foo" + "bar" + "baz";"#).unwrap();
    assert!(output.contains(r#"s = "foobarbaz""#));
}

#[test]
fn bracket_access_simplified_unless_reserved() {
    let output = deobfuscate(r#"a = obj["length"]; b = obj["for"];"#).unwrap();
    assert!(output.contains("obj.length"));
    assert!(output.contains(r#"obj["for"]"#));
}

#[test]
fn boolean_encodings_simplified() {
    let output = deobfuscate("x = !0 ? a : b; y = !1 && zzz();").unwrap();
    assert!(output.contains("x = a"));
    assert!(output.contains("y = false"));
    assert!(!output.contains("zzz"));
}

#[test]
fn resolver_call_inlined() {
    let source = r#"
        function R(k) {
            switch (k) {
                case "D": return g["Date"];
                case "C": return g["console"];
                case "M": return g["Math"];
                case "S": return g["String"];
                case "O": return g["Object"];
            }
        }
        z = R("D")();
    "#;
    let output = deobfuscate(source).unwrap();
    assert!(output.contains("z = Date()"));
}

#[test]
fn resolver_unknown_key_left_alone() {
    let source = r#"
        function R(k) {
            switch (k) {
                case "D": return g["Date"];
                case "C": return g["console"];
                case "M": return g["Math"];
                case "S": return g["String"];
                case "O": return g["Object"];
            }
        }
        z = R("??")();
    "#;
    let output = deobfuscate(source).unwrap();
    assert!(output.contains(r#"R("??")"#));
}

#[test]
fn resolver_never_introduces_non_allowlisted_name() {
    // "E" maps outside the allow-list and must survive as a call even though
    // the resolver itself is promoted (five other mappings are valid).
    let source = r#"
        function R(k) {
            switch (k) {
                case "D": return g["Date"];
                case "C": return g["console"];
                case "M": return g["Math"];
                case "S": return g["String"];
                case "O": return g["Object"];
                case "E": return g["exfiltrate"];
            }
        }
        a = R("D"); b = R("E");
    "#;
    let output = deobfuscate(source).unwrap();
    assert!(output.contains("a = Date"));
    assert!(output.contains(r#"b = R("E")"#));
    assert!(!output.contains("b = exfiltrate"));
}

#[test]
fn decoder_call_inlined_via_textual_fallback() {
    let source = table_script("alpha|beta|gamma", "y = D(2);");
    let output = deobfuscate(&source).unwrap();
    assert!(output.contains(r#"y = "gamma""#));
}

#[test]
fn decoder_argument_folds_before_inlining() {
    let source = table_script("alpha|beta|gamma", "y = D(1 + 1); z = D(0x1);");
    let output = deobfuscate(&source).unwrap();
    assert!(output.contains(r#"y = "gamma""#));
    assert!(output.contains(r#"z = "beta""#));
}

#[test]
fn decoder_out_of_range_left_alone() {
    let source = table_script("alpha|beta", "y = D(7);");
    let output = deobfuscate(&source).unwrap();
    assert!(output.contains("D(7)"));
}

#[test]
fn decoder_found_by_ast_strategy_when_assignment_is_far() {
    // 1200 characters of padding defeat the 1000-character textual window, so
    // only the enclosing-function scan can identify the decoder.
    let payload = escape_payload(&compress_to_utf16("alpha|beta|gamma"));
    let padding = "x".repeat(1200);
    let source = format!(
        "(function () {{\n\
           var TBL = codec.decompressFromUTF16(\"{payload}\").split(\"|\");\n\
           var pad = \"{padding}\";\n\
           D = function (i) {{ return TBL[i]; }};\n\
         }})();\n\
         y = D(0);\n"
    );
    let output = deobfuscate(&source).unwrap();
    assert!(output.contains(r#"y = "alpha""#));
}

#[test]
fn nested_decoder_and_array_indirection() {
    let payload = escape_payload(&compress_to_utf16("alpha|beta|gamma|delta"));
    let source = format!(
        "var K = [2, 0, 1, 5, 3, 4, 9, 8, 7, 6];\n\
         var payload = \"{payload}\";\n\
         var TBL = codec.decompressFromUTF16(payload).split(\"|\");\n\
         D = function (i) {{ return TBL[i]; }};\n\
         msg = D(K[0x4]) + \" \" + D(1);\n"
    );
    let engine = DeobfuscationEngine::with_defaults();
    let (output, result) = engine.process_source(&source).unwrap();
    // K[4] = 3 → D(3) = "delta", then the chain folds.
    assert!(output.contains(r#"msg = "delta beta""#));
    // The nested rewrite needs one decoder/array interleave iteration plus one
    // confirming iteration.
    assert!(result.phase_iterations[1] >= 2);
    assert!(result.stats.decoder_calls_inlined == 2);
    assert!(result.stats.array_accesses_inlined == 1);
}

#[test]
fn kitchen_sink_bundle() {
    let payload = escape_payload(&compress_to_utf16("alpha|beta|gamma|delta"));
    let source = format!(
        "var K = [2, 0, 1, 5, 3, 4, 9, 8, 7, 6];\n\
         var payload = \"{payload}\";\n\
         var TBL = codec.decompressFromUTF16(payload).split(\"|\");\n\
         D = function (i) {{ return TBL[i]; }};\n\
         function G(k) {{\n\
           switch (k) {{\n\
             case \"c\": return w[\"console\"];\n\
             case \"d\": return w[\"Date\"];\n\
             case \"j\": return w[\"JSON\"];\n\
             case \"m\": return w[\"Math\"];\n\
             case \"p\": return w[\"parseInt\"];\n\
           }}\n\
         }}\n\
         var mask = 0x1f;\n\
         var msg = D(K[0x4]) + \" \" + D(1);\n\
         G(\"c\")[\"log\"](msg, !0 ? D(0) : D(1), obj[(0, \"length\")]);\n"
    );
    let engine = DeobfuscationEngine::with_defaults();
    let (output, result) = engine.process_source(&source).unwrap();

    assert!(output.contains("var mask = 31"));
    assert!(output.contains(r#"var msg = "delta beta""#));
    assert!(output.contains("console.log"));
    assert!(output.contains(r#""alpha""#));
    assert!(output.contains("obj.length"));

    // No call to the discovered decoder with a literal argument survives, and
    // no computed access into the constant array with an in-range literal
    // index survives.
    assert!(!output.contains("D(0"));
    assert!(!output.contains("D(1"));
    assert!(!output.contains("K[0x4]"));
    assert!(!output.contains("!0"));

    assert!(result.stats.decoder_calls_inlined >= 3);
    assert!(result.stats.resolver_calls_inlined == 1);
    assert!(result.stats.hex_normalized >= 1);
    assert!(result.stats.properties_simplified >= 2);
}

#[test]
fn discovery_free_source_roundtrips_unchanged() {
    let source = "function add(a, b) {\n    return a + b;\n}\nadd(x, y);\n";
    let engine = DeobfuscationEngine::with_defaults();
    let (output, result) = engine.process_source(source).unwrap();
    assert!(result.unchanged());
    assert!(output.contains("function add"));
    // The output must re-parse cleanly.
    assert!(deobfuscate(&output).is_ok());
}

#[test]
fn comments_survive_the_pipeline() {
    let source = "// preserved header\nvar k = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];\nx = k[1];";
    let output = deobfuscate(source).unwrap();
    assert!(output.contains("// preserved header"));
    assert!(output.contains("x = 1"));
}

#[test]
fn void_zero_stays_inert() {
    // An array holding undefined materializes as `void 0` and later passes
    // must not rewrite it into anything else.
    let source = "var k = [void 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]; x = k[0];";
    let output = deobfuscate(source).unwrap();
    assert!(output.contains("x = void 0"));
}

#[test]
fn idempotent_over_scenarios() {
    let resolver = r#"
        function R(k) {
            switch (k) {
                case "D": return g["Date"];
                case "C": return g["console"];
                case "M": return g["Math"];
                case "S": return g["String"];
                case "O": return g["Object"];
            }
        }
        z = R("D")();
    "#;
    let sources = vec![
        "const A = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]; x = A[0x3];".to_string(),
        r#"s = "foo" + "bar" + "baz";"#.to_string(),
        r#"a = obj["length"]; b = obj["for"]; c = obj[(junk(), "for")];"#.to_string(),
        "x = !0 ? a : b; y = !1 && zzz();".to_string(),
        resolver.to_string(),
        table_script("alpha|beta|gamma", "y = D(2); keep = D(9);"),
    ];

    for source in sources {
        let once = deobfuscate(&source).unwrap();
        let twice = deobfuscate(&once).unwrap();
        assert_eq!(once, twice, "pipeline not idempotent for: {source}");
    }
}

#[test]
fn phase_caps_respected() {
    let source = table_script("alpha|beta|gamma", "y = D(2);");
    let engine = DeobfuscationEngine::with_defaults();
    let (_, result) = engine.process_source(&source).unwrap();
    let caps = [10, 10, 10, 3, 1];
    for (used, cap) in result.phase_iterations.iter().zip(caps) {
        assert!(*used <= cap);
    }
}

#[test]
fn fast_preset_still_resolves_shallow_indirection() {
    let source = "var k = [5, 6, 7, 8, 9, 0, 1, 2, 3, 4]; x = k[2];";
    let engine = DeobfuscationEngine::new(EngineConfig::fast());
    let (output, _) = engine.process_source(source).unwrap();
    assert!(output.contains("x = 7"));
}

#[test]
fn table_without_decoder_disables_decoder_phase() {
    // No decoder assignment anywhere: the table is discovered but phase 2 is
    // skipped, leaving the call untouched.
    let payload = escape_payload(&compress_to_utf16("alpha|beta"));
    let source = format!(
        "var TBL = codec.decompressFromUTF16(\"{payload}\").split(\"|\");\n\
         y = J(1);\n"
    );
    let engine = DeobfuscationEngine::with_defaults();
    let (output, result) = engine.process_source(&source).unwrap();
    assert!(output.contains("J(1)"));
    assert_eq!(result.phase_iterations[1], 0);
    assert_eq!(result.stats.decoder_calls_inlined, 0);
}
