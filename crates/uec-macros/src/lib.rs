//! Requirement IDs, table captions and table references for Markdown builds.
//!
//! [`register`] is a plugin for [`uec_renderer::Build`]. It adds three macros
//! to the build's environment:
//!
//! | Call                               | Output                  |
//! |------------------------------------|-------------------------|
//! | `{{ requirement() }}`              | `**[UEC-001]**`, ...    |
//! | `{{ table_caption(label, text) }}` | `Table: text`           |
//! | `{{ table_ref(label) }}`           | `Table 1`, or `Table ??`|
//!
//! Numbers follow rendering order. A reference rendered before its caption
//! shows the `??` sentinel, and a label captioned twice resolves to the later
//! number.
//!
//! # Example
//!
//! ```
//! use uec_config::Config;
//! use uec_renderer::{Build, Page};
//!
//! let build = Build::new(Config::default()).with_plugin(uec_macros::register);
//! let pages = build
//!     .run(&[Page::new(
//!         "failures.md",
//!         "{{ requirement() }} See {{ table_ref('locks') }}.\n\n\
//!          {{ table_caption('locks', 'Connection lock failures') }}\n",
//!     )])
//!     .unwrap();
//!
//! assert_eq!(
//!     pages[0].markdown,
//!     "**[UEC-001]** See Table ??.\n\nTable: Connection lock failures\n"
//! );
//! ```

mod state;

pub use state::BuildState;

use uec_renderer::{Environment, MacroArgs, MacroError, Variables};

/// Seed a fresh [`BuildState`] and register the macros on `env`.
///
/// Calling it again on the same environment resets all counters and labels.
pub fn register(env: &mut Environment) {
    env.variables_mut()
        .insert(BuildState::VARIABLE, BuildState::new());

    env.register_macro("requirement", requirement);
    env.register_macro("table_caption", table_caption);
    env.register_macro("table_ref", table_ref);
}

/// `requirement()`
fn requirement(vars: &mut Variables, args: &MacroArgs) -> Result<String, MacroError> {
    args.check_params(&[])?;
    let state = vars.get_mut::<BuildState>(BuildState::VARIABLE)?;
    Ok(state.next_requirement())
}

/// `table_caption(label, text)`
fn table_caption(vars: &mut Variables, args: &MacroArgs) -> Result<String, MacroError> {
    args.check_params(&["label", "text"])?;
    let label = args.require(0, "label")?;
    let text = args.require(1, "text")?;
    let state = vars.get_mut::<BuildState>(BuildState::VARIABLE)?;
    Ok(state.caption_table(label, text))
}

/// `table_ref(label)`
fn table_ref(vars: &mut Variables, args: &MacroArgs) -> Result<String, MacroError> {
    args.check_params(&["label"])?;
    let label = args.require(0, "label")?;
    let state = vars.get::<BuildState>(BuildState::VARIABLE)?;
    Ok(state.table_ref(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uec_config::Config;
    use uec_renderer::{Build, BuildError, Page};

    fn env() -> Environment {
        let mut env = Environment::new();
        register(&mut env);
        env
    }

    fn call(env: &mut Environment, name: &str, args: &[&str]) -> Result<String, MacroError> {
        env.call(name, &MacroArgs::positional(args.iter().copied()))
    }

    fn build() -> Build {
        Build::new(Config::default()).with_plugin(register)
    }

    fn render(pages: &[(&str, &str)]) -> Vec<String> {
        let pages: Vec<_> = pages
            .iter()
            .map(|(path, source)| Page::new(*path, *source))
            .collect();
        build()
            .run(&pages)
            .unwrap()
            .into_iter()
            .map(|page| page.markdown)
            .collect()
    }

    #[test]
    fn test_register_initializes_state() {
        let env = env();

        let state = env
            .variables()
            .get::<BuildState>(BuildState::VARIABLE)
            .unwrap();
        assert_eq!(state, &BuildState::new());
        assert_eq!(
            env.macro_names().collect::<Vec<_>>(),
            vec!["requirement", "table_caption", "table_ref"]
        );
    }

    #[test]
    fn test_requirement_sequence() {
        let mut env = env();

        assert_eq!(call(&mut env, "requirement", &[]).unwrap(), "**[UEC-001]**");
        assert_eq!(call(&mut env, "requirement", &[]).unwrap(), "**[UEC-002]**");
        assert_eq!(call(&mut env, "requirement", &[]).unwrap(), "**[UEC-003]**");
    }

    #[test]
    fn test_caption_then_ref() {
        let mut env = env();

        assert_eq!(
            call(&mut env, "table_caption", &["fail1", "Connection lock failures"]).unwrap(),
            "Table: Connection lock failures"
        );
        assert_eq!(call(&mut env, "table_ref", &["fail1"]).unwrap(), "Table 1");

        assert_eq!(
            call(&mut env, "table_caption", &["fail2", "Timeout errors"]).unwrap(),
            "Table: Timeout errors"
        );
        assert_eq!(call(&mut env, "table_ref", &["fail2"]).unwrap(), "Table 2");
        assert_eq!(call(&mut env, "table_ref", &["fail1"]).unwrap(), "Table 1");
    }

    #[test]
    fn test_ref_never_captioned() {
        let mut env = env();
        assert_eq!(
            call(&mut env, "table_ref", &["never_captioned"]).unwrap(),
            "Table ??"
        );
    }

    #[test]
    fn test_recaption_uses_second_number() {
        let mut env = env();

        assert_eq!(
            call(&mut env, "table_caption", &["dup", "first"]).unwrap(),
            "Table: first"
        );
        assert_eq!(
            call(&mut env, "table_caption", &["dup", "second"]).unwrap(),
            "Table: second"
        );
        assert_eq!(call(&mut env, "table_ref", &["dup"]).unwrap(), "Table 2");
    }

    #[test]
    fn test_requirement_does_not_touch_tables() {
        let mut env = env();

        call(&mut env, "table_caption", &["t", "T"]).unwrap();
        call(&mut env, "requirement", &[]).unwrap();

        assert_eq!(call(&mut env, "table_ref", &["t"]).unwrap(), "Table 1");
        assert_eq!(call(&mut env, "requirement", &[]).unwrap(), "**[UEC-002]**");
    }

    #[test]
    fn test_keyword_arguments() {
        let mut env = env();

        let args = MacroArgs::parse(r#"text="Timeouts", label="t""#).unwrap();
        assert_eq!(env.call("table_caption", &args).unwrap(), "Table: Timeouts");

        let args = MacroArgs::parse("label='t'").unwrap();
        assert_eq!(env.call("table_ref", &args).unwrap(), "Table 1");
    }

    #[test]
    fn test_argument_errors() {
        let mut env = env();

        assert_eq!(
            call(&mut env, "requirement", &["x"]),
            Err(MacroError::TooManyArguments {
                expected: 0,
                found: 1,
            })
        );
        assert_eq!(
            call(&mut env, "table_caption", &["only_label"]),
            Err(MacroError::MissingArgument {
                name: "text".to_owned(),
                position: 1,
            })
        );
        assert_eq!(
            call(&mut env, "table_ref", &[]),
            Err(MacroError::MissingArgument {
                name: "label".to_owned(),
                position: 0,
            })
        );
    }

    #[test]
    fn test_failed_call_leaves_state_untouched() {
        let mut env = env();

        let _ = call(&mut env, "table_caption", &["only_label"]);

        call(&mut env, "table_caption", &["t", "T"]).unwrap();
        assert_eq!(call(&mut env, "table_ref", &["t"]).unwrap(), "Table 1");
    }

    #[test]
    fn test_missing_state_is_reported() {
        let mut env = env();
        env.variables_mut().remove(BuildState::VARIABLE);

        for (name, args) in [
            ("requirement", &[][..]),
            ("table_caption", &["t", "T"][..]),
            ("table_ref", &["t"][..]),
        ] {
            assert_eq!(
                call(&mut env, name, args),
                Err(MacroError::MissingVariable(BuildState::VARIABLE.to_owned())),
                "{name}"
            );
        }
    }

    #[test]
    fn test_unregistered_environment() {
        let mut env = Environment::new();
        assert_eq!(
            call(&mut env, "requirement", &[]),
            Err(MacroError::UnknownMacro("requirement".to_owned()))
        );
    }

    #[test]
    fn test_register_again_resets() {
        let mut env = env();
        call(&mut env, "requirement", &[]).unwrap();
        call(&mut env, "table_caption", &["t", "T"]).unwrap();

        register(&mut env);

        assert_eq!(call(&mut env, "requirement", &[]).unwrap(), "**[UEC-001]**");
        assert_eq!(call(&mut env, "table_ref", &["t"]).unwrap(), "Table ??");
    }

    #[test]
    fn test_build_page() {
        let source = "\
# Failures

{{ requirement() }} The pool shall report lock failures, see {{ table_ref(\"fail1\") }}.

{{ table_caption(\"fail1\", \"Connection lock failures\") }}

| Code | Meaning |
|------|---------|
| 1    | busy    |

{{ requirement() }} Timeouts are listed in {{ table_ref(\"fail1\") }}.
";
        let pages = render(&[("failures.md", source)]);

        assert_eq!(
            pages[0],
            "\
# Failures

**[UEC-001]** The pool shall report lock failures, see Table ??.

Table: Connection lock failures

| Code | Meaning |
|------|---------|
| 1    | busy    |

**[UEC-002]** Timeouts are listed in Table 1.
"
        );
    }

    #[test]
    fn test_build_numbers_follow_page_order() {
        let pages = render(&[
            ("a.md", "{{ table_caption('t_a', 'A') }} {{ requirement() }}"),
            ("b.md", "{{ table_ref('t_a') }} {{ table_caption('t_b', 'B') }} {{ requirement() }}"),
            ("c.md", "{{ table_ref('t_b') }} {{ table_ref('t_a') }}"),
        ]);

        assert_eq!(
            pages,
            vec![
                "Table: A **[UEC-001]**",
                "Table 1 Table: B **[UEC-002]**",
                "Table 2 Table 1",
            ]
        );
    }

    #[test]
    fn test_build_html_output() {
        let build = build();
        let pages = build
            .run(&[Page::new("a.md", "{{ requirement() }} Text")])
            .unwrap();

        assert_eq!(pages[0].html, "<p><strong>[UEC-001]</strong> Text</p>\n");
    }

    #[test]
    fn test_builds_are_isolated() {
        let build = build();
        let first = [Page::new(
            "a.md",
            "{{ requirement() }} {{ table_caption('t', 'T') }}",
        )];
        let second = [Page::new("a.md", "{{ requirement() }} {{ table_ref('t') }}")];

        let first = build.run(&first).unwrap();
        let second = build.run(&second).unwrap();

        assert_eq!(first[0].markdown, "**[UEC-001]** Table: T");
        assert_eq!(second[0].markdown, "**[UEC-001]** Table ??");
    }

    #[test]
    fn test_build_code_fence_untouched() {
        let pages = render(&[("a.md", "```\n{{ requirement() }}\n```\n{{ requirement() }}\n")]);
        assert_eq!(pages[0], "```\n{{ requirement() }}\n```\n**[UEC-001]**\n");
    }

    #[test]
    fn test_build_bad_call_warns() {
        let pages = build()
            .run(&[Page::new("a.md", "{{ table_caption('only') }} {{ requirement() }}")])
            .unwrap();

        assert_eq!(pages[0].markdown, "{{ table_caption('only') }} **[UEC-001]**");
        assert_eq!(
            pages[0].warnings,
            vec!["line 1: missing argument `text` (position 1)"]
        );
    }

    #[test]
    fn test_build_bad_call_fails_when_strict() {
        let config = Config::from_toml_str("[macros]\non_error_fail = true\n").unwrap();
        let build = Build::new(config).with_plugin(register);

        let err = build
            .run(&[Page::new("a.md", "ok\n{{ requirement(1) }}")])
            .unwrap_err();

        let BuildError::Expand { path, source } = err;
        assert_eq!(path, "a.md");
        assert_eq!(source.line, 2);
        assert_eq!(
            source.source,
            MacroError::TooManyArguments {
                expected: 0,
                found: 1,
            }
        );
    }
}
