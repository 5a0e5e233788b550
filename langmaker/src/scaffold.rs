//! Generates a ready-to-use project directory for one language: README, example programs, the
//! configuration record and a shell wrapper running `langmaker`.

use langmaker_spec::Specification;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

/// An example program written by the scaffolder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// File name without the extension.
    pub name: &'static str,
    pub source: String,
}

/// Writes the project for `spec` into `<out_dir>/<language name, lower-cased>/` and returns that
/// directory. Existing files are overwritten.
pub fn generate(spec: &Specification, out_dir: &Path) -> Result<PathBuf> {
    spec.validate()?;

    let dir = out_dir.join(spec.language_name.to_lowercase());
    fs::create_dir_all(&dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to create directory: {}", dir.display()))?;
    tracing::info!(language = %spec.language_name, dir = %dir.display(), "generating language");

    write(&dir.join("README.md"), &readme(spec))?;

    for example in examples(spec) {
        let path = dir.join(format!("{}{}", example.name, spec.file_extension));
        write(&path, &example.source)?;
    }

    write(&dir.join("language.json"), &spec.to_json()?)?;

    let script = dir.join(&spec.command_name);
    write(&script, &wrapper_script())?;
    make_executable(&script)?;

    tracing::info!("language generated");
    Ok(dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    tracing::debug!(path = %path.display(), "writing file");
    fs::write(path, contents)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write: {}", path.display()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read permissions: {}", path.display()))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to make executable: {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Shell wrapper that runs a program with the configuration stored next to it.
pub fn wrapper_script() -> String {
    r#"#!/bin/sh
SCRIPT_DIR="$(cd "$(dirname "$0")" && pwd)"
exec langmaker run --spec "$SCRIPT_DIR/language.json" "$@"
"#
    .to_string()
}

pub fn readme(spec: &Specification) -> String {
    let name = &spec.language_name;
    let ext = &spec.file_extension;
    let case = if spec.case_sensitive {
        "Case-sensitive"
    } else {
        "Case-insensitive"
    };
    let comments = if spec.enforce_uppercase_comments {
        "Enforces uppercase comments"
    } else {
        "Allows any case for comments"
    };
    let code = if spec.enforce_uppercase_code {
        "Enforces uppercase code"
    } else {
        "Allows any case for code"
    };
    let examples = examples(spec)
        .iter()
        .map(|example| format!("- `{}{}`\n", example.name, ext))
        .collect::<String>();

    format!(
        "# {name} Programming Language

{name} is a small interpreted language generated by langmaker.

## Features

- File extension: {ext}
- Comment prefix: {comment}
- Command prefix: {command}
- {case}
- {comments}
- {code}
- Block end: {block_end}
- True value: {true_value}
- False value: {false_value}

## Running {name} Programs

Use the `{command_name}` command followed by your {name} file:

```
./{command_name} your_program{ext}
```

## Examples

Check out the example programs in this directory:
{examples}",
        comment = spec.comment_prefix,
        command = spec.command_prefix,
        block_end = spec.block_end,
        true_value = spec.true_value,
        false_value = spec.false_value,
        command_name = spec.command_name,
    )
}

/// Example programs showing every feature of the language.
pub fn examples(spec: &Specification) -> Vec<Example> {
    let comment = &spec.comment_prefix;
    let int = &spec.type_prefixes.integer;
    let string = &spec.type_prefixes.string;
    let print = spec.keyword("PRINT");
    let shout = spec.keyword("SHOUT");
    let if_ = spec.keyword("IF");
    let else_ = spec.keyword("ELSE");
    let while_ = spec.keyword("WHILE");
    let end = &spec.block_end;
    let (yes, no) = (&spec.true_value, &spec.false_value);

    vec![
        Example {
            name: "arithmetic",
            source: format!(
                "{comment} ARITHMETIC EXAMPLE

A = {int} 10
B = {int} 5

SUM = A + B
DIFFERENCE = A - B
PRODUCT = A * B
QUOTIENT = A / B

{print}({string} \"SUM:\", SUM)
{print}({string} \"DIFFERENCE:\", DIFFERENCE)
{print}({string} \"PRODUCT:\", PRODUCT)
{print}({string} \"QUOTIENT:\", QUOTIENT)
"
            ),
        },
        Example {
            name: "string_manipulation",
            source: format!(
                "{comment} STRING MANIPULATION EXAMPLE

NAME = {string} \"FRIEND\"
GREETING = {shout}({string} \"Hello, \")
FULL_GREETING = GREETING + NAME
{print}(FULL_GREETING)
"
            ),
        },
        Example {
            name: "boolean_logic",
            source: format!(
                "{comment} BOOLEAN LOGIC EXAMPLE

A = {yes}
B = {no}

{print}({string} \"A IS TRUE:\", A)
{print}({string} \"B IS FALSE:\", B)

{if_} A:
    {print}({string} \"A IS TRUE\")
{end}

{if_} B:
    {print}({string} \"THIS WILL NOT BE PRINTED\")
{else_}:
    {print}({string} \"B IS FALSE\")
{end}
"
            ),
        },
        Example {
            name: "server",
            source: format!(
                "{comment} SERVER EXAMPLE

SERVERSOCKET = {socket}({string} \"SERVER\")
{bind}(SERVERSOCKET, {int} 1001)
{listen}(SERVERSOCKET, {int} 1)

{print}({string} \"SERVER LISTENING ON PORT 1001\")

{while_} {yes}:
    {print}({string} \"WAITING FOR CONNECTION...\")
    CONNECTION = {accept}(SERVERSOCKET)
    {print}({shout}({string} \"connected\"))

    RESPONSE = {shout}({string} \"hello\")
    {send}(CONNECTION, RESPONSE)

    {comment} DROPPING THE LAST REFERENCE CLOSES THE CONNECTION
    CONNECTION = {no}
{end}
",
                socket = spec.keyword("SOCKET"),
                bind = spec.keyword("BIND"),
                listen = spec.keyword("LISTEN"),
                accept = spec.keyword("ACCEPT"),
                send = spec.keyword("SEND"),
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn examples_use_the_configured_spellings() {
        let spec = Specification {
            command_prefix: "BHAV".to_string(),
            block_end: "BHAVEND".to_string(),
            ..Default::default()
        };
        let examples = examples(&spec);
        assert_eq!(examples.len(), 4);
        let boolean = examples
            .iter()
            .find(|example| example.name == "boolean_logic")
            .unwrap();
        assert!(boolean.source.contains("BHAVIF A:"));
        assert!(boolean.source.contains("BHAVELSE:"));
        assert!(boolean.source.contains("\nBHAVEND\n"));
        assert!(!boolean.source.contains("SOARESIF"));
    }

    #[test]
    fn readme_lists_examples() {
        let readme = readme(&Specification::default());
        assert!(readme.starts_with("# SOARES Programming Language"));
        assert!(readme.contains("./soaresexec your_program.soares"));
        assert!(readme.contains("- `server.soares`"));
        assert!(readme.contains("- Enforces uppercase code"));
    }

    #[test]
    fn generate_writes_project() {
        let out = tempfile::tempdir().unwrap();
        let spec = Specification::default();
        let dir = generate(&spec, out.path()).unwrap();
        assert_eq!(dir, out.path().join("soares"));

        for name in [
            "README.md",
            "arithmetic.soares",
            "string_manipulation.soares",
            "boolean_logic.soares",
            "server.soares",
            "language.json",
            "soaresexec",
        ] {
            assert!(dir.join(name).is_file(), "missing {}", name);
        }

        let stored = Specification::from_path(dir.join("language.json")).unwrap();
        assert_eq!(stored, spec);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.join("soaresexec")).unwrap().permissions().mode();
            assert_ne!(mode & 0o111, 0);
        }
    }

    #[test]
    fn generate_rejects_invalid_spec() {
        let out = tempfile::tempdir().unwrap();
        let spec = Specification {
            true_value: "NAWWW".to_string(),
            ..Default::default()
        };
        assert!(generate(&spec, out.path()).is_err());
        assert!(!out.path().join("soares").exists());
    }
}
