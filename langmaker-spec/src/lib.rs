//! Language specification and source code representation.
//!
//! A [`Specification`] describes the spellings of one generated language: comment marker, command
//! prefix, type tags, boolean literals and block terminator. It is built once (usually from a JSON
//! configuration record) and then shared by reference with the lexer, parser and interpreter.

mod source;

pub use source::Source;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Characters that the lexer always splits on. Token spellings may not contain them.
const RESERVED_CHARS: &[char] = &['+', '-', '*', '/', '(', ')', '=', ':', ',', '"'];

/// Errors raised while loading or validating a [`Specification`].
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SpecError {
    #[error("failed to read specification {path}: {source}")]
    #[diagnostic(code(langmaker::spec::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed specification: {0}")]
    #[diagnostic(code(langmaker::spec::json))]
    Json(#[from] serde_json::Error),

    #[error("invalid `{field}`: {reason}")]
    #[diagnostic(code(langmaker::spec::invalid))]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, SpecError>;

/// The literal kind introduced by a type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Integer,
    Float,
    String,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Integer => write!(f, "integer"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::String => write!(f, "string"),
        }
    }
}

/// Tokens tagging the literal that follows them with a concrete type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePrefixes {
    pub integer: String,
    pub float: String,
    pub string: String,
}

/// Lexical and syntactic parameters of one generated language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub language_name: String,
    /// Suffix (including the leading dot) of runnable source files.
    pub file_extension: String,
    /// Name of the shell wrapper written by the scaffolder.
    pub command_name: String,
    pub comment_prefix: String,
    /// Marks builtin commands and keywords (`<prefix>IF`, `<prefix>PRINT`, ...).
    pub command_prefix: String,
    /// Informational only. Case folding is controlled by `enforce_uppercase_code`.
    #[serde(deserialize_with = "flag")]
    pub case_sensitive: bool,
    #[serde(deserialize_with = "flag")]
    pub enforce_uppercase_comments: bool,
    /// Upper-cases the whole program (string contents included) before lexing.
    #[serde(deserialize_with = "flag")]
    pub enforce_uppercase_code: bool,
    pub type_prefixes: TypePrefixes,
    pub block_end: String,
    pub true_value: String,
    pub false_value: String,
}

impl Default for Specification {
    fn default() -> Self {
        Self {
            language_name: "SOARES".to_string(),
            file_extension: ".soares".to_string(),
            command_name: "soaresexec".to_string(),
            comment_prefix: "SOARESAY".to_string(),
            command_prefix: "SOARES".to_string(),
            case_sensitive: false,
            enforce_uppercase_comments: true,
            enforce_uppercase_code: true,
            type_prefixes: TypePrefixes {
                integer: "SOARESNUM".to_string(),
                float: "SOARESFLOAT".to_string(),
                string: "SOARESSTRING".to_string(),
            },
            block_end: "SOARESDONE".to_string(),
            true_value: "YEEE".to_string(),
            false_value: "NAWWW".to_string(),
        }
    }
}

impl Specification {
    /// Parses and validates a JSON configuration record.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serializes the specification back into a pretty-printed JSON record.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every spelling can actually be produced by the lexer and that no two
    /// spellings collide.
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl ToString) -> SpecError {
            SpecError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        for (field, value) in [
            ("language_name", &self.language_name),
            ("command_name", &self.command_name),
            ("comment_prefix", &self.comment_prefix),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        if !self.file_extension.starts_with('.') || self.file_extension.len() < 2 {
            return Err(invalid(
                "file_extension",
                format!("`{}` must be a dot followed by a suffix", self.file_extension),
            ));
        }

        // These spellings are compared against whole barewords, so they must lex as one.
        let barewords = [
            ("command_prefix", &self.command_prefix),
            ("type_prefixes.integer", &self.type_prefixes.integer),
            ("type_prefixes.float", &self.type_prefixes.float),
            ("type_prefixes.string", &self.type_prefixes.string),
            ("block_end", &self.block_end),
            ("true_value", &self.true_value),
            ("false_value", &self.false_value),
        ];
        for (field, value) in barewords {
            if value.is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
            if value
                .chars()
                .any(|c| c.is_whitespace() || RESERVED_CHARS.contains(&c))
            {
                return Err(invalid(
                    field,
                    format!("`{}` contains whitespace or a reserved symbol", value),
                ));
            }
            if self.enforce_uppercase_code && value.chars().any(char::is_lowercase) {
                return Err(invalid(
                    field,
                    format!(
                        "`{}` can never match because enforce_uppercase_code is set",
                        value
                    ),
                ));
            }
        }

        if self.true_value == self.false_value {
            return Err(invalid("false_value", "must differ from true_value"));
        }
        let prefixes = &self.type_prefixes;
        if prefixes.integer == prefixes.float
            || prefixes.integer == prefixes.string
            || prefixes.float == prefixes.string
        {
            return Err(invalid("type_prefixes", "the three prefixes must be distinct"));
        }

        Ok(())
    }

    /// Spelling of the builtin or keyword `name` (e.g. `IF` becomes `<command_prefix>IF`).
    pub fn keyword(&self, name: &str) -> String {
        format!("{}{}", self.command_prefix, name)
    }

    /// Returns the literal kind introduced by `token`, or `None` if `token` is not a type prefix.
    pub fn type_tag(&self, token: &str) -> Option<TypeTag> {
        if token == self.type_prefixes.integer {
            Some(TypeTag::Integer)
        } else if token == self.type_prefixes.float {
            Some(TypeTag::Float)
        } else if token == self.type_prefixes.string {
            Some(TypeTag::String)
        } else {
            None
        }
    }

    /// A command is a type prefix or any bareword starting with the command prefix.
    pub fn is_command(&self, token: &str) -> bool {
        self.type_tag(token).is_some() || token.starts_with(&self.command_prefix)
    }

    /// Returns `true` if `path` carries the configured file extension.
    pub fn accepts_file(&self, path: &Path) -> bool {
        path.to_str()
            .map_or(false, |path| path.ends_with(&self.file_extension))
    }

    /// Spelling of a boolean literal.
    pub fn bool_spelling(&self, value: bool) -> &str {
        if value {
            &self.true_value
        } else {
            &self.false_value
        }
    }
}

/// Accepts JSON booleans as well as the `"True"`/`"False"` strings emitted by older generators.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(serde::de::Error::custom(format!(
                "expected a boolean, found `{}`",
                text
            ))),
        },
    }
}
