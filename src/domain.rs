use serde::{
    Deserialize, Deserializer,
    de::{self, Visitor},
};
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "pics";
pub const DEFAULT_OUTPUT_PREFIX: &str = "executed_";

#[derive(Debug, Clone, PartialEq)]
pub struct NotebookRef {
    path: PathBuf,
    file_name: String,
}

impl NotebookRef {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Display for NotebookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.to_string_lossy())
    }
}

impl TryFrom<&str> for NotebookRef {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let path = PathBuf::from(value);
        match path.file_name() {
            Some(name) => Ok(NotebookRef {
                file_name: name.to_string_lossy().to_string(),
                path,
            }),
            None => Err(format!("\"{value}\" doesn't point to a notebook file")),
        }
    }
}

impl<'de> Deserialize<'de> for NotebookRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NotebookRefVisitor;

        impl Visitor<'_> for NotebookRefVisitor {
            type Value = NotebookRef;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a path to a notebook file")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                NotebookRef::try_from(value)
                    .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_str(NotebookRefVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutorKind {
    Papermill,
    Nbconvert,
    Command,
}

impl<'de> Deserialize<'de> for ExecutorKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ExecutorKindVisitor;

        impl Visitor<'_> for ExecutorKindVisitor {
            type Value = ExecutorKind;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"either "papermill" or "nbconvert" or "command""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match value {
                    "papermill" => Ok(ExecutorKind::Papermill),
                    "nbconvert" => Ok(ExecutorKind::Nbconvert),
                    "command" => Ok(ExecutorKind::Command),
                    _ => Err(de::Error::invalid_value(de::Unexpected::Str(value), &self)),
                }
            }
        }

        deserializer.deserialize_str(ExecutorKindVisitor)
    }
}

/// How notebooks get executed; resolved from the `[executor]` table of the config.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorSpec {
    Papermill {
        kernel: Option<String>,
    },
    Nbconvert {
        kernel: Option<String>,
    },
    /// Runs `<program> [args..] <input> <output>`
    Command {
        program: String,
        args: Vec<String>,
    },
}

impl Default for ExecutorSpec {
    fn default() -> Self {
        ExecutorSpec::Papermill { kernel: None }
    }
}

#[derive(Debug, Clone)]
pub struct RunPlan {
    pub notebooks: Vec<NotebookRef>,
    pub output_dir: PathBuf,
    pub output_prefix: String,
}

impl RunPlan {
    pub fn output_path(&self, notebook: &NotebookRef) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.output_prefix, notebook.file_name()))
    }
}
