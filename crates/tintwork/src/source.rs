//! Raw stylesheet input.
//!
//! The engine never reads files itself. A [`StylesheetSource`] hands it the
//! text of a theme's stylesheets; [`DirectorySource`] is the usual
//! filesystem-backed implementation and [`MemorySource`] serves tests and
//! hosts that already hold the text.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::settings::GtkVersion;

/// One of the stylesheets a theme ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFile {
    Gtk,
    GtkDark,
    Shell,
}

impl SourceFile {
    pub const ALL: [SourceFile; 3] = [SourceFile::Gtk, SourceFile::GtkDark, SourceFile::Shell];

    /// Path of this file relative to the theme directory.
    pub fn relative_path(self, gtk: GtkVersion) -> PathBuf {
        match self {
            SourceFile::Gtk => Path::new(gtk.dir_name()).join("gtk.css"),
            SourceFile::GtkDark => Path::new(gtk.dir_name()).join("gtk-dark.css"),
            SourceFile::Shell => Path::new("gnome-shell").join("gnome-shell.css"),
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFile::Gtk => write!(f, "gtk"),
            SourceFile::GtkDark => write!(f, "gtk-dark"),
            SourceFile::Shell => write!(f, "shell"),
        }
    }
}

/// Identity of a source theme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThemeId {
    pub name: String,
    pub path: PathBuf,
}

impl ThemeId {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Supplies stylesheet text.
pub trait StylesheetSource {
    /// Returns `Ok(None)` when the theme does not ship `file`.
    fn read(&self, theme: &ThemeId, file: SourceFile, gtk: GtkVersion) -> io::Result<Option<String>>;
}

/// Reads `<theme path>/<gtk-x.0>/gtk.css` and friends from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectorySource;

impl StylesheetSource for DirectorySource {
    fn read(&self, theme: &ThemeId, file: SourceFile, gtk: GtkVersion) -> io::Result<Option<String>> {
        let path = theme.path.join(file.relative_path(gtk));
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Stylesheets held in memory, keyed by theme name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<(String, SourceFile), String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, theme: &str, file: SourceFile, css: impl Into<String>) -> Self {
        self.files.insert((theme.to_string(), file), css.into());
        self
    }
}

impl StylesheetSource for MemorySource {
    fn read(&self, theme: &ThemeId, file: SourceFile, _gtk: GtkVersion) -> io::Result<Option<String>> {
        Ok(self.files.get(&(theme.name.clone(), file)).cloned())
    }
}

/// The text of every stylesheet of one theme. Missing files are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStylesheets {
    pub id: ThemeId,
    pub gtk: Option<String>,
    pub gtk_dark: Option<String>,
    pub shell: Option<String>,
}

impl ThemeStylesheets {
    pub fn new(id: ThemeId) -> Self {
        Self {
            id,
            gtk: None,
            gtk_dark: None,
            shell: None,
        }
    }

    pub fn with(mut self, file: SourceFile, css: impl Into<String>) -> Self {
        *self.slot_mut(file) = Some(css.into());
        self
    }

    /// Loads all three files through `source`.
    pub fn load<S: StylesheetSource + ?Sized>(source: &S, id: ThemeId, gtk: GtkVersion) -> Result<Self> {
        let mut sheets = Self::new(id);
        for file in SourceFile::ALL {
            let text = source
                .read(&sheets.id, file, gtk)
                .map_err(|source| Error::Source {
                    theme: sheets.id.name.clone(),
                    file,
                    source,
                })?;
            if text.is_none() {
                tracing::debug!(theme = %sheets.id.name, %file, "stylesheet not present");
            }
            *sheets.slot_mut(file) = text;
        }
        Ok(sheets)
    }

    pub fn get(&self, file: SourceFile) -> Option<&str> {
        match file {
            SourceFile::Gtk => self.gtk.as_deref(),
            SourceFile::GtkDark => self.gtk_dark.as_deref(),
            SourceFile::Shell => self.shell.as_deref(),
        }
    }

    fn slot_mut(&mut self, file: SourceFile) -> &mut Option<String> {
        match file {
            SourceFile::Gtk => &mut self.gtk,
            SourceFile::GtkDark => &mut self.gtk_dark,
            SourceFile::Shell => &mut self.shell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl StylesheetSource for FailingSource {
        fn read(&self, _: &ThemeId, file: SourceFile, _: GtkVersion) -> io::Result<Option<String>> {
            match file {
                SourceFile::Shell => Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_relative_paths() {
        assert_eq!(
            SourceFile::Gtk.relative_path(GtkVersion::Gtk4),
            Path::new("gtk-4.0/gtk.css")
        );
        assert_eq!(
            SourceFile::GtkDark.relative_path(GtkVersion::Gtk3),
            Path::new("gtk-3.0/gtk-dark.css")
        );
        assert_eq!(
            SourceFile::Shell.relative_path(GtkVersion::Gtk4),
            Path::new("gnome-shell/gnome-shell.css")
        );
    }

    #[test]
    fn test_load_from_memory() {
        let source = MemorySource::new()
            .with("Nordic", SourceFile::Gtk, "window { color: #eceff4; }")
            .with("Nordic", SourceFile::Shell, "stage { color: #eceff4; }");
        let sheets =
            ThemeStylesheets::load(&source, ThemeId::new("Nordic", "/themes/Nordic"), GtkVersion::Gtk4)
                .unwrap();
        assert!(sheets.gtk.is_some());
        assert!(sheets.gtk_dark.is_none());
        assert_eq!(sheets.get(SourceFile::Shell), Some("stage { color: #eceff4; }"));
    }

    #[test]
    fn test_load_surfaces_io_errors() {
        let err = ThemeStylesheets::load(&FailingSource, ThemeId::new("Nordic", "/x"), GtkVersion::Gtk4)
            .unwrap_err();
        match err {
            Error::Source { file, theme, .. } => {
                assert_eq!(file, SourceFile::Shell);
                assert_eq!(theme, "Nordic");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_directory_source_missing_file_is_none() {
        let id = ThemeId::new("Missing", "/nonexistent/tintwork/theme");
        let text = DirectorySource.read(&id, SourceFile::Gtk, GtkVersion::Gtk4).unwrap();
        assert!(text.is_none());
    }
}
