//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from checking templates.
#[derive(Debug)]
pub struct CheckReport {
    pub files: Vec<FileCheck>,
}

/// Outcome for one template.
#[derive(Debug)]
pub struct FileCheck {
    pub path: PathBuf,
    /// The rendered diagnostic, if the file failed.
    pub error: Option<String>,
}

impl CheckReport {
    /// Whether every file passed.
    pub fn is_valid(&self) -> bool {
        self.files.iter().all(|f| f.error.is_none())
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for file in &self.files {
            match &file.error {
                Some(error) => out.error(error),
                None => out.ok_item(&format!("{} is valid", file.path.display())),
            }
        }

        let failed = self.files.iter().filter(|f| f.error.is_some()).count();
        if failed > 0 {
            out.newline();
            out.preformatted(&format!("{} of {} templates failed", failed, self.files.len()));
        }
    }
}
