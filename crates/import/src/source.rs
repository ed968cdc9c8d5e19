use std::path::Path;

/// The kinds of input the assembler knows how to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Zip archive bundling one or more statement documents.
    Container,
    /// A single camt.053 document.
    Statement,
}

impl InputKind {
    /// Classifies an input path by its extension, ASCII case-insensitive.
    /// `None` means the path is of no kind this tool can decode.
    pub fn of(path: &Path) -> Option<InputKind> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("zip") {
            Some(InputKind::Container)
        } else if ext.eq_ignore_ascii_case("xml") {
            Some(InputKind::Statement)
        } else {
            None
        }
    }
}
