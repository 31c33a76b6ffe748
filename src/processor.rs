use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::{Entry, Function, Kind, Templates, Token};
use crate::error::{ItmlError, Result};
use crate::lexer::tokenize;

/// Where the ITML text comes from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Source text; imports resolve against the anchor or the working directory
    Text(&'a str),
    /// File on disk; imports resolve against its directory
    File(&'a Path),
}

#[derive(Debug, Default, Clone)]
pub struct ParseOptions {
    /// Directory used to resolve relative imports, overriding the default.
    pub anchor: Option<PathBuf>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor(mut self, anchor: impl Into<PathBuf>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

/// Parse ITML from text or a file into templates, following imports.
pub fn parse(source: Source<'_>, options: &ParseOptions) -> Result<Templates> {
    match source {
        Source::Text(text) => {
            let anchor = options.anchor.clone().unwrap_or_default();
            Processor::new(text, anchor, Vec::new())?.run()
        }
        Source::File(path) => {
            let path = canonicalize(path)?;
            let text = fs::read_to_string(&path).map_err(|e| ItmlError::read(path.clone(), e))?;
            let anchor = match &options.anchor {
                Some(anchor) => anchor.clone(),
                None => parent_dir(&path),
            };
            tracing::debug!(path = %path.display(), "parsing file");
            Processor::new(&text, anchor, vec![path])?.run()
        }
    }
}

/// Parse ITML text, resolving imports against the working directory.
pub fn parse_str(text: &str) -> Result<Templates> {
    parse(Source::Text(text), &ParseOptions::default())
}

/// Parse an ITML file, resolving imports against its directory.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Templates> {
    parse(Source::File(path.as_ref()), &ParseOptions::default())
}

/// Forward-only position over a token sequence with one step of pushback.
#[derive(Debug)]
pub struct Cursor<'a> {
    tokens: Vec<Token<'a>>,
    index: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.index).copied()
    }

    /// Return the current token and move past it.
    ///
    /// The position advances even at the end of input, so a following
    /// [`rewind`](Self::rewind) always undoes exactly this call.
    pub fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        self.index += 1;
        token
    }

    pub fn rewind(&mut self) {
        self.index = self.index.saturating_sub(1);
    }
}

/// One parse invocation: a cursor over a single file's tokens plus the
/// context needed to resolve its imports.
struct Processor<'a> {
    cursor: Cursor<'a>,
    anchor: PathBuf,
    // Canonical paths of the files currently being parsed, outermost first.
    chain: Vec<PathBuf>,
}

impl<'a> Processor<'a> {
    fn new(text: &'a str, anchor: PathBuf, chain: Vec<PathBuf>) -> Result<Self> {
        Ok(Self {
            cursor: Cursor::new(tokenize(text)?),
            anchor,
            chain,
        })
    }

    fn run(mut self) -> Result<Templates> {
        let mut templates = Templates::new();
        while let Some(token) = self.cursor.advance() {
            match token {
                Token::Name { id, kind } => match Kind::parse(kind) {
                    Some(Kind::Str) => {
                        let value = self.parse_str();
                        templates.insert(id, Entry::Str(value));
                    }
                    Some(Kind::List) => {
                        let value = self.parse_list();
                        templates.insert(id, Entry::List(value));
                    }
                    None => tracing::trace!(id, kind, "ignoring entry with unsupported type"),
                },
                Token::Function(Function::Import(path)) => {
                    let imported = self.import(path)?;
                    templates.merge(imported);
                }
                // Content outside of a block has nothing to attach to.
                Token::Newline | Token::Comment | Token::Indent(_) | Token::String(_) => continue,
            }
        }
        Ok(templates)
    }

    /// Collect content lines up to the next block terminator and join them.
    fn parse_str(&mut self) -> String {
        let mut strings = Vec::new();
        loop {
            match self.cursor.advance() {
                Some(Token::Indent(_) | Token::Comment) => continue,
                Some(Token::String(text)) => strings.push(text),
                _ => {
                    self.cursor.rewind();
                    return strings.join(" ");
                }
            }
        }
    }

    /// Collect paragraphs until the next declaration, directive or end of input.
    fn parse_list(&mut self) -> Vec<String> {
        let mut paragraphs = Vec::new();
        loop {
            match self.cursor.advance() {
                None | Some(Token::Name { .. } | Token::Function(_)) => {
                    self.cursor.rewind();
                    return paragraphs;
                }
                Some(Token::Indent(_)) => {
                    self.cursor.rewind();
                    paragraphs.push(self.parse_str());
                }
                Some(Token::Newline | Token::Comment | Token::String(_)) => continue,
            }
        }
    }

    fn import(&self, argument: &str) -> Result<Templates> {
        let path = canonicalize(&self.anchor.join(argument))?;
        if self.chain.contains(&path) {
            return Err(ItmlError::ImportCycle { path });
        }

        tracing::debug!(path = %path.display(), depth = self.chain.len(), "importing");
        let text = fs::read_to_string(&path).map_err(|e| ItmlError::read(path.clone(), e))?;

        let mut chain = self.chain.clone();
        chain.push(path.clone());
        Processor::new(&text, parent_dir(&path), chain)?.run()
    }
}

/// Resolve `path` to an absolute location of an existing regular file.
fn canonicalize(path: &Path) -> Result<PathBuf> {
    let resolved = path
        .canonicalize()
        .map_err(|e| ItmlError::read(path.to_path_buf(), e))?;
    if !resolved.is_file() {
        return Err(ItmlError::FileNotFound { path: resolved });
    }
    Ok(resolved)
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
