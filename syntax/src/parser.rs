//! Recursive descent parser for TypeScript declarations.
//!
//! Only the declaration level is modeled: interfaces, classes, type aliases, enums and
//! namespaces, together with the type grammar their members use. Everything else (functions,
//! variables, imports, statements) is skipped by balanced-delimiter scanning. Errors never abort
//! the parse; they are recorded and the parser resynchronizes at the next member or statement.

use std::collections::HashMap;
use std::ops::Range;

use thiserror::Error;
use tracing::{debug, trace};

use crate::lexer::{unquote, Lexer, Token};
use crate::node::{DocTag, Node};
use crate::SyntaxKind;

/// Nesting limit for types and namespaces.
pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
}

/// Parse result: the tree and every error encountered while building it.
#[derive(Clone, Debug)]
pub struct Parse {
    pub root: Node,
    pub errors: Vec<ParseError>,
}

impl Parse {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors that start inside `span`.
    pub fn errors_within<'a>(
        &'a self,
        span: &'a Range<usize>,
    ) -> impl Iterator<Item = &'a ParseError> + 'a {
        self.errors
            .iter()
            .filter(move |e| span.contains(&e.span.start))
    }
}

pub fn parse(input: &str) -> Parse {
    let mut parser = Parser::new(input);
    let root = parser.parse_source_file();
    for error in &parser.errors {
        debug!(%error, "syntax error");
    }
    Parse {
        root,
        errors: parser.errors,
    }
}

type PResult<T> = Result<T, ParseError>;

#[derive(Clone, Debug)]
struct Tok<'a> {
    token: Token,
    text: &'a str,
    span: Range<usize>,
    newline_before: bool,
}

/// Words that begin a new statement when they start a line.
const STATEMENT_WORDS: &[&str] = &[
    "abstract",
    "class",
    "const",
    "declare",
    "enum",
    "export",
    "function",
    "import",
    "interface",
    "let",
    "module",
    "namespace",
    "type",
    "var",
];

struct Parser<'a> {
    tokens: Vec<Tok<'a>>,
    /// Documentation tags keyed by the index of the token they precede.
    docs: HashMap<usize, Vec<DocTag>>,
    pos: usize,
    depth: usize,
    errors: Vec<ParseError>,
    len: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut docs = HashMap::new();
        let mut pending = Vec::new();
        let mut prev_end = 0;
        for lexeme in Lexer::new(input) {
            let newline_before = input[prev_end..lexeme.span.start].contains('\n');
            prev_end = lexeme.span.end;
            if lexeme.token == Token::DocComment {
                pending.extend(DocTag::parse_comment(lexeme.text));
                continue;
            }
            if !pending.is_empty() {
                docs.insert(tokens.len(), std::mem::take(&mut pending));
            }
            tokens.push(Tok {
                token: lexeme.token,
                text: lexeme.text,
                span: lexeme.span,
                newline_before,
            });
        }

        Self {
            tokens,
            docs,
            pos: 0,
            depth: 0,
            errors: Vec::new(),
            len: input.len(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Token inspection
    // ---------------------------------------------------------------------------------------------

    fn nth(&self, n: usize) -> Option<&Tok<'a>> {
        self.tokens.get(self.pos + n)
    }

    fn current(&self) -> Option<&Tok<'a>> {
        self.nth(0)
    }

    fn nth_is(&self, n: usize, token: Token) -> bool {
        self.nth(n).is_some_and(|t| t.token == token)
    }

    fn at(&self, token: Token) -> bool {
        self.nth_is(0, token)
    }

    fn nth_word(&self, n: usize) -> Option<&'a str> {
        self.nth(n)
            .filter(|t| t.token == Token::Word)
            .map(|t| t.text)
    }

    fn current_word(&self) -> Option<&'a str> {
        self.nth_word(0)
    }

    fn at_word(&self, word: &str) -> bool {
        self.current_word() == Some(word)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at_newline(&self) -> bool {
        self.current().is_some_and(|t| t.newline_before)
    }

    /// Whether token `n` can begin a member name.
    fn nth_starts_name(&self, n: usize) -> bool {
        self.nth(n).is_some_and(|t| {
            matches!(
                t.token,
                Token::Word | Token::String | Token::Number | Token::LBracket | Token::Hash
            )
        })
    }

    fn start(&self) -> usize {
        self.current().map(|t| t.span.start).unwrap_or(self.len)
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn bump(&mut self) -> Option<Tok<'a>> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.at(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> PResult<Tok<'a>> {
        if self.at(token) {
            Ok(self.bump().expect("token checked above"))
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let span = match self.current() {
            Some(t) => t.span.clone(),
            None => self.len..self.len,
        };
        let found = self
            .current()
            .map(|t| format!(", found `{}`", t.text))
            .unwrap_or_else(|| ", found end of input".to_string());
        let mut message: String = message.into();
        message.push_str(&found);
        ParseError { message, span }
    }

    fn take_docs(&mut self) -> Vec<DocTag> {
        self.docs.remove(&self.pos).unwrap_or_default()
    }

    fn enter(&mut self) -> PResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error_here("nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // Skipping
    // ---------------------------------------------------------------------------------------------

    /// Skips a bracketed group starting at the current opening delimiter.
    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.bump() {
            match tok.token {
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace | Token::RParen | Token::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
            if depth == 0 {
                return;
            }
        }
    }

    /// Skips an unrecognized statement. Stops after a `;` or a top-level block, before a `}`
    /// closing the enclosing block, or before a line starting a new declaration.
    fn skip_statement(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.current() {
            if depth == 0 && self.pos > start && tok.newline_before {
                if let Token::Word = tok.token {
                    if STATEMENT_WORDS.contains(&tok.text) {
                        return;
                    }
                }
            }
            match tok.token {
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace if depth == 0 => return,
                Token::RBrace | Token::RParen | Token::RBracket if depth > 0 => {
                    depth -= 1;
                    if depth == 0 && tok.token == Token::RBrace {
                        self.bump();
                        self.eat(Token::Semicolon);
                        return;
                    }
                }
                Token::Semicolon if depth == 0 => {
                    self.bump();
                    return;
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Resynchronizes after a malformed member: stops after a `;` or `,`, or before the `}`
    /// closing the member list.
    fn recover_member(&mut self, start: usize) {
        let mut depth = 0usize;
        while let Some(tok) = self.current() {
            match tok.token {
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace if depth == 0 => break,
                Token::RBrace | Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
                Token::Semicolon | Token::Comma if depth == 0 => {
                    self.bump();
                    return;
                }
                _ => {}
            }
            self.bump();
        }
        if self.pos == start && !self.at(Token::RBrace) {
            self.bump();
        }
    }

    /// Skips an initializer expression up to one of `terminators` (not consumed), a closing
    /// delimiter, or the start of a new line.
    fn skip_initializer(&mut self, terminators: &[Token]) {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.current() {
            if depth == 0 {
                if terminators.contains(&tok.token) {
                    return;
                }
                if self.pos > start && tok.newline_before && tok.token != Token::Dot {
                    return;
                }
            }
            match tok.token {
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace | Token::RParen | Token::RBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn skip_decorators(&mut self) {
        while self.eat(Token::At) {
            while self.current_word().is_some() {
                self.bump();
                if !self.eat(Token::Dot) {
                    break;
                }
            }
            if self.at(Token::LParen) {
                self.skip_balanced();
            }
        }
    }

    /// Index of the `)` matching the `(` at `open`.
    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(open) {
            match tok.token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    // ---------------------------------------------------------------------------------------------
    // Names
    // ---------------------------------------------------------------------------------------------

    fn identifier(&mut self, what: &str) -> PResult<Node> {
        match self.current() {
            Some(tok) if tok.token == Token::Word => {
                let tok = self.bump().expect("token checked above");
                Ok(Node::with_text(SyntaxKind::Identifier, tok.text, tok.span))
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    fn modifier(&mut self, kind: SyntaxKind) -> Node {
        let tok = self.bump().expect("modifier token present");
        Node::with_text(kind, tok.text, tok.span)
    }

    /// `a` or `a.b.c`
    fn entity_name(&mut self) -> PResult<Node> {
        let first = self.identifier("a name")?;
        if !(self.at(Token::Dot) && self.nth_word(1).is_some()) {
            return Ok(first);
        }

        let start = first.span().start;
        let mut full = first.text().unwrap_or_default().to_string();
        let mut parts = vec![first];
        while self.at(Token::Dot) && self.nth_word(1).is_some() {
            self.bump();
            let part = self.identifier("a name")?;
            full.push('.');
            full.push_str(part.text().unwrap_or_default());
            parts.push(part);
        }
        let mut qualified = Node::with_text(SyntaxKind::QualifiedName, full, start..start);
        for part in parts {
            qualified.push(part);
        }
        qualified.set_end(self.prev_end());
        Ok(qualified)
    }

    /// A member name. Computed names (`[expr]`) have no node.
    fn property_name(&mut self) -> PResult<Option<Node>> {
        let Some(tok) = self.current().cloned() else {
            return Err(self.error_here("expected a member name"));
        };
        match tok.token {
            Token::Word => {
                self.bump();
                Ok(Some(Node::with_text(SyntaxKind::Identifier, tok.text, tok.span)))
            }
            Token::String => {
                self.bump();
                Ok(Some(Node::with_text(
                    SyntaxKind::StringLiteral,
                    unquote(tok.text),
                    tok.span,
                )))
            }
            Token::Number => {
                self.bump();
                Ok(Some(Node::with_text(SyntaxKind::NumericLiteral, tok.text, tok.span)))
            }
            Token::Hash if self.nth_word(1).is_some() => {
                self.bump();
                let name = self.bump().expect("word checked above");
                Ok(Some(Node::with_text(
                    SyntaxKind::Identifier,
                    format!("#{}", name.text),
                    tok.span.start..name.span.end,
                )))
            }
            Token::LBracket => {
                self.skip_balanced();
                Ok(None)
            }
            _ => Err(self.error_here("expected a member name")),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------------------------------

    fn parse_source_file(&mut self) -> Node {
        let mut root = Node::new(SyntaxKind::SourceFile, 0..self.len);
        self.parse_statements(&mut root, false);
        root
    }

    fn parse_statements(&mut self, parent: &mut Node, in_block: bool) {
        loop {
            while self.eat(Token::Semicolon) {}
            let Some(tok) = self.current() else {
                break;
            };
            if tok.token == Token::RBrace {
                if in_block {
                    break;
                }
                let error = self.error_here("unexpected `}`");
                self.errors.push(error);
                self.bump();
                continue;
            }

            match self.parse_statement() {
                Ok(Some(node)) => {
                    trace!(kind = %node.kind(), span = ?node.span(), "declaration");
                    parent.push(node);
                }
                Ok(None) => {}
                Err(error) => {
                    self.errors.push(error);
                    self.skip_statement();
                }
            }
        }
    }

    fn parse_statement(&mut self) -> PResult<Option<Node>> {
        let start = self.start();
        let mut tags = self.take_docs();
        self.skip_decorators();
        tags.extend(self.take_docs());

        let mut modifiers = Vec::new();
        loop {
            match self.current_word() {
                Some("export") => modifiers.push(self.modifier(SyntaxKind::ExportKeyword)),
                Some("declare") if self.nth_word(1).is_some() => {
                    modifiers.push(self.modifier(SyntaxKind::DeclareKeyword))
                }
                Some("abstract") if self.nth_word(1) == Some("class") => {
                    modifiers.push(self.modifier(SyntaxKind::AbstractKeyword))
                }
                Some("default") if !modifiers.is_empty() => {
                    self.bump();
                }
                _ => break,
            }
        }

        let kind = match self.current_word() {
            Some("interface") if self.nth_word(1).is_some() || self.nth_is(1, Token::LBrace) => {
                SyntaxKind::InterfaceDeclaration
            }
            Some("class") => SyntaxKind::ClassDeclaration,
            Some("type")
                if self.nth_word(1).is_some()
                    && (self.nth_is(2, Token::Eq) || self.nth_is(2, Token::Lt)) =>
            {
                SyntaxKind::TypeAliasDeclaration
            }
            Some("enum") => SyntaxKind::EnumDeclaration,
            Some("const") if self.nth_word(1) == Some("enum") => {
                self.bump();
                SyntaxKind::EnumDeclaration
            }
            Some("namespace" | "module")
                if self.nth_word(1).is_some() || self.nth_is(1, Token::String) =>
            {
                SyntaxKind::ModuleDeclaration
            }
            _ => {
                self.skip_statement();
                return Ok(None);
            }
        };

        let mut node = Node::new(kind, start..start);
        node.set_tags(tags);
        for modifier in modifiers {
            node.push(modifier);
        }

        match kind {
            SyntaxKind::InterfaceDeclaration => self.parse_interface(&mut node)?,
            SyntaxKind::ClassDeclaration => self.parse_class(&mut node)?,
            SyntaxKind::TypeAliasDeclaration => self.parse_type_alias(&mut node)?,
            SyntaxKind::EnumDeclaration => self.parse_enum(&mut node)?,
            SyntaxKind::ModuleDeclaration => self.parse_module(&mut node)?,
            _ => unreachable!("statement kinds are listed above"),
        }
        node.set_end(self.prev_end());
        Ok(Some(node))
    }

    fn parse_interface(&mut self, node: &mut Node) -> PResult<()> {
        self.bump();
        node.push(self.identifier("an interface name")?);
        if self.at(Token::Lt) {
            self.parse_type_parameters(node)?;
        }
        while self.at_word("extends") {
            node.push(self.parse_heritage_clause()?);
        }
        self.expect(Token::LBrace, "`{`")?;
        self.parse_type_members(node);
        self.expect(Token::RBrace, "`}`")?;
        Ok(())
    }

    fn parse_class(&mut self, node: &mut Node) -> PResult<()> {
        self.bump();
        if let Some(word) = self.current_word() {
            if word != "extends" && word != "implements" {
                node.push(self.identifier("a class name")?);
            }
        }
        if self.at(Token::Lt) {
            self.parse_type_parameters(node)?;
        }
        while self.at_word("extends") || self.at_word("implements") {
            node.push(self.parse_heritage_clause()?);
        }
        self.expect(Token::LBrace, "`{`")?;
        self.parse_class_members(node);
        self.expect(Token::RBrace, "`}`")?;
        Ok(())
    }

    fn parse_type_alias(&mut self, node: &mut Node) -> PResult<()> {
        self.bump();
        node.push(self.identifier("a type alias name")?);
        if self.at(Token::Lt) {
            self.parse_type_parameters(node)?;
        }
        self.expect(Token::Eq, "`=`")?;
        node.push(self.parse_type()?);
        self.eat(Token::Semicolon);
        Ok(())
    }

    fn parse_enum(&mut self, node: &mut Node) -> PResult<()> {
        self.bump();
        node.push(self.identifier("an enum name")?);
        if !self.at(Token::LBrace) {
            return Err(self.error_here("expected `{`"));
        }
        self.skip_balanced();
        Ok(())
    }

    fn parse_module(&mut self, node: &mut Node) -> PResult<()> {
        self.bump();
        if self.at(Token::String) {
            let tok = self.bump().expect("token checked above");
            node.push(Node::with_text(
                SyntaxKind::StringLiteral,
                unquote(tok.text),
                tok.span,
            ));
        } else {
            node.push(self.entity_name()?);
        }

        if !self.at(Token::LBrace) {
            self.eat(Token::Semicolon);
            return Ok(());
        }

        let open = self.bump().expect("token checked above");
        let mut block = Node::new(SyntaxKind::ModuleBlock, open.span.start..open.span.end);
        self.enter()?;
        self.parse_statements(&mut block, true);
        self.depth -= 1;
        self.expect(Token::RBrace, "`}`")?;
        block.set_end(self.prev_end());
        node.push(block);
        Ok(())
    }

    fn parse_heritage_clause(&mut self) -> PResult<Node> {
        let keyword = self.bump().expect("heritage keyword present");
        let mut clause = Node::with_text(SyntaxKind::HeritageClause, keyword.text, keyword.span);
        loop {
            clause.push(self.parse_type()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        clause.set_end(self.prev_end());
        Ok(clause)
    }

    fn parse_type_parameters(&mut self, parent: &mut Node) -> PResult<()> {
        self.expect(Token::Lt, "`<`")?;
        loop {
            if self.eat(Token::Gt) {
                break;
            }
            let start = self.start();
            self.eat_word("const");
            if matches!(self.current_word(), Some("in" | "out")) && self.nth_word(1).is_some() {
                self.bump();
            }
            let mut param = Node::new(SyntaxKind::TypeParameter, start..start);
            param.push(self.identifier("a type parameter")?);
            if self.eat_word("extends") {
                param.push(self.parse_type()?);
            }
            if self.eat(Token::Eq) {
                param.push(self.parse_type()?);
            }
            param.set_end(self.prev_end());
            parent.push(param);
            if !self.eat(Token::Comma) {
                self.expect(Token::Gt, "`>`")?;
                break;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------------------------------------

    fn parse_type_members(&mut self, parent: &mut Node) {
        loop {
            while self.eat(Token::Semicolon) || self.eat(Token::Comma) {}
            if self.at_eof() || self.at(Token::RBrace) {
                break;
            }
            let start = self.pos;
            match self.parse_type_member() {
                Ok(member) => parent.push(member),
                Err(error) => {
                    self.errors.push(error);
                    self.recover_member(start);
                }
            }
        }
    }

    fn parse_type_member(&mut self) -> PResult<Node> {
        let start = self.start();
        let tags = self.take_docs();

        let mut modifiers = Vec::new();
        if self.at_word("readonly") && self.nth_starts_name(1) {
            modifiers.push(self.modifier(SyntaxKind::ReadonlyKeyword));
        }

        if matches!(self.current_word(), Some("get" | "set")) && self.nth_starts_name(1) {
            self.bump();
            let mut node = Node::new(SyntaxKind::MethodSignature, start..start);
            if let Some(name) = self.property_name()? {
                node.push(name);
            }
            self.parse_signature(&mut node, false)?;
            node.set_end(self.prev_end());
            return Ok(node);
        }

        let kind = if self.at(Token::LBracket) && self.looks_like_index_signature() {
            SyntaxKind::IndexSignature
        } else if self.at(Token::LParen)
            || self.at(Token::Lt)
            || (self.at_word("new") && (self.nth_is(1, Token::LParen) || self.nth_is(1, Token::Lt)))
        {
            // call or construct signature
            self.eat_word("new");
            let mut node = Node::new(SyntaxKind::MethodSignature, start..start);
            self.parse_signature(&mut node, false)?;
            node.set_end(self.prev_end());
            return Ok(node);
        } else {
            SyntaxKind::PropertySignature
        };

        let mut node = Node::new(kind, start..start);
        node.set_tags(tags);
        for modifier in modifiers {
            node.push(modifier);
        }

        if kind == SyntaxKind::IndexSignature {
            self.parse_index_signature(&mut node)?;
            node.set_end(self.prev_end());
            return Ok(node);
        }

        if let Some(name) = self.property_name()? {
            node.push(name);
        }
        if self.at(Token::Question) {
            let tok = self.bump().expect("token checked above");
            node.push(Node::new(SyntaxKind::QuestionToken, tok.span));
        }

        if self.at(Token::LParen) || self.at(Token::Lt) {
            let mut method = Node::new(SyntaxKind::MethodSignature, start..start);
            for child in node.children().cloned().collect::<Vec<_>>() {
                method.push(child);
            }
            self.parse_signature(&mut method, false)?;
            method.set_end(self.prev_end());
            return Ok(method);
        }

        if self.eat(Token::Colon) {
            node.push(self.parse_type()?);
        }
        node.set_end(self.prev_end());
        Ok(node)
    }

    fn looks_like_index_signature(&self) -> bool {
        self.nth_word(1).is_some() && self.nth_is(2, Token::Colon)
    }

    fn parse_index_signature(&mut self, node: &mut Node) -> PResult<()> {
        self.expect(Token::LBracket, "`[`")?;
        let mut key = Node::new(SyntaxKind::Parameter, self.start()..self.start());
        key.push(self.identifier("an index name")?);
        self.expect(Token::Colon, "`:`")?;
        key.push(self.parse_type()?);
        key.set_end(self.prev_end());
        node.push(key);
        self.expect(Token::RBracket, "`]`")?;
        if self.at(Token::Question) {
            let tok = self.bump().expect("token checked above");
            node.push(Node::new(SyntaxKind::QuestionToken, tok.span));
        }
        self.expect(Token::Colon, "`:`")?;
        node.push(self.parse_type()?);
        Ok(())
    }

    /// Type parameters, parameters, return type and (for class methods) body. Return types are
    /// parsed leniently; they never contribute to a declaration's shape.
    fn parse_signature(&mut self, node: &mut Node, with_body: bool) -> PResult<()> {
        if self.at(Token::Lt) {
            self.parse_type_parameters(node)?;
        }
        self.parse_parameters(node)?;
        if self.eat(Token::Colon) {
            self.skip_return_type(with_body);
        }
        if with_body {
            if self.at(Token::LBrace) {
                self.skip_balanced();
            } else {
                self.eat(Token::Semicolon);
            }
        }
        Ok(())
    }

    fn skip_return_type(&mut self, with_body: bool) {
        let save = self.pos;
        let errors = self.errors.len();
        let parsed = self.parse_type();
        self.errors.truncate(errors);

        let terminated = match self.current() {
            None => true,
            Some(tok) => {
                tok.newline_before
                    || matches!(tok.token, Token::Semicolon | Token::Comma | Token::RBrace)
                    || (with_body && tok.token == Token::LBrace)
            }
        };
        if parsed.is_ok() && terminated {
            return;
        }

        self.pos = save;
        let mut depth = 0usize;
        while let Some(tok) = self.current() {
            if depth == 0 {
                let stop = matches!(tok.token, Token::Semicolon | Token::Comma | Token::RBrace)
                    || (with_body && tok.token == Token::LBrace)
                    || (self.pos > save && tok.newline_before);
                if stop {
                    return;
                }
            }
            match tok.token {
                Token::LBrace | Token::LParen | Token::LBracket | Token::Lt => depth += 1,
                Token::RBrace | Token::RParen | Token::RBracket | Token::Gt => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn parse_parameters(&mut self, parent: &mut Node) -> PResult<()> {
        self.expect(Token::LParen, "`(`")?;
        loop {
            if self.eat(Token::RParen) {
                break;
            }
            parent.push(self.parse_parameter()?);
            if !self.eat(Token::Comma) {
                self.expect(Token::RParen, "`)`")?;
                break;
            }
        }
        Ok(())
    }

    fn parse_parameter(&mut self) -> PResult<Node> {
        self.skip_decorators();
        let start = self.start();
        let mut param = Node::new(SyntaxKind::Parameter, start..start);

        while let Some(word) = self.current_word() {
            if !self.nth_starts_binding(1) {
                break;
            }
            match SyntaxKind::modifier(word) {
                Some(kind) => param.push(self.modifier(kind)),
                None if word == "override" => {
                    self.bump();
                }
                None => break,
            }
        }

        self.eat(Token::Ellipsis);
        match self.current().map(|t| t.token) {
            Some(Token::Word) => param.push(self.identifier("a parameter name")?),
            Some(Token::LBrace | Token::LBracket) => self.skip_balanced(),
            _ => return Err(self.error_here("expected a parameter name")),
        }
        if self.at(Token::Question) {
            let tok = self.bump().expect("token checked above");
            param.push(Node::new(SyntaxKind::QuestionToken, tok.span));
        }
        if self.eat(Token::Colon) {
            param.push(self.parse_type()?);
        }
        if self.eat(Token::Eq) {
            self.skip_initializer(&[Token::Comma, Token::RParen]);
        }
        param.set_end(self.prev_end());
        Ok(param)
    }

    fn nth_starts_binding(&self, n: usize) -> bool {
        self.nth(n).is_some_and(|t| {
            matches!(
                t.token,
                Token::Word | Token::LBrace | Token::LBracket | Token::Ellipsis
            )
        })
    }

    fn parse_class_members(&mut self, parent: &mut Node) {
        loop {
            while self.eat(Token::Semicolon) {}
            if self.at_eof() || self.at(Token::RBrace) {
                break;
            }
            let start = self.pos;
            match self.parse_class_member() {
                Ok(Some(member)) => parent.push(member),
                Ok(None) => {}
                Err(error) => {
                    self.errors.push(error);
                    self.recover_member(start);
                }
            }
        }
    }

    fn parse_class_member(&mut self) -> PResult<Option<Node>> {
        let mut tags = self.take_docs();
        self.skip_decorators();
        tags.extend(self.take_docs());
        let start = self.start();

        if self.at_word("static") && self.nth_is(1, Token::LBrace) {
            // static initialization block
            self.bump();
            self.skip_balanced();
            return Ok(None);
        }

        let mut modifiers = Vec::new();
        while let Some(word) = self.current_word() {
            if !(self.nth_starts_name(1) || self.nth_is(1, Token::Star)) {
                break;
            }
            match SyntaxKind::modifier(word) {
                Some(kind) => modifiers.push(self.modifier(kind)),
                None if matches!(word, "override" | "accessor" | "async") => {
                    self.bump();
                }
                None => break,
            }
        }

        let member = |kind: SyntaxKind, modifiers: Vec<Node>, tags: Vec<DocTag>| {
            let mut node = Node::new(kind, start..start);
            node.set_tags(tags);
            for modifier in modifiers {
                node.push(modifier);
            }
            node
        };

        if self.at_word("constructor") && self.nth_is(1, Token::LParen) {
            self.bump();
            let mut node = member(SyntaxKind::Constructor, modifiers, tags);
            self.parse_parameters(&mut node)?;
            if self.at(Token::LBrace) {
                self.skip_balanced();
            } else {
                self.eat(Token::Semicolon);
            }
            node.set_end(self.prev_end());
            return Ok(Some(node));
        }

        if matches!(self.current_word(), Some("get" | "set")) && self.nth_starts_name(1) {
            self.bump();
            let mut node = member(SyntaxKind::MethodDeclaration, modifiers, tags);
            if let Some(name) = self.property_name()? {
                node.push(name);
            }
            self.parse_signature(&mut node, true)?;
            node.set_end(self.prev_end());
            return Ok(Some(node));
        }

        self.eat(Token::Star);

        if self.at(Token::LBracket) && self.looks_like_index_signature() {
            let mut node = member(SyntaxKind::IndexSignature, modifiers, tags);
            self.parse_index_signature(&mut node)?;
            self.eat(Token::Semicolon);
            node.set_end(self.prev_end());
            return Ok(Some(node));
        }

        let name = self.property_name()?;
        let question = if self.at(Token::Question) {
            let tok = self.bump().expect("token checked above");
            Some(Node::new(SyntaxKind::QuestionToken, tok.span))
        } else {
            None
        };
        self.eat(Token::Bang);

        let kind = if self.at(Token::LParen) || self.at(Token::Lt) {
            SyntaxKind::MethodDeclaration
        } else {
            SyntaxKind::PropertyDeclaration
        };
        let mut node = member(kind, modifiers, tags);
        if let Some(name) = name {
            node.push(name);
        }
        if let Some(question) = question {
            node.push(question);
        }

        if kind == SyntaxKind::MethodDeclaration {
            self.parse_signature(&mut node, true)?;
        } else {
            if self.eat(Token::Colon) {
                node.push(self.parse_type()?);
            }
            if self.eat(Token::Eq) {
                self.skip_initializer(&[Token::Semicolon]);
            }
            self.eat(Token::Semicolon);
        }
        node.set_end(self.prev_end());
        Ok(Some(node))
    }

    // ---------------------------------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------------------------------

    fn parse_type(&mut self) -> PResult<Node> {
        self.enter()?;
        let result = self.parse_union_type();
        self.depth -= 1;
        result
    }

    fn parse_union_type(&mut self) -> PResult<Node> {
        let start = self.start();
        self.eat(Token::Pipe);
        let first = self.parse_intersection_type()?;
        if !self.at(Token::Pipe) {
            return Ok(first);
        }

        let mut union = Node::new(SyntaxKind::UnionType, start..start);
        union.push(first);
        while self.eat(Token::Pipe) {
            union.push(self.parse_intersection_type()?);
        }
        union.set_end(self.prev_end());
        Ok(union)
    }

    fn parse_intersection_type(&mut self) -> PResult<Node> {
        let start = self.start();
        self.eat(Token::Amp);
        let first = self.parse_postfix_type()?;
        if !self.at(Token::Amp) {
            return Ok(first);
        }

        let mut intersection = Node::new(SyntaxKind::IntersectionType, start..start);
        intersection.push(first);
        while self.eat(Token::Amp) {
            intersection.push(self.parse_postfix_type()?);
        }
        intersection.set_end(self.prev_end());
        Ok(intersection)
    }

    fn parse_postfix_type(&mut self) -> PResult<Node> {
        let start = self.start();
        let mut ty = self.parse_primary_type()?;
        while self.at(Token::LBracket) && !self.at_newline() {
            self.bump();
            let kind = if self.eat(Token::RBracket) {
                SyntaxKind::ArrayType
            } else {
                SyntaxKind::IndexedAccessType
            };
            let mut wrapper = Node::new(kind, start..start);
            wrapper.push(ty);
            if kind == SyntaxKind::IndexedAccessType {
                wrapper.push(self.parse_type()?);
                self.expect(Token::RBracket, "`]`")?;
            }
            wrapper.set_end(self.prev_end());
            ty = wrapper;
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> PResult<Node> {
        let start = self.start();
        let Some(tok) = self.current().cloned() else {
            return Err(self.error_here("expected a type"));
        };

        match tok.token {
            Token::LParen if self.is_function_type_start() => self.parse_function_type(),
            Token::Lt => self.parse_function_type(),
            Token::LParen => {
                self.bump();
                let mut node = Node::new(SyntaxKind::ParenthesizedType, start..start);
                node.push(self.parse_type()?);
                self.expect(Token::RParen, "`)`")?;
                node.set_end(self.prev_end());
                Ok(node)
            }
            Token::LBrace => {
                self.bump();
                let mut node = Node::new(SyntaxKind::TypeLiteral, start..start);
                self.enter()?;
                self.parse_type_members(&mut node);
                self.depth -= 1;
                self.expect(Token::RBrace, "`}`")?;
                node.set_end(self.prev_end());
                Ok(node)
            }
            Token::LBracket => self.parse_tuple_type(),
            Token::String => {
                self.bump();
                let literal = Node::with_text(SyntaxKind::StringLiteral, unquote(tok.text), tok.span);
                Ok(Self::literal_type(literal))
            }
            Token::Number => {
                self.bump();
                let literal = Node::with_text(SyntaxKind::NumericLiteral, tok.text, tok.span);
                Ok(Self::literal_type(literal))
            }
            Token::Minus if self.nth_is(1, Token::Number) => {
                self.bump();
                let number = self.bump().expect("token checked above");
                let literal = Node::with_text(
                    SyntaxKind::NumericLiteral,
                    format!("-{}", number.text),
                    start..number.span.end,
                );
                Ok(Self::literal_type(literal))
            }
            Token::Template => Err(self.error_here("template literal types are not supported")),
            Token::Word => self.parse_word_type(),
            _ => Err(self.error_here("expected a type")),
        }
    }

    fn literal_type(literal: Node) -> Node {
        let mut node = Node::new(SyntaxKind::LiteralType, literal.span());
        node.push(literal);
        node
    }

    fn parse_word_type(&mut self) -> PResult<Node> {
        let tok = self.current().cloned().expect("word token present");
        let start = tok.span.start;

        match tok.text {
            "typeof" => {
                self.bump();
                let mut node = Node::new(SyntaxKind::TypeQuery, start..start);
                if self.current_word().is_none() {
                    return Err(self.error_here("expected a name after `typeof`"));
                }
                node.push(self.entity_name()?);
                if self.at(Token::Lt) {
                    self.parse_type_arguments(&mut node)?;
                }
                node.set_end(self.prev_end());
                Ok(node)
            }
            "true" | "false" => {
                self.bump();
                let kind = if tok.text == "true" {
                    SyntaxKind::TrueKeyword
                } else {
                    SyntaxKind::FalseKeyword
                };
                Ok(Self::literal_type(Node::with_text(kind, tok.text, tok.span)))
            }
            "new" if self.nth_is(1, Token::LParen) || self.nth_is(1, Token::Lt) => {
                self.bump();
                self.parse_function_type()
            }
            "readonly" if self.nth(1).is_some_and(|t| !t.newline_before) => {
                self.bump();
                self.parse_postfix_type()
            }
            "keyof" | "unique" | "infer" | "asserts" if self.nth_word(1).is_some() => Err(
                self.error_here(format!("type operator `{}` is not supported", tok.text)),
            ),
            word => match SyntaxKind::keyword_type(word) {
                Some(kind) if !self.nth_is(1, Token::Dot) => {
                    self.bump();
                    Ok(Node::with_text(kind, word, tok.span))
                }
                _ => {
                    let mut node = Node::new(SyntaxKind::TypeReference, start..start);
                    node.push(self.entity_name()?);
                    if self.at(Token::Lt) && !self.at_newline() {
                        self.parse_type_arguments(&mut node)?;
                    }
                    node.set_end(self.prev_end());
                    Ok(node)
                }
            },
        }
    }

    fn parse_type_arguments(&mut self, parent: &mut Node) -> PResult<()> {
        self.expect(Token::Lt, "`<`")?;
        loop {
            parent.push(self.parse_type()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Gt, "`>`")?;
        Ok(())
    }

    fn is_function_type_start(&self) -> bool {
        self.matching_paren(self.pos)
            .and_then(|close| self.tokens.get(close + 1))
            .is_some_and(|t| t.token == Token::Arrow)
    }

    fn parse_function_type(&mut self) -> PResult<Node> {
        let start = self.start();
        let mut node = Node::new(SyntaxKind::FunctionType, start..start);
        if self.at(Token::Lt) {
            self.parse_type_parameters(&mut node)?;
        }
        self.parse_parameters(&mut node)?;
        self.expect(Token::Arrow, "`=>`")?;
        node.push(self.parse_type()?);
        node.set_end(self.prev_end());
        Ok(node)
    }

    fn parse_tuple_type(&mut self) -> PResult<Node> {
        let start = self.start();
        self.expect(Token::LBracket, "`[`")?;
        let mut tuple = Node::new(SyntaxKind::TupleType, start..start);
        loop {
            if self.eat(Token::RBracket) {
                break;
            }
            let element_start = self.start();
            let spread = self.eat(Token::Ellipsis);
            // named element: `name: T` or `name?: T`
            if self.current_word().is_some()
                && (self.nth_is(1, Token::Colon)
                    || (self.nth_is(1, Token::Question) && self.nth_is(2, Token::Colon)))
            {
                self.bump();
                self.eat(Token::Question);
                self.bump();
            }
            let element = self.parse_type()?;
            self.eat(Token::Question);
            if spread {
                let mut node = Node::new(SyntaxKind::SpreadElement, element_start..element_start);
                node.push(element);
                node.set_end(self.prev_end());
                tuple.push(node);
            } else {
                tuple.push(element);
            }
            if !self.eat(Token::Comma) {
                self.expect(Token::RBracket, "`]`")?;
                break;
            }
        }
        tuple.set_end(self.prev_end());
        Ok(tuple)
    }
}
