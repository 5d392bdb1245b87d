use tracing::trace;

use crate::block::{Block, Span};
use crate::lexer::{Token, TokenKind};
use crate::page::{PageContext, ResolvedUrl};

/// Build the block forest for a token stream.
///
/// Never fails: unterminated links, inline code and code blocks are
/// dropped, stray delimiters and two-backtick runs are ignored.
pub fn build(tokens: &[Token], page: &PageContext) -> Vec<Block> {
    let mut state = ParseState::new(page);

    let mut i = 0;
    while i < tokens.len() {
        let previous = i.checked_sub(1).map(|p| &tokens[p]);
        if state.process(&tokens[i], previous, tokens.get(i + 1)) {
            // The following token was consumed too.
            i += 1;
        }
        i += 1;
    }

    state.blocks
}

/// Where the builder is, together with whatever construct is open there.
enum BuildState {
    Paragraph,
    /// Between `[` and `](`.
    InsideAlt(LinkBuilder),
    /// Between `](` and `)`.
    InsideSrc(LinkBuilder),
    InsideInlineCode(String),
    InsideBlockCode(String),
}

#[derive(Default)]
struct LinkBuilder {
    target: Option<ResolvedUrl>,
    content: Vec<Span>,
    /// Set for `![alt](src)`; the alt text lands here instead of `content`.
    image_alt: Option<String>,
}

struct ParseState<'a> {
    page: &'a PageContext,
    build: BuildState,
    // Spans of the open paragraph; links and inline code attach here on close
    paragraph: Vec<Span>,
    blocks: Vec<Block>,
}

impl<'a> ParseState<'a> {
    fn new(page: &'a PageContext) -> Self {
        Self {
            page,
            build: BuildState::Paragraph,
            paragraph: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Feed one token. Returns true when `next` was consumed as well.
    fn process(&mut self, token: &Token, previous: Option<&Token>, next: Option<&Token>) -> bool {
        match token.kind {
            TokenKind::Begin => {
                self.build = BuildState::Paragraph;
                self.paragraph = Vec::new();
            }
            TokenKind::Text => self.text(&token.text),
            TokenKind::CodeQuote => self.code_quote(token),
            TokenKind::Delimiter => return self.delimiter(token, previous, next),
            TokenKind::LineBreak => self.line_break(token),
            TokenKind::End => {
                self.abandon();
                self.flush_paragraph();
            }
        }
        false
    }

    fn text(&mut self, text: &str) {
        match &mut self.build {
            BuildState::Paragraph => push_text(&mut self.paragraph, text),
            BuildState::InsideAlt(link) => match &mut link.image_alt {
                Some(alt) => *alt = text.to_string(),
                None => push_text(&mut link.content, text),
            },
            BuildState::InsideSrc(link) => link.target = Some(self.page.resolve(text)),
            BuildState::InsideInlineCode(code) | BuildState::InsideBlockCode(code) => {
                code.push_str(text)
            }
        }
    }

    fn code_quote(&mut self, token: &Token) {
        let width = token.char_count();
        match std::mem::replace(&mut self.build, BuildState::Paragraph) {
            BuildState::Paragraph => match width {
                1 => self.build = BuildState::InsideInlineCode(String::new()),
                2 => trace!("ignoring double backtick"),
                _ => {
                    self.flush_paragraph();
                    self.build = BuildState::InsideBlockCode(String::new());
                }
            },
            BuildState::InsideInlineCode(code) if width == 1 => {
                self.paragraph.push(Span::Code(code));
            }
            BuildState::InsideInlineCode(mut code) => {
                code.push_str(&token.text);
                self.build = BuildState::InsideInlineCode(code);
            }
            BuildState::InsideBlockCode(code) if width > 2 => {
                let content = strip_fence_breaks(&code).to_string();
                self.blocks.push(Block::CodeBlock { content });
                self.paragraph = Vec::new();
            }
            BuildState::InsideBlockCode(mut code) => {
                code.push_str(&token.text);
                self.build = BuildState::InsideBlockCode(code);
            }
            link @ (BuildState::InsideAlt(_) | BuildState::InsideSrc(_)) => {
                trace!("ignoring backticks inside link");
                self.build = link;
            }
        }
    }

    fn delimiter(&mut self, token: &Token, previous: Option<&Token>, next: Option<&Token>) -> bool {
        if let BuildState::InsideInlineCode(code) | BuildState::InsideBlockCode(code) =
            &mut self.build
        {
            code.push_str(&token.text);
            return false;
        }

        if token.is_delimiter('[') {
            self.abandon();
            let image_alt = previous
                .is_some_and(|t| t.is_delimiter('!'))
                .then(String::new);
            self.build = BuildState::InsideAlt(LinkBuilder {
                image_alt,
                ..LinkBuilder::default()
            });
            return false;
        }

        match std::mem::replace(&mut self.build, BuildState::Paragraph) {
            BuildState::InsideAlt(link)
                if token.is_delimiter(']') && next.is_some_and(|t| t.is_delimiter('(')) =>
            {
                self.build = BuildState::InsideSrc(link);
                true
            }
            BuildState::InsideSrc(link) if token.is_delimiter(')') => {
                self.close_link(link);
                false
            }
            other => {
                trace!(delimiter = token.text.as_str(), "ignoring delimiter");
                self.build = other;
                false
            }
        }
    }

    fn close_link(&mut self, link: LinkBuilder) {
        let target = link.target.unwrap_or_else(|| self.page.resolve(""));
        let content = match link.image_alt {
            Some(alt) => vec![Span::Image {
                alt,
                src: target.url.clone(),
            }],
            None => link.content,
        };
        self.paragraph.push(Span::Link {
            url: target.url,
            risky: target.risky,
            content,
        });
    }

    fn line_break(&mut self, token: &Token) {
        if token.char_count() > 1 {
            if let BuildState::InsideBlockCode(code) = &mut self.build {
                code.push_str(&token.text);
            } else {
                self.abandon();
                self.flush_paragraph();
            }
            return;
        }

        match &mut self.build {
            BuildState::Paragraph => soft_break(&mut self.paragraph),
            BuildState::InsideAlt(link) if link.image_alt.is_none() => {
                soft_break(&mut link.content)
            }
            BuildState::InsideInlineCode(code) if !code.is_empty() => code.push(' '),
            BuildState::InsideBlockCode(code) => code.push_str(&token.text),
            BuildState::InsideAlt(_) | BuildState::InsideSrc(_) | BuildState::InsideInlineCode(_) => {}
        }
    }

    /// Drop whatever link, inline code or code block is still open.
    fn abandon(&mut self) {
        match std::mem::replace(&mut self.build, BuildState::Paragraph) {
            BuildState::Paragraph => {}
            BuildState::InsideAlt(_) | BuildState::InsideSrc(_) => {
                trace!("dropping unterminated link")
            }
            BuildState::InsideInlineCode(_) => trace!("dropping unterminated inline code"),
            BuildState::InsideBlockCode(_) => trace!("dropping unterminated code block"),
        }
    }

    /// Close the open paragraph and start a new one.
    fn flush_paragraph(&mut self) {
        let mut content = std::mem::take(&mut self.paragraph);
        if !content.iter().any(Span::has_content) {
            return;
        }
        if let Some(Span::Text(text)) = content.last_mut() {
            text.truncate(text.trim_end().len());
            if text.is_empty() {
                content.pop();
            }
        }
        self.blocks.push(Block::Paragraph { content });
    }
}

/// Append text, merging with a preceding text run.
fn push_text(spans: &mut Vec<Span>, text: &str) {
    if let Some(Span::Text(last)) = spans.last_mut() {
        last.push_str(text);
    } else {
        spans.push(Span::Text(text.to_string()));
    }
}

/// A single newline reads as a space, once there is something to separate.
fn soft_break(spans: &mut Vec<Span>) {
    if spans.iter().any(Span::has_content) {
        push_text(spans, " ");
    }
}

/// The newline right after the opening fence and the one right before the
/// closing fence belong to the fences.
fn strip_fence_breaks(code: &str) -> &str {
    let code = code.strip_prefix('\n').unwrap_or(code);
    code.strip_suffix('\n').unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Vec<Block> {
        parse_on("https://site.test/", source)
    }

    fn parse_on(page: &str, source: &str) -> Vec<Block> {
        let page = PageContext::new(page).unwrap();
        build(&tokenize(source), &page)
    }

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    fn paragraph(content: Vec<Span>) -> Block {
        Block::Paragraph { content }
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("  \n\n  "), vec![]);
    }

    #[test]
    fn plain_text() {
        assert_eq!(parse("hello world"), vec![paragraph(vec![text("hello world")])]);
    }

    #[test]
    fn soft_break_becomes_space() {
        assert_eq!(parse("one\ntwo"), vec![paragraph(vec![text("one two")])]);
    }

    #[test]
    fn blank_lines_split_paragraphs() {
        assert_eq!(
            parse("one\n\ntwo\n\n\n\nthree"),
            vec![
                paragraph(vec![text("one")]),
                paragraph(vec![text("two")]),
                paragraph(vec![text("three")]),
            ]
        );
    }

    #[test]
    fn leading_newline_adds_nothing() {
        assert_eq!(parse("\nhello\n"), vec![paragraph(vec![text("hello")])]);
    }

    #[test]
    fn link_same_host() {
        assert_eq!(
            parse_on("http://x.com/", "[alt](http://x.com/y)"),
            vec![paragraph(vec![Span::Link {
                url: "http://x.com/y".to_string(),
                risky: false,
                content: vec![text("alt")],
            }])]
        );
    }

    #[test]
    fn link_other_host() {
        assert_eq!(
            parse("see [alt](http://x.com/y) now"),
            vec![paragraph(vec![
                text("see "),
                Span::Link {
                    url: "http://x.com/y".to_string(),
                    risky: true,
                    content: vec![text("alt")],
                },
                text("now"),
            ])]
        );
    }

    #[test]
    fn image_resolves_against_page() {
        assert_eq!(
            parse("![alt](img.png)"),
            vec![paragraph(vec![Span::Link {
                url: "https://site.test/img.png".to_string(),
                risky: false,
                content: vec![Span::Image {
                    alt: "alt".to_string(),
                    src: "https://site.test/img.png".to_string(),
                }],
            }])]
        );
    }

    #[test]
    fn uploaded_image_without_alt() {
        let blocks = parse("![](/media/a.png)");
        let [Block::Paragraph { content }] = blocks.as_slice() else {
            panic!("expected one paragraph, got {blocks:?}");
        };
        assert_eq!(
            content[0],
            Span::Link {
                url: "https://site.test/media/a.png".to_string(),
                risky: false,
                content: vec![Span::Image {
                    alt: String::new(),
                    src: "https://site.test/media/a.png".to_string(),
                }],
            }
        );
    }

    #[test]
    fn bang_without_bracket_is_dropped() {
        assert_eq!(parse("Hi!"), vec![paragraph(vec![text("Hi")])]);
    }

    #[test]
    fn javascript_link_is_coerced() {
        let blocks = parse("[x](javascript:alert(1))");
        let [Block::Paragraph { content }] = blocks.as_slice() else {
            panic!("expected one paragraph, got {blocks:?}");
        };
        let Span::Link { url, risky, .. } = &content[0] else {
            panic!("expected link, got {:?}", content[0]);
        };
        assert!(url.starts_with("https://site.test/"));
        assert!(!risky);
    }

    #[test]
    fn link_without_source_points_at_page() {
        assert_eq!(
            parse("[here]()"),
            vec![paragraph(vec![Span::Link {
                url: "https://site.test/".to_string(),
                risky: false,
                content: vec![text("here")],
            }])]
        );
    }

    #[test]
    fn unterminated_link_is_dropped() {
        assert_eq!(parse("a [b](c"), vec![paragraph(vec![text("a")])]);
        assert_eq!(parse("a [b"), vec![paragraph(vec![text("a")])]);
    }

    #[test]
    fn bracket_without_paren_stays_open() {
        // `]` not followed by `(` is ignored; the link never closes.
        assert_eq!(parse("[b] c"), vec![]);
    }

    #[test]
    fn stray_delimiters_are_ignored() {
        assert_eq!(parse("a ] b ) c"), vec![paragraph(vec![text("a b c")])]);
    }

    #[test]
    fn inline_code() {
        assert_eq!(parse("`code`"), vec![paragraph(vec![Span::Code("code".to_string())])]);
    }

    #[test]
    fn inline_code_keeps_markup_literal() {
        assert_eq!(
            parse("`[a](b)`"),
            vec![paragraph(vec![Span::Code("[a](b)".to_string())])]
        );
    }

    #[test]
    fn unterminated_inline_code_is_dropped() {
        assert_eq!(parse("`code"), vec![]);
        assert_eq!(parse("text `code"), vec![paragraph(vec![text("text")])]);
    }

    #[test]
    fn double_backtick_is_inert() {
        assert_eq!(parse("a ``b"), vec![paragraph(vec![text("a b")])]);
    }

    #[test]
    fn code_block() {
        assert_eq!(
            parse("```\nline1\nline2\n```"),
            vec![Block::CodeBlock {
                content: "line1\nline2".to_string()
            }]
        );
    }

    #[test]
    fn code_block_keeps_blank_lines_and_markup() {
        assert_eq!(
            parse("```\na[0]\n\n`b`\n```"),
            vec![Block::CodeBlock {
                content: "a[0]\n\n`b`".to_string()
            }]
        );
    }

    #[test]
    fn code_block_between_paragraphs() {
        assert_eq!(
            parse("before\n```\ncode\n```\nafter"),
            vec![
                paragraph(vec![text("before")]),
                Block::CodeBlock {
                    content: "code".to_string()
                },
                paragraph(vec![text("after")]),
            ]
        );
    }

    #[test]
    fn unterminated_code_block_is_dropped() {
        assert_eq!(
            parse("intro\n\n```\nnever closed"),
            vec![paragraph(vec![text("intro")])]
        );
    }

    #[test]
    fn paragraph_break_drops_open_link() {
        assert_eq!(
            parse("a [b\n\nc"),
            vec![paragraph(vec![text("a")]), paragraph(vec![text("c")])]
        );
    }

    #[test]
    fn new_bracket_restarts_link() {
        assert_eq!(
            parse("[a [b](/c)"),
            vec![paragraph(vec![Span::Link {
                url: "https://site.test/c".to_string(),
                risky: false,
                content: vec![text("b")],
            }])]
        );
    }

    #[test]
    fn soft_break_inside_link_text() {
        assert_eq!(
            parse("[a\nb](/c)"),
            vec![paragraph(vec![Span::Link {
                url: "https://site.test/c".to_string(),
                risky: false,
                content: vec![text("a b")],
            }])]
        );
    }

    #[test]
    fn tokens_without_begin_still_build() {
        let page = PageContext::new("https://site.test/").unwrap();
        let tokens = vec![
            Token::new(TokenKind::Text, "x"),
            Token::new(TokenKind::End, ""),
        ];
        assert_eq!(build(&tokens, &page), vec![paragraph(vec![text("x")])]);
    }
}
