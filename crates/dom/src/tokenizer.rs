//! Forgiving markup tokenizer for form fragments and small documents.
//!
//! Tag and attribute names are restricted to ASCII `[A-Za-z0-9:_-]` and are
//! lowercased. `script` and `style` bodies are treated as raw text. This is not an
//! HTML5 state machine: there is no parse-error recovery beyond skipping bytes
//! that cannot start a token.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

// Non-ASCII bytes only occur as whole UTF-8 sequences, so a run of them ends
// on a char boundary.
fn is_attribute_name_byte(b: u8) -> bool {
    is_name_byte(b) || b == b'.' || !b.is_ascii()
}

pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_rawtext_element(name: &str) -> bool {
    name == "script" || name == "style"
}

fn find_rawtext_close(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        let after = i + 2 + name.len();
        if bytes.get(i + 1) == Some(&b'/')
            && bytes
                .get(i + 2..after)
                .is_some_and(|s| s.eq_ignore_ascii_case(name.as_bytes()))
        {
            let mut k = after;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if bytes.get(k) == Some(&b'>') {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    // Tag name bytes are ASCII, so both slice ends stay on char boundaries.
    fn take_name(&mut self) -> &'a str {
        self.take_while(is_name_byte)
    }

    fn take_attribute_name(&mut self) -> &'a str {
        self.take_while(is_attribute_name_byte)
    }

    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Steps over one whole character.
    fn skip_char(&mut self) {
        self.pos += self.rest().chars().next().map_or(1, char::len_utf8);
    }

    fn take_until(&mut self, stop: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| !stop(b)) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut cur = Cursor::new(input);

    while !cur.at_end() {
        if cur.peek() != Some(b'<') {
            let start = cur.pos;
            cur.pos += memchr(b'<', &cur.bytes[start..]).unwrap_or(cur.bytes.len() - start);
            let text = decode_entities(&input[start..cur.pos]);
            if !text.is_empty() {
                out.push(Token::Text(text));
            }
            continue;
        }

        let rest = cur.rest();
        if let Some(body) = rest.strip_prefix(COMMENT_START) {
            match body.find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(body[..end].to_string()));
                    cur.pos += COMMENT_START.len() + end + COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(body.to_string()));
                    cur.pos = cur.bytes.len();
                }
            }
            continue;
        }

        if rest.len() >= 9 && rest.as_bytes()[..9].eq_ignore_ascii_case(b"<!doctype") {
            let Some(end) = rest.find('>') else {
                break;
            };
            out.push(Token::Doctype(rest[2..end].trim().to_string()));
            cur.pos += end + 1;
            continue;
        }

        if rest.as_bytes().get(1) == Some(&b'/') {
            cur.pos += 2;
            let name = cur.take_name().to_ascii_lowercase();
            cur.take_until(|b| b == b'>');
            if cur.peek() == Some(b'>') {
                cur.pos += 1;
            }
            if !name.is_empty() {
                out.push(Token::EndTag(name));
            }
            continue;
        }

        cur.pos += 1;
        let name = cur.take_name().to_ascii_lowercase();
        if name.is_empty() {
            // A stray '<' is literal text.
            out.push(Token::Text("<".to_string()));
            continue;
        }
        let (attributes, mut self_closing) = read_attributes(&mut cur);
        if is_void_element(&name) {
            self_closing = true;
        }
        let rawtext = is_rawtext_element(&name) && !self_closing;
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if rawtext {
            let body = cur.rest();
            match find_rawtext_close(body, &name) {
                Some((start, end)) => {
                    if start > 0 {
                        out.push(Token::Text(body[..start].to_string()));
                    }
                    cur.pos += end;
                }
                None => {
                    if !body.is_empty() {
                        out.push(Token::Text(body.to_string()));
                    }
                    cur.pos = cur.bytes.len();
                }
            }
            out.push(Token::EndTag(name));
        }
    }

    log::trace!(target: "dom.tokenizer", "tokenized {} bytes into {} tokens", input.len(), out.len());
    out
}

fn read_attributes(cur: &mut Cursor<'_>) -> (Vec<(String, Option<String>)>, bool) {
    let mut attributes = Vec::new();
    loop {
        cur.skip_whitespace();
        match cur.peek() {
            None => return (attributes, false),
            Some(b'>') => {
                cur.pos += 1;
                return (attributes, false);
            }
            Some(b'/') => {
                cur.pos += 1;
                if cur.peek() == Some(b'>') {
                    cur.pos += 1;
                    return (attributes, true);
                }
                continue;
            }
            _ => {}
        }

        let name = cur.take_attribute_name();
        if name.is_empty() {
            cur.skip_char();
            continue;
        }
        let name = name.to_ascii_lowercase();

        cur.skip_whitespace();
        if cur.peek() != Some(b'=') {
            attributes.push((name, None));
            continue;
        }
        cur.pos += 1;
        cur.skip_whitespace();

        let value = match cur.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                cur.pos += 1;
                let raw = cur.take_until(|b| b == quote);
                if !cur.at_end() {
                    cur.pos += 1;
                }
                decode_entities(raw)
            }
            _ => {
                let start = cur.pos;
                while let Some(b) = cur.peek() {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    if b == b'/' && cur.bytes.get(cur.pos + 1) == Some(&b'>') {
                        break;
                    }
                    cur.pos += 1;
                }
                decode_entities(&cur.input[start..cur.pos])
            }
        };
        attributes.push((name, Some(value)));
    }
}
