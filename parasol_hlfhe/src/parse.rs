use crate::{Error, Result, Type};

/// A nested list literal as it appears inside `dense<...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Nested {
    Leaf(u64),
    List(Vec<Nested>),
}

/// A minimal recursive descent parser over the textual forms of types and attributes.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    /// Consume `token` if it comes next, ignoring leading whitespace.
    pub fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();

        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{token}`")))
        }
    }

    fn peek_digit(&mut self) -> bool {
        self.skip_whitespace();
        self.rest().starts_with(|c: char| c.is_ascii_digit())
    }

    pub fn unsigned(&mut self) -> Result<u64> {
        self.skip_whitespace();

        let len = self
            .rest()
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest().len());

        if len == 0 {
            return Err(self.error("expected an unsigned integer"));
        }

        let value = self.rest()[..len]
            .parse::<u64>()
            .map_err(|e| self.error(e.to_string()))?;

        self.pos += len;

        Ok(value)
    }

    fn width(&mut self) -> Result<u32> {
        let width = self.unsigned()?;
        let width = u32::try_from(width).map_err(|_| self.error("bit width is too large"))?;

        if width == 0 {
            return Err(Error::ZeroWidth);
        }

        Ok(width)
    }

    pub fn parse_type(&mut self) -> Result<Type> {
        if self.eat("!HLFHE.eint<") {
            let width = self.width()?;
            self.expect(">")?;

            Ok(Type::EncryptedInteger(width))
        } else if self.eat("tensor<") {
            let mut shape = vec![];

            while self.peek_digit() {
                shape.push(self.unsigned()? as usize);
                self.expect("x")?;
            }

            let element = self.parse_type()?;
            self.expect(">")?;

            Ok(Type::ranked_tensor(&shape, element))
        } else if self.eat("i") {
            Ok(Type::Integer(self.width()?))
        } else {
            Err(self.error("expected a type"))
        }
    }

    pub fn parse_nested(&mut self) -> Result<Nested> {
        if !self.eat("[") {
            return Ok(Nested::Leaf(self.unsigned()?));
        }

        let mut items = vec![];

        if self.eat("]") {
            return Ok(Nested::List(items));
        }

        loop {
            items.push(self.parse_nested()?);

            if self.eat("]") {
                break;
            }

            self.expect(",")?;
        }

        Ok(Nested::List(items))
    }

    pub fn finish(&mut self) -> Result<()> {
        self.skip_whitespace();

        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }
}

impl Nested {
    /// Flatten the literal in row-major order, checking it has exactly `shape`.
    pub fn flatten_into(&self, shape: &[usize], out: &mut Vec<u64>) -> Result<()> {
        match (self, shape.split_first()) {
            (Self::Leaf(x), None) => {
                out.push(*x);
                Ok(())
            }
            (Self::List(items), Some((dim, rest))) if items.len() == *dim => {
                items.iter().try_for_each(|i| i.flatten_into(rest, out))
            }
            (Self::List(items), Some((dim, _))) => Err(Error::MalformedLiteral(format!(
                "expected {dim} elements, found {}",
                items.len()
            ))),
            (Self::Leaf(_), Some(_)) => Err(Error::MalformedLiteral(format!(
                "expected a list of {} dimension(s), found a scalar",
                shape.len()
            ))),
            (Self::List(_), None) => Err(Error::MalformedLiteral(
                "expected a scalar, found a list".to_owned(),
            )),
        }
    }
}
