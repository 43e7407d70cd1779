// 型式パーサー
//
// フィールドの型式文字列を LogicalType の構文木に変換します。
//
// 文法:
//   type  := path | '[' digits? ']' type | 'map[' type ']' type | unsupported
//   path  := ident ('.' ident)*
// unsupported は `*`, `chan`, `func`, `interface{`, `struct{` で始まる型です。

use crate::core::schema::LogicalType;

/// 型式を解析する
///
/// 末尾に余分な文字が残る場合や、括弧が閉じていない場合はエラーを返します。
pub fn parse_type_expr(input: &str) -> Result<LogicalType, String> {
    let source = input.trim();
    if source.is_empty() {
        return Err("type expression is empty".to_string());
    }

    let mut parser = TypeExprParser::new(source);
    let parsed = parser.parse_type()?;
    if !parser.at_end() {
        return Err(format!(
            "unexpected '{}' at offset {} in type expression '{}'",
            parser.rest(),
            parser.pos,
            source
        ));
    }
    Ok(parsed)
}

struct TypeExprParser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> TypeExprParser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), String> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(format!(
                "expected '{}' at offset {} in type expression '{}'",
                token, self.pos, self.source
            ))
        }
    }

    fn parse_type(&mut self) -> Result<LogicalType, String> {
        let rest = self.rest();

        if is_unsupported_form(rest) {
            // 外側の `]` までを読み飛ばす（スキーマとしては扱わない）
            self.pos += unsupported_len(rest);
            return Ok(LogicalType::Unsupported);
        }

        if self.eat("map[") {
            let key = self.parse_type()?;
            self.expect("]")?;
            let value = self.parse_type()?;
            return Ok(LogicalType::map(key, value));
        }

        if self.eat("[") {
            // 固定長配列 `[N]T` も列型として扱う
            let digits = self
                .rest()
                .bytes()
                .take_while(|b| b.is_ascii_digit())
                .count();
            self.pos += digits;
            self.expect("]")?;
            let element = self.parse_type()?;
            return Ok(LogicalType::sequence(element));
        }

        self.parse_path().map(LogicalType::Named)
    }

    fn parse_path(&mut self) -> Result<String, String> {
        let mut segments = vec![self.parse_ident()?];
        while self.eat(".") {
            segments.push(self.parse_ident()?);
        }
        Ok(segments.join("."))
    }

    fn parse_ident(&mut self) -> Result<String, String> {
        let rest = self.rest();
        let mut chars = rest.char_indices();

        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' => {}
            _ => {
                return Err(format!(
                    "expected identifier at offset {} in type expression '{}'",
                    self.pos, self.source
                ))
            }
        }

        let len = chars
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        Ok(rest[..len].to_string())
    }
}

fn is_unsupported_form(rest: &str) -> bool {
    rest.starts_with('*')
        || rest.starts_with("chan ")
        || rest.starts_with("<-chan")
        || rest.starts_with("func(")
        || rest.starts_with("interface{")
        || rest.starts_with("struct{")
}

fn unsupported_len(rest: &str) -> usize {
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' if depth == 0 => return i,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    rest.len()
}
