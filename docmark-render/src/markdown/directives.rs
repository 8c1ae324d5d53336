//! Triple-colon directive lines
//!
//! `:::image type="content" source="a.png" alt-text="A":::` opens with three
//! colons, then a name, then attributes. The trailing colons are optional on
//! some directives (`:::zone pivot="x"`).

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub closed: bool,
}

/// Directive names that open a block closed by `:::<name>-end:::`.
pub const CONTAINER_DIRECTIVES: &[&str] = &["row", "column", "zone", "moniker"];

impl Directive {
    pub fn new(name: &str, attributes: Vec<(String, String)>) -> Self {
        Directive {
            name: name.to_string(),
            attributes,
            closed: true,
        }
    }

    pub fn parse(line: &str) -> Option<Directive> {
        let rest = line.trim().strip_prefix(":::")?.trim_start();
        let (body, closed) = match rest.strip_suffix(":::") {
            Some(body) => (body.trim_end(), true),
            None => (rest, false),
        };
        let name_len = body
            .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(body.len());
        if name_len == 0 {
            return None;
        }
        let name = body[..name_len].to_string();
        let attributes = parse_attributes(&body[name_len..])?;
        Some(Directive {
            name,
            attributes,
            closed,
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True for the opening line of a block that needs a matching `-end` line.
    pub fn opens_container(&self) -> bool {
        CONTAINER_DIRECTIVES.contains(&self.name.as_str())
            || (self.name == "image" && self.attribute("type") == Some("complex"))
    }

    /// The name this line closes, if it is an `-end` line.
    pub fn closes(&self) -> Option<&str> {
        self.name.strip_suffix("-end")
    }

    pub fn to_line(&self) -> String {
        let mut line = format!(":::{}", self.name);
        for (key, value) in &self.attributes {
            line.push(' ');
            line.push_str(key);
            line.push_str("=\"");
            line.push_str(&value.replace('"', "&quot;"));
            line.push('"');
        }
        if self.closed {
            line.push_str(":::");
        }
        line
    }

    pub fn end_line(name: &str) -> String {
        format!(":::{name}-end:::")
    }
}

fn parse_attributes(mut input: &str) -> Option<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    loop {
        input = input.trim_start();
        if input.is_empty() {
            return Some(attributes);
        }
        let key_len = input
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(input.len());
        if key_len == 0 {
            return None;
        }
        let key = input[..key_len].to_string();
        input = &input[key_len..];
        let Some(after_eq) = input.strip_prefix('=') else {
            attributes.push((key, String::new()));
            continue;
        };
        let (value, rest) = match after_eq.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &after_eq[1..];
                let end = body.find(quote)?;
                (body[..end].replace("&quot;", "\""), &body[end + 1..])
            }
            _ => {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                (after_eq[..end].to_string(), &after_eq[end..])
            }
        };
        attributes.push((key, value));
        input = rest;
    }
}
