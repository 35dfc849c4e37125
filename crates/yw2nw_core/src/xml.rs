//! Minimal XML element tree for writing project files.
//!
//! Reading goes through `roxmltree`; this module only covers output: ordered
//! attributes, optional text, child elements and two-space indentation.

use roxmltree::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder form of `set`.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets or replaces an attribute, keeping first-insertion order.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends a child and returns a handle to it.
    pub fn push(&mut self, child: XmlElement) -> &mut XmlElement {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Appends `<tag>text</tag>`.
    pub fn push_text(&mut self, tag: &str, text: impl Into<String>) {
        self.children.push(XmlElement::new(tag).with_text(text));
    }

    /// Serializes with an XML declaration and a trailing newline.
    pub fn to_document(&self) -> String {
        let mut out = String::from("<?xml version='1.0' encoding='utf-8'?>\n");
        self.write_into(&mut out, 0);
        out
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attributes {
            out.push_str(&format!(" {key}=\"{}\"", escape_attr(value)));
        }

        let text = self.text.as_deref().unwrap_or("");
        if self.children.is_empty() {
            if text.is_empty() {
                out.push_str(" />\n");
            } else {
                out.push_str(&format!(">{}</{}>\n", escape_text(text), self.tag));
            }
            return;
        }

        out.push('>');
        out.push_str(&escape_text(text));
        out.push('\n');
        for child in &self.children {
            child.write_into(out, depth + 1);
        }
        out.push_str(&indent);
        out.push_str(&format!("</{}>\n", self.tag));
    }
}

pub fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
}

/// First child element named `tag`.
pub fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|candidate| candidate.is_element() && candidate.has_tag_name(tag))
}

/// Text of the first child element named `tag`; `None` when the element is
/// missing, `Some("")` when it is empty.
pub fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag).map(|found| found.text().unwrap_or("").to_string())
}

/// All child elements named `tag`, in document order.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |candidate| candidate.is_element() && candidate.has_tag_name(tag))
}

#[cfg(test)]
mod tests {
    use super::XmlElement;

    #[test]
    fn nested_elements_are_indented_and_escaped() {
        let mut root = XmlElement::new("root").attr("name", "a \"b\"");
        root.push_text("title", "x < y & z");
        root.push(XmlElement::new("empty"));
        assert_eq!(
            root.to_document(),
            "<?xml version='1.0' encoding='utf-8'?>\n\
             <root name=\"a &quot;b&quot;\">\n  \
             <title>x &lt; y &amp; z</title>\n  \
             <empty />\n\
             </root>\n"
        );
    }
}
