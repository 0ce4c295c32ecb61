/// A tiny DOM: just enough to build the instruction panels. All text is escaped when rendered.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: &'static str,
    class: Option<String>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            children: Vec::new(),
        }
    }

    pub fn class<I: Into<String>>(mut self, class: I) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn text<I: Into<String>>(mut self, text: I) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn child(mut self, element: Element) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    pub fn tag(&self) -> &str {
        self.tag
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Concatenated text of this element and everything under it
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(x) => out.push_str(x),
                Node::Element(e) => out.push_str(&e.inner_text()),
            }
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        if let Some(ref class) = self.class {
            out.push_str(&format!(" class=\"{}\"", escape(class)));
        }
        if is_void(self.tag) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Text(x) => out.push_str(&escape(x)),
                Node::Element(e) => e.write_html(out),
            }
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img")
}

pub fn escape(x: &str) -> String {
    let mut out = String::with_capacity(x.len());
    for c in x.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A container element on the page that renderers append to.
pub struct Panel {
    id: String,
    children: Vec<Element>,
}

impl Panel {
    pub fn new<I: Into<String>>(id: I) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
        }
    }

    pub fn append(&mut self, element: Element) {
        self.children.push(element);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn to_html(&self) -> String {
        let mut out = format!("<div id=\"{}\">", escape(&self.id));
        for child in &self.children {
            out.push_str(&child.to_html());
        }
        out.push_str("</div>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_nested() {
        let e = Element::new("li")
            .child(Element::new("span").class("arrow leftturn"))
            .child(Element::new("span").text("Turn left onto <Ebertstraße> & go"));
        assert_eq!(
            e.to_html(),
            "<li><span class=\"arrow leftturn\"></span><span>Turn left onto &lt;Ebertstraße&gt; &amp; go</span></li>"
        );
        assert_eq!(e.inner_text(), "Turn left onto <Ebertstraße> & go");
    }

    #[test]
    fn void_elements() {
        let e = Element::new("div")
            .text("a")
            .child(Element::new("br"))
            .text("b");
        assert_eq!(e.to_html(), "<div>a<br/>b</div>");
    }

    #[test]
    fn panel() {
        let mut panel = Panel::new("panel");
        panel.append(Element::new("h3").text("A - B"));
        assert_eq!(panel.to_html(), "<div id=\"panel\"><h3>A - B</h3></div>");
        assert_eq!(escape("it's \"quoted\""), "it&#39;s &quot;quoted&quot;");
    }
}
