use scraper::{ElementRef, Html, Node};

/// One step of a document-order walk over report markup.
///
/// Text carries already-decoded character references, so `&gt;` arrives
/// as `>` and `&#39;` as `'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    StartTag { name: String, id: Option<String> },
    EndTag { name: String },
    Text(String),
}

#[cfg(test)]
impl MarkupEvent {
    pub fn start(name: impl Into<String>) -> Self {
        MarkupEvent::StartTag {
            name: name.into(),
            id: None,
        }
    }

    pub fn start_with_id(name: impl Into<String>, id: impl Into<String>) -> Self {
        MarkupEvent::StartTag {
            name: name.into(),
            id: Some(id.into()),
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        MarkupEvent::EndTag { name: name.into() }
    }

    pub fn text(data: impl Into<String>) -> Self {
        MarkupEvent::Text(data.into())
    }
}

/// Parse an HTML document and flatten it into start/end/text events.
///
/// The HTML5 parser repairs the tree first (implicit `<tbody>`, unclosed
/// cells, void elements), so every start tag gets a matching end tag.
pub fn events(html: &str) -> Vec<MarkupEvent> {
    let document = Html::parse_document(html);
    let mut events = Vec::new();
    walk(document.root_element(), &mut events);
    events
}

fn walk(element: ElementRef<'_>, events: &mut Vec<MarkupEvent>) {
    let name = element.value().name().to_string();
    events.push(MarkupEvent::StartTag {
        name: name.clone(),
        id: element.value().id().map(str::to_string),
    });

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            walk(child_element, events);
        } else if let Node::Text(text) = child.value() {
            let data: &str = text;
            events.push(MarkupEvent::Text(data.to_string()));
        }
    }

    events.push(MarkupEvent::EndTag { name });
}
