//! Template markup parsing using html5ever.
//!
//! Markup is parsed with the HTML fragment algorithm in a `<body>` context,
//! into an `RcDom`, and then copied into the document arena under a fresh
//! detached fragment node.

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use super::{Document, ElementData, NodeId, NodeKind};

impl Document {
    /// Parse markup into a new detached `DocumentFragment`.
    ///
    /// Malformed markup is recovered by html5ever's own rules; this never fails.
    pub fn parse_fragment(&mut self, markup: &str) -> NodeId {
        let context = QualName::new(None, ns!(html), local_name!("body"));
        let dom: RcDom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
            .one(markup);

        let fragment = self.create_fragment();
        // The fragment algorithm parents the parsed nodes under a synthetic <html>.
        for root in dom.document.children.borrow().iter() {
            for child in root.children.borrow().iter() {
                self.convert_node(child, fragment);
            }
        }
        fragment
    }

    fn convert_node(&mut self, rc_node: &Handle, parent: NodeId) {
        let node = match &rc_node.data {
            RcNodeData::Text { contents } => {
                self.new_node(NodeKind::Text(contents.borrow().to_string()))
            }
            RcNodeData::Comment { contents } => self.new_node(NodeKind::Comment(contents.to_string())),
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let mut data = ElementData::new(&name.local);
                for attr in attrs.borrow().iter() {
                    data.attrs
                        .push((attr.name.local.to_string(), attr.value.to_string()));
                }
                let node = self.new_node(NodeKind::Element(data));

                // <template> keeps its parsed content aside; inline it.
                let contents = template_contents.borrow().clone();
                let source = contents.as_ref().unwrap_or(rc_node);
                for child in source.children.borrow().iter() {
                    self.convert_node(child, node);
                }
                node
            }
            RcNodeData::Document
            | RcNodeData::Doctype { .. }
            | RcNodeData::ProcessingInstruction { .. } => return,
        };
        parent.append(node, &mut self.arena);
    }
}
