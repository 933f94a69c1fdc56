// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Conversion between a flat document delta and the addressable blocks an
//! editor renders.
//!
//! A document is a run of blocks; each block is styled text terminated by
//! a newline whose `node_id` attribute names the block. This converter
//! handles rich *text* only; embeds are reported as unsupported.

use crate::attributes::Attributes;
use crate::delta::Delta;
use crate::document::NODE_ID_ATTR;
use crate::operation::{AttrValue, InsertValue, OpKind, OpType};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConvertError {
    /// Content after the last block newline; there is no block to hang
    /// it on, and the conversion cannot recover.
    #[error("orphaned operations: content is not terminated by a block newline")]
    OrphanedOperations,
    /// A node this converter does not know how to render.
    #[error("unsupported document node: {kind}")]
    UnsupportedNode { kind: String },
    /// A block newline without a `node_id`; the document breaks the
    /// block-addressability invariant.
    #[error("block newline is missing a node id")]
    MissingNodeId,
    /// Retains or deletes in what should be a document.
    #[error("not a document: documents contain only insert operations")]
    NotADocument,
}

/// One styled run of text within a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub attributes: Attributes,
}

/// One addressable rich-text block: its spans plus the attributes of the
/// terminating newline (block-level formatting), without the node id.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub node_id: String,
    pub spans: Vec<Span>,
    pub attributes: Attributes,
}

/// Splits a document delta into its blocks.
pub fn blocks_from_document(document: &Delta) -> Result<Vec<Block>, ConvertError> {
    let mut blocks = Vec::new();
    let mut spans: Vec<Span> = Vec::new();

    for op in document {
        if op.op_type() != OpType::Insert {
            return Err(ConvertError::NotADocument);
        }
        match op.kind() {
            OpKind::Insert(InsertValue::Embed(embed)) => {
                let mut kinds: Vec<_> = embed.keys().cloned().collect();
                kinds.sort();
                return Err(ConvertError::UnsupportedNode {
                    kind: kinds.join(", "),
                });
            }
            OpKind::Insert(InsertValue::Text(text)) => {
                for piece in split_keeping_newlines(text) {
                    if piece == "\n" {
                        blocks.push(close_block(std::mem::take(&mut spans), op.attributes())?);
                    } else {
                        spans.push(Span {
                            text: piece.to_string(),
                            attributes: op.attributes().clone(),
                        });
                    }
                }
            }
            _ => unreachable!("non-insert was rejected above"),
        }
    }

    if !spans.is_empty() {
        return Err(ConvertError::OrphanedOperations);
    }
    Ok(blocks)
}

/// Rebuilds the flat document delta from its blocks.
pub fn document_from_blocks(blocks: &[Block]) -> Delta {
    let mut document = Delta::default();
    for block in blocks {
        for span in &block.spans {
            document.insert_attr(span.text.clone(), span.attributes.clone());
        }
        let mut newline_attributes = block.attributes.clone();
        newline_attributes.insert(NODE_ID_ATTR, block.node_id.clone());
        document.insert_attr("\n", newline_attributes);
    }
    document
}

fn close_block(spans: Vec<Span>, newline_attributes: &Attributes) -> Result<Block, ConvertError> {
    let Some(AttrValue::Str(node_id)) = newline_attributes.get(NODE_ID_ATTR) else {
        return Err(ConvertError::MissingNodeId);
    };
    let mut attributes = newline_attributes.clone();
    attributes.remove(NODE_ID_ATTR);
    Ok(Block {
        node_id: node_id.clone(),
        spans,
        attributes,
    })
}

/// Splits text into maximal newline-free pieces and single `"\n"`s.
fn split_keeping_newlines(text: &str) -> impl Iterator<Item = &str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(at) = rest.find('\n') {
        if at > 0 {
            pieces.push(&rest[..at]);
        }
        pieces.push("\n");
        rest = &rest[at + 1..];
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces.into_iter()
}
