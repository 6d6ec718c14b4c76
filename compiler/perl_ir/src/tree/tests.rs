#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::{LexMode, StringInterner, Token, TokenKind};
use pretty_assertions::assert_eq;

fn tokens(layout: &[(TokenKind, u32, u32)]) -> TokenList {
    layout
        .iter()
        .map(|&(kind, start, end)| Token::new(kind, Span::new(start, end), LexMode::Code))
        .collect()
}

fn root_context(interner: &StringInterner) -> ScopeContext {
    ScopeContext {
        package: interner.intern("main"),
        features: FeatureTable::default(),
    }
}

/// Builds the tree for `my $x = 1;`:
/// File(ExprStmt(AssignExpr(VarDecl(my, ScalarVar($x)), =, NumberLit(1)), ;))
fn build_assignment(interner: &StringInterner) -> SyntaxTree {
    let list = tokens(&[
        (TokenKind::KwMy, 0, 2),
        (TokenKind::ScalarVar, 3, 5),
        (TokenKind::Assign, 6, 7),
        (TokenKind::Number, 8, 9),
        (TokenKind::Semicolon, 9, 10),
    ]);
    let mut b = TreeBuilder::new(root_context(interner));
    b.start_node(NodeKind::File);
    b.start_node(NodeKind::ExprStmt);
    let cp = b.checkpoint();
    b.start_node(NodeKind::VarDecl);
    b.token(0, list[0].span);
    b.start_node(NodeKind::ScalarVar);
    b.set_name(interner.intern("x"));
    b.token(1, list[1].span);
    b.finish_node();
    b.finish_node();
    b.start_node_at(cp, NodeKind::AssignExpr);
    b.token(2, list[2].span);
    b.start_node(NodeKind::NumberLit);
    b.token(3, list[3].span);
    b.finish_node();
    b.finish_node();
    b.token(4, list[4].span);
    b.finish_node();
    b.finish_node();
    b.finish(list)
}

#[test]
fn test_post_order_allocation() {
    let interner = StringInterner::new();
    let tree = build_assignment(&interner);

    assert_eq!(tree.kind(tree.root()), NodeKind::File);
    assert_eq!(tree.root().index(), tree.len() - 1);
    for id in tree.preorder(tree.root()) {
        for child in tree.child_nodes(id) {
            assert!(child < id, "child {child:?} allocated after parent {id:?}");
            assert_eq!(tree.parent(child), Some(id));
        }
    }
    assert_eq!(tree.parent(tree.root()), None);
}

#[test]
fn test_checkpoint_wraps_previous_children() {
    let interner = StringInterner::new();
    let tree = build_assignment(&interner);

    let stmt = tree.child_nodes(tree.root()).next().unwrap();
    let assign = tree.child_of_kind(stmt, NodeKind::AssignExpr).unwrap();
    let kinds: Vec<_> = tree.child_nodes(assign).map(|n| tree.kind(n)).collect();
    assert_eq!(kinds, vec![NodeKind::VarDecl, NodeKind::NumberLit]);
    assert_eq!(tree.span(assign), Span::new(0, 9));
    assert_eq!(tree.span(stmt), Span::new(0, 10));
}

#[test]
fn test_every_token_attached_once() {
    let interner = StringInterner::new();
    let tree = build_assignment(&interner);

    let mut seen = vec![0u32; tree.tokens().len()];
    for id in tree.preorder(tree.root()) {
        for (idx, _) in tree.child_tokens(id) {
            seen[idx as usize] += 1;
        }
    }
    assert!(seen.iter().all(|&n| n == 1), "{seen:?}");
}

#[test]
fn test_node_at_offset_finds_deepest() {
    let interner = StringInterner::new();
    let tree = build_assignment(&interner);

    let var = tree.node_at_offset(4).unwrap();
    assert_eq!(tree.kind(var), NodeKind::ScalarVar);
    assert_eq!(interner.lookup(tree.name(var)), "x");

    let num = tree.node_at_offset(8).unwrap();
    assert_eq!(tree.kind(num), NodeKind::NumberLit);
    assert_eq!(tree.node_at_offset(50), None);
}

#[test]
fn test_ancestors_and_enclosing() {
    let interner = StringInterner::new();
    let tree = build_assignment(&interner);

    let var = tree.node_at_offset(4).unwrap();
    let kinds: Vec<_> = tree.ancestors(var).map(|n| tree.kind(n)).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::VarDecl,
            NodeKind::AssignExpr,
            NodeKind::ExprStmt,
            NodeKind::File
        ]
    );
    assert!(tree.enclosing(var, NodeKind::ExprStmt).is_some());
    assert_eq!(tree.enclosing(var, NodeKind::SubDecl), None);
}

#[test]
fn test_contexts_are_recorded_per_node() {
    let interner = StringInterner::new();
    let list = tokens(&[(TokenKind::Semicolon, 0, 1), (TokenKind::Semicolon, 2, 3)]);
    let mut b = TreeBuilder::new(root_context(&interner));
    b.start_node(NodeKind::File);
    b.start_node(NodeKind::EmptyStmt);
    b.token(0, list[0].span);
    b.finish_node();

    let strict = ScopeContext {
        package: interner.intern("Foo"),
        features: FeatureTable::default().with_pragma("strict", &[], true),
    };
    let id = b.push_context(strict);
    assert_ne!(id, ContextId::ROOT);
    // Pushing an identical context reuses it.
    assert_eq!(b.push_context(strict), id);

    b.start_node(NodeKind::EmptyStmt);
    b.token(1, list[1].span);
    b.finish_node();
    let tree = b.finish(list);

    assert_eq!(interner.lookup(tree.context_at(0).package), "main");
    assert_eq!(interner.lookup(tree.context_at(2).package), "Foo");
    assert_eq!(tree.contexts().len(), 2);
}

#[test]
fn test_empty_builder_yields_file_root() {
    let interner = StringInterner::new();
    let tree = TreeBuilder::new(root_context(&interner)).finish(TokenList::new());
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.kind(tree.root()), NodeKind::File);
    assert!(tree.children(tree.root()).is_empty());
}
