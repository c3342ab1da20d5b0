//! Canonicalizer tests
//!
//! Tests for folding accelerator strings into canonical combos:
//! - Modifier token extraction
//! - Modifier mask computation (aliases, case, unknown tokens)
//! - Order and case insensitivity
//! - Legacy key name aliasing

use crate::core::{parser::*, types::{KeyCombo, Modifier}};

#[test]
fn test_modifier_tokens_preserve_order_and_duplicates() {
    assert_eq!(
        modifier_tokens("<Shift><Control><Shift>a"),
        vec!["<Shift>", "<Control>", "<Shift>"]
    );
}

#[test]
fn test_modifier_tokens_are_non_greedy() {
    assert_eq!(modifier_tokens("<Alt>x<Super>"), vec!["<Alt>", "<Super>"]);
}

#[test]
fn test_modifier_tokens_without_modifiers() {
    assert!(modifier_tokens("F12").is_empty());
    assert!(modifier_tokens("").is_empty());
}

#[test]
fn test_control_aliases_share_one_bit() {
    let control = Modifier::Control.mask_bit();
    assert_eq!(modifier_mask("<Control>a"), control);
    assert_eq!(modifier_mask("<Ctrl>a"), control);
    assert_eq!(modifier_mask("<Primary>a"), control);
    assert_eq!(modifier_mask("<Ctrl><Primary>a"), control);
}

#[test]
fn test_modifier_mask_is_case_insensitive() {
    assert_eq!(modifier_mask("<SUPER>t"), modifier_mask("<super>t"));
    assert_eq!(modifier_mask("<hYpEr>t"), Modifier::Hyper.mask_bit());
}

#[test]
fn test_all_modifier_bits() {
    let mask = modifier_mask("<Shift><Control><Alt><Super><Hyper><Meta>x");
    assert_eq!(mask, (1 << 0) | (1 << 2) | (1 << 3) | (1 << 26) | (1 << 27) | (1 << 28));
}

#[test]
fn test_unknown_tokens_contribute_nothing() {
    assert_eq!(modifier_mask("<Mod5>a"), 0);
    assert_eq!(modifier_mask("<Mod5><Alt>a"), Modifier::Alt.mask_bit());
}

#[test]
fn test_canonicalize_is_order_and_case_insensitive() {
    assert_eq!(
        canonicalize("<Control><Shift>t"),
        canonicalize("<Shift><Control>T")
    );
}

#[test]
fn test_canonicalize_token_spelling() {
    assert_eq!(canonicalize("<Primary>q"), canonicalize("<Ctrl>q"));
}

#[test]
fn test_canonicalize_aliases_above_tab() {
    assert_eq!(canonicalize("<Super>Above_Tab"), canonicalize("<Super>grave"));
    assert_eq!(canonicalize("<Super>Above_Tab").key, "grave");
}

#[test]
fn test_canonicalize_alias_keeps_modifiers_distinct() {
    assert_ne!(canonicalize("<Super>Above_Tab"), canonicalize("<Alt>grave"));
}

#[test]
fn test_canonicalize_strips_unknown_tokens_from_key() {
    let combo = canonicalize("<Mod5>Return");
    assert_eq!(combo, KeyCombo::new(0, "return"));
}

#[test]
fn test_canonicalize_trims_whitespace() {
    assert_eq!(canonicalize(" <Super> t "), KeyCombo::new(Modifier::Super.mask_bit(), "t"));
}

#[test]
fn test_canonicalize_display_format() {
    assert_eq!(canonicalize("<Super>t").to_string(), "67108864|t");
    assert_eq!(canonicalize("Print").to_string(), "0|print");
}

#[test]
fn test_canonicalize_empty_is_unset() {
    assert!(canonicalize("").is_unset());
    assert!(!canonicalize("a").is_unset());
}
