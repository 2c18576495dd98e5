use super::*;
use proptest::prelude::*;

fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    let arr: [u8; 2] = bytes[offset..offset + 2]
        .try_into()
        .expect("u16 read out of bounds in test");
    u16::from_le_bytes(arr)
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    let arr: [u8; 4] = bytes[offset..offset + 4]
        .try_into()
        .expect("u32 read out of bounds in test");
    u32::from_le_bytes(arr)
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn sample_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new(123, "Item 123").with_checked(true),
        MenuItem::separator(),
        MenuItem::new(1, "Quit"),
    ]
}

fn popup(bytes: &[u8]) -> Vec<ParsedItem> {
    let parsed = parse_template(bytes).expect("encoded template must parse");
    parsed
        .popup_items()
        .expect("template must hold a single wrapper popup")
        .to_vec()
}

/// Checks a parsed sibling list against the descriptors it was encoded from.
fn assert_mirrors(items: &[MenuItem], parsed: &[ParsedItem]) {
    if items.is_empty() {
        assert_eq!(parsed.len(), 1, "empty list must hold one placeholder");
        assert!(parsed[0].is_last());
        assert!(parsed[0].is_disabled());
        assert!(!parsed[0].has_children());
        return;
    }

    assert_eq!(items.len(), parsed.len(), "sibling count mismatch");
    for (index, (item, got)) in items.iter().zip(parsed).enumerate() {
        assert_eq!(got.is_last(), index + 1 == items.len(), "last flag at #{index}");
        assert_eq!(got.has_children(), item.children().is_some(), "popup flag at #{index}");
        assert_eq!(got.is_separator(), item.separator, "separator at #{index}");
        assert_eq!(got.is_disabled(), item.disabled, "disabled at #{index}");
        assert_eq!(got.is_checked(), item.checked, "checked at #{index}");
        assert_eq!(got.id, item.id);
        assert_eq!(got.text, item.text);
        assert_eq!(got.size % 4, 0, "item size must be 4-byte aligned");
        assert!(got.size >= ITEM_FIXED_SIZE + 2);

        if let Some(children) = item.children() {
            assert_eq!(got.help_id, Some(0));
            let parsed_children = got.children.as_deref().expect("children parsed");
            assert_mirrors(children, parsed_children);
        }
    }
}

#[test]
fn header_is_version_one_with_offset_four() {
    let bytes = encode_template(&sample_menu());
    assert_eq!(read_u16_le(&bytes, 0), TEMPLATE_VERSION);
    assert_eq!(read_u16_le(&bytes, 2), TEMPLATE_HEADER_OFFSET);
    assert_eq!(read_u32_le(&bytes, 4), 0);
    assert_eq!(bytes.len() % 4, 0);
}

#[test]
fn single_item_template_is_bit_exact() {
    let bytes = encode_template(&[MenuItem::new(1, "Quit")]);

    let mut expected = Vec::new();
    push_u16(&mut expected, 1);
    push_u16(&mut expected, 4);
    push_u32(&mut expected, 0);
    // wrapper: 14 + "root" + NUL = 24, help id brings it to 28
    push_u32(&mut expected, 0);
    push_u32(&mut expected, 0);
    push_u32(&mut expected, 0);
    push_u16(&mut expected, MF_END | MF_POPUP);
    for unit in "root".encode_utf16() {
        push_u16(&mut expected, unit);
    }
    push_u16(&mut expected, 0);
    push_u32(&mut expected, 0);
    // child: 14 + "Quit" + NUL = 24
    push_u32(&mut expected, 0);
    push_u32(&mut expected, 0);
    push_u32(&mut expected, 1);
    push_u16(&mut expected, MF_END);
    for unit in "Quit".encode_utf16() {
        push_u16(&mut expected, unit);
    }
    push_u16(&mut expected, 0);

    assert_eq!(bytes, expected);
}

#[test]
fn odd_text_length_is_padded() {
    // "Ab": 14 + 4 + 2 = 20, already aligned; "A": 14 + 2 + 2 = 18 -> 20
    let items = [MenuItem::new(1, "A"), MenuItem::new(2, "Ab")];
    let parsed = popup(&encode_template(&items));
    assert_eq!(parsed[0].size, 20);
    assert_eq!(parsed[1].size, 20);
    assert_eq!(parsed[1].offset, parsed[0].offset + 20);
}

#[test]
fn sample_menu_flags_match_descriptors() {
    let items = sample_menu();
    let parsed = popup(&encode_template(&items));

    assert_eq!(parsed.len(), 3);
    assert!(parsed[0].is_checked());
    assert_eq!(parsed[0].state, MFS_CHECKED);
    assert_ne!(parsed[1].item_type & MFT_SEPARATOR, 0);
    assert_ne!(parsed[2].flags & MF_END, 0);
    assert_eq!(parsed[2].flags & MF_POPUP, 0);
    assert_mirrors(&items, &parsed);
}

#[test]
fn root_wrapper_is_sole_last_item() {
    let parsed = parse_template(&encode_template(&sample_menu())).expect("parse");
    assert_eq!(parsed.items.len(), 1);
    let root = &parsed.items[0];
    assert_eq!(root.flags, MF_END | MF_POPUP);
    assert_eq!(root.text, "root");
    assert_eq!(root.offset, TEMPLATE_HEADER_SIZE);
}

#[test]
fn empty_menu_gets_disabled_placeholder() {
    let parsed = popup(&encode_template(&[]));
    assert_eq!(parsed.len(), 1);
    assert!(parsed[0].is_last());
    assert_eq!(parsed[0].state, MFS_DISABLED);
    assert_eq!(parsed[0].text, "Empty");
    assert_eq!(parsed[0].id, 0);
}

#[test]
fn empty_submenu_gets_placeholder_too() {
    let items = vec![
        MenuItem::submenu("Nothing here", Vec::new()),
        MenuItem::new(9, "After"),
    ];
    let parsed = popup(&encode_template(&items));
    assert!(parsed[0].has_children());
    assert!(!parsed[0].is_last());
    let children = parsed[0].children.as_deref().expect("children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].text, "Empty");
    assert!(children[0].is_disabled());
    assert!(parsed[1].is_last());
}

#[test]
fn nested_submenus_mirror_descriptors() {
    let items = vec![
        MenuItem::new(123, "Item 123"),
        MenuItem::submenu(
            "Submenu",
            vec![
                MenuItem::new(456, "Subitem 456"),
                MenuItem::submenu("Deeper", vec![MenuItem::new(7, "x").with_disabled(true)]),
                MenuItem::new(789, "Subitem 789"),
            ],
        ),
    ];
    assert_mirrors(&items, &popup(&encode_template(&items)));
}

#[test]
fn encode_options_change_placeholder_and_root_text() {
    let options = EncodeOptions {
        root_text: String::from("r"),
        empty_text: String::from("(none)"),
    };
    let bytes = encode_template_with(&[], &options);
    assert_eq!(bytes.len(), template_size_with(&[], &options));
    let parsed = parse_template(&bytes).expect("parse");
    assert_eq!(parsed.items[0].text, "r");
    let items = parsed.popup_items().expect("popup");
    assert_eq!(items[0].text, "(none)");
}

#[test]
fn non_bmp_text_counts_utf16_units() {
    let items = [MenuItem::new(1, "\u{1F600}")];
    let parsed = popup(&encode_template(&items));
    // 14 + 2 * 2 + 2 = 20
    assert_eq!(parsed[0].size, 20);
    assert_eq!(parsed[0].text, "\u{1F600}");
}

#[test]
fn parse_rejects_bad_headers() {
    assert!(matches!(
        parse_template(&[1, 0, 4]),
        Err(Error::HeaderTooSmall { size: 3 })
    ));

    let mut bytes = encode_template(&sample_menu());
    bytes[0] = 2;
    assert!(matches!(
        parse_template(&bytes),
        Err(Error::UnsupportedVersion { got: 2 })
    ));

    let mut bytes = encode_template(&sample_menu());
    bytes[2] = 0;
    assert!(matches!(
        parse_template(&bytes),
        Err(Error::InvalidHeaderOffset { got: 0 })
    ));
}

#[test]
fn parse_reports_truncation() {
    let bytes = encode_template(&sample_menu());
    let truncated = &bytes[..bytes.len() - 24];
    assert!(matches!(
        parse_template(truncated),
        Err(Error::ItemOutOfBounds { .. })
    ));

    let mut unterminated = encode_template(&[MenuItem::new(1, "Quit")]);
    unterminated.truncate(unterminated.len() - 2);
    assert!(matches!(
        parse_template(&unterminated),
        Err(Error::UnterminatedText { .. })
    ));
}

#[test]
fn parse_rejects_runaway_nesting() {
    let mut item = MenuItem::new(1, "leaf");
    for _ in 0..parse::MAX_DEPTH + 1 {
        item = MenuItem::submenu("n", vec![item]);
    }
    let bytes = encode_template(&[item]);
    assert!(matches!(
        parse_template(&bytes),
        Err(Error::NestingTooDeep { .. })
    ));
}

#[test]
fn deepest_readable_tree_round_trips() {
    let nest = |levels: usize| {
        let mut item = MenuItem::new(1, "leaf");
        for _ in 0..levels {
            item = MenuItem::submenu("n", vec![item]);
        }
        encode_template(&[item])
    };

    assert!(parse_template(&nest(parse::MAX_DEPTH - 2)).is_ok());
    assert!(matches!(
        parse_template(&nest(parse::MAX_DEPTH - 1)),
        Err(Error::NestingTooDeep { max: parse::MAX_DEPTH })
    ));
}

#[test]
fn encode_into_replaces_sink_content() {
    let items = sample_menu();
    let mut out = vec![0xEE; 4];
    let written = encode_template_into(&items, &EncodeOptions::default(), &mut out)
        .expect("vec sink");
    assert_eq!(written, template_size(&items));
    assert_eq!(out, encode_template(&items));
}

fn arb_menu_item() -> impl Strategy<Value = MenuItem> {
    let leaf = (
        any::<u32>(),
        "[a-zA-Z0-9 &]{0,12}",
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(id, text, separator, disabled, checked)| MenuItem {
            id,
            text,
            separator,
            disabled,
            checked,
            kind: MenuItemKind::Leaf,
        });
    leaf.prop_recursive(3, 32, 4, |inner| {
        (
            any::<u32>(),
            "[a-z]{0,9}",
            any::<bool>(),
            proptest::collection::vec(inner, 0..4),
        )
            .prop_map(|(id, text, disabled, children)| MenuItem {
                id,
                text,
                disabled,
                kind: MenuItemKind::Submenu(children),
                ..MenuItem::default()
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn encoded_structure_mirrors_descriptors(
        items in proptest::collection::vec(arb_menu_item(), 0..6)
    ) {
        let bytes = encode_template(&items);
        prop_assert_eq!(bytes.len(), template_size(&items));
        prop_assert_eq!(bytes.len() % 4, 0);
        assert_mirrors(&items, &popup(&bytes));
    }

    #[test]
    fn parse_template_is_panic_free_on_random_bytes(
        data in proptest::collection::vec(any::<u8>(), 0..512)
    ) {
        let _ = parse_template(&data);
    }
}
