use pretty_assertions::assert_eq;
use proptest::prelude::*;
use ss_kcl::{decode, error::Result, locate_root, Child, DecodeOptions, NodeTree};
use tracing::info;
use tracing_test::traced_test;

/// A header pointing at a root at 0x40 whose slot `k` holds `slots[k]`
fn kcl(slots: [i32; 8], extra: &[[i32; 8]]) -> Vec<u8> {
    let mut buffer = vec![0u8; 0x40];
    buffer[12..16].copy_from_slice(&0x40u32.to_be_bytes());
    for words in std::iter::once(&slots).chain(extra) {
        buffer.extend(words.iter().flat_map(|w| w.to_be_bytes()));
    }
    buffer
}

#[traced_test]
#[test]
fn shallow_tree() -> Result<()> {
    let buffer = kcl([-4, 0x20, -0x10, -0x14, -0x18, -0x1C, -0x20, -0x24], &[[-0x8; 8]]);

    let root = locate_root(&buffer)?;
    assert_eq!(root, 0x40);

    let tree = decode(&buffer, root, &DecodeOptions::default())?;
    info!("decoded\n{tree}");

    let node = tree.get(root).map(|n| n.children);
    let Some(children) = node else {
        panic!("root was not decoded");
    };
    assert_eq!(children[0], Child::Leaf(0x3C));
    assert!(matches!(children[1], Child::Node(_)));
    for (k, child) in children.iter().enumerate().skip(2) {
        assert_eq!(*child, Child::Leaf(0x40 - 0x10 - 4 * (k as u32 - 2)));
    }

    let inner = tree.get(0x60).map(|n| n.children);
    assert_eq!(inner, Some([Child::Leaf(0x58); 8]));

    Ok(())
}

#[traced_test]
#[test]
fn tree_from_header() -> Result<()> {
    let buffer = kcl([-1; 8], &[]);
    let tree = NodeTree::from_kcl(&buffer, &DecodeOptions::default())?;

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.leaves(), vec![0x3F]);

    Ok(())
}

proptest! {
    #[test]
    fn arbitrary_buffers_never_panic(
        buffer in prop::collection::vec(any::<u8>(), 0..512),
        root in 0u32..512,
    ) {
        let options = DecodeOptions::builder().max_depth(16).build();
        if let Ok(tree) = decode(&buffer, root, &options) {
            prop_assert!(tree.depth() <= 16);
            prop_assert!(!tree.is_empty());
        }
    }
}
